//! [`Command`] definition.

pub mod authorize_user_session;
pub mod cancel_booking;
pub mod create_booking;
pub mod create_complaint;
pub mod create_payment_order;
pub mod create_property;
pub mod create_review;
pub mod create_room;
pub mod create_user;
pub mod create_user_session;
pub mod delete_review;
pub mod flag_review;
pub mod handle_payment_webhook;
pub mod resolve_complaint;
pub mod update_booking_status;
pub mod verify_payment;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    cancel_booking::CancelBooking, create_booking::CreateBooking,
    create_complaint::CreateComplaint,
    create_payment_order::CreatePaymentOrder, create_property::CreateProperty,
    create_review::CreateReview, create_room::CreateRoom,
    create_user::CreateUser, create_user_session::CreateUserSession,
    delete_review::DeleteReview, flag_review::FlagReview,
    handle_payment_webhook::HandlePaymentWebhook,
    resolve_complaint::ResolveComplaint,
    update_booking_status::UpdateBookingStatus, verify_payment::VerifyPayment,
};
