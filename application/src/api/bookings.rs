//! [`Booking`] endpoints.
//!
//! [`Booking`]: service::domain::Booking

use axum::{
    extract::{Path, Query as UrlQuery},
    routing::{get, post, put},
    Extension, Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use service::{
    command::{self, Command as _},
    domain::{booking, property, room, user, Booking},
    query::{self, Query as _},
    read,
};
use uuid::Uuid;

use crate::{api, define_error, AsError, Error, Service, Session};

/// Builds the [`Router`] of the booking endpoints.
#[must_use]
pub(super) fn router() -> Router {
    Router::new()
        .route("/", post(create).get(list))
        .route("/my", get(my))
        .route("/property/:propertyId", get(by_property))
        .route("/:id/cancel", put(cancel))
        .route("/:id/status", put(update_status))
}

/// [`Booking`] representation of the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    /// ID of the booking.
    pub id: booking::Id,

    /// ID of the booking user.
    pub user_id: user::Id,

    /// ID of the booked property.
    pub property_id: property::Id,

    /// ID of the booked room.
    pub room_id: room::Id,

    /// Check-in time, RFC 3339.
    pub check_in: String,

    /// Check-out time, RFC 3339.
    pub check_out: String,

    /// Number of guests staying.
    pub guests: u16,

    /// Frozen amount breakdown of the booking.
    pub amount: AmountDto,

    /// Payment state of the booking.
    pub payment: PaymentDto,

    /// Status of the booking.
    pub status: booking::Status,

    /// Special requests left by the guest.
    pub special_requests: Option<String>,

    /// Invoice number of the booking.
    pub invoice_number: String,

    /// Creation time of the booking, RFC 3339.
    pub created_at: String,
}

/// Amount part of a [`BookingDto`], in rupees.
#[derive(Debug, Serialize)]
pub struct AmountDto {
    /// Room rate multiplied by the stay length.
    pub subtotal: Decimal,

    /// GST applied to the subtotal.
    pub tax: Decimal,

    /// Discount subtracted from the total.
    pub discount: Decimal,

    /// Final amount to be paid.
    pub total: Decimal,
}

/// Payment part of a [`BookingDto`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    /// Payment method, if chosen.
    pub method: Option<booking::Method>,

    /// Payment status.
    pub status: booking::PaymentStatus,

    /// Gateway order ID, once an order has been created.
    pub razorpay_order_id: Option<String>,

    /// Gateway payment ID, once captured.
    pub razorpay_payment_id: Option<String>,

    /// Payment time, RFC 3339, once paid.
    pub paid_at: Option<String>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            property_id: b.property_id,
            room_id: b.room_id,
            check_in: b.check_in.to_rfc3339(),
            check_out: b.check_out.to_rfc3339(),
            guests: b.guests,
            amount: AmountDto {
                subtotal: b.amount.subtotal.amount,
                tax: b.amount.tax.amount,
                discount: b.amount.discount.amount,
                total: b.amount.total.amount,
            },
            payment: PaymentDto {
                method: b.payment.method,
                status: b.payment.status,
                razorpay_order_id: b.payment.order_id.map(|o| o.to_string()),
                razorpay_payment_id: b
                    .payment
                    .payment_id
                    .map(|p| p.to_string()),
                paid_at: b.payment.paid_at.map(|at| at.to_rfc3339()),
            },
            status: b.status,
            special_requests: b.special_requests.map(|s| s.to_string()),
            invoice_number: b.invoice_number.to_string(),
            created_at: b.created_at.to_rfc3339(),
        }
    }
}

/// Body of the `POST /bookings` request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest {
    /// ID of the property to book.
    property_id: Uuid,

    /// ID of the room to book.
    room_id: Uuid,

    /// Check-in time, RFC 3339.
    check_in: String,

    /// Check-out time, RFC 3339.
    check_out: String,

    /// Number of guests staying.
    #[serde(default = "one")]
    guests: u16,

    /// Special requests of the guest.
    special_requests: Option<String>,
}

/// Serde default for the guest count.
fn one() -> u16 {
    1
}

/// Creates a new [`Booking`].
#[tracing::instrument(skip_all, fields(http.name = "createBooking"))]
async fn create(
    Extension(service): Extension<Service>,
    session: Session,
    Json(body): Json<CreateRequest>,
) -> Result<(http::StatusCode, Json<serde_json::Value>), Error> {
    let check_in = common::DateTime::from_rfc3339(&body.check_in)
        .map_err(|e| Error::invalid_input(format!("invalid `checkIn`: {e}")))?
        .coerce();
    let check_out = common::DateTime::from_rfc3339(&body.check_out)
        .map_err(|e| {
            Error::invalid_input(format!("invalid `checkOut`: {e}"))
        })?
        .coerce();
    let special_requests = body
        .special_requests
        .map(|s| {
            booking::SpecialRequests::new(s).ok_or_else(|| {
                Error::invalid_input("invalid `specialRequests`")
            })
        })
        .transpose()?;

    let booking = service
        .execute(command::CreateBooking {
            user_id: session.user_id,
            property_id: body.property_id.into(),
            room_id: body.room_id.into(),
            check_in,
            check_out,
            guests: body.guests,
            special_requests,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::CREATED,
        Json(json!({
            "success": true,
            "booking": BookingDto::from(booking),
        })),
    ))
}

/// Returns the authenticated user's bookings, newest first.
#[tracing::instrument(skip_all, fields(http.name = "myBookings"))]
async fn my(
    Extension(service): Extension<Service>,
    session: Session,
) -> Result<Json<serde_json::Value>, Error> {
    let bookings = service
        .execute(query::bookings::ByUser::by(session.user_id))
        .await
        .map_err(AsError::into_error)?
        .into_iter()
        .map(BookingDto::from)
        .collect::<Vec<_>>();

    Ok(Json(json!({
        "success": true,
        "bookings": bookings,
    })))
}

/// Returns the bookings of a property, for its owner or an admin.
#[tracing::instrument(
    skip_all,
    fields(http.name = "propertyBookings", property_id = %property_id),
)]
async fn by_property(
    Extension(service): Extension<Service>,
    session: Session,
    Path(property_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, Error> {
    let property_id = property::Id::from(property_id);

    let property = service
        .execute(query::property::ById::by(property_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(api::NotFoundError::NotFound))?;
    if property.owner_id != session.user_id
        && session.role != user::Role::Admin
    {
        return Err(api::PrivilegeError::NotAuthorized.into());
    }

    let bookings = service
        .execute(query::bookings::ByProperty::by(property_id))
        .await
        .map_err(AsError::into_error)?
        .into_iter()
        .map(BookingDto::from)
        .collect::<Vec<_>>();

    Ok(Json(json!({
        "success": true,
        "bookings": bookings,
    })))
}

/// Filters of the `GET /bookings` request.
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    /// Status to filter by.
    status: Option<booking::Status>,

    /// 1-based number of the requested page.
    page: Option<usize>,

    /// Number of items per page.
    limit: Option<usize>,
}

/// Lists all the bookings, admin-only, paginated.
#[tracing::instrument(skip_all, fields(http.name = "listBookings"))]
async fn list(
    Extension(service): Extension<Service>,
    session: Session,
    UrlQuery(q): UrlQuery<ListQuery>,
) -> Result<Json<serde_json::Value>, Error> {
    if !session.role.may(user::Action::ViewAllBookings) {
        return Err(api::PrivilegeError::NotAuthorized.into());
    }

    let page = service
        .execute(query::bookings::List::by(read::booking::list::Selector {
            arguments: api::PageQuery {
                page: q.page,
                limit: q.limit,
            }
            .arguments(),
            filter: read::booking::list::Filter { status: q.status },
        }))
        .await
        .map_err(AsError::into_error)?;

    let meta = api::PageMeta::from(&page);
    let bookings = page
        .items
        .into_iter()
        .map(BookingDto::from)
        .collect::<Vec<_>>();

    Ok(Json(json!({
        "success": true,
        "bookings": bookings,
        "pagination": meta,
    })))
}

/// Cancels a [`Booking`].
#[tracing::instrument(skip_all, fields(http.name = "cancelBooking", id = %id))]
async fn cancel(
    Extension(service): Extension<Service>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, Error> {
    let booking = service
        .execute(command::CancelBooking {
            booking_id: id.into(),
            initiator_id: session.user_id,
            initiator_role: session.role,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": BookingDto::from(booking),
    })))
}

/// Body of the `PUT /bookings/{id}/status` request.
#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    /// Status to transition the booking into.
    status: booking::Status,
}

/// Drives a [`Booking`] through its status lifecycle, for the property
/// owner or an admin.
#[tracing::instrument(
    skip_all,
    fields(http.name = "updateBookingStatus", id = %id),
)]
async fn update_status(
    Extension(service): Extension<Service>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, Error> {
    let booking = service
        .execute(command::UpdateBookingStatus {
            booking_id: id.into(),
            status: body.status,
            initiator_id: session.user_id,
            initiator_role: session.role,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": BookingDto::from(booking),
    })))
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_DATE_RANGE"]
                #[status = BAD_REQUEST]
                #[message = "Check-out date must be after the check-in date"]
                InvalidDateRange,

                #[code = "NO_GUESTS"]
                #[status = BAD_REQUEST]
                #[message = "`Booking` must have at least one guest"]
                NoGuests,

                #[code = "ROOM_NOT_EXISTS"]
                #[status = BAD_REQUEST]
                #[message = "`Room` with the provided ID is not available"]
                RoomNotExists,

                #[code = "ROOM_SOLD_OUT"]
                #[status = BAD_REQUEST]
                #[message = "`Room` has no available beds"]
                RoomSoldOut,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidDateRange => Error::InvalidDateRange.into(),
            Self::NoGuests => Error::NoGuests.into(),
            Self::RoomNotExists(_) => Error::RoomNotExists.into(),
            Self::RoomSoldOut(_) => Error::RoomSoldOut.into(),
        })
    }
}

impl AsError for command::cancel_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_CANCELLED"]
                #[status = BAD_REQUEST]
                #[message = "`Booking` is already cancelled"]
                AlreadyCancelled,

                #[code = "BOOKING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Booking` with the provided ID does not exist"]
                BookingNotExists,

                #[code = "NOT_CANCELLABLE"]
                #[status = CONFLICT]
                #[message = "`Booking` status does not permit cancellation"]
                NotCancellable,
            }
        }

        Some(match self {
            Self::AlreadyCancelled(_) => Error::AlreadyCancelled.into(),
            Self::BookingNotExists(_) => Error::BookingNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotAllowed(_) => api::PrivilegeError::NotAuthorized.into(),
            Self::NotCancellable(_) => Error::NotCancellable.into(),
        })
    }
}

impl AsError for command::update_booking_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "BOOKING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Booking` with the provided ID does not exist"]
                BookingNotExists,

                #[code = "ILLEGAL_TRANSITION"]
                #[status = CONFLICT]
                #[message = "Requested `Booking` status transition is not \
                             allowed"]
                IllegalTransition,
            }
        }

        Some(match self {
            Self::BookingNotExists(_) => Error::BookingNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::IllegalTransition { .. } => Error::IllegalTransition.into(),
            Self::NotAllowed(_) => api::PrivilegeError::NotAuthorized.into(),
        })
    }
}
