//! Payment bridge endpoints.

use axum::{
    body::Bytes, http::HeaderMap, routing::post, Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use service::{
    command::{self, Command as _},
    domain::booking,
};
use uuid::Uuid;

use crate::{
    api::bookings::BookingDto, define_error, AsError, Error, Service, Session,
};

/// Name of the header carrying the gateway webhook signature.
const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Builds the [`Router`] of the payment endpoints.
#[must_use]
pub(super) fn router() -> Router {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/verify", post(verify))
        .route("/webhook", post(webhook))
}

/// Body of the `POST /payments/create-order` request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest {
    /// ID of the booking to pay for.
    booking_id: Uuid,
}

/// Creates a payment gateway order for a booking.
#[tracing::instrument(skip_all, fields(http.name = "createPaymentOrder"))]
async fn create_order(
    Extension(service): Extension<Service>,
    session: Session,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<serde_json::Value>, Error> {
    let output = service
        .execute(command::CreatePaymentOrder {
            booking_id: body.booking_id.into(),
            initiator_id: session.user_id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(json!({
        "success": true,
        "order": output.order,
        "key": output.key,
        "isMock": output.is_mock,
    })))
}

/// Body of the `POST /payments/verify` request.
///
/// Field names follow the gateway checkout callback.
#[derive(Debug, Deserialize)]
struct VerifyRequest {
    /// Gateway order ID.
    razorpay_order_id: String,

    /// Gateway payment ID.
    razorpay_payment_id: String,

    /// Signature over `<order_id>|<payment_id>`.
    razorpay_signature: String,

    /// ID of the booking being paid.
    #[serde(rename = "bookingId")]
    booking_id: Uuid,

    /// Indicator that the checkout ran against a mock order.
    #[serde(rename = "isMock", default)]
    is_mock: bool,
}

/// Verifies a client-redirected payment confirmation.
#[tracing::instrument(skip_all, fields(http.name = "verifyPayment"))]
async fn verify(
    Extension(service): Extension<Service>,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<serde_json::Value>, Error> {
    let booking = service
        .execute(command::VerifyPayment {
            booking_id: body.booking_id.into(),
            order_id: booking::OrderId::from(body.razorpay_order_id),
            payment_id: booking::PaymentId::from(body.razorpay_payment_id),
            signature: booking::Signature::from(body.razorpay_signature),
            is_mock: body.is_mock,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": BookingDto::from(booking),
    })))
}

/// Handles a gateway webhook.
///
/// The body is taken raw: the signature covers the exact bytes on the wire,
/// so it must be verified before any parsing happens.
#[tracing::instrument(skip_all, fields(http.name = "paymentWebhook"))]
async fn webhook(
    Extension(service): Extension<Service>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, Error> {
    let provided_signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    drop(
        service
            .execute(command::HandlePaymentWebhook {
                raw_body: body.to_vec(),
                provided_signature,
            })
            .await
            .map_err(AsError::into_error)?,
    );

    Ok(Json(json!({ "success": true })))
}

impl AsError for command::create_payment_order::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "BOOKING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Booking` with the provided ID does not exist"]
                BookingNotExists,

                #[code = "NOT_AUTHORIZED"]
                #[status = FORBIDDEN]
                #[message = "Authenticated `User` does not own this `Booking`"]
                NotAuthorized,
            }
        }

        Some(match self {
            Self::BookingNotExists(_) => Error::BookingNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            // The booking stays pending and retryable; the gateway outage
            // surfaces as a server error.
            Self::Gateway(_) => return None,
            Self::NotAllowed(_) => Error::NotAuthorized.into(),
        })
    }
}

impl AsError for command::verify_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "BOOKING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Booking` with the provided ID does not exist"]
                BookingNotExists,

                #[code = "NOT_CONFIRMABLE"]
                #[status = CONFLICT]
                #[message = "`Booking` status does not permit confirmation"]
                NotConfirmable,

                #[code = "VERIFICATION_FAILED"]
                #[status = BAD_REQUEST]
                #[message = "Payment verification failed"]
                VerificationFailed,
            }
        }

        Some(match self {
            Self::BookingNotExists(_) => Error::BookingNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotConfirmable(_) => Error::NotConfirmable.into(),
            Self::SignatureMismatch => Error::VerificationFailed.into(),
        })
    }
}

impl AsError for command::handle_payment_webhook::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "BAD_WEBHOOK"]
                #[status = BAD_REQUEST]
                #[message = "Webhook body or signature is invalid"]
                BadWebhook,
            }
        }

        Some(match self {
            Self::BadBody(_)
            | Self::NoSecret
            | Self::NoSignature
            | Self::SignatureMismatch => Error::BadWebhook.into(),
            Self::Db(e) => return e.try_as_error(),
        })
    }
}
