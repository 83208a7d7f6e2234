//! [`Command`] for handling a payment gateway webhook.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use serde::Deserialize;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{booking, Booking},
    infra::{database, payment::signature, Database},
    Service,
};

use super::Command;

/// [`Command`] for handling a payment gateway webhook.
///
/// The gateway-initiated, asynchronous, authoritative confirmation path.
/// The signature is recomputed over the *raw* body before anything is
/// parsed or written, and status writes are absolute sets, so at-least-once
/// webhook delivery converges instead of double-crediting.
#[derive(Clone, Debug)]
pub struct HandlePaymentWebhook {
    /// Raw, unparsed body of the webhook request.
    pub raw_body: Vec<u8>,

    /// Value of the signature header, if present.
    pub provided_signature: Option<String>,
}

/// Outcome of a handled webhook.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// `payment.captured`: the [`Booking`] is confirmed and paid.
    Captured,

    /// `payment.failed`: the payment is marked failed, the [`Booking`]
    /// status is untouched.
    Failed,

    /// Event is not relevant; acknowledged and ignored.
    Ignored,
}

/// Webhook payload shape of the gateway.
#[derive(Debug, Deserialize)]
struct Event {
    /// Name of the event, e.g. `payment.captured`.
    event: String,

    /// Payload of the event.
    #[serde(default)]
    payload: Option<Payload>,
}

/// Payload of an [`Event`].
#[derive(Debug, Deserialize)]
struct Payload {
    /// Payment entity wrapper.
    #[serde(default)]
    payment: Option<PaymentWrapper>,
}

/// Payment entity wrapper of a [`Payload`].
#[derive(Debug, Deserialize)]
struct PaymentWrapper {
    /// The payment entity itself.
    entity: PaymentEntity,
}

/// Payment entity of a gateway [`Event`].
#[derive(Debug, Deserialize)]
struct PaymentEntity {
    /// Gateway payment ID.
    id: String,

    /// Gateway order ID the payment belongs to.
    order_id: String,
}

impl<Db> Command<HandlePaymentWebhook> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'o> Database<
            Select<By<Option<Booking>, &'o booking::OrderId>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Outcome;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: HandlePaymentWebhook,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let HandlePaymentWebhook {
            raw_body,
            provided_signature,
        } = cmd;

        // Reject before any state change: both the secret and the header
        // must be present, and the signature must match the raw body.
        let secret = self
            .gateway()
            .config()
            .secret()
            .ok_or(E::NoSecret)
            .map_err(tracerr::wrap!())?;
        let provided = provided_signature
            .ok_or(E::NoSignature)
            .map_err(tracerr::wrap!())?;
        if !signature::verify(secret, &raw_body, &provided) {
            return Err(tracerr::new!(E::SignatureMismatch));
        }

        let event: Event = serde_json::from_slice(&raw_body)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let payment = event.payload.and_then(|p| p.payment).map(|p| p.entity);
        let (confirmed, payment) = match (event.event.as_str(), payment) {
            ("payment.captured", Some(p)) => (true, p),
            ("payment.failed", Some(p)) => (false, p),
            (name, _) => {
                log::debug!("ignoring `{name}` webhook event");
                return Ok(Outcome::Ignored);
            }
        };
        let order_id = booking::OrderId::from(payment.order_id.as_str());

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let Some(mut booking) = tx
            .execute(Select(By::<Option<Booking>, _>::new(&order_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            // Unknown order: acknowledge so the gateway stops retrying.
            log::warn!("webhook for unknown order `{order_id}`");
            return Ok(Outcome::Ignored);
        };

        tx.execute(Lock(By::new(booking.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if confirmed {
            if booking.status.may_become(booking::Status::Confirmed) {
                booking.status = booking::Status::Confirmed;
            }
            booking.payment.status = booking::PaymentStatus::Completed;
            booking.payment.payment_id =
                Some(booking::PaymentId::from(payment.id.as_str()));
            if booking.payment.paid_at.is_none() {
                booking.payment.paid_at = Some(DateTime::now().coerce());
            }
        } else {
            booking.payment.status = booking::PaymentStatus::Failed;
        }

        tx.execute(Update(booking))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(if confirmed {
            Outcome::Captured
        } else {
            Outcome::Failed
        })
    }
}

/// Error of [`HandlePaymentWebhook`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Webhook body is not the expected JSON.
    #[display("Cannot parse webhook body: {_0}")]
    BadBody(serde_json::Error),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Gateway secret is not configured; webhooks cannot be authenticated.
    #[display("Webhook secret is not configured")]
    NoSecret,

    /// Signature header is missing.
    #[display("Webhook signature header is missing")]
    NoSignature,

    /// Signature does not match the raw body.
    #[display("Webhook signature verification failed")]
    SignatureMismatch,
}
