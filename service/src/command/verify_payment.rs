//! [`Command`] for verifying a client-redirected payment confirmation.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{database, payment::signature, Database},
    Service,
};

use super::Command;

/// [`Command`] for verifying a client-redirected payment confirmation.
///
/// This is the optimistic UI shortcut; the webhook remains the
/// system-of-record path, and both tolerate being invoked for the same
/// [`Booking`].
#[derive(Clone, Debug)]
pub struct VerifyPayment {
    /// ID of the [`Booking`] being paid.
    pub booking_id: booking::Id,

    /// Gateway order ID returned by the checkout.
    pub order_id: booking::OrderId,

    /// Gateway payment ID returned by the checkout.
    pub payment_id: booking::PaymentId,

    /// Signature over `<order_id>|<payment_id>` provided by the checkout.
    pub signature: booking::Signature,

    /// Indicator that the checkout ran against a mock order.
    pub is_mock: bool,
}

impl<Db> Command<VerifyPayment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: VerifyPayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let VerifyPayment {
            booking_id,
            order_id,
            payment_id,
            signature,
            is_mock,
        } = cmd;

        // Mock checkouts and a missing secret bypass the check, matching the
        // gateway's mock mode.
        if !is_mock {
            if let Some(secret) = self.gateway().config().secret() {
                let payload = format!("{order_id}|{payment_id}");
                if !signature::verify(
                    secret,
                    payload.as_bytes(),
                    signature.as_ref(),
                ) {
                    return Err(tracerr::new!(E::SignatureMismatch));
                }
            }
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        // Both confirmation paths may run for the same booking; a repeat is
        // a no-op, not an error.
        if booking.status != booking::Status::Confirmed {
            if !booking.status.may_become(booking::Status::Confirmed) {
                return Err(tracerr::new!(E::NotConfirmable(booking.status)));
            }
            booking.status = booking::Status::Confirmed;
        }
        booking.payment.status = booking::PaymentStatus::Completed;
        booking.payment.payment_id = Some(payment_id);
        booking.payment.signature = Some(signature);
        if booking.payment.paid_at.is_none() {
            booking.payment.paid_at = Some(DateTime::now().coerce());
        }

        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(booking)
    }
}

/// Error of [`VerifyPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Booking`] status does not permit confirmation.
    #[display("`Booking` in status `{_0}` cannot be confirmed")]
    NotConfirmable(#[error(not(source))] booking::Status),

    /// Provided signature does not match the recomputed one.
    ///
    /// Terminal for this confirmation attempt; the [`Booking`] stays
    /// unconfirmed until a valid confirmation arrives.
    #[display("Payment signature verification failed")]
    SignatureMismatch,
}
