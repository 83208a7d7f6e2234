//! [`Command`] for creating a payment gateway order for a [`Booking`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, user, Booking},
    infra::{database, payment, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a payment gateway order for a [`Booking`].
///
/// The order is keyed to the frozen booking total (in paise) and receipted
/// with the invoice number. The [`Booking`] is only marked order-initiated,
/// never paid, by this [`Command`].
#[derive(Clone, Copy, Debug)]
pub struct CreatePaymentOrder {
    /// ID of the [`Booking`] to pay for.
    pub booking_id: booking::Id,

    /// ID of the [`User`] paying, who must own the [`Booking`].
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,
}

/// Output of [`CreatePaymentOrder`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Created gateway [`payment::Order`].
    pub order: payment::Order,

    /// Gateway key for the paying client.
    pub key: String,

    /// Indicator whether the order was synthesized in mock mode.
    pub is_mock: bool,
}

impl<Db> Command<CreatePaymentOrder> for Service<Db>
where
    Db: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePaymentOrder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePaymentOrder {
            booking_id,
            initiator_id,
        } = cmd;

        let mut booking = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        if booking.user_id != initiator_id {
            return Err(tracerr::new!(E::NotAllowed(initiator_id)));
        }

        let order = self
            .gateway()
            .create_order(
                booking.id,
                booking.user_id,
                booking.amount.total,
                &booking.invoice_number,
            )
            .await
            .map_err(tracerr::from_and_wrap!(=> E))?;

        booking.payment.order_id = Some(order.id.clone());
        booking.payment.method = Some(booking::Method::Razorpay);

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Update(booking))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Output {
            order,
            key: self.gateway().config().client_key().to_owned(),
            is_mock: self.gateway().config().is_mock(),
        })
    }
}

/// Error of [`CreatePaymentOrder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Payment gateway error. The [`Booking`] stays pending and retryable.
    #[display("Payment gateway operation failed: {_0}")]
    #[from]
    Gateway(payment::Error),

    /// Initiator does not own the [`Booking`].
    #[display("`User(id: {_0})` does not own this `Booking`")]
    NotAllowed(#[error(not(source))] user::Id),
}
