//! [`Command`] for cancelling a [`Booking`].

use common::operations::{
    By, Commit, Lock, Perform, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracing as log;
use tracerr::Traced;

use crate::{
    domain::{booking, property, room, user, Booking},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Booking`].
///
/// The exact inverse of a create: the bed is released (saturating at the
/// room's bed total) and the property availability is recomputed, in one
/// transaction.
#[derive(Clone, Copy, Debug)]
pub struct CancelBooking {
    /// ID of the [`Booking`] to cancel.
    pub booking_id: booking::Id,

    /// ID of the [`User`] requesting the cancellation.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// Role of the initiator, as authenticated.
    pub initiator_role: user::Role,
}

impl<Db> Command<CancelBooking> for Service<Db>
where
    Db: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<
            Update<(room::BedAdjustment, room::Id)>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<
            Perform<By<read::property::Availability, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelBooking {
            booking_id,
            initiator_id,
            initiator_role,
        } = cmd;

        let booking = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        let is_admin = initiator_role == user::Role::Admin;
        if booking.user_id != initiator_id && !is_admin {
            return Err(tracerr::new!(E::NotAllowed(initiator_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent cancellations releasing the bed twice.
        tx.execute(Lock(By::new(booking.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        // Re-cancel is an error, not a no-op: the client must learn the
        // cancellation didn't happen twice.
        if booking.status == booking::Status::Cancelled {
            return Err(tracerr::new!(E::AlreadyCancelled(booking_id)));
        }
        if !booking.status.may_become(booking::Status::Cancelled) {
            return Err(tracerr::new!(E::NotCancellable(booking.status)));
        }

        booking.status = booking::Status::Cancelled;
        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let released = tx
            .execute(Update((room::BedAdjustment::Release, booking.room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !released {
            // Saturated at the bed total: nothing to release, counters are
            // reconciled by the background task.
            log::warn!(
                "bed release for `Booking(id: {})` saturated at the total",
                booking.id,
            );
        }

        tx.execute(Perform(By::<read::property::Availability, _>::new(
            booking.property_id,
        )))
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

/// Error of [`CancelBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] is already cancelled.
    #[display("`Booking(id: {_0})` is already cancelled")]
    AlreadyCancelled(#[error(not(source))] booking::Id),

    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Initiator is neither the [`Booking`] owner nor an admin.
    #[display("`User(id: {_0})` may not cancel this `Booking`")]
    NotAllowed(#[error(not(source))] user::Id),

    /// [`Booking`] status does not permit cancellation.
    #[display("`Booking` in status `{_0}` cannot be cancelled")]
    NotCancellable(#[error(not(source))] booking::Status),
}
