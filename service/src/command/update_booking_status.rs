//! [`Command`] for driving a [`Booking`] through its status lifecycle.

use common::operations::{
    By, Commit, Lock, Perform, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, property, room, user, Booking, Property},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for driving a [`Booking`] through its status lifecycle.
///
/// Transitions follow the explicit state machine of
/// [`booking::Status::may_become`]; there is no admin bypass. Cancelling
/// through this path releases the bed exactly like [`CancelBooking`] does.
///
/// [`CancelBooking`]: super::CancelBooking
#[derive(Clone, Copy, Debug)]
pub struct UpdateBookingStatus {
    /// ID of the [`Booking`] to transition.
    pub booking_id: booking::Id,

    /// Status to transition the [`Booking`] into.
    pub status: booking::Status,

    /// ID of the [`User`] requesting the transition.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// Role of the initiator, as authenticated.
    pub initiator_role: user::Role,
}

impl<Db> Command<UpdateBookingStatus> for Service<Db>
where
    Db: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
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
        cmd: UpdateBookingStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateBookingStatus {
            booking_id,
            status,
            initiator_id,
            initiator_role,
        } = cmd;

        if !initiator_role.may(user::Action::OverrideBookingStatus) {
            return Err(tracerr::new!(E::NotAllowed(initiator_id)));
        }

        let booking = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        // Owners drive only their own property's bookings.
        if initiator_role != user::Role::Admin {
            let property = self
                .database()
                .execute(Select(By::<Option<Property>, _>::new(
                    booking.property_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::BookingNotExists(booking_id))
                .map_err(tracerr::wrap!())?;
            if property.owner_id != initiator_id {
                return Err(tracerr::new!(E::NotAllowed(initiator_id)));
            }
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

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

        if !booking.status.may_become(status) {
            return Err(tracerr::new!(E::IllegalTransition {
                from: booking.status,
                into: status,
            }));
        }

        let releases_bed = status == booking::Status::Cancelled;

        booking.status = status;
        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if releases_bed {
            _ = tx
                .execute(Update((
                    room::BedAdjustment::Release,
                    booking.room_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            tx.execute(Perform(By::<read::property::Availability, _>::new(
                booking.property_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(booking)
    }
}

/// Error of [`UpdateBookingStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested transition is not allowed by the status machine.
    #[display("`Booking` status cannot change from `{from}` to `{into}`")]
    IllegalTransition {
        /// Current [`booking::Status`].
        from: booking::Status,

        /// Requested [`booking::Status`].
        into: booking::Status,
    },

    /// Initiator may not drive this [`Booking`].
    #[display("`User(id: {_0})` may not update this `Booking`")]
    NotAllowed(#[error(not(source))] user::Id),
}
