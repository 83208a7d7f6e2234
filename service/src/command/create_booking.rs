//! [`Command`] for creating a new [`Booking`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Perform, Select, Transact, Transacted,
        Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, property, room, user, Booking, Property, Room},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Booking`].
///
/// Availability is taken with a conditional single-statement decrement
/// inside the same transaction as the [`Booking`] insert, so two concurrent
/// bookings of the last bed can never both succeed.
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// ID of the [`User`] making the [`Booking`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the [`Property`] to book.
    pub property_id: property::Id,

    /// ID of the [`Room`] to book.
    pub room_id: room::Id,

    /// Check-in date of the [`Booking`].
    pub check_in: booking::CheckInDateTime,

    /// Check-out date of the [`Booking`].
    pub check_out: booking::CheckOutDateTime,

    /// Number of guests staying.
    pub guests: booking::GuestCount,

    /// Special requests left by the guest.
    pub special_requests: Option<booking::SpecialRequests>,
}

impl<Db> Command<CreateBooking> for Service<Db>
where
    Db: Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Update<(room::BedAdjustment, room::Id)>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<
            Perform<By<read::property::Availability, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            user_id,
            property_id,
            room_id,
            check_in,
            check_out,
            guests,
            special_requests,
        } = cmd;

        let nights = booking::nights(check_in, check_out)
            .ok_or(E::InvalidDateRange)
            .map_err(tracerr::wrap!())?;
        if guests == 0 {
            return Err(tracerr::new!(E::NoGuests));
        }

        let room = self
            .database()
            .execute(Select(By::<Option<Room>, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|r| r.active && r.property_id == property_id)
            .ok_or(E::RoomNotExists(room_id))
            .map_err(tracerr::wrap!())?;
        if room.available_beds == 0 {
            return Err(tracerr::new!(E::RoomSoldOut(room_id)));
        }

        let amount = booking::Amount::quote(room.price.daily, nights);

        let id = booking::Id::new();
        let created_at: booking::CreationDateTime = DateTime::now().coerce();
        let booking = Booking {
            id,
            user_id,
            property_id,
            room_id: room.id,
            check_in,
            check_out,
            guests,
            amount,
            payment: booking::Payment::pending(),
            status: booking::Status::Pending,
            special_requests,
            invoice_number: booking::InvoiceNumber::generate(id, created_at),
            created_at,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize against concurrent availability recomputations.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // The decrement is conditional on `available_beds > 0`: of N
        // concurrent bookings of the last bed exactly one passes here.
        let occupied = tx
            .execute(Update((room::BedAdjustment::Occupy, room.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !occupied {
            return Err(tracerr::new!(E::RoomSoldOut(room.id)));
        }

        tx.execute(Insert(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Perform(By::<read::property::Availability, _>::new(
            property_id,
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

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Check-out date is not after the check-in date.
    #[display("Check-out date must be after the check-in date")]
    InvalidDateRange,

    /// [`Booking`] must have at least one guest.
    #[display("`Booking` must have at least one guest")]
    NoGuests,

    /// [`Room`] with the provided ID does not exist in the [`Property`].
    ///
    /// [`Property`]: crate::domain::Property
    #[display("`Room(id: {_0})` does not exist")]
    RoomNotExists(#[error(not(source))] room::Id),

    /// [`Room`] has no available beds left.
    #[display("`Room(id: {_0})` has no available beds")]
    RoomSoldOut(#[error(not(source))] room::Id),
}
