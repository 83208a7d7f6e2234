//! [`Command`] for adding a [`Room`] to a [`Property`].

use common::{
    operations::{By, Commit, Insert, Lock, Perform, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, room, user, Property, Room},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for adding a [`Room`] to a [`Property`].
#[derive(Clone, Debug)]
pub struct CreateRoom {
    /// ID of the [`Property`] to add a [`Room`] to.
    pub property_id: property::Id,

    /// ID of the [`User`] adding the [`Room`].
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// Role of the initiator, as authenticated.
    pub initiator_role: user::Role,

    /// Name of a new [`Room`].
    pub name: room::Name,

    /// Kind of a new [`Room`].
    pub kind: room::Kind,

    /// Price of a new [`Room`].
    pub price: room::Price,

    /// Guest capacity of a new [`Room`].
    pub capacity: room::Capacity,

    /// Total number of beds in a new [`Room`].
    pub total_beds: room::BedCount,

    /// Indicator whether a new [`Room`] is air-conditioned.
    pub ac: bool,

    /// Indicator whether a new [`Room`] has an attached bathroom.
    pub attached_bathroom: bool,
}

impl<Db> Command<CreateRoom> for Service<Db>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Room>, Err = Traced<database::Error>>
        + Database<
            Perform<By<read::property::RoomSummary, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Room;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateRoom) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateRoom {
            property_id,
            initiator_id,
            initiator_role,
            name,
            kind,
            price,
            capacity,
            total_beds,
            ac,
            attached_bathroom,
        } = cmd;

        if total_beds == 0 {
            return Err(tracerr::new!(E::NoBeds));
        }

        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        let is_admin = initiator_role == user::Role::Admin;
        if property.owner_id != initiator_id && !is_admin {
            return Err(tracerr::new!(E::NotAllowed(initiator_id)));
        }

        let room = Room {
            id: room::Id::new(),
            property_id: property.id,
            name,
            kind,
            price,
            capacity,
            total_beds,
            available_beds: total_beds,
            ac,
            attached_bathroom,
            active: true,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize against concurrent room-count recomputations.
        tx.execute(Lock(By::new(property.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(room.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Perform(By::<read::property::RoomSummary, _>::new(
            property.id,
        )))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(room)
    }
}

/// Error of [`CreateRoom`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Room`] must have at least one bed.
    #[display("`Room` must have at least one bed")]
    NoBeds,

    /// Initiator does not own the [`Property`].
    #[display("`User(id: {_0})` does not own the `Property`")]
    NotAllowed(#[error(not(source))] user::Id),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}
