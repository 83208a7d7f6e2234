//! [`Command`] for creating a new [`Property`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, user, Property, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Property`].
#[derive(Clone, Debug)]
pub struct CreateProperty {
    /// ID of the [`User`] listing the [`Property`].
    pub owner_id: user::Id,

    /// Name of a new [`Property`].
    pub name: property::Name,

    /// Description of a new [`Property`].
    pub description: property::Description,

    /// Kind of a new [`Property`].
    pub kind: property::Kind,

    /// Gender policy of a new [`Property`].
    pub gender: property::GenderPolicy,

    /// Location of a new [`Property`].
    pub location: property::Location,

    /// Amenities of a new [`Property`].
    pub amenities: Vec<property::Amenity>,

    /// House rules of a new [`Property`].
    pub rules: Vec<property::Rule>,

    /// Starting daily rate, until the first room defines the real one.
    pub starting_from: Money,

    /// Security deposit of a new [`Property`].
    pub security_deposit: Money,
}

impl<Db> Command<CreateProperty> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProperty {
            owner_id,
            name,
            description,
            kind,
            gender,
            location,
            amenities,
            rules,
            starting_from,
            security_deposit,
        } = cmd;

        let owner = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(owner_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(owner_id))
            .map_err(tracerr::wrap!())?;
        if !owner.role.may(user::Action::ManageProperties) {
            return Err(tracerr::new!(E::NotAllowed(owner.id)));
        }

        let created_at: property::CreationDateTime = DateTime::now().coerce();
        let slug = property::Slug::generate(&name, created_at);

        let property = Property {
            id: property::Id::new(),
            name,
            slug,
            description,
            kind,
            gender,
            location,
            amenities,
            rules,
            pricing: property::Pricing {
                starting_from,
                security_deposit,
            },
            owner_id: owner.id,
            avg_rating: property::Rating::NONE,
            total_reviews: 0,
            total_rooms: 0,
            available_rooms: 0,
            verified: false,
            featured: false,
            active: true,
            created_at,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`CreateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] is not allowed to list properties.
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` is not allowed to list properties")]
    NotAllowed(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}
