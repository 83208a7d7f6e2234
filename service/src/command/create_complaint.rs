//! [`Command`] for filing a new [`Complaint`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{complaint, property, user, Complaint, Property},
    infra::{assist, database, Database},
    Service,
};

use super::Command;

/// [`Command`] for filing a new [`Complaint`].
///
/// Classification is advisory: its snapshot is stored alongside the
/// complaint, and a model failure yields the default snapshot without
/// blocking the submission.
#[derive(Clone, Debug)]
pub struct CreateComplaint {
    /// ID of the [`User`] filing the [`Complaint`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the [`Property`] the [`Complaint`] is about.
    pub property_id: property::Id,

    /// Title of the [`Complaint`].
    pub title: complaint::Title,

    /// Description of the [`Complaint`].
    pub description: complaint::Description,

    /// Category picked by the filer, if any.
    pub category: Option<complaint::Category>,

    /// Priority picked by the filer, if any.
    pub priority: Option<complaint::Priority>,
}

impl<Db> Command<CreateComplaint> for Service<Db>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Complaint>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Complaint;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateComplaint,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateComplaint {
            user_id,
            property_id,
            title,
            description,
            category,
            priority,
        } = cmd;

        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        let classification = self
            .assistant()
            .classify(&title, &description)
            .await
            .unwrap_or_else(|e| {
                log::warn!("complaint classification unavailable: {e}");
                assist::Classification::fallback()
            })
            .snapshot();

        let complaint = Complaint {
            id: complaint::Id::new(),
            user_id,
            property_id: property.id,
            title,
            description,
            category: category
                .unwrap_or(classification.suggested_category),
            priority: priority
                .unwrap_or(classification.suggested_priority),
            status: complaint::Status::Open,
            classification: Some(classification),
            resolution: None,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(complaint.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(complaint)
    }
}

/// Error of [`CreateComplaint`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}
