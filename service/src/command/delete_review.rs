//! [`Command`] for deleting a [`Review`].

use common::operations::{
    By, Commit, Delete, Lock, Perform, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, review, user, Property, Review},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Review`].
///
/// The property aggregate is recomputed in the same transaction as the
/// deletion.
#[derive(Clone, Copy, Debug)]
pub struct DeleteReview {
    /// ID of the [`Review`] to delete.
    pub review_id: review::Id,

    /// ID of the [`User`] requesting the deletion.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// Role of the initiator, as authenticated.
    pub initiator_role: user::Role,
}

impl<Db> Command<DeleteReview> for Service<Db>
where
    Db: Database<
            Select<By<Option<Review>, review::Id>>,
            Ok = Option<Review>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Delete<By<Review, review::Id>>, Err = Traced<database::Error>>
        + Database<
            Perform<By<read::property::RatingStats, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteReview) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteReview {
            review_id,
            initiator_id,
            initiator_role,
        } = cmd;

        let review = self
            .database()
            .execute(Select(By::<Option<Review>, _>::new(review_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReviewNotExists(review_id))
            .map_err(tracerr::wrap!())?;

        let is_admin = initiator_role == user::Role::Admin;
        if review.user_id != initiator_id && !is_admin {
            return Err(tracerr::new!(E::NotAllowed(initiator_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(review.property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Delete(By::<Review, _>::new(review.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Perform(By::<read::property::RatingStats, _>::new(
            review.property_id,
        )))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(())
    }
}

/// Error of [`DeleteReview`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Initiator is neither the [`Review`] author nor an admin.
    #[display("`User(id: {_0})` may not delete this `Review`")]
    NotAllowed(#[error(not(source))] user::Id),

    /// [`Review`] with the provided ID does not exist.
    #[display("`Review(id: {_0})` does not exist")]
    ReviewNotExists(#[error(not(source))] review::Id),
}
