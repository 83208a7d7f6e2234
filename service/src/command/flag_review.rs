//! [`Command`] for flagging or unflagging a [`Review`].

use common::operations::{
    By, Commit, Lock, Perform, Select, Transact, Transacted, Update,
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

/// [`Command`] for flagging or unflagging a [`Review`].
///
/// Flag state changes the set of reviews the property aggregate is computed
/// over, so the aggregate is recomputed here too, in the same transaction.
#[derive(Clone, Debug)]
pub struct FlagReview {
    /// ID of the [`Review`] to flag or unflag.
    pub review_id: review::Id,

    /// New flagged state of the [`Review`].
    pub flagged: bool,

    /// Reason of the flag, if flagging.
    pub reason: Option<review::FlagReason>,

    /// ID of the [`User`] moderating.
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// Role of the initiator, as authenticated.
    pub initiator_role: user::Role,
}

impl<Db> Command<FlagReview> for Service<Db>
where
    Db: Database<
            Select<By<Option<Review>, review::Id>>,
            Ok = Option<Review>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<Review>, Err = Traced<database::Error>>
        + Database<
            Perform<By<read::property::RatingStats, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Review;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: FlagReview) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let FlagReview {
            review_id,
            flagged,
            reason,
            initiator_id,
            initiator_role,
        } = cmd;

        if !initiator_role.may(user::Action::ModerateReviews) {
            return Err(tracerr::new!(E::NotAllowed(initiator_id)));
        }

        let mut review = self
            .database()
            .execute(Select(By::<Option<Review>, _>::new(review_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReviewNotExists(review_id))
            .map_err(tracerr::wrap!())?;

        review.flagged = flagged;
        review.flag_reason = flagged.then_some(reason).flatten();

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(review.property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Update(review.clone()))
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

        Ok(review)
    }
}

/// Error of [`FlagReview`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Initiator may not moderate reviews.
    #[display("`User(id: {_0})` may not moderate reviews")]
    NotAllowed(#[error(not(source))] user::Id),

    /// [`Review`] with the provided ID does not exist.
    #[display("`Review(id: {_0})` does not exist")]
    ReviewNotExists(#[error(not(source))] review::Id),
}
