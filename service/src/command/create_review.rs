//! [`Command`] for creating a new [`Review`].

use common::{
    operations::{By, Commit, Insert, Lock, Perform, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{property, review, user, Property, Review},
    infra::{assist, database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Review`].
///
/// Moderation is advisory and best-effort: a model failure yields the
/// neutral verdict and never blocks the submission. The property aggregate
/// is recomputed in the same transaction as the insert.
#[derive(Clone, Debug)]
pub struct CreateReview {
    /// ID of the [`User`] authoring the [`Review`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the [`Property`] being reviewed.
    pub property_id: property::Id,

    /// Rating given by the [`Review`].
    pub rating: review::Rating,

    /// Optional title of the [`Review`].
    pub title: Option<review::Title>,

    /// Text of the [`Review`].
    pub text: review::Text,
}

impl<Db> Command<CreateReview> for Service<Db>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Review>, (user::Id, property::Id)>>,
            Ok = Option<Review>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Review>, Err = Traced<database::Error>>
        + Database<
            Perform<By<read::property::RatingStats, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Review;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateReview) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateReview {
            user_id,
            property_id,
            rating,
            title,
            text,
        } = cmd;

        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        let existing = self
            .database()
            .execute(Select(By::<Option<Review>, _>::new((
                user_id,
                property.id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::AlreadyReviewed(property.id)));
        }

        let verdict = self
            .assistant()
            .moderate(&text, rating)
            .await
            .unwrap_or_else(|e| {
                log::warn!("review moderation unavailable: {e}");
                assist::Moderation::fallback()
            });
        let flag_reason = verdict
            .should_flag
            .then(|| review::FlagReason::new(verdict.flag_reason.clone()))
            .flatten();

        let review = Review {
            id: review::Id::new(),
            user_id,
            property_id: property.id,
            rating,
            title,
            text,
            sentiment: review::Sentiment {
                score: verdict.sentiment_score,
                label: verdict.label(),
            },
            flagged: verdict.should_flag,
            flag_reason,
            helpful: 0,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Aggregate recomputation must see a stable review set.
        tx.execute(Lock(By::new(property.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(review.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Perform(By::<read::property::RatingStats, _>::new(
            property.id,
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

/// Error of [`CreateReview`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`User`] has already reviewed this [`Property`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`Property(id: {_0})` is already reviewed by this `User`")]
    AlreadyReviewed(#[error(not(source))] property::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}
