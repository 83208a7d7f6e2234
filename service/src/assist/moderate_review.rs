//! [`Assist`] operation moderating review text.

use std::convert::Infallible;

use tracing as log;

use crate::{
    domain::review,
    infra::assist,
    Service,
};

use super::Assist;

/// [`Assist`] operation moderating review text.
///
/// Advisory only: [`CreateReview`] runs the same moderation internally;
/// this operation exposes it for pre-submission checks.
///
/// [`CreateReview`]: crate::command::CreateReview
#[derive(Clone, Debug)]
pub struct ModerateReview {
    /// Text of the review to moderate.
    pub text: review::Text,

    /// Rating the review gives.
    pub rating: review::Rating,
}

impl<Db> Assist<ModerateReview> for Service<Db> {
    type Ok = assist::Moderation;
    type Err = Infallible;

    /// Moderates the review, falling back to the neutral
    /// [`assist::Moderation::fallback()`] verdict on any upstream failure,
    /// so moderation never blocks a submission.
    async fn execute(&self, op: ModerateReview) -> Result<Self::Ok, Self::Err> {
        let ModerateReview { text, rating } = op;

        Ok(self
            .assistant()
            .moderate(&text, rating)
            .await
            .unwrap_or_else(|e| {
                log::warn!("review moderation unavailable: {e}");
                assist::Moderation::fallback()
            }))
    }
}
