//! [`Assist`] operation classifying a complaint.

use std::convert::Infallible;

use tracing as log;

use crate::{
    domain::complaint,
    infra::assist,
    Service,
};

use super::Assist;

/// [`Assist`] operation classifying a complaint.
///
/// Advisory only: the suggestion never changes complaint state by itself.
#[derive(Clone, Debug)]
pub struct ClassifyComplaint {
    /// Title of the complaint.
    pub title: complaint::Title,

    /// Description of the complaint.
    pub description: complaint::Description,
}

impl<Db> Assist<ClassifyComplaint> for Service<Db> {
    type Ok = complaint::Classification;
    type Err = Infallible;

    /// Classifies the complaint, falling back to the default
    /// [`assist::Classification::fallback()`] snapshot on any upstream
    /// failure.
    async fn execute(
        &self,
        op: ClassifyComplaint,
    ) -> Result<Self::Ok, Self::Err> {
        let ClassifyComplaint { title, description } = op;

        Ok(self
            .assistant()
            .classify(&title, &description)
            .await
            .unwrap_or_else(|e| {
                log::warn!("complaint classification unavailable: {e}");
                assist::Classification::fallback()
            })
            .snapshot())
    }
}
