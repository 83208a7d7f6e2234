//! AI-assist operations of the [`Service`].
//!
//! These are the advisory operations backed by the model API: they degrade
//! onto documented fallbacks instead of failing, and none of them mutates
//! core state.
//!
//! [`Service`]: crate::Service

pub mod chat;
pub mod classify_complaint;
pub mod moderate_review;
pub mod predict_demand;

/// AI-assist operation of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Assist;

pub use self::{
    chat::Chat, classify_complaint::ClassifyComplaint,
    moderate_review::ModerateReview, predict_demand::PredictDemand,
};
