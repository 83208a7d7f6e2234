//! Background [`Task`]s definitions.

mod background;
pub mod reconcile_counters;

pub use common::Handler as Task;

pub use self::{
    background::Background, reconcile_counters::ReconcileCounters,
};
