//! Infrastructure layer.

pub mod assist;
pub mod database;
pub mod payment;

pub use self::database::Database;
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
pub use self::{assist::Assistant, payment::Gateway};
