//! [`Query`] collection related to [`Room`] lists.
//!
//! [`Room`]: crate::domain::Room

use common::operations::By;

use crate::domain::{property, Room};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Room`]s of a [`Property`].
///
/// [`Room`]: crate::domain::Room
/// [`Property`]: crate::domain::Property
pub type ByProperty = DatabaseQuery<By<Vec<Room>, property::Id>>;
