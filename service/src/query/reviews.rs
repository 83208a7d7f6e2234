//! [`Query`] collection related to [`Review`] lists.
//!
//! [`Review`]: crate::domain::Review

use common::operations::By;

use crate::{
    domain::{property, Review},
    read,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries the publicly visible (non-flagged) [`Review`]s of a [`Property`],
/// newest first.
///
/// [`Review`]: crate::domain::Review
/// [`Property`]: crate::domain::Property
pub type ByProperty = DatabaseQuery<By<Vec<Review>, property::Id>>;

/// Queries a [`read::review::list::Page`] of all the [`Review`]s.
///
/// [`Review`]: crate::domain::Review
pub type List =
    DatabaseQuery<By<read::review::list::Page, read::review::list::Selector>>;
