//! [`Query`] collection related to [`Complaint`] lists.
//!
//! [`Complaint`]: crate::domain::Complaint

use common::operations::By;

use crate::domain::{property, user, Complaint};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Complaint`]s filed by a [`User`], newest first.
///
/// [`Complaint`]: crate::domain::Complaint
/// [`User`]: crate::domain::User
pub type ByUser = DatabaseQuery<By<Vec<Complaint>, user::Id>>;

/// Queries all the [`Complaint`]s against a [`Property`], newest first.
///
/// [`Complaint`]: crate::domain::Complaint
/// [`Property`]: crate::domain::Property
pub type ByProperty = DatabaseQuery<By<Vec<Complaint>, property::Id>>;
