//! [`Query`] collection related to [`Property`] lists.
//!
//! [`Property`]: crate::domain::Property

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`read::property::list::Page`] of active, verified properties.
pub type List = DatabaseQuery<
    By<read::property::list::Page, read::property::list::Selector>,
>;
