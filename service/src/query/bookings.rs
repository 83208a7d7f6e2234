//! [`Query`] collection related to [`Booking`] lists.
//!
//! [`Booking`]: crate::domain::Booking

use common::operations::By;

use crate::{
    domain::{property, user, Booking},
    read,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Booking`]s made by a [`User`], newest first.
///
/// [`Booking`]: crate::domain::Booking
/// [`User`]: crate::domain::User
pub type ByUser = DatabaseQuery<By<Vec<Booking>, user::Id>>;

/// Queries all the [`Booking`]s of a [`Property`], newest first.
///
/// [`Booking`]: crate::domain::Booking
/// [`Property`]: crate::domain::Property
pub type ByProperty = DatabaseQuery<By<Vec<Booking>, property::Id>>;

/// Queries a [`read::booking::list::Page`] of all the [`Booking`]s.
///
/// [`Booking`]: crate::domain::Booking
pub type List =
    DatabaseQuery<By<read::booking::list::Page, read::booking::list::Selector>>;

/// Queries month-bucketed [`Booking`] volumes for demand prediction.
///
/// [`Booking`]: crate::domain::Booking
pub type MonthlyVolumes = DatabaseQuery<
    By<Vec<read::booking::MonthlyVolume>, Option<property::Id>>,
>;
