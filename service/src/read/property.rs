//! [`Property`] read model definitions.

#[cfg(doc)]
use crate::domain::Property;

/// Recomputation of [`Property::available_rooms`] from the current state of
/// its rooms.
///
/// Performed inside the same transaction as the triggering bed-count change.
#[derive(Clone, Copy, Debug)]
pub struct Availability;

/// Recomputation of [`Property::total_rooms`],
/// [`Property::available_rooms`], and the lowest daily rate from the current
/// set of rooms.
///
/// Performed when rooms are added, and periodically by the reconciliation
/// task.
#[derive(Clone, Copy, Debug)]
pub struct RoomSummary;

/// Recomputation of [`Property::avg_rating`] and [`Property::total_reviews`]
/// over non-flagged reviews.
///
/// Performed on every review create, delete, and flag change.
#[derive(Clone, Copy, Debug)]
pub struct RatingStats;

pub mod list {
    //! [`Property`] listing definitions.
    //!
    //! [`Property`]: crate::domain::Property

    use common::define_pagination;

    use crate::domain::{property, Property};

    define_pagination!(Property, Filter);

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`property::City`] to list properties in.
        pub city: Option<property::City>,

        /// [`property::Kind`] to list properties of.
        pub kind: Option<property::Kind>,
    }
}
