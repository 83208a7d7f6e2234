//! [`Review`] read model definitions.

#[cfg(doc)]
use crate::domain::Review;

pub mod list {
    //! [`Review`]s list definitions.
    //!
    //! [`Review`]: crate::domain::Review

    use common::define_pagination;

    use crate::domain::Review;

    define_pagination!(Review, Filter);

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Flagged state to filter by.
        pub flagged: Option<bool>,
    }
}
