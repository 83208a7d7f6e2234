//! [`Booking`] read model definitions.

use rust_decimal::Decimal;

#[cfg(doc)]
use crate::domain::Booking;

pub mod list {
    //! [`Booking`]s list definitions.
    //!
    //! [`Booking`]: crate::domain::Booking

    use common::define_pagination;

    use crate::domain::{booking, Booking};

    define_pagination!(Booking, Filter);

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// [`booking::Status`] to filter by.
        pub status: Option<booking::Status>,
    }
}

/// Month-bucketed [`Booking`] volume, used as demand-prediction history.
#[derive(Clone, Debug)]
pub struct MonthlyVolume {
    /// Month in `YYYY-MM` form.
    pub month: String,

    /// Number of bookings created that month.
    pub bookings: i64,

    /// Total booked amount of that month, in rupees.
    pub revenue: Decimal,

    /// Average booked amount of that month, in rupees.
    pub avg_amount: Decimal,
}
