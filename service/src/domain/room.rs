//! [`Room`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::property;

/// Bookable sub-unit of a [`Property`] with its own capacity and price.
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct Room {
    /// ID of this [`Room`].
    pub id: Id,

    /// ID of the [`Property`] this [`Room`] belongs to.
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: property::Id,

    /// [`Name`] of this [`Room`].
    pub name: Name,

    /// [`Kind`] of this [`Room`].
    pub kind: Kind,

    /// [`Price`] of this [`Room`].
    pub price: Price,

    /// Number of guests this [`Room`] accommodates.
    pub capacity: Capacity,

    /// Total number of beds in this [`Room`].
    pub total_beds: BedCount,

    /// Number of beds currently available for booking.
    ///
    /// Always stays within `0..=total_beds`: mutated only via conditional
    /// single-statement updates, never read-modify-write.
    pub available_beds: BedCount,

    /// Indicator whether this [`Room`] is air-conditioned.
    pub ac: bool,

    /// Indicator whether this [`Room`] has an attached bathroom.
    pub attached_bathroom: bool,

    /// Indicator whether this [`Room`] is active and bookable.
    pub active: bool,

    /// [`DateTime`] when this [`Room`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Room`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`Room`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 128
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

define_kind! {
    #[doc = "Kind of a [`Room`]."]
    enum Kind {
        #[doc = "Single occupancy room."]
        Single = 1,

        #[doc = "Double occupancy room."]
        Double = 2,

        #[doc = "Triple occupancy room."]
        Triple = 3,

        #[doc = "Dormitory with multiple beds."]
        Dormitory = 4,

        #[doc = "Deluxe room."]
        Deluxe = 5,

        #[doc = "Suite."]
        Suite = 6,
    }
}

/// Price of a [`Room`] per stay period.
#[derive(Clone, Copy, Debug)]
pub struct Price {
    /// Price of a [`Room`] per day.
    pub daily: Money,

    /// Price of a [`Room`] per week, if offered.
    pub weekly: Option<Money>,

    /// Price of a [`Room`] per month, if offered.
    pub monthly: Option<Money>,
}

/// Number of guests a [`Room`] accommodates.
pub type Capacity = u16;

/// Number of beds in a [`Room`].
pub type BedCount = u16;

/// Direction of an atomic change to [`Room::available_beds`].
///
/// Applied at the storage layer as a conditional single-statement update:
/// occupying fails (affects zero rows) when the room is sold out, and
/// releasing saturates at [`Room::total_beds`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BedAdjustment {
    /// Take one bed for a new booking.
    Occupy,

    /// Return one bed from a cancelled booking.
    Release,
}

/// [`DateTime`] when a [`Room`] was created.
pub type CreationDateTime = DateTimeOf<(Room, unit::Creation)>;
