//! [`Property`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;

/// Listed hostel, PG, budget hotel or co-living unit.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// [`Name`] of this [`Property`].
    pub name: Name,

    /// [`Slug`] of this [`Property`] used in listing URLs.
    pub slug: Slug,

    /// [`Description`] of this [`Property`].
    pub description: Description,

    /// [`Kind`] of this [`Property`].
    pub kind: Kind,

    /// [`GenderPolicy`] of this [`Property`].
    pub gender: GenderPolicy,

    /// [`Location`] of this [`Property`].
    pub location: Location,

    /// Set of [`Amenity`]s this [`Property`] provides.
    pub amenities: Vec<Amenity>,

    /// House [`Rule`]s of this [`Property`].
    pub rules: Vec<Rule>,

    /// [`Pricing`] summary of this [`Property`].
    pub pricing: Pricing,

    /// ID of the [`User`] owning this [`Property`].
    ///
    /// [`User`]: crate::domain::User
    pub owner_id: user::Id,

    /// Average [`Rating`] over non-flagged reviews of this [`Property`].
    ///
    /// Derived value, recomputed from review rows on every review mutation.
    pub avg_rating: Rating,

    /// Count of non-flagged reviews of this [`Property`].
    ///
    /// Derived value, recomputed together with [`Property::avg_rating`].
    pub total_reviews: i32,

    /// Count of rooms belonging to this [`Property`].
    ///
    /// Derived value, recomputed on every room mutation.
    pub total_rooms: i32,

    /// Count of rooms of this [`Property`] having at least one available bed.
    ///
    /// Derived value, recomputed on every room or booking mutation.
    pub available_rooms: i32,

    /// Indicator whether this [`Property`] has been verified by moderation.
    pub verified: bool,

    /// Indicator whether this [`Property`] is featured on the landing page.
    pub featured: bool,

    /// Indicator whether this [`Property`] is active and bookable.
    pub active: bool,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Property`].
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

/// Name of a [`Property`].
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
        name.trim() == name && !name.is_empty() && name.len() <= 100
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// URL slug of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Slug(String);

impl Slug {
    /// Generates a new [`Slug`] from the provided [`Name`].
    ///
    /// The creation timestamp is mixed in (base36) to keep slugs unique
    /// across properties sharing a name.
    #[must_use]
    pub fn generate(name: &Name, created_at: CreationDateTime) -> Self {
        let mut slug =
            String::with_capacity(AsRef::<str>::as_ref(name).len() + 10);
        let mut prev_dash = true;
        for c in AsRef::<str>::as_ref(name).chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
                prev_dash = false;
            } else if !prev_dash {
                slug.push('-');
                prev_dash = true;
            }
        }
        if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }

        let mut ts = u64::try_from(created_at.unix_timestamp().max(0))
            .unwrap_or_default();
        let mut suffix = [0_u8; 13];
        let mut i = suffix.len();
        loop {
            i -= 1;
            suffix[i] = b"0123456789abcdefghijklmnopqrstuvwxyz"
                [usize::try_from(ts % 36).expect("< 36")];
            ts /= 36;
            if ts == 0 {
                break;
            }
        }
        slug.push_str(
            std::str::from_utf8(&suffix[i..]).expect("ASCII alphanumerics"),
        );

        Self(slug)
    }
}

impl FromStr for Slug {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.len() <= 128
            && s.chars().all(|c| c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || c == '-');
        valid.then(|| Self(s.to_owned())).ok_or("invalid `Slug`")
    }
}

/// Description of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `description` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        !description.trim().is_empty() && description.len() <= 2000
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

define_kind! {
    #[doc = "Kind of a [`Property`]."]
    enum Kind {
        #[doc = "A hostel with dormitory-style rooms."]
        Hostel = 1,

        #[doc = "A paying-guest accommodation."]
        Pg = 2,

        #[doc = "A budget hotel."]
        BudgetHotel = 3,

        #[doc = "A co-living space."]
        CoLiving = 4,
    }
}

define_kind! {
    #[doc = "Gender policy of a [`Property`]."]
    enum GenderPolicy {
        #[doc = "Male residents only."]
        Male = 1,

        #[doc = "Female residents only."]
        Female = 2,

        #[doc = "Residents of any gender."]
        Coed = 3,
    }
}

/// Location of a [`Property`].
#[derive(Clone, Debug)]
pub struct Location {
    /// Street [`Address`] of a [`Property`].
    pub address: Address,

    /// [`City`] a [`Property`] is located in.
    pub city: City,

    /// [`State`] a [`Property`] is located in.
    pub state: State,

    /// [`Pincode`] of a [`Property`].
    pub pincode: Pincode,

    /// Geographic [`Coordinates`] of a [`Property`], if known.
    pub coordinates: Option<Coordinates>,
}

/// Street address of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Address(String);

impl Address {
    /// Creates a new [`Address`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Address`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Address`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.trim() == address && !address.is_empty() && address.len() <= 512
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Address`")
    }
}

/// City a [`Property`] is located in.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct City(String);

impl City {
    /// Creates a new [`City`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `city` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(city: impl Into<String>) -> Self {
        Self(city.into())
    }

    /// Creates a new [`City`] if the given `city` is valid.
    #[must_use]
    pub fn new(city: impl Into<String>) -> Option<Self> {
        let city = city.into();
        Self::check(&city).then_some(Self(city))
    }

    /// Checks whether the given `city` is a valid [`City`].
    fn check(city: impl AsRef<str>) -> bool {
        let city = city.as_ref();
        city.trim() == city && !city.is_empty() && city.len() <= 128
    }
}

impl FromStr for City {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `City`")
    }
}

/// State a [`Property`] is located in.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct State(String);

impl State {
    /// Creates a new [`State`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `state` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    /// Creates a new [`State`] if the given `state` is valid.
    #[must_use]
    pub fn new(state: impl Into<String>) -> Option<Self> {
        let state = state.into();
        Self::check(&state).then_some(Self(state))
    }

    /// Checks whether the given `state` is a valid [`State`].
    fn check(state: impl AsRef<str>) -> bool {
        let state = state.as_ref();
        state.trim() == state && !state.is_empty() && state.len() <= 128
    }
}

impl FromStr for State {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `State`")
    }
}

/// Indian postal code of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Pincode(String);

impl Pincode {
    /// Creates a new [`Pincode`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `pincode` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(pincode: impl Into<String>) -> Self {
        Self(pincode.into())
    }

    /// Creates a new [`Pincode`] if the given `pincode` is valid.
    #[must_use]
    pub fn new(pincode: impl Into<String>) -> Option<Self> {
        let pincode = pincode.into();
        Self::check(&pincode).then_some(Self(pincode))
    }

    /// Checks whether the given `pincode` is a valid [`Pincode`].
    fn check(pincode: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Pincode`] format: 6 digits, not
        /// starting with zero.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[1-9][0-9]{5}$").expect("valid regex")
        });

        REGEX.is_match(pincode.as_ref())
    }
}

impl FromStr for Pincode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Pincode`")
    }
}

/// Geographic coordinates of a [`Property`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Coordinates {
    /// Latitude, in degrees.
    pub lat: Decimal,

    /// Longitude, in degrees.
    pub lng: Decimal,
}

define_kind! {
    #[doc = "Amenity provided by a [`Property`]."]
    enum Amenity {
        #[doc = "Wireless internet."]
        Wifi = 1,

        #[doc = "Air conditioning."]
        Ac = 2,

        #[doc = "Vehicle parking."]
        Parking = 3,

        #[doc = "Laundry service."]
        Laundry = 4,

        #[doc = "Meals included or available."]
        Meals = 5,

        #[doc = "Gym access."]
        Gym = 6,

        #[doc = "CCTV surveillance."]
        Cctv = 7,

        #[doc = "Power backup."]
        PowerBackup = 8,

        #[doc = "Water purifier."]
        WaterPurifier = 9,

        #[doc = "Television."]
        Tv = 10,

        #[doc = "Refrigerator."]
        Fridge = 11,

        #[doc = "Water geyser."]
        Geyser = 12,

        #[doc = "Dedicated study room."]
        StudyRoom = 13,

        #[doc = "Recreation area."]
        Recreation = 14,

        #[doc = "Housekeeping service."]
        Housekeeping = 15,

        #[doc = "On-premises security."]
        Security = 16,
    }
}

/// House rule of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Rule(String);

impl Rule {
    /// Creates a new [`Rule`] if the given `rule` is valid.
    #[must_use]
    pub fn new(rule: impl Into<String>) -> Option<Self> {
        let rule = rule.into();
        let valid = !rule.trim().is_empty() && rule.len() <= 512;
        valid.then_some(Self(rule))
    }
}

impl FromStr for Rule {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Rule`")
    }
}

/// Pricing summary of a [`Property`].
#[derive(Clone, Copy, Debug)]
pub struct Pricing {
    /// Lowest daily room rate of a [`Property`].
    ///
    /// Derived value, recomputed on every room mutation.
    pub starting_from: Money,

    /// Security deposit required by a [`Property`].
    pub security_deposit: Money,
}

/// Average rating of a [`Property`], `0` to `5` with one decimal place.
#[derive(Clone, Copy, Debug, Display, Eq, From, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Rating(Decimal);

impl Rating {
    /// [`Rating`] of a [`Property`] without any reviews.
    pub const NONE: Self = Self(Decimal::ZERO);
}

/// [`DateTime`] when a [`Property`] was created.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{Name, Slug};

    #[test]
    fn generates_slug() {
        let name = Name::new("Blue Nest PG & Hostel").unwrap();
        let at = DateTime::from_unix_timestamp(1_700_000_000).unwrap().coerce();

        let slug = Slug::generate(&name, at);

        let s: &str = slug.as_ref();
        assert!(s.starts_with("blue-nest-pg-hostel-"), "got `{s}`");
        assert!(s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));

        // Same name at the same instant is deterministic.
        assert_eq!(slug, Slug::generate(&name, at));
    }

    #[test]
    fn pincode_format() {
        use super::Pincode;

        assert!(Pincode::new("560001").is_some());
        assert!(Pincode::new("110092").is_some());
        assert!(Pincode::new("060001").is_none());
        assert!(Pincode::new("56001").is_none());
        assert!(Pincode::new("5600012").is_none());
        assert!(Pincode::new("56000a").is_none());
    }
}
