//! [`Review`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{property, user};

/// Review of a [`Property`] left by a [`User`].
///
/// At most one [`Review`] exists per `(user, property)` pair.
///
/// [`Property`]: crate::domain::Property
/// [`User`]: crate::domain::User
#[derive(Clone, Debug)]
pub struct Review {
    /// ID of this [`Review`].
    pub id: Id,

    /// ID of the [`User`] who authored this [`Review`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the [`Property`] this [`Review`] is about.
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: property::Id,

    /// [`Rating`] given by this [`Review`], `1` to `5`.
    pub rating: Rating,

    /// Optional [`Title`] of this [`Review`].
    pub title: Option<Title>,

    /// [`Text`] of this [`Review`].
    pub text: Text,

    /// [`Sentiment`] of this [`Review`], estimated by moderation.
    pub sentiment: Sentiment,

    /// Indicator whether this [`Review`] is flagged and so excluded from the
    /// [`Property`] aggregates.
    ///
    /// [`Property`]: crate::domain::Property
    pub flagged: bool,

    /// Reason this [`Review`] was flagged for, if it was.
    pub flag_reason: Option<FlagReason>,

    /// Count of "helpful" votes on this [`Review`].
    pub helpful: i32,

    /// [`DateTime`] when this [`Review`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Review`].
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

/// Rating given by a [`Review`], `1` to `5` stars.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, PartialEq)]
pub struct Rating(u8);

impl Rating {
    /// Creates a new [`Rating`] if the given `stars` value is within `1..=5`.
    #[must_use]
    pub fn new(stars: u8) -> Option<Self> {
        (1..=5).contains(&stars).then_some(Self(stars))
    }
}

/// Calculates the average of the provided [`Rating`]s, rounded to one
/// decimal place (half away from zero).
///
/// [`Decimal::ZERO`] is returned when there are no ratings, matching the
/// reset state of a [`Property`] without qualifying reviews.
///
/// [`Property`]: crate::domain::Property
#[must_use]
pub fn average(ratings: &[Rating]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }
    let sum: u32 = ratings.iter().map(|r| u32::from(r.0)).sum();
    (Decimal::from(sum) / Decimal::from(ratings.len()))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Title of a [`Review`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        let valid = title.trim() == title
            && !title.is_empty()
            && title.len() <= 100;
        valid.then_some(Self(title))
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Text of a [`Review`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Text(String);

impl Text {
    /// Creates a new [`Text`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let valid = !text.trim().is_empty() && text.len() <= 1000;
        valid.then_some(Self(text))
    }
}

impl FromStr for Text {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Text`")
    }
}

/// Sentiment of a [`Review`], estimated by moderation.
#[derive(Clone, Copy, Debug)]
pub struct Sentiment {
    /// Sentiment score, `-1` (very negative) to `1` (very positive).
    pub score: Decimal,

    /// [`SentimentLabel`] of the sentiment.
    pub label: SentimentLabel,
}

impl Sentiment {
    /// Neutral [`Sentiment`] used when moderation is unavailable.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            score: Decimal::ZERO,
            label: SentimentLabel::Neutral,
        }
    }
}

define_kind! {
    #[doc = "Label of a [`Review`] sentiment."]
    enum SentimentLabel {
        #[doc = "Positive sentiment."]
        Positive = 1,

        #[doc = "Negative sentiment."]
        Negative = 2,

        #[doc = "Neutral sentiment."]
        Neutral = 3,
    }
}

/// Reason a [`Review`] was flagged for.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct FlagReason(String);

impl FlagReason {
    /// Creates a new [`FlagReason`] if the given `reason` is valid.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Option<Self> {
        let reason = reason.into();
        let valid = !reason.trim().is_empty() && reason.len() <= 512;
        valid.then_some(Self(reason))
    }
}

impl FromStr for FlagReason {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `FlagReason`")
    }
}

/// [`DateTime`] when a [`Review`] was created.
pub type CreationDateTime = DateTimeOf<(Review, unit::Creation)>;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{average, Rating};

    fn ratings(stars: &[u8]) -> Vec<Rating> {
        stars.iter().map(|s| Rating::new(*s).unwrap()).collect()
    }

    #[test]
    fn rating_bounds() {
        assert!(Rating::new(0).is_none());
        assert!(Rating::new(1).is_some());
        assert!(Rating::new(5).is_some());
        assert!(Rating::new(6).is_none());
    }

    #[test]
    fn averages_to_one_decimal() {
        assert_eq!(average(&ratings(&[5, 4, 3])), Decimal::new(40, 1));
        assert_eq!(average(&ratings(&[5, 4])), Decimal::new(45, 1));
        // 14 / 3 = 4.666... rounds up to 4.7.
        assert_eq!(average(&ratings(&[5, 5, 4])), Decimal::new(47, 1));
        assert_eq!(average(&[]), Decimal::ZERO);
    }

    #[test]
    fn flagged_review_drops_from_average() {
        // [5, 4, 3] with the 3 flagged leaves [5, 4].
        let all = ratings(&[5, 4, 3]);
        let unflagged = &all[..2];
        assert_eq!(average(unflagged), Decimal::new(45, 1));
    }
}
