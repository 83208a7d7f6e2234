//! [`Complaint`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{property, user};

/// Complaint filed by a [`User`] against a [`Property`].
///
/// [`Property`]: crate::domain::Property
/// [`User`]: crate::domain::User
#[derive(Clone, Debug)]
pub struct Complaint {
    /// ID of this [`Complaint`].
    pub id: Id,

    /// ID of the [`User`] who filed this [`Complaint`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the [`Property`] this [`Complaint`] is about.
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: property::Id,

    /// [`Title`] of this [`Complaint`].
    pub title: Title,

    /// [`Description`] of this [`Complaint`].
    pub description: Description,

    /// [`Category`] of this [`Complaint`].
    pub category: Category,

    /// [`Priority`] of this [`Complaint`].
    pub priority: Priority,

    /// [`Status`] of this [`Complaint`].
    pub status: Status,

    /// Advisory [`Classification`] snapshot, if classification succeeded.
    pub classification: Option<Classification>,

    /// [`Resolution`] of this [`Complaint`], once resolved.
    pub resolution: Option<Resolution>,

    /// [`DateTime`] when this [`Complaint`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Complaint`].
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

/// Title of a [`Complaint`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        let valid =
            title.trim() == title && !title.is_empty() && title.len() <= 150;
        valid.then_some(Self(title))
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Description of a [`Complaint`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        let valid =
            !description.trim().is_empty() && description.len() <= 1000;
        valid.then_some(Self(description))
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

define_kind! {
    #[doc = "Category of a [`Complaint`]."]
    enum Category {
        #[doc = "Maintenance issue."]
        Maintenance = 1,

        #[doc = "Cleanliness issue."]
        Cleanliness = 2,

        #[doc = "Noise disturbance."]
        Noise = 3,

        #[doc = "Security concern."]
        Security = 4,

        #[doc = "Billing dispute."]
        Billing = 5,

        #[doc = "Staff behavior."]
        Staff = 6,

        #[doc = "Food quality."]
        Food = 7,

        #[doc = "Anything else."]
        Other = 8,
    }
}

define_kind! {
    #[doc = "Priority of a [`Complaint`]."]
    enum Priority {
        #[doc = "Minor inconvenience."]
        Low = 1,

        #[doc = "Standard priority."]
        Medium = 2,

        #[doc = "Needs prompt attention."]
        High = 3,

        #[doc = "Safety-relevant, immediate attention."]
        Urgent = 4,
    }
}

define_kind! {
    #[doc = "Status of a [`Complaint`]."]
    enum Status {
        #[doc = "Filed, not yet picked up."]
        Open = 1,

        #[doc = "Being worked on."]
        InProgress = 2,

        #[doc = "Resolved by the property owner or an admin."]
        Resolved = 3,

        #[doc = "Closed without resolution."]
        Closed = 4,
    }
}

/// Advisory AI classification snapshot of a [`Complaint`].
///
/// Never changes the [`Complaint`] state by itself.
#[derive(Clone, Copy, Debug)]
pub struct Classification {
    /// [`Category`] suggested by the classifier.
    pub suggested_category: Category,

    /// [`Priority`] suggested by the classifier.
    pub suggested_priority: Priority,

    /// Sentiment score of the complaint text, `-1` to `1`.
    pub sentiment_score: Decimal,

    /// Classifier confidence, `0` to `1`.
    pub confidence: Decimal,
}

/// Resolution of a [`Complaint`].
#[derive(Clone, Debug)]
pub struct Resolution {
    /// Text describing how the [`Complaint`] was resolved.
    pub text: ResolutionText,

    /// ID of the [`User`] who resolved the [`Complaint`].
    ///
    /// [`User`]: crate::domain::User
    pub resolved_by: user::Id,

    /// [`DateTime`] when the [`Complaint`] was resolved.
    pub resolved_at: ResolutionDateTime,
}

/// Text of a [`Complaint`] [`Resolution`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct ResolutionText(String);

impl ResolutionText {
    /// Creates a new [`ResolutionText`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let valid = !text.trim().is_empty() && text.len() <= 1000;
        valid.then_some(Self(text))
    }
}

impl FromStr for ResolutionText {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ResolutionText`")
    }
}

/// [`DateTime`] when a [`Complaint`] was created.
pub type CreationDateTime = DateTimeOf<(Complaint, unit::Creation)>;

/// [`DateTime`] when a [`Complaint`] was resolved.
pub type ResolutionDateTime = DateTimeOf<(Complaint, unit::Resolution)>;
