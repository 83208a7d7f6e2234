//! [`User`] definitions.

pub mod session;

use std::{fmt::Write as _, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use crate::domain::property;

pub use self::session::Session;

/// Platform user.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`], unique across the platform.
    pub email: Email,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`Role`] of this [`User`].
    pub role: Role,

    /// [`Phone`] of this [`User`], if provided.
    pub phone: Option<Phone>,

    /// Search [`Preferences`] of this [`User`].
    pub preferences: Preferences,

    /// IDs of properties this [`User`] has saved.
    pub saved_properties: Vec<property::Id>,

    /// Indicator whether this [`User`] is verified.
    pub verified: bool,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`User`].
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

/// Name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
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
        name.trim() == name && !name.is_empty() && name.len() <= 50
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`User`], serving as the login.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] if the given `address` is valid, lowercasing
    /// it on the way.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into().to_lowercase();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,})+$")
                .expect("valid regex")
        });

        REGEX.is_match(address.as_ref())
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Password of a [`User`].
#[derive(Clone, Debug, Display, Eq, From, PartialEq)]
#[from(&str, String)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `password` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        password.len() >= 6 && password.len() <= 128
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Salted password hash of a [`User`], stored as `<salt>$<SHA-256 hex>`.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Creates a new [`PasswordHash`] of the given [`Password`] with a fresh
    /// random salt.
    #[must_use]
    pub fn new(password: &Password) -> Self {
        Self::with_salt(&Uuid::new_v4().simple().to_string(), password)
    }

    /// Checks whether the given [`Password`] matches this [`PasswordHash`].
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        self.0
            .split_once('$')
            .is_some_and(|(salt, _)| Self::with_salt(salt, password) == *self)
    }

    /// Hashes the given [`Password`] with the provided salt.
    fn with_salt(salt: &str, password: &Password) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.0.as_bytes());

        let mut out = String::with_capacity(salt.len() + 1 + 64);
        out.push_str(salt);
        out.push('$');
        for byte in hasher.finalize() {
            write!(out, "{byte:02x}").expect("infallible");
        }

        Self(out)
    }
}

define_kind! {
    #[doc = "Role of a [`User`]."]
    enum Role {
        #[doc = "Regular guest booking stays."]
        User = 1,

        #[doc = "Property owner listing and managing properties."]
        Owner = 2,

        #[doc = "Platform administrator."]
        Admin = 3,
    }
}

/// Role-gated action on the platform.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// Listing properties and adding rooms to them.
    ManageProperties,

    /// Driving a booking through its status lifecycle.
    OverrideBookingStatus,

    /// Listing every booking on the platform.
    ViewAllBookings,

    /// Flagging reviews and listing all of them.
    ModerateReviews,

    /// Resolving complaints against a property.
    ResolveComplaints,
}

impl Role {
    /// Checks whether this [`Role`] is allowed to perform the provided
    /// [`Action`].
    #[must_use]
    pub fn may(self, action: Action) -> bool {
        match action {
            Action::ManageProperties
            | Action::OverrideBookingStatus
            | Action::ResolveComplaints => {
                matches!(self, Self::Owner | Self::Admin)
            }
            Action::ViewAllBookings | Action::ModerateReviews => {
                matches!(self, Self::Admin)
            }
        }
    }
}

/// Phone number of a [`User`], 10 Indian digits.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `number` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("valid regex"));

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Search preferences of a [`User`].
#[derive(Clone, Debug, Default)]
pub struct Preferences {
    /// Preferred [`property::City`].
    pub city: Option<property::City>,

    /// Lower bound of the preferred budget.
    pub budget_min: Option<Money>,

    /// Upper bound of the preferred budget.
    pub budget_max: Option<Money>,

    /// Preferred [`property::GenderPolicy`].
    pub gender: Option<property::GenderPolicy>,
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Action, Email, Password, PasswordHash, Role};

    #[test]
    fn hashes_and_verifies_password() {
        let password = Password::new("correct horse").unwrap();
        let hash = PasswordHash::new(&password);

        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("wrong horse").unwrap()));

        // Fresh salt every time.
        assert_ne!(hash, PasswordHash::new(&password));
    }

    #[test]
    fn email_lowercases_and_validates() {
        assert_eq!(
            Email::new("Guest@StayEase.In").unwrap().to_string(),
            "guest@stayease.in",
        );
        assert!(Email::new("nobody").is_none());
        assert!(Email::new("nobody@").is_none());
        assert!(Email::new("@stayease.in").is_none());
    }

    #[test]
    fn role_capabilities() {
        use Action as A;

        assert!(!Role::User.may(A::ManageProperties));
        assert!(Role::Owner.may(A::ManageProperties));
        assert!(Role::Admin.may(A::ManageProperties));

        assert!(!Role::User.may(A::ViewAllBookings));
        assert!(!Role::Owner.may(A::ViewAllBookings));
        assert!(Role::Admin.may(A::ViewAllBookings));

        assert!(!Role::Owner.may(A::ModerateReviews));
        assert!(Role::Admin.may(A::ModerateReviews));

        assert!(Role::Owner.may(A::ResolveComplaints));
        assert!(!Role::User.may(A::ResolveComplaints));
    }
}
