//! [`Booking`] definitions.

use common::{define_kind, unit, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use xxhash_rust::xxh3;

use crate::domain::{property, room, user};

/// Reservation of one [`Room`] by one [`User`] for a date range.
///
/// [`Room`]: crate::domain::Room
/// [`User`]: crate::domain::User
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the [`User`] who made this [`Booking`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the [`Property`] this [`Booking`] is for.
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: property::Id,

    /// ID of the [`Room`] this [`Booking`] reserves.
    ///
    /// [`Room`]: crate::domain::Room
    pub room_id: room::Id,

    /// [`DateTime`] of the check-in.
    pub check_in: CheckInDateTime,

    /// [`DateTime`] of the check-out.
    ///
    /// Always strictly after [`Booking::check_in`].
    pub check_out: CheckOutDateTime,

    /// Number of guests staying.
    pub guests: GuestCount,

    /// [`Amount`] of this [`Booking`], frozen at creation.
    pub amount: Amount,

    /// [`Payment`] state of this [`Booking`].
    pub payment: Payment,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// Special requests left by the guest, if any.
    pub special_requests: Option<SpecialRequests>,

    /// [`InvoiceNumber`] assigned to this [`Booking`] at creation.
    pub invoice_number: InvoiceNumber,

    /// [`DateTime`] when this [`Booking`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

/// ID of a [`Booking`].
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

/// Number of nights between a check-in and a check-out.
pub type Nights = u32;

/// Calculates the number of nights between the provided dates, rounding
/// partial days up.
///
/// [`None`] is returned if `check_out` is not strictly after `check_in`.
#[must_use]
pub fn nights(
    check_in: CheckInDateTime,
    check_out: CheckOutDateTime,
) -> Option<Nights> {
    const DAY_SECS: u64 = 24 * 60 * 60;

    if check_out.coerce::<()>() <= check_in.coerce() {
        return None;
    }
    let stay = check_out.coerce::<()>() - check_in.coerce();
    Nights::try_from(stay.as_secs().div_ceil(DAY_SECS)).ok()
}

/// Number of guests of a [`Booking`].
pub type GuestCount = u16;

/// Monetary breakdown of a [`Booking`], computed at creation and frozen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Amount {
    /// Room rate multiplied by the stay length.
    pub subtotal: Money,

    /// GST applied to the subtotal.
    pub tax: Money,

    /// Discount subtracted from the total.
    pub discount: Money,

    /// Final amount to be paid.
    pub total: Money,
}

impl Amount {
    /// GST rate applied to [`Booking`] subtotals.
    const GST: u32 = 12;

    /// Quotes an [`Amount`] for the provided daily rate and stay length.
    ///
    /// The tax is rounded to whole rupees, half away from zero.
    #[must_use]
    pub fn quote(daily_rate: Money, nights: Nights) -> Self {
        let subtotal = daily_rate.amount * Decimal::from(nights);
        let gst = Percent::new(Self::GST.into()).expect("within bounds");
        let tax = gst.of(subtotal).round_dp_with_strategy(
            0,
            RoundingStrategy::MidpointAwayFromZero,
        );

        Self {
            subtotal: Money {
                amount: subtotal,
                currency: daily_rate.currency,
            },
            tax: Money {
                amount: tax,
                currency: daily_rate.currency,
            },
            discount: Money {
                amount: Decimal::ZERO,
                currency: daily_rate.currency,
            },
            total: Money {
                amount: subtotal + tax,
                currency: daily_rate.currency,
            },
        }
    }
}

/// Payment state of a [`Booking`].
#[derive(Clone, Debug)]
pub struct Payment {
    /// [`Method`] the [`Booking`] is being paid with, if chosen.
    pub method: Option<Method>,

    /// [`PaymentStatus`] of the [`Booking`].
    pub status: PaymentStatus,

    /// Gateway order ID, once an order has been created.
    pub order_id: Option<OrderId>,

    /// Gateway payment ID, once a payment has been captured.
    pub payment_id: Option<PaymentId>,

    /// Gateway signature provided with the payment confirmation.
    pub signature: Option<Signature>,

    /// [`DateTime`] when the [`Booking`] was paid.
    ///
    /// [`DateTime`]: common::DateTime
    pub paid_at: Option<PaymentDateTime>,
}

impl Payment {
    /// Initial [`Payment`] state of a freshly created [`Booking`].
    #[must_use]
    pub fn pending() -> Self {
        Self {
            method: None,
            status: PaymentStatus::Pending,
            order_id: None,
            payment_id: None,
            signature: None,
            paid_at: None,
        }
    }
}

define_kind! {
    #[doc = "Method a [`Booking`] is paid with."]
    enum Method {
        #[doc = "Razorpay payment gateway."]
        Razorpay = 1,

        #[doc = "Cash on arrival."]
        Cash = 2,

        #[doc = "Bank transfer."]
        BankTransfer = 3,
    }
}

define_kind! {
    #[doc = "Status of a [`Booking`] payment."]
    enum PaymentStatus {
        #[doc = "Payment has not been completed yet."]
        Pending = 1,

        #[doc = "Payment has been captured by the gateway."]
        Completed = 2,

        #[doc = "Payment attempt has failed."]
        Failed = 3,

        #[doc = "Payment has been refunded."]
        Refunded = 4,
    }
}

/// Gateway-side order ID tied to a [`Booking`].
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
#[from(String, &str)]
pub struct OrderId(String);

/// Gateway-side payment ID of a captured [`Booking`] payment.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
#[from(String, &str)]
pub struct PaymentId(String);

/// Hex-encoded HMAC-SHA256 signature of a gateway confirmation.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
#[from(String, &str)]
pub struct Signature(String);

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "Created, awaiting payment confirmation."]
        Pending = 1,

        #[doc = "Payment confirmed."]
        Confirmed = 2,

        #[doc = "Guest has checked in."]
        CheckedIn = 3,

        #[doc = "Guest has checked out."]
        CheckedOut = 4,

        #[doc = "Cancelled by the guest or an admin."]
        Cancelled = 5,
    }
}

impl Status {
    /// Checks whether this [`Status`] may transition into the provided one.
    ///
    /// Cancellation is reachable from [`Status::Pending`] and
    /// [`Status::Confirmed`] only. [`Status::CheckedOut`] and
    /// [`Status::Cancelled`] are terminal.
    #[must_use]
    pub fn may_become(self, next: Self) -> bool {
        match self {
            Self::Pending => {
                matches!(next, Self::Confirmed | Self::Cancelled)
            }
            Self::Confirmed => {
                matches!(next, Self::CheckedIn | Self::Cancelled)
            }
            Self::CheckedIn => matches!(next, Self::CheckedOut),
            Self::CheckedOut | Self::Cancelled => false,
        }
    }
}

/// Special requests left by the guest of a [`Booking`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct SpecialRequests(String);

impl SpecialRequests {
    /// Creates new [`SpecialRequests`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let valid = !text.trim().is_empty() && text.len() <= 500;
        valid.then_some(Self(text))
    }
}

impl FromStr for SpecialRequests {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `SpecialRequests`")
    }
}

/// Unique human-readable identifier assigned to a [`Booking`] at creation.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
#[from(String, &str)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Generates a new [`InvoiceNumber`] for the [`Booking`] with the provided
    /// ID: `SE-<creation time, base36>-<xxh3 of the ID, 4 hex digits>`.
    #[must_use]
    pub fn generate(id: Id, created_at: CreationDateTime) -> Self {
        let mut ts =
            u64::try_from(created_at.unix_timestamp().max(0)).expect(">= 0");
        let mut stamp = [0_u8; 13];
        let mut i = stamp.len();
        loop {
            i -= 1;
            stamp[i] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ"
                [usize::try_from(ts % 36).expect("< 36")];
            ts /= 36;
            if ts == 0 {
                break;
            }
        }
        let stamp = std::str::from_utf8(&stamp[i..]).expect("ASCII");

        let digest = xxh3::xxh3_64(Uuid::from(id).as_bytes());

        Self(format!("SE-{stamp}-{:04X}", digest & 0xFFFF))
    }
}

/// [`DateTime`] of a [`Booking`] check-in.
///
/// [`DateTime`]: common::DateTime
pub type CheckInDateTime = DateTimeOf<(Booking, CheckIn)>;

/// [`DateTime`] of a [`Booking`] check-out.
///
/// [`DateTime`]: common::DateTime
pub type CheckOutDateTime = DateTimeOf<(Booking, CheckOut)>;

/// Marker type describing a [`Booking`] check-in.
#[derive(Clone, Copy, Debug)]
pub struct CheckIn;

/// Marker type describing a [`Booking`] check-out.
#[derive(Clone, Copy, Debug)]
pub struct CheckOut;

/// [`DateTime`] when a [`Booking`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a [`Booking`] was paid.
///
/// [`DateTime`]: common::DateTime
pub type PaymentDateTime = DateTimeOf<(Booking, unit::Payment)>;

#[cfg(test)]
mod spec {
    use common::{DateTime, Money};

    use super::{nights, Amount, Id, InvoiceNumber, Status};

    fn date(s: &str) -> DateTime {
        DateTime::from_rfc3339(s).unwrap()
    }

    #[test]
    fn quotes_amount() {
        let amount = Amount::quote(Money::rupees(550), 14);
        assert_eq!(amount.subtotal, Money::rupees(7700));
        assert_eq!(amount.tax, Money::rupees(924));
        assert_eq!(amount.discount, Money::rupees(0));
        assert_eq!(amount.total, Money::rupees(8624));

        let amount = Amount::quote(Money::rupees(800), 15);
        assert_eq!(amount.subtotal, Money::rupees(12000));
        assert_eq!(amount.tax, Money::rupees(1440));
        assert_eq!(amount.total, Money::rupees(13440));
    }

    #[test]
    fn quote_rounds_half_away_from_zero() {
        // 12% of 1337 is 160.44, 12% of 1338 is 160.56.
        assert_eq!(
            Amount::quote(Money::rupees(1337), 1).tax,
            Money::rupees(160),
        );
        assert_eq!(
            Amount::quote(Money::rupees(1338), 1).tax,
            Money::rupees(161),
        );
        // 12% of 4 is 0.48, 12% of 5 is 0.60.
        assert_eq!(Amount::quote(Money::rupees(4), 1).tax, Money::rupees(0));
        assert_eq!(Amount::quote(Money::rupees(5), 1).tax, Money::rupees(1));
    }

    #[test]
    fn counts_nights() {
        assert_eq!(
            nights(
                date("2026-01-10T00:00:00Z").coerce(),
                date("2026-01-25T00:00:00Z").coerce(),
            ),
            Some(15),
        );

        // Partial days round up.
        assert_eq!(
            nights(
                date("2026-01-10T14:00:00Z").coerce(),
                date("2026-01-11T10:00:00Z").coerce(),
            ),
            Some(1),
        );

        // Check-out must be strictly after check-in.
        assert_eq!(
            nights(
                date("2026-01-10T00:00:00Z").coerce(),
                date("2026-01-10T00:00:00Z").coerce(),
            ),
            None,
        );
        assert_eq!(
            nights(
                date("2026-01-10T00:00:00Z").coerce(),
                date("2026-01-09T00:00:00Z").coerce(),
            ),
            None,
        );
    }

    #[test]
    fn status_transitions() {
        use Status as S;

        assert!(S::Pending.may_become(S::Confirmed));
        assert!(S::Pending.may_become(S::Cancelled));
        assert!(S::Confirmed.may_become(S::CheckedIn));
        assert!(S::Confirmed.may_become(S::Cancelled));
        assert!(S::CheckedIn.may_become(S::CheckedOut));

        assert!(!S::Pending.may_become(S::CheckedIn));
        assert!(!S::Pending.may_become(S::CheckedOut));
        assert!(!S::CheckedIn.may_become(S::Cancelled));
        assert!(!S::CheckedOut.may_become(S::Cancelled));
        assert!(!S::Cancelled.may_become(S::Pending));
        assert!(!S::Cancelled.may_become(S::Confirmed));
        assert!(!S::CheckedOut.may_become(S::Pending));
    }

    #[test]
    fn generates_invoice_number() {
        let id = Id::new();
        let at = date("2026-01-10T00:00:00Z").coerce();

        let invoice = InvoiceNumber::generate(id, at);
        let s: &str = invoice.as_ref();

        assert!(s.starts_with("SE-"), "got `{s}`");
        let mut parts = s.splitn(3, '-');
        assert_eq!(parts.next(), Some("SE"));
        assert!(parts
            .next()
            .is_some_and(|p| p.chars().all(|c| c.is_ascii_alphanumeric())));
        assert!(parts.next().is_some_and(|p| p.len() == 4
            && p.chars().all(|c| c.is_ascii_hexdigit())));

        // Deterministic for the same booking.
        assert_eq!(invoice, InvoiceNumber::generate(id, at));
        // Distinct bookings get distinct suffixes (with overwhelming odds).
        assert_ne!(invoice, InvoiceNumber::generate(Id::new(), at));
    }
}
