//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a new [`Money`] of the given whole rupees amount.
    #[must_use]
    pub fn rupees(amount: impl Into<Decimal>) -> Self {
        Self {
            amount: amount.into(),
            currency: Currency::Inr,
        }
    }

    /// Converts this [`Money`] into minor currency units (paise for
    /// [`Currency::Inr`]), as expected by payment gateways.
    ///
    /// [`None`] is returned if the amount doesn't fit into an [`i64`].
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        (self.amount * Decimal::ONE_HUNDRED).round().to_i64()
    }

    /// Indicates whether this [`Money`] amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        if amount.is_integer() {
            write!(f, "{}{currency}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}{currency}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Indian Rupee."]
        Inr = 1,
    }
}

impl Currency {
    /// Returns the [ISO 4217] code of this [`Currency`].
    ///
    /// [ISO 4217]: https://wikipedia.org/wiki/ISO_4217
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Inr => "INR",
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("550INR").unwrap(),
            Money {
                amount: decimal("550"),
                currency: Currency::Inr,
            },
        );

        assert_eq!(
            Money::from_str("1234.50INR").unwrap(),
            Money {
                amount: decimal("1234.50"),
                currency: Currency::Inr,
            },
        );

        assert!(Money::from_str("550").is_err());
        assert!(Money::from_str("550In").is_err());
        assert!(Money::from_str("550Rupees").is_err());
        assert!(Money::from_str("550USD").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Money::rupees(550).to_string(), "550INR");
        assert_eq!(
            Money {
                amount: decimal("123.45"),
                currency: Currency::Inr,
            }
            .to_string(),
            "123.45INR",
        );
        assert_eq!(
            Money {
                amount: decimal("123.0"),
                currency: Currency::Inr,
            }
            .to_string(),
            "123INR",
        );
    }

    #[test]
    fn minor_units() {
        assert_eq!(Money::rupees(13440).minor_units(), Some(1_344_000));
        assert_eq!(
            Money {
                amount: decimal("99.99"),
                currency: Currency::Inr,
            }
            .minor_units(),
            Some(9999),
        );
        assert_eq!(Money::rupees(0).minor_units(), Some(0));
    }
}
