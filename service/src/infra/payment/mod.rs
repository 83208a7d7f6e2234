//! Payment gateway infrastructure.

pub mod signature;

use derive_more::{Display, Error as StdError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use xxhash_rust::xxh3;

use common::Money;
use uuid::Uuid;

use crate::domain::{booking, user};

/// Configuration of the payment gateway.
#[derive(Clone, Debug)]
pub struct Config {
    /// Gateway key ID. Absent or placeholder values switch the gateway into
    /// mock mode.
    pub key_id: Option<String>,

    /// Gateway key secret, shared with the gateway for order creation and
    /// signature verification.
    pub key_secret: Option<SecretString>,

    /// Base URL of the gateway API.
    pub api_url: String,
}

impl Config {
    /// Prefix marking a placeholder credential taken from a config template.
    const PLACEHOLDER: &'static str = "your_";

    /// Indicates whether the gateway operates in mock mode.
    ///
    /// Mock mode is a documented operational state entered deterministically
    /// whenever the key ID is absent or still a placeholder.
    #[must_use]
    pub fn is_mock(&self) -> bool {
        self.key_id.as_deref().map_or(true, |key| {
            key.is_empty() || key.starts_with(Self::PLACEHOLDER)
        })
    }

    /// Returns the key ID to expose to the paying client.
    #[must_use]
    pub fn client_key(&self) -> &str {
        if self.is_mock() {
            "mock_key"
        } else {
            self.key_id.as_deref().expect("checked by `is_mock()`")
        }
    }

    /// Returns the gateway secret, if configured with a real value.
    #[must_use]
    pub fn secret(&self) -> Option<&str> {
        self.key_secret
            .as_ref()
            .map(|s| s.expose_secret())
            .filter(|s| !s.is_empty() && !s.starts_with(Self::PLACEHOLDER))
    }
}

/// Gateway-side order: an intent to pay a specific amount, referenced by a
/// [`Booking`].
///
/// [`Booking`]: crate::domain::Booking
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Order {
    /// Gateway order ID.
    pub id: booking::OrderId,

    /// Amount in minor currency units (paise).
    pub amount: i64,

    /// ISO 4217 currency code.
    pub currency: String,

    /// Receipt reference, the [`Booking`] invoice number.
    ///
    /// [`Booking`]: crate::domain::Booking
    pub receipt: String,
}

/// Razorpay-compatible payment gateway client.
///
/// Without real credentials every order is synthesized locally (mock mode);
/// no external call is ever made.
#[derive(Clone, Debug)]
pub struct Gateway {
    /// Configuration of this [`Gateway`].
    config: Config,

    /// HTTP client to reach the gateway with.
    http: reqwest::Client,
}

impl Gateway {
    /// Creates a new [`Gateway`] with the provided [`Config`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Returns the [`Config`] of this [`Gateway`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates a gateway order for the provided [`Booking`] total.
    ///
    /// In mock mode the order is synthesized deterministically from the
    /// booking ID; otherwise the gateway is asked to create it.
    ///
    /// # Errors
    ///
    /// - If the total doesn't fit into minor units.
    /// - If the gateway call fails or returns an unexpected response.
    ///
    /// [`Booking`]: crate::domain::Booking
    pub async fn create_order(
        &self,
        booking_id: booking::Id,
        user_id: user::Id,
        total: Money,
        receipt: &booking::InvoiceNumber,
    ) -> Result<Order, Error> {
        let amount = total.minor_units().ok_or(Error::AmountOverflow)?;

        if self.config.is_mock() {
            let digest = xxh3::xxh3_64(Uuid::from(booking_id).as_bytes());
            return Ok(Order {
                id: format!("order_mock_{digest:012x}").into(),
                amount,
                currency: total.currency.code().to_owned(),
                receipt: receipt.to_string(),
            });
        }

        let key_id = self.config.key_id.as_deref().ok_or(Error::NoCredentials)?;
        let secret = self.config.secret().ok_or(Error::NoCredentials)?;

        let response = self
            .http
            .post(format!("{}/orders", self.config.api_url))
            .basic_auth(key_id, Some(secret))
            .json(&json!({
                "amount": amount,
                "currency": total.currency.code(),
                "receipt": receipt.to_string(),
                "notes": {
                    "bookingId": booking_id.to_string(),
                    "userId": user_id.to_string(),
                },
            }))
            .send()
            .await
            .map_err(Error::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::BadStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        response.json::<Order>().await.map_err(Error::Request)
    }
}

/// Error of a [`Gateway`] operation.
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// [`Booking`] total doesn't fit into minor currency units.
    ///
    /// [`Booking`]: crate::domain::Booking
    #[display("`Booking` total overflows minor currency units")]
    AmountOverflow,

    /// Gateway responded with a non-success status.
    #[display("gateway responded with status {status}: {body}")]
    BadStatus {
        /// HTTP status code of the response.
        status: u16,

        /// Body of the response.
        #[error(not(source))]
        body: String,
    },

    /// Live mode entered without full credentials.
    #[display("gateway credentials are not configured")]
    NoCredentials,

    /// HTTP request to the gateway failed.
    #[display("gateway request failed: {_0}")]
    Request(reqwest::Error),
}

#[cfg(test)]
mod spec {
    use super::{Config, SecretString};

    fn config(key_id: Option<&str>, secret: Option<&str>) -> Config {
        Config {
            key_id: key_id.map(ToOwned::to_owned),
            key_secret: secret.map(SecretString::from),
            api_url: "https://api.razorpay.com/v1".into(),
        }
    }

    #[test]
    fn detects_mock_mode() {
        assert!(config(None, None).is_mock());
        assert!(config(Some(""), None).is_mock());
        assert!(config(Some("your_razorpay_key_id"), None).is_mock());
        assert!(!config(Some("rzp_test_abc123"), None).is_mock());
    }

    #[test]
    fn filters_placeholder_secret() {
        assert_eq!(config(None, None).secret(), None);
        assert_eq!(
            config(None, Some("your_razorpay_key_secret")).secret(),
            None,
        );
        assert_eq!(config(None, Some("")).secret(), None);
        assert_eq!(config(None, Some("s3cr3t")).secret(), Some("s3cr3t"));
    }

    #[test]
    fn client_key_in_mock_mode() {
        assert_eq!(config(None, None).client_key(), "mock_key");
        assert_eq!(
            config(Some("rzp_test_abc123"), None).client_key(),
            "rzp_test_abc123",
        );
    }
}
