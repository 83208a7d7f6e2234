//! Model API infrastructure for the AI-assist layer.
//!
//! The assistant is an external collaborator: every operation returns an
//! explicit [`Result`], and every response type carries a documented
//! fallback used when the upstream is unreachable, so callers never have to
//! guess what a degraded answer looks like.

use std::sync::LazyLock;

use derive_more::{Display, Error as StdError};
use regex::Regex;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    domain::{complaint, property, review},
    read,
};

/// Configuration of the [`Assistant`].
#[derive(Clone, Debug)]
pub struct Config {
    /// API key of the model provider. Absent key switches every operation
    /// onto its fallback path.
    pub api_key: Option<SecretString>,

    /// Base URL of the OpenRouter-compatible API.
    pub api_url: String,

    /// Model identifier to request.
    pub model: String,
}

/// Stateless client of an OpenRouter-compatible chat-completion API.
#[derive(Clone, Debug)]
pub struct Assistant {
    /// Configuration of this [`Assistant`].
    config: Config,

    /// HTTP client to reach the model API with.
    http: reqwest::Client,
}

/// Role of a [`ChatMessage`] author.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Platform-injected instructions.
    System,

    /// End user of the chat.
    User,

    /// The model.
    Assistant,
}

/// Single turn of a chat conversation.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatMessage {
    /// [`ChatRole`] of the author.
    pub role: ChatRole,

    /// Text of the turn.
    pub content: String,
}

impl Assistant {
    /// Number of most recent chat turns forwarded to the model.
    const CHAT_HISTORY_LIMIT: usize = 10;

    /// Reply returned when the model is unreachable.
    ///
    /// Chat must never surface a hard failure to the UI.
    pub const CHAT_FALLBACK: &'static str =
        "I'm having trouble connecting right now. Please try again in a \
         moment, or reach out to our support team.";

    /// Creates a new [`Assistant`] with the provided [`Config`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Replies to the provided chat history.
    ///
    /// Only the [`CHAT_HISTORY_LIMIT`] most recent turns are forwarded. The
    /// optional `city` is injected as additional context.
    ///
    /// # Errors
    ///
    /// If the model API is not configured, unreachable, or returns an
    /// unusable response. Callers fall back to [`Assistant::CHAT_FALLBACK`].
    ///
    /// [`CHAT_HISTORY_LIMIT`]: Self::CHAT_HISTORY_LIMIT
    pub async fn chat(
        &self,
        history: &[ChatMessage],
        city: Option<&property::City>,
    ) -> Result<String, Error> {
        const PROMPT: &str =
            "You are StayEase AI Assistant, a helpful chatbot for a hostel \
             and PG booking platform in India. Help users find properties, \
             understand booking policies, amenities, pricing and \
             availability, and guide them to the complaint form when needed. \
             Be friendly and concise; keep responses under 150 words.";

        let mut messages = vec![ChatMessage {
            role: ChatRole::System,
            content: PROMPT.to_owned(),
        }];
        if let Some(city) = city {
            messages.push(ChatMessage {
                role: ChatRole::System,
                content: format!(
                    "The user is looking in {city}. We have properties \
                     available in major Indian cities.",
                ),
            });
        }
        let tail = history
            .len()
            .saturating_sub(Self::CHAT_HISTORY_LIMIT);
        messages.extend_from_slice(&history[tail..]);

        self.completion(&messages, 300, 0.7).await
    }

    /// Moderates a review, returning the [`Moderation`] verdict.
    ///
    /// # Errors
    ///
    /// If the model API is not configured, unreachable, or returns an
    /// unusable response. Callers fall back to [`Moderation::fallback()`].
    pub async fn moderate(
        &self,
        text: &review::Text,
        rating: review::Rating,
    ) -> Result<Moderation, Error> {
        const PROMPT: &str =
            "You are a review moderation system for a hostel/PG platform. \
             Analyze the review and return a JSON object with: isFake \
             (boolean), isAbusive (boolean), sentimentScore (number from -1 \
             to 1), sentimentLabel (one of [positive, negative, neutral]), \
             shouldFlag (boolean), flagReason (string, empty if not \
             flagged), confidence (number from 0 to 1). Return ONLY valid \
             JSON.";

        let messages = [
            ChatMessage {
                role: ChatRole::System,
                content: PROMPT.to_owned(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: format!("Rating: {rating}/5\nReview: {text}"),
            },
        ];

        let content = self.completion(&messages, 200, 0.3).await?;
        serde_json::from_str(extract_json(&content)).map_err(Error::Parse)
    }

    /// Classifies a complaint, returning the advisory [`Classification`].
    ///
    /// # Errors
    ///
    /// If the model API is not configured, unreachable, or returns an
    /// unusable response. Callers fall back to
    /// [`Classification::fallback()`].
    pub async fn classify(
        &self,
        title: &complaint::Title,
        description: &complaint::Description,
    ) -> Result<Classification, Error> {
        const PROMPT: &str =
            "You are a complaint classification system for a hostel/PG \
             platform. Analyze the complaint and return a JSON object with: \
             category (one of [maintenance, cleanliness, noise, security, \
             billing, staff, food, other]), priority (one of [low, medium, \
             high, urgent]), sentimentScore (number from -1 to 1), \
             confidence (number from 0 to 1). Safety and security issues \
             are urgent; billing overcharges are high. Return ONLY valid \
             JSON.";

        let messages = [
            ChatMessage {
                role: ChatRole::System,
                content: PROMPT.to_owned(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: format!(
                    "Title: {title}\nDescription: {description}",
                ),
            },
        ];

        let content = self.completion(&messages, 150, 0.3).await?;
        serde_json::from_str(extract_json(&content)).map_err(Error::Parse)
    }

    /// Predicts forward-looking demand from the provided booking history.
    ///
    /// Purely advisory: the [`Forecast`] never mutates pricing.
    ///
    /// # Errors
    ///
    /// If the model API is not configured, unreachable, or returns an
    /// unusable response. Callers fall back to [`Forecast::fallback()`].
    pub async fn predict(
        &self,
        city: Option<&property::City>,
        history: &[read::booking::MonthlyVolume],
    ) -> Result<Forecast, Error> {
        const PROMPT: &str =
            "You are a demand prediction AI for a hostel/PG platform in \
             India. Based on historical booking data and Indian travel \
             patterns (college admissions in June-July, festival seasons, \
             exam periods), return a JSON object with: predictions (array \
             of {month, occupancy, pricingSuggestion}), peakPeriods (array \
             of strings), recommendations (array of strings). Return ONLY \
             valid JSON.";

        let history = history
            .iter()
            .map(|m| {
                json!({
                    "month": m.month,
                    "bookings": m.bookings,
                    "revenue": m.revenue,
                    "avgAmount": m.avg_amount,
                })
            })
            .collect::<Vec<_>>();
        let messages = [
            ChatMessage {
                role: ChatRole::System,
                content: PROMPT.to_owned(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: format!(
                    "City: {}\nHistorical Data: {}",
                    city.map_or("General", AsRef::as_ref),
                    serde_json::Value::Array(history),
                ),
            },
        ];

        let content = self.completion(&messages, 500, 0.5).await?;
        serde_json::from_str(extract_json(&content)).map_err(Error::Parse)
    }

    /// Requests a single chat completion and returns its text content.
    async fn completion(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, Error> {
        let api_key = self.config.api_key.as_ref().ok_or(Error::NoApiKey)?;

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.api_url))
            .bearer_auth(api_key.expose_secret())
            .json(&json!({
                "model": self.config.model,
                "messages": messages,
                "max_tokens": max_tokens,
                "temperature": temperature,
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

        let completion =
            response.json::<Completion>().await.map_err(Error::Request)?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(Error::EmptyResponse)
    }
}

/// Response of the chat-completion API.
#[derive(Debug, Deserialize)]
struct Completion {
    /// Completion choices, first one used.
    choices: Vec<Choice>,
}

/// Single choice of a [`Completion`].
#[derive(Debug, Deserialize)]
struct Choice {
    /// Message of this [`Choice`].
    message: ChoiceMessage,
}

/// Message of a completion [`Choice`].
#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    /// Text content of the message.
    #[serde(default)]
    content: String,
}

/// Moderation verdict over a review.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moderation {
    /// Indicator whether the review looks fake or bot-generated.
    #[serde(default)]
    pub is_fake: bool,

    /// Indicator whether the review contains abuse.
    #[serde(default)]
    pub is_abusive: bool,

    /// Sentiment score, `-1` to `1`.
    #[serde(default)]
    pub sentiment_score: Decimal,

    /// Sentiment label reported by the model.
    #[serde(default)]
    pub sentiment_label: String,

    /// Indicator whether the review should be flagged for manual review.
    #[serde(default)]
    pub should_flag: bool,

    /// Reason for flagging, empty if not flagged.
    #[serde(default)]
    pub flag_reason: String,

    /// Model confidence, `0` to `1`.
    #[serde(default = "half")]
    pub confidence: Decimal,
}

impl Moderation {
    /// Neutral, unflagged [`Moderation`] used when the model is unreachable,
    /// so moderation failure never blocks a review submission.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            is_fake: false,
            is_abusive: false,
            sentiment_score: Decimal::ZERO,
            sentiment_label: String::new(),
            should_flag: false,
            flag_reason: String::new(),
            confidence: half(),
        }
    }

    /// Returns the [`review::SentimentLabel`] of this verdict.
    #[must_use]
    pub fn label(&self) -> review::SentimentLabel {
        self.sentiment_label
            .to_uppercase()
            .parse()
            .unwrap_or(review::SentimentLabel::Neutral)
    }
}

/// Advisory classification of a complaint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Category name suggested by the model.
    #[serde(default)]
    pub category: String,

    /// Priority name suggested by the model.
    #[serde(default)]
    pub priority: String,

    /// Sentiment score, `-1` to `1`.
    #[serde(default)]
    pub sentiment_score: Decimal,

    /// Model confidence, `0` to `1`.
    #[serde(default = "half")]
    pub confidence: Decimal,
}

impl Classification {
    /// Default [`Classification`] used when the model is unreachable.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            category: String::new(),
            priority: String::new(),
            sentiment_score: Decimal::ZERO,
            confidence: half(),
        }
    }

    /// Converts this into a [`complaint::Classification`] snapshot, mapping
    /// unknown names onto [`complaint::Category::Other`] and
    /// [`complaint::Priority::Medium`].
    #[must_use]
    pub fn snapshot(&self) -> complaint::Classification {
        complaint::Classification {
            suggested_category: self
                .category
                .to_uppercase()
                .parse()
                .unwrap_or(complaint::Category::Other),
            suggested_priority: self
                .priority
                .to_uppercase()
                .parse()
                .unwrap_or(complaint::Priority::Medium),
            sentiment_score: self.sentiment_score,
            confidence: self.confidence,
        }
    }
}

/// Forward-looking occupancy and pricing suggestion.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    /// Month-by-month predictions.
    #[serde(default)]
    pub predictions: Vec<MonthlyForecast>,

    /// Expected peak demand periods.
    #[serde(default)]
    pub peak_periods: Vec<String>,

    /// Free-form recommendations.
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl Forecast {
    /// Conservative static [`Forecast`] used when the model is unreachable.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            predictions: vec![
                MonthlyForecast {
                    month: "Next Month".into(),
                    occupancy: Decimal::new(70, 0),
                    pricing_suggestion: "+5%".into(),
                },
                MonthlyForecast {
                    month: "Month +2".into(),
                    occupancy: Decimal::new(75, 0),
                    pricing_suggestion: "+8%".into(),
                },
                MonthlyForecast {
                    month: "Month +3".into(),
                    occupancy: Decimal::new(65, 0),
                    pricing_suggestion: "0%".into(),
                },
            ],
            peak_periods: vec![
                "June-July (College Admissions)".into(),
                "October-November (Festivals)".into(),
            ],
            recommendations: vec![
                "Consider early-bird discounts".into(),
                "Bundle meal plans during peak".into(),
            ],
        }
    }
}

/// Single month of a [`Forecast`].
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyForecast {
    /// Month this prediction is for.
    pub month: String,

    /// Expected occupancy percentage.
    #[serde(default)]
    pub occupancy: Decimal,

    /// Suggested pricing adjustment, e.g. `+5%`.
    #[serde(default)]
    pub pricing_suggestion: String,
}

/// Serde default for model confidence fields.
fn half() -> Decimal {
    Decimal::new(5, 1)
}

/// Extracts the JSON object from a model reply, stripping an optional
/// Markdown code fence.
fn extract_json(content: &str) -> &str {
    /// Matches a fenced ```json block.
    static FENCED: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid regex")
    });
    /// Matches a bare JSON object.
    static BARE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

    FENCED
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .or_else(|| BARE.find(content).map(|m| m.as_str()))
        .unwrap_or(content)
}

/// Error of an [`Assistant`] operation.
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// Model API responded with a non-success status.
    #[display("model API responded with status {status}: {body}")]
    BadStatus {
        /// HTTP status code of the response.
        status: u16,

        /// Body of the response.
        #[error(not(source))]
        body: String,
    },

    /// Model API returned no completion choices.
    #[display("model API returned no choices")]
    EmptyResponse,

    /// Model API key is not configured.
    #[display("model API key is not configured")]
    NoApiKey,

    /// Model reply is not the expected JSON.
    #[display("cannot parse model reply: {_0}")]
    Parse(serde_json::Error),

    /// HTTP request to the model API failed.
    #[display("model API request failed: {_0}")]
    Request(reqwest::Error),
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::domain::{complaint, review};

    use super::{extract_json, Classification, Moderation};

    #[test]
    fn extracts_json() {
        assert_eq!(extract_json(r#"{"a": 1}"#), r#"{"a": 1}"#);
        assert_eq!(
            extract_json("```json\n{\"a\": 1}\n```"),
            r#"{"a": 1}"#,
        );
        assert_eq!(extract_json("```\n{\"a\": 1}\n```"), r#"{"a": 1}"#);
        assert_eq!(
            extract_json("Here you go:\n{\"a\": 1}\nanything else?"),
            r#"{"a": 1}"#,
        );
    }

    #[test]
    fn parses_moderation() {
        let verdict: Moderation = serde_json::from_str(
            r#"{
                "isFake": false,
                "isAbusive": true,
                "sentimentScore": -0.8,
                "sentimentLabel": "negative",
                "shouldFlag": true,
                "flagReason": "personal attack",
                "confidence": 0.9
            }"#,
        )
        .unwrap();

        assert!(verdict.is_abusive);
        assert!(verdict.should_flag);
        assert_eq!(verdict.label(), review::SentimentLabel::Negative);
        assert_eq!(verdict.confidence, Decimal::new(9, 1));

        // Missing fields take safe defaults.
        let sparse: Moderation = serde_json::from_str("{}").unwrap();
        assert!(!sparse.should_flag);
        assert_eq!(sparse.label(), review::SentimentLabel::Neutral);
        assert_eq!(sparse.confidence, Decimal::new(5, 1));
    }

    #[test]
    fn maps_classification_snapshot() {
        let classification: Classification = serde_json::from_str(
            r#"{"category": "security", "priority": "urgent",
                "sentimentScore": -0.6, "confidence": 0.8}"#,
        )
        .unwrap();
        let snapshot = classification.snapshot();
        assert_eq!(
            snapshot.suggested_category,
            complaint::Category::Security,
        );
        assert_eq!(snapshot.suggested_priority, complaint::Priority::Urgent);

        // Unknown names fall back to `Other`/`Medium`.
        let snapshot = Classification {
            category: "plumbing".into(),
            priority: "asap".into(),
            sentiment_score: Decimal::ZERO,
            confidence: Decimal::ONE,
        }
        .snapshot();
        assert_eq!(snapshot.suggested_category, complaint::Category::Other);
        assert_eq!(snapshot.suggested_priority, complaint::Priority::Medium);
    }
}
