//! AI-assist endpoints.
//!
//! All of these are advisory: they degrade onto documented fallbacks and
//! never surface a hard upstream failure.

use axum::{routing::post, Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use service::{
    assist::{self, Assist as _},
    domain::{complaint, property, review},
    infra::assist::ChatMessage,
};
use uuid::Uuid;

use crate::{AsError, Error, Service, Session};

/// Builds the [`Router`] of the AI-assist endpoints.
#[must_use]
pub(super) fn router() -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/moderate-review", post(moderate_review))
        .route("/classify-complaint", post(classify_complaint))
        .route("/predict-demand", post(predict_demand))
}

/// Body of the `POST /assist/chat` request.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    /// Chat history, oldest turn first.
    #[serde(default)]
    messages: Vec<ChatMessage>,

    /// City the user is searching in.
    city: Option<String>,
}

/// Replies to a support chat.
#[tracing::instrument(skip_all, fields(http.name = "assistChat"))]
async fn chat(
    Extension(service): Extension<Service>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, Error> {
    let city = body.city.and_then(property::City::new);

    let reply = service
        .execute(assist::Chat {
            history: body.messages,
            city,
        })
        .await
        .unwrap_or_else(|e| match e {});

    Ok(Json(json!({
        "success": true,
        "message": reply,
    })))
}

/// Body of the `POST /assist/moderate-review` request.
#[derive(Debug, Deserialize)]
struct ModerateRequest {
    /// Text of the review to moderate.
    text: String,

    /// Rating the review gives.
    rating: u8,
}

/// Moderates review text.
#[tracing::instrument(skip_all, fields(http.name = "assistModerateReview"))]
async fn moderate_review(
    Extension(service): Extension<Service>,
    session: Session,
    Json(body): Json<ModerateRequest>,
) -> Result<Json<serde_json::Value>, Error> {
    _ = session;

    let text = review::Text::new(body.text)
        .ok_or_else(|| Error::invalid_input("invalid `text`"))?;
    let rating = review::Rating::new(body.rating)
        .ok_or_else(|| Error::invalid_input("`rating` must be 1 to 5"))?;

    let verdict = service
        .execute(assist::ModerateReview { text, rating })
        .await
        .unwrap_or_else(|e| match e {});

    Ok(Json(json!({
        "success": true,
        "moderation": {
            "isFake": verdict.is_fake,
            "isAbusive": verdict.is_abusive,
            "sentimentScore": verdict.sentiment_score,
            "sentimentLabel": verdict.label(),
            "shouldFlag": verdict.should_flag,
            "flagReason": verdict.flag_reason,
            "confidence": verdict.confidence,
        },
    })))
}

/// Body of the `POST /assist/classify-complaint` request.
#[derive(Debug, Deserialize)]
struct ClassifyRequest {
    /// Title of the complaint.
    title: String,

    /// Description of the complaint.
    description: String,
}

/// Classifies a complaint.
#[tracing::instrument(skip_all, fields(http.name = "assistClassifyComplaint"))]
async fn classify_complaint(
    Extension(service): Extension<Service>,
    session: Session,
    Json(body): Json<ClassifyRequest>,
) -> Result<Json<serde_json::Value>, Error> {
    _ = session;

    let title = complaint::Title::new(body.title)
        .ok_or_else(|| Error::invalid_input("invalid `title`"))?;
    let description = complaint::Description::new(body.description)
        .ok_or_else(|| Error::invalid_input("invalid `description`"))?;

    let classification = service
        .execute(assist::ClassifyComplaint { title, description })
        .await
        .unwrap_or_else(|e| match e {});

    Ok(Json(json!({
        "success": true,
        "classification": {
            "suggestedCategory": classification.suggested_category,
            "suggestedPriority": classification.suggested_priority,
            "sentimentScore": classification.sentiment_score,
            "confidence": classification.confidence,
        },
    })))
}

/// Body of the `POST /assist/predict-demand` request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest {
    /// ID of the property to predict demand for.
    property_id: Option<Uuid>,

    /// City context of the prediction.
    city: Option<String>,
}

/// Predicts forward-looking demand.
#[tracing::instrument(skip_all, fields(http.name = "assistPredictDemand"))]
async fn predict_demand(
    Extension(service): Extension<Service>,
    session: Session,
    Json(body): Json<PredictRequest>,
) -> Result<Json<serde_json::Value>, Error> {
    _ = session;

    let city = body.city.and_then(property::City::new);

    let output = service
        .execute(assist::PredictDemand {
            property_id: body.property_id.map(Into::into),
            city,
        })
        .await
        .map_err(AsError::into_error)?;

    let historical = output
        .historical
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

    Ok(Json(json!({
        "success": true,
        "prediction": output.forecast,
        "historical": historical,
    })))
}
