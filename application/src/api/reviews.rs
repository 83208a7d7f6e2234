//! [`Review`] endpoints.
//!
//! [`Review`]: service::domain::Review

use axum::{
    extract::{Path, Query as UrlQuery},
    routing::{get, post, put},
    Extension, Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use service::{
    command::{self, Command as _},
    domain::{property, review, user, Review},
    query::{self, Query as _},
    read,
};
use uuid::Uuid;

use crate::{api, define_error, AsError, Error, Service, Session};

/// Builds the [`Router`] of the review endpoints.
#[must_use]
pub(super) fn router() -> Router {
    Router::new()
        .route("/", post(create).get(list))
        .route("/property/:propertyId", get(by_property))
        .route("/:id", axum::routing::delete(delete))
        .route("/:id/flag", put(flag))
}

/// [`Review`] representation of the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    /// ID of the review.
    pub id: review::Id,

    /// ID of the review author.
    pub user_id: user::Id,

    /// ID of the reviewed property.
    pub property_id: property::Id,

    /// Rating given, 1 to 5.
    pub rating: u8,

    /// Title of the review.
    pub title: Option<String>,

    /// Text of the review.
    pub text: String,

    /// Estimated sentiment of the review.
    pub sentiment: SentimentDto,

    /// Indicator whether the review is flagged.
    pub flagged: bool,

    /// Flag reason, if flagged.
    pub flag_reason: Option<String>,

    /// Count of "helpful" votes.
    pub helpful: i32,

    /// Creation time of the review, RFC 3339.
    pub created_at: String,
}

/// Sentiment part of a [`ReviewDto`].
#[derive(Debug, Serialize)]
pub struct SentimentDto {
    /// Sentiment score, `-1` to `1`.
    pub score: Decimal,

    /// Sentiment label.
    pub label: review::SentimentLabel,
}

impl From<Review> for ReviewDto {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            property_id: r.property_id,
            rating: r.rating.into(),
            title: r.title.map(|t| t.to_string()),
            text: r.text.to_string(),
            sentiment: SentimentDto {
                score: r.sentiment.score,
                label: r.sentiment.label,
            },
            flagged: r.flagged,
            flag_reason: r.flag_reason.map(|f| f.to_string()),
            helpful: r.helpful,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Body of the `POST /reviews` request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest {
    /// ID of the property being reviewed.
    property_id: Uuid,

    /// Rating given, 1 to 5.
    rating: u8,

    /// Title of the review.
    title: Option<String>,

    /// Text of the review.
    text: String,
}

/// Creates a new [`Review`].
#[tracing::instrument(skip_all, fields(http.name = "createReview"))]
async fn create(
    Extension(service): Extension<Service>,
    session: Session,
    Json(body): Json<CreateRequest>,
) -> Result<(http::StatusCode, Json<serde_json::Value>), Error> {
    let rating = review::Rating::new(body.rating)
        .ok_or_else(|| Error::invalid_input("`rating` must be 1 to 5"))?;
    let title = body
        .title
        .map(|t| {
            review::Title::new(t)
                .ok_or_else(|| Error::invalid_input("invalid `title`"))
        })
        .transpose()?;
    let text = review::Text::new(body.text)
        .ok_or_else(|| Error::invalid_input("invalid `text`"))?;

    let review = service
        .execute(command::CreateReview {
            user_id: session.user_id,
            property_id: body.property_id.into(),
            rating,
            title,
            text,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::CREATED,
        Json(json!({
            "success": true,
            "review": ReviewDto::from(review),
        })),
    ))
}

/// Returns the publicly visible reviews of a property.
#[tracing::instrument(
    skip_all,
    fields(http.name = "propertyReviews", property_id = %property_id),
)]
async fn by_property(
    Extension(service): Extension<Service>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, Error> {
    let reviews = service
        .execute(query::reviews::ByProperty::by(property_id.into()))
        .await
        .map_err(AsError::into_error)?
        .into_iter()
        .map(ReviewDto::from)
        .collect::<Vec<_>>();

    Ok(Json(json!({
        "success": true,
        "reviews": reviews,
    })))
}

/// Filters of the `GET /reviews` request.
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    /// Flagged state to filter by.
    flagged: Option<bool>,

    /// 1-based number of the requested page.
    page: Option<usize>,

    /// Number of items per page.
    limit: Option<usize>,
}

/// Lists all the reviews, admin-only, paginated.
#[tracing::instrument(skip_all, fields(http.name = "listReviews"))]
async fn list(
    Extension(service): Extension<Service>,
    session: Session,
    UrlQuery(q): UrlQuery<ListQuery>,
) -> Result<Json<serde_json::Value>, Error> {
    if !session.role.may(user::Action::ModerateReviews) {
        return Err(api::PrivilegeError::NotAuthorized.into());
    }

    let page = service
        .execute(query::reviews::List::by(read::review::list::Selector {
            arguments: api::PageQuery {
                page: q.page,
                limit: q.limit,
            }
            .arguments(),
            filter: read::review::list::Filter { flagged: q.flagged },
        }))
        .await
        .map_err(AsError::into_error)?;

    let meta = api::PageMeta::from(&page);
    let reviews = page
        .items
        .into_iter()
        .map(ReviewDto::from)
        .collect::<Vec<_>>();

    Ok(Json(json!({
        "success": true,
        "reviews": reviews,
        "pagination": meta,
    })))
}

/// Deletes a [`Review`].
#[tracing::instrument(skip_all, fields(http.name = "deleteReview", id = %id))]
async fn delete(
    Extension(service): Extension<Service>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, Error> {
    service
        .execute(command::DeleteReview {
            review_id: id.into(),
            initiator_id: session.user_id,
            initiator_role: session.role,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(json!({ "success": true })))
}

/// Body of the `PUT /reviews/{id}/flag` request.
#[derive(Debug, Deserialize)]
struct FlagRequest {
    /// New flagged state.
    flagged: bool,

    /// Reason of the flag.
    reason: Option<String>,
}

/// Flags or unflags a [`Review`], admin-only.
#[tracing::instrument(skip_all, fields(http.name = "flagReview", id = %id))]
async fn flag(
    Extension(service): Extension<Service>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(body): Json<FlagRequest>,
) -> Result<Json<serde_json::Value>, Error> {
    let reason = body
        .reason
        .map(|r| {
            review::FlagReason::new(r)
                .ok_or_else(|| Error::invalid_input("invalid `reason`"))
        })
        .transpose()?;

    let review = service
        .execute(command::FlagReview {
            review_id: id.into(),
            flagged: body.flagged,
            reason,
            initiator_id: session.user_id,
            initiator_role: session.role,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(json!({
        "success": true,
        "review": ReviewDto::from(review),
    })))
}

impl AsError for command::create_review::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_REVIEWED"]
                #[status = BAD_REQUEST]
                #[message = "You have already reviewed this property"]
                AlreadyReviewed,

                #[code = "PROPERTY_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Property` with the provided ID does not exist"]
                PropertyNotExists,
            }
        }

        Some(match self {
            Self::AlreadyReviewed(_) => Error::AlreadyReviewed.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::PropertyNotExists(_) => Error::PropertyNotExists.into(),
        })
    }
}

impl AsError for command::delete_review::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "REVIEW_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Review` with the provided ID does not exist"]
                ReviewNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NotAllowed(_) => api::PrivilegeError::NotAuthorized.into(),
            Self::ReviewNotExists(_) => Error::ReviewNotExists.into(),
        })
    }
}

impl AsError for command::flag_review::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "REVIEW_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Review` with the provided ID does not exist"]
                ReviewNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NotAllowed(_) => api::PrivilegeError::NotAuthorized.into(),
            Self::ReviewNotExists(_) => Error::ReviewNotExists.into(),
        })
    }
}
