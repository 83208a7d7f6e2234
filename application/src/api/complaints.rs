//! [`Complaint`] endpoints.
//!
//! [`Complaint`]: service::domain::Complaint

use axum::{
    extract::Path,
    routing::{get, post, put},
    Extension, Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use service::{
    command::{self, Command as _},
    domain::{complaint, property, user, Complaint},
    query::{self, Query as _},
};
use uuid::Uuid;

use crate::{api, define_error, AsError, Error, Service, Session};

/// Builds the [`Router`] of the complaint endpoints.
#[must_use]
pub(super) fn router() -> Router {
    Router::new()
        .route("/", post(create))
        .route("/my", get(my))
        .route("/property/:propertyId", get(by_property))
        .route("/:id/resolve", put(resolve))
}

/// [`Complaint`] representation of the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDto {
    /// ID of the complaint.
    pub id: complaint::Id,

    /// ID of the filing user.
    pub user_id: user::Id,

    /// ID of the property complained about.
    pub property_id: property::Id,

    /// Title of the complaint.
    pub title: String,

    /// Description of the complaint.
    pub description: String,

    /// Category of the complaint.
    pub category: complaint::Category,

    /// Priority of the complaint.
    pub priority: complaint::Priority,

    /// Status of the complaint.
    pub status: complaint::Status,

    /// Advisory AI classification snapshot, if available.
    pub ai_classification: Option<ClassificationDto>,

    /// Resolution of the complaint, once resolved.
    pub resolution: Option<ResolutionDto>,

    /// Creation time of the complaint, RFC 3339.
    pub created_at: String,
}

/// AI classification part of a [`ComplaintDto`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationDto {
    /// Suggested category.
    pub suggested_category: complaint::Category,

    /// Suggested priority.
    pub suggested_priority: complaint::Priority,

    /// Sentiment score, `-1` to `1`.
    pub sentiment_score: Decimal,

    /// Classifier confidence, `0` to `1`.
    pub confidence: Decimal,
}

impl From<complaint::Classification> for ClassificationDto {
    fn from(c: complaint::Classification) -> Self {
        Self {
            suggested_category: c.suggested_category,
            suggested_priority: c.suggested_priority,
            sentiment_score: c.sentiment_score,
            confidence: c.confidence,
        }
    }
}

/// Resolution part of a [`ComplaintDto`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDto {
    /// Resolution text.
    pub text: String,

    /// ID of the resolving user.
    pub resolved_by: user::Id,

    /// Resolution time, RFC 3339.
    pub resolved_at: String,
}

impl From<Complaint> for ComplaintDto {
    fn from(c: Complaint) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            property_id: c.property_id,
            title: c.title.to_string(),
            description: c.description.to_string(),
            category: c.category,
            priority: c.priority,
            status: c.status,
            ai_classification: c.classification.map(Into::into),
            resolution: c.resolution.map(|r| ResolutionDto {
                text: r.text.to_string(),
                resolved_by: r.resolved_by,
                resolved_at: r.resolved_at.to_rfc3339(),
            }),
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Body of the `POST /complaints` request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest {
    /// ID of the property complained about.
    property_id: Uuid,

    /// Title of the complaint.
    title: String,

    /// Description of the complaint.
    description: String,

    /// Category picked by the filer.
    category: Option<complaint::Category>,

    /// Priority picked by the filer.
    priority: Option<complaint::Priority>,
}

/// Files a new [`Complaint`].
#[tracing::instrument(skip_all, fields(http.name = "createComplaint"))]
async fn create(
    Extension(service): Extension<Service>,
    session: Session,
    Json(body): Json<CreateRequest>,
) -> Result<(http::StatusCode, Json<serde_json::Value>), Error> {
    let title = complaint::Title::new(body.title)
        .ok_or_else(|| Error::invalid_input("invalid `title`"))?;
    let description = complaint::Description::new(body.description)
        .ok_or_else(|| Error::invalid_input("invalid `description`"))?;

    let complaint = service
        .execute(command::CreateComplaint {
            user_id: session.user_id,
            property_id: body.property_id.into(),
            title,
            description,
            category: body.category,
            priority: body.priority,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::CREATED,
        Json(json!({
            "success": true,
            "complaint": ComplaintDto::from(complaint),
        })),
    ))
}

/// Returns the authenticated user's complaints, newest first.
#[tracing::instrument(skip_all, fields(http.name = "myComplaints"))]
async fn my(
    Extension(service): Extension<Service>,
    session: Session,
) -> Result<Json<serde_json::Value>, Error> {
    let complaints = service
        .execute(query::complaints::ByUser::by(session.user_id))
        .await
        .map_err(AsError::into_error)?
        .into_iter()
        .map(ComplaintDto::from)
        .collect::<Vec<_>>();

    Ok(Json(json!({
        "success": true,
        "complaints": complaints,
    })))
}

/// Returns the complaints against a property, for its owner or an admin.
#[tracing::instrument(
    skip_all,
    fields(http.name = "propertyComplaints", property_id = %property_id),
)]
async fn by_property(
    Extension(service): Extension<Service>,
    session: Session,
    Path(property_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, Error> {
    let property_id = property::Id::from(property_id);

    let property = service
        .execute(query::property::ById::by(property_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(api::NotFoundError::NotFound))?;
    if property.owner_id != session.user_id
        && session.role != user::Role::Admin
    {
        return Err(api::PrivilegeError::NotAuthorized.into());
    }

    let complaints = service
        .execute(query::complaints::ByProperty::by(property_id))
        .await
        .map_err(AsError::into_error)?
        .into_iter()
        .map(ComplaintDto::from)
        .collect::<Vec<_>>();

    Ok(Json(json!({
        "success": true,
        "complaints": complaints,
    })))
}

/// Body of the `PUT /complaints/{id}/resolve` request.
#[derive(Debug, Deserialize)]
struct ResolveRequest {
    /// Text describing the resolution.
    resolution: String,
}

/// Resolves a [`Complaint`], for the property owner or an admin.
#[tracing::instrument(
    skip_all,
    fields(http.name = "resolveComplaint", id = %id),
)]
async fn resolve(
    Extension(service): Extension<Service>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(body): Json<ResolveRequest>,
) -> Result<Json<serde_json::Value>, Error> {
    let resolution = complaint::ResolutionText::new(body.resolution)
        .ok_or_else(|| Error::invalid_input("invalid `resolution`"))?;

    let complaint = service
        .execute(command::ResolveComplaint {
            complaint_id: id.into(),
            resolution,
            initiator_id: session.user_id,
            initiator_role: session.role,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(json!({
        "success": true,
        "complaint": ComplaintDto::from(complaint),
    })))
}

impl AsError for command::create_complaint::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PROPERTY_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Property` with the provided ID does not exist"]
                PropertyNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::PropertyNotExists(_) => Error::PropertyNotExists.into(),
        })
    }
}

impl AsError for command::resolve_complaint::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_RESOLVED"]
                #[status = CONFLICT]
                #[message = "`Complaint` is already resolved"]
                AlreadyResolved,

                #[code = "COMPLAINT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Complaint` with the provided ID does not exist"]
                ComplaintNotExists,
            }
        }

        Some(match self {
            Self::AlreadyResolved(_) => Error::AlreadyResolved.into(),
            Self::ComplaintNotExists(_) => Error::ComplaintNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotAllowed(_) => api::PrivilegeError::NotAuthorized.into(),
        })
    }
}
