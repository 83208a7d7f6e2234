//! Authentication endpoints.

use axum::{routing::get, routing::post, Extension, Json, Router};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use serde_json::json;
use service::{
    command::{self, Command as _},
    domain::{user, User},
    query::{self, Query as _},
};

use crate::{api, define_error, AsError, Error, Service, Session};

/// Builds the [`Router`] of the authentication endpoints.
#[must_use]
pub(super) fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

/// [`User`] representation of the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// ID of the user.
    pub id: user::Id,

    /// Name of the user.
    pub name: String,

    /// Email of the user.
    pub email: String,

    /// Role of the user.
    pub role: user::Role,

    /// Phone of the user, if provided.
    pub phone: Option<String>,

    /// Indicator whether the user is verified.
    pub verified: bool,

    /// Creation time of the user, RFC 3339.
    pub created_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name.to_string(),
            email: user.email.to_string(),
            role: user.role,
            phone: user.phone.map(|p| p.to_string()),
            verified: user.verified,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Body of the `POST /auth/register` request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    /// Name of the new user.
    name: String,

    /// Email of the new user.
    email: String,

    /// Password of the new user.
    password: String,

    /// Role of the new user, `USER` if omitted. `ADMIN` cannot be
    /// self-assigned.
    role: Option<user::Role>,

    /// Phone of the new user.
    phone: Option<String>,
}

/// Registers a new [`User`] and logs it in.
#[tracing::instrument(skip_all, fields(http.name = "register"))]
async fn register(
    Extension(service): Extension<Service>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, Error> {
    let RegisterRequest {
        name,
        email,
        password,
        role,
        phone,
    } = body;

    let name = user::Name::new(name)
        .ok_or_else(|| Error::invalid_input("invalid `name`"))?;
    let email = user::Email::new(email)
        .ok_or_else(|| Error::invalid_input("invalid `email`"))?;
    let password = user::Password::new(password).ok_or_else(|| {
        Error::invalid_input("`password` must be 6 to 128 characters")
    })?;
    let phone = phone
        .map(|p| {
            user::Phone::new(p)
                .ok_or_else(|| Error::invalid_input("invalid `phone`"))
        })
        .transpose()?;
    let role = match role {
        None => user::Role::User,
        Some(user::Role::Admin) => {
            return Err(AuthApiError::AdminSelfAssignment.into());
        }
        Some(role @ (user::Role::User | user::Role::Owner)) => role,
    };

    let user = service
        .execute(command::CreateUser {
            name,
            email,
            password: SecretBox::init_with(move || password),
            role,
            phone,
        })
        .await
        .map_err(AsError::into_error)?;

    let output = service
        .execute(command::CreateUserSession::ByUserId(user.id))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(json!({
        "success": true,
        "token": output.token.to_string(),
        "user": UserDto::from(output.user),
    })))
}

/// Body of the `POST /auth/login` request.
#[derive(Debug, Deserialize)]
struct LoginRequest {
    /// Email of the user.
    email: String,

    /// Password of the user.
    password: String,
}

/// Logs a [`User`] in by credentials.
#[tracing::instrument(skip_all, fields(http.name = "login"))]
async fn login(
    Extension(service): Extension<Service>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, Error> {
    let LoginRequest { email, password } = body;

    let email = user::Email::new(email)
        .ok_or_else(|| Error::invalid_input("invalid `email`"))?;
    let password = user::Password::new(password)
        .ok_or_else(|| Error::invalid_input("invalid `password`"))?;

    let output = service
        .execute(command::CreateUserSession::ByCredentials {
            email,
            password: SecretBox::init_with(move || password),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(json!({
        "success": true,
        "token": output.token.to_string(),
        "user": UserDto::from(output.user),
    })))
}

/// Returns the authenticated [`User`].
#[tracing::instrument(skip_all, fields(http.name = "me"))]
async fn me(
    Extension(service): Extension<Service>,
    session: Session,
) -> Result<Json<serde_json::Value>, Error> {
    let user = service
        .execute(query::user::ById::by(session.user_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(api::NotFoundError::NotFound))?;

    Ok(Json(json!({
        "success": true,
        "user": UserDto::from(user),
    })))
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserEmail` is occupied by another `User`"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = FORBIDDEN]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}

define_error! {
    enum AuthApiError {
        #[code = "ADMIN_SELF_ASSIGNMENT"]
        #[status = FORBIDDEN]
        #[message = "`ADMIN` role cannot be self-assigned"]
        AdminSelfAssignment,
    }
}
