//! REST API definitions.

pub mod assist;
pub mod auth;
pub mod bookings;
pub mod complaints;
pub mod payments;
pub mod properties;
pub mod reviews;

use axum::Router;
use common::pagination;
use serde::{Deserialize, Serialize};

use crate::define_error;

/// Builds the [`Router`] of the whole REST API.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/properties", properties::router())
        .nest("/bookings", bookings::router())
        .nest("/payments", payments::router())
        .nest("/reviews", reviews::router())
        .nest("/complaints", complaints::router())
        .nest("/assist", assist::router())
}

/// Pagination parameters of a list request.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based number of the requested page.
    pub page: Option<usize>,

    /// Number of items per page.
    pub limit: Option<usize>,
}

impl PageQuery {
    /// Converts this [`PageQuery`] into pagination [`Arguments`].
    ///
    /// [`Arguments`]: pagination::Arguments
    #[must_use]
    pub fn arguments(self) -> pagination::Arguments {
        pagination::Arguments::new(self.page, self.limit)
    }
}

/// Pagination metadata of a list response.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PageMeta {
    /// 1-based number of the returned page.
    pub page: usize,

    /// Number of items per page.
    pub limit: usize,

    /// Total number of items across all pages.
    pub total: u64,

    /// Total number of pages.
    pub pages: u64,
}

impl<I> From<&pagination::Page<I>> for PageMeta {
    fn from(page: &pagination::Page<I>) -> Self {
        Self {
            page: page.arguments.page(),
            limit: page.arguments.limit(),
            total: page.total,
            pages: page.pages(),
        }
    }
}

define_error! {
    enum PrivilegeError {
        #[code = "NOT_AUTHORIZED"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` is not authorized for this action"]
        NotAuthorized,
    }
}

define_error! {
    enum NotFoundError {
        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Requested entity does not exist"]
        NotFound,
    }
}
