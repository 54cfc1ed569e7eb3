// [business] Error sources from the catalog and the raw-query guard, plus the client body
use crate::{
    db::{CatalogError, ErrorBody}, // [business] Allow-list misses and the generic error body
    security::SqlGuardError,       // [security] Raw statements refused as not read-only
};

// [library] Axum response building - status code plus JSON body
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

// [library] Derive Display/Error and From conversions for the enum
use thiserror::Error;

// [library] Server-side logging of the detail the client never sees
use tracing::{error, warn};

/// Every failure a route can produce.
///
/// Handlers propagate with `?`; this is the one place where a failure becomes
/// an HTTP response. Details are logged and never sent to the client.
#[derive(Debug, Error)]
pub enum GatewayError {
    // [business] Any database failure - connection, syntax, missing table, type error
    #[error("Error executing query: {0}")]
    Query(#[from] sqlx::Error),
    // [security] Identifier not on an allow-list
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    // [security] Raw statement failed the read-only guard
    #[error("Rejected raw query: {0}")]
    Guard(#[from] SqlGuardError),
    // [security] ENABLE_RAW_QUERY is off
    #[error("Raw query route is disabled")]
    RawQueryDisabled,
}

impl GatewayError {
    // [business] Three client-visible outcomes: 500, 400, 403
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Catalog(_) | GatewayError::Guard(_) => StatusCode::BAD_REQUEST,
            GatewayError::RawQueryDisabled => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();

        // [business] Operators get the detail; server faults log louder than client mistakes
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }

        // [rust] Reason phrase doubles as the body: "Internal Server Error", "Bad Request", "Forbidden"
        let message = status.canonical_reason().unwrap_or("Internal Server Error");
        (status, Json(ErrorBody::new(message))).into_response()
    }
}
