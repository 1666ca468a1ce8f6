//! Bill API routes.
//!
//! JSON endpoints used by the bill list's client-side script.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use homebase_core::{BillId, BillStatus};

use crate::db::{BillRepository, RepositoryError};
use crate::error::add_breadcrumb;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Failure response for API endpoints.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    pub message: &'static str,
}

impl ApiError {
    const fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            success: false,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Request to flip a bill's status.
#[derive(Debug, Default, Deserialize)]
pub struct ToggleStatusRequest {
    /// Bill id, as a JSON number or a numeric string.
    #[serde(rename = "billId", default)]
    pub bill_id: Option<Value>,
}

impl ToggleStatusRequest {
    /// The requested id, if it is a positive integer.
    fn bill_id(&self) -> Option<BillId> {
        let id = match self.bill_id.as_ref()? {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        (id > 0).then_some(BillId::new(id))
    }
}

/// Response from a successful toggle.
#[derive(Debug, Serialize)]
pub struct ToggleStatusResponse {
    pub success: bool,
    pub status: BillStatus,
}

/// Flip a bill between paid and unpaid.
///
/// POST /api/bills/toggle-status
///
/// A bill that does not exist and a bill owned by someone else both answer
/// 404 "Unauthorized".
///
/// # Errors
///
/// Returns `ApiError` if the id is missing, the bill is not visible, or the
/// update fails.
pub async fn toggle_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: Result<Json<ToggleStatusRequest>, JsonRejection>,
) -> Result<Json<ToggleStatusResponse>, ApiError> {
    let Json(request) = body.map_err(|e| {
        tracing::debug!("Rejected toggle body: {}", e);
        ApiError::new(StatusCode::BAD_REQUEST, "Bill ID is required")
    })?;
    let id = request
        .bill_id()
        .ok_or(ApiError::new(StatusCode::BAD_REQUEST, "Bill ID is required"))?;

    let status = BillRepository::new(state.pool())
        .toggle_status(user.scope(), id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                tracing::warn!(user_id = %user.id, bill_id = %id, "Toggle refused");
                ApiError::new(StatusCode::NOT_FOUND, "Unauthorized")
            }
            other => {
                tracing::error!(user_id = %user.id, bill_id = %id, "Toggle failed: {}", other);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
        })?;

    let bill_id = id.to_string();
    add_breadcrumb(
        "bills",
        "Toggled bill status",
        Some(&[("bill_id", bill_id.as_str()), ("status", status.as_str())]),
    );

    Ok(Json(ToggleStatusResponse {
        success: true,
        status,
    }))
}
