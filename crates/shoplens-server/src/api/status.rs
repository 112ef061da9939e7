//! Status-check endpoints, the service's minimal write-path smoke test.

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

// Unbounded listing would eventually ship the whole table; cap it.
const STATUS_LIST_CAP: i64 = 1000;

#[derive(Debug, Deserialize)]
pub(super) struct CreateStatusCheck {
    pub client_name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct StatusCheck {
    pub id: Uuid,
    pub client_name: String,
    pub timestamp: DateTime<Utc>,
}

impl From<shoplens_db::StatusCheckRow> for StatusCheck {
    fn from(row: shoplens_db::StatusCheckRow) -> Self {
        Self {
            id: row.id,
            client_name: row.client_name,
            timestamp: row.recorded_at,
        }
    }
}

pub(super) async fn create_status_check(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Json(body): Json<CreateStatusCheck>,
) -> Result<Json<StatusCheck>, ApiError> {
    let row = shoplens_db::insert_status_check(&state.pool, &body.client_name)
        .await
        .map_err(|e| map_db_error(request_id, &e))?;
    Ok(Json(row.into()))
}

pub(super) async fn list_status_checks(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
) -> Result<Json<Vec<StatusCheck>>, ApiError> {
    let rows = shoplens_db::list_status_checks(&state.pool, STATUS_LIST_CAP)
        .await
        .map_err(|e| map_db_error(request_id, &e))?;
    Ok(Json(rows.into_iter().map(StatusCheck::from).collect()))
}
