use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::errors::{ActionError, AppError};
use crate::lifecycle::Role;
use crate::services::bookings;
use crate::services::earnings::{self, EarningsSummary};
use crate::state::AppState;

use super::actor_from_headers;

// GET /api/earnings
pub async fn get_earnings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<EarningsSummary>, AppError> {
    let actor = actor_from_headers(&headers, &state.config.admin_token)?;
    if actor.role != Role::Cleaner {
        return Err(ActionError::Unauthorized(
            "earnings are only available to cleaners".to_string(),
        )
        .into());
    }

    let jobs = {
        let db = state.db.lock().unwrap();
        bookings::list_bookings_for_actor(&db, &actor)?
    };

    Ok(Json(earnings::summarize(&jobs)))
}
