use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::errors::AppError;
use crate::models::{BookingEvent, EventKind, NewReview, Review};
use crate::services::bookings;
use crate::services::notifications::publish;
use crate::state::AppState;

use super::actor_from_headers;

// GET /api/reviews
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = {
        let db = state.db.lock().unwrap();
        bookings::list_reviews(&db)?
    };
    Ok(Json(reviews))
}

// POST /api/reviews
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let actor = actor_from_headers(&headers, &state.config.admin_token)?;
    if body.booking_id.trim().is_empty() {
        return Err(AppError::BadRequest("bookingId is required".to_string()));
    }

    let (review, booking) = {
        let db = state.db.lock().unwrap();
        let review = bookings::create_review(&db, &actor, &body)?;
        (review, bookings::fetch_booking(&db, &body.booking_id)?)
    };

    let event = BookingEvent::for_booking(&booking, EventKind::Status, "Your client left a review");
    publish(&state, event).await;

    Ok((StatusCode::CREATED, Json(review)))
}
