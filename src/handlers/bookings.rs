use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{BookingEvent, CleaningReport, EventKind, ReportPayload, ReviewIndex};
use crate::services::bookings::{self, BookingView};
use crate::services::notifications::publish;
use crate::state::AppState;

use super::actor_from_headers;

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingView>>, AppError> {
    let actor = actor_from_headers(&headers, &state.config.admin_token)?;

    let views = {
        let db = state.db.lock().unwrap();
        bookings::view_bookings(&db, &actor)?
    };

    Ok(Json(views))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingView>, AppError> {
    let actor = actor_from_headers(&headers, &state.config.admin_token)?;

    let view = {
        let db = state.db.lock().unwrap();
        bookings::view_booking(&db, &id, &actor)?
    };

    Ok(Json(view))
}

// POST /api/bookings/:id/arrived
pub async fn mark_arrived(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingView>, AppError> {
    let actor = actor_from_headers(&headers, &state.config.admin_token)?;

    let view = {
        let db = state.db.lock().unwrap();
        let booking = bookings::mark_arrived(&db, &id, &actor)?;
        BookingView::build(booking, &actor, &ReviewIndex::default())
    };

    let event =
        BookingEvent::for_booking(&view.booking, EventKind::Status, "Your cleaner has arrived");
    publish(&state, event).await;

    Ok(Json(view))
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub report: CleaningReport,
    pub booking: BookingView,
}

// POST /api/bookings/:id/report
pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<ReportPayload>,
) -> Result<Json<ReportResponse>, AppError> {
    let actor = actor_from_headers(&headers, &state.config.admin_token)?;

    let (booking, report) = {
        let db = state.db.lock().unwrap();
        let (booking, report) = bookings::submit_report(&db, &id, &actor, &payload)?;
        (BookingView::build(booking, &actor, &ReviewIndex::default()), report)
    };

    let event = BookingEvent::for_booking(
        &booking.booking,
        EventKind::Status,
        "Cleaning report submitted and awaiting approval",
    );
    publish(&state, event).await;

    Ok(Json(ReportResponse { report, booking }))
}
