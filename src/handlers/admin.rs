use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{
    BookingEvent, EventKind, PaymentStatus, RawBooking, ReportDecision, ReviewIndex,
};
use crate::services::bookings::{self, BookingView};
use crate::services::notifications::publish;
use crate::state::AppState;

use super::admin_actor;

// GET /api/admin/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingView>>, AppError> {
    let actor = admin_actor(&headers, &state.config.admin_token)?;

    let views = {
        let db = state.db.lock().unwrap();
        bookings::view_bookings(&db, &actor)?
    };

    Ok(Json(views))
}

// POST /api/admin/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(raw): Json<RawBooking>,
) -> Result<(StatusCode, Json<BookingView>), AppError> {
    let actor = admin_actor(&headers, &state.config.admin_token)?;

    let view = {
        let db = state.db.lock().unwrap();
        let booking = bookings::create_booking(&db, raw)?;
        BookingView::build(booking, &actor, &ReviewIndex::default())
    };

    if view.booking.has_cleaner() {
        let event = BookingEvent::for_booking(
            &view.booking,
            EventKind::Assignment,
            "You have been assigned a new job",
        );
        publish(&state, event).await;
    }

    Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Deserialize)]
pub struct PaymentRequest {
    pub status: PaymentStatus,
}

// POST /api/admin/bookings/:id/payment
pub async fn record_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<PaymentRequest>,
) -> Result<Json<BookingView>, AppError> {
    let actor = admin_actor(&headers, &state.config.admin_token)?;
    let status = body.status;

    let view = {
        let db = state.db.lock().unwrap();
        let booking = bookings::record_payment(&db, &id, status)?;
        BookingView::build(booking, &actor, &ReviewIndex::default())
    };

    if status == PaymentStatus::Paid {
        let event = BookingEvent::for_booking(&view.booking, EventKind::Status, "Payment received");
        publish(&state, event).await;
    }

    Ok(Json(view))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[serde(default)]
    pub cleaner_ids: Vec<String>,
}

// POST /api/admin/bookings/:id/assign
pub async fn assign_cleaners(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<AssignRequest>,
) -> Result<Json<BookingView>, AppError> {
    let actor = admin_actor(&headers, &state.config.admin_token)?;

    let view = {
        let db = state.db.lock().unwrap();
        let booking = bookings::assign_cleaners(&db, &id, &body.cleaner_ids)?;
        BookingView::build(booking, &actor, &ReviewIndex::default())
    };

    let event = BookingEvent::for_booking(
        &view.booking,
        EventKind::Assignment,
        "You have been assigned a new job",
    );
    publish(&state, event).await;

    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct DecisionRequest {
    pub decision: ReportDecision,
}

// POST /api/admin/bookings/:id/report/decision
pub async fn decide_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<BookingView>, AppError> {
    let actor = admin_actor(&headers, &state.config.admin_token)?;

    let view = {
        let db = state.db.lock().unwrap();
        let booking = bookings::decide_report(&db, &id, &actor, body.decision)?;
        let reviews = bookings::review_index(&db, std::slice::from_ref(&booking))?;
        BookingView::build(booking, &actor, &reviews)
    };

    let message = match body.decision {
        ReportDecision::Approve => "Your cleaning has been completed",
        ReportDecision::Reject => "The cleaning report needs another look",
    };
    let event = BookingEvent::for_booking(&view.booking, EventKind::Status, message);
    publish(&state, event).await;

    Ok(Json(view))
}
