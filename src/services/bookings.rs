use std::collections::BTreeSet;

use chrono::{NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::errors::{ActionError, ValidationError};
use crate::lifecycle::{self, transitions, Action, Actor, Role, StageView};
use crate::models::pricing::check_line_items;
use crate::models::time_of_day::format_time_12h;
use crate::models::{
    Booking, CleaningReport, NewReview, PaymentStatus, RawBooking, ReportDecision, ReportPayload,
    Review, ReviewIndex,
};
use crate::services::earnings::cleaner_earning;

const ADMIN_LIST_LIMIT: i64 = 200;

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// A booking as one actor sees it: the record, its derived stage under the
/// actor's wording, and what the actor can do next.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub stage: StageView,
    pub actions: BTreeSet<Action>,
    pub preferred_time_display: Option<String>,
    pub earning_cents: Option<i64>,
    pub has_review: bool,
}

impl BookingView {
    pub fn build(booking: Booking, actor: &Actor, reviews: &ReviewIndex) -> Self {
        let stage = lifecycle::derive_stage(&booking);
        let actions = lifecycle::eligible_actions(stage, actor, &booking, reviews);
        let earning_cents = match actor.role {
            Role::Client => None,
            Role::Cleaner | Role::Admin => cleaner_earning(&booking),
        };

        Self {
            stage: stage.view_for(actor.role),
            actions,
            preferred_time_display: booking.preferred_time.as_deref().map(format_time_12h),
            earning_cents,
            has_review: reviews.contains(&booking.id),
            booking,
        }
    }
}

pub fn fetch_booking(conn: &Connection, id: &str) -> Result<Booking, ActionError> {
    queries::get_booking(conn, id)?.ok_or_else(|| ActionError::NotFound(format!("booking {id}")))
}

/// Fetches a booking the actor is allowed to see.
pub fn fetch_booking_for(
    conn: &Connection,
    id: &str,
    actor: &Actor,
) -> Result<Booking, ActionError> {
    let booking = fetch_booking(conn, id)?;
    if !actor.owns(&booking) {
        return Err(ActionError::Unauthorized(format!(
            "booking {id} does not belong to {} {}",
            actor.role.as_str(),
            actor.id
        )));
    }
    Ok(booking)
}

pub fn list_bookings_for_actor(
    conn: &Connection,
    actor: &Actor,
) -> Result<Vec<Booking>, ActionError> {
    let bookings = match actor.role {
        Role::Client => queries::get_bookings_for_client(conn, &actor.id)?,
        Role::Cleaner => queries::get_bookings_for_cleaner(conn, &actor.id)?,
        Role::Admin => queries::get_all_bookings(conn, ADMIN_LIST_LIMIT)?,
    };
    Ok(bookings)
}

/// Index of reviewed bookings among `bookings`.
pub fn review_index(conn: &Connection, bookings: &[Booking]) -> Result<ReviewIndex, ActionError> {
    let ids: Vec<String> = bookings.iter().map(|b| b.id.clone()).collect();
    let reviews = queries::get_reviews_for_bookings(conn, &ids)?;
    Ok(ReviewIndex::from_reviews(&reviews))
}

pub fn view_bookings(conn: &Connection, actor: &Actor) -> Result<Vec<BookingView>, ActionError> {
    let bookings = list_bookings_for_actor(conn, actor)?;
    let reviews = review_index(conn, &bookings)?;
    Ok(bookings
        .into_iter()
        .map(|b| BookingView::build(b, actor, &reviews))
        .collect())
}

pub fn view_booking(
    conn: &Connection,
    id: &str,
    actor: &Actor,
) -> Result<BookingView, ActionError> {
    let booking = fetch_booking_for(conn, id, actor)?;
    let reviews = review_index(conn, std::slice::from_ref(&booking))?;
    Ok(BookingView::build(booking, actor, &reviews))
}

pub fn mark_arrived(conn: &Connection, id: &str, actor: &Actor) -> Result<Booking, ActionError> {
    let booking = fetch_booking(conn, id)?;
    let next = transitions::mark_arrived(&booking, actor, now())?;
    queries::update_progress(conn, &next)?;

    tracing::info!(booking_id = %id, cleaner_id = %actor.id, "cleaner marked arrival");
    Ok(next)
}

pub fn submit_report(
    conn: &Connection,
    id: &str,
    actor: &Actor,
    payload: &ReportPayload,
) -> Result<(Booking, CleaningReport), ActionError> {
    let booking = fetch_booking(conn, id)?;
    let (next, report) = transitions::submit_report(&booking, actor, payload, now())?;

    let tx = conn.unchecked_transaction()?;
    queries::insert_report(&tx, &report)?;
    queries::update_progress(&tx, &next)?;
    tx.commit()?;

    tracing::info!(
        booking_id = %id,
        cleaner_id = %actor.id,
        before_photos = report.before_photos.len(),
        after_photos = report.after_photos.len(),
        "cleaning report submitted"
    );
    Ok((next, report))
}

pub fn decide_report(
    conn: &Connection,
    id: &str,
    actor: &Actor,
    decision: ReportDecision,
) -> Result<Booking, ActionError> {
    let booking = fetch_booking(conn, id)?;
    let next = transitions::decide_report(&booking, actor, decision, now())?;

    let tx = conn.unchecked_transaction()?;
    queries::update_progress(&tx, &next)?;
    queries::update_report_status(&tx, id, next.report_status)?;
    tx.commit()?;

    tracing::info!(booking_id = %id, decision = ?decision, "report decided");
    Ok(next)
}

pub fn list_reviews(conn: &Connection) -> Result<Vec<Review>, ActionError> {
    Ok(queries::get_reviews(conn)?)
}

pub fn create_review(
    conn: &Connection,
    actor: &Actor,
    new: &NewReview,
) -> Result<Review, ActionError> {
    let rating = new.rating()?;
    let booking = fetch_booking(conn, &new.booking_id)?;
    let reviews = review_index(conn, std::slice::from_ref(&booking))?;
    transitions::check_review(&booking, actor, &reviews)?;

    let client_name = new
        .client_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| booking.client_name.clone())
        .unwrap_or_else(|| "Client".to_string());

    let review = Review {
        id: uuid::Uuid::new_v4().to_string(),
        booking_id: booking.id.clone(),
        client_id: actor.id.clone(),
        client_name,
        rating,
        comment: new
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        created_at: now(),
    };
    queries::insert_review(conn, &review)?;

    tracing::info!(booking_id = %review.booking_id, rating = review.rating, "review created");
    Ok(review)
}

// ── Dispatch ──

pub fn create_booking(conn: &Connection, raw: RawBooking) -> Result<Booking, ActionError> {
    let booking = raw.normalize(now())?;
    check_line_items(&booking)?;

    if queries::get_booking(conn, &booking.id)?.is_some() {
        return Err(ActionError::Conflict(format!("booking {} already exists", booking.id)));
    }
    queries::insert_booking(conn, &booking)?;

    tracing::info!(
        booking_id = %booking.id,
        service_type = booking.service_type.as_str(),
        "booking created"
    );
    Ok(booking)
}

/// Records the payment provider's verdict for a checkout.
pub fn record_payment(
    conn: &Connection,
    id: &str,
    status: PaymentStatus,
) -> Result<Booking, ActionError> {
    let booking = fetch_booking(conn, id)?;
    if booking.payment_status == PaymentStatus::Paid && status != PaymentStatus::Paid {
        return Err(ActionError::Conflict(format!("booking {id} is already paid")));
    }
    queries::update_payment_status(conn, id, status, &now())?;

    tracing::info!(booking_id = %id, payment_status = status.as_str(), "payment status recorded");
    fetch_booking(conn, id)
}

pub fn assign_cleaners(
    conn: &Connection,
    id: &str,
    cleaner_ids: &[String],
) -> Result<Booking, ActionError> {
    let mut ids: Vec<String> = Vec::new();
    for cleaner_id in cleaner_ids.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if !ids.iter().any(|existing| existing == cleaner_id) {
            ids.push(cleaner_id.to_string());
        }
    }
    if ids.is_empty() {
        return Err(ValidationError::MissingField("cleanerIds").into());
    }

    let booking = fetch_booking(conn, id)?;
    if booking.payment_status != PaymentStatus::Paid {
        return Err(ActionError::Conflict(format!(
            "booking {id} is {} and cannot be assigned until paid",
            booking.payment_status.as_str()
        )));
    }
    let stage = lifecycle::derive_stage(&booking);
    if stage > lifecycle::Stage::Assigned {
        return Err(ActionError::Conflict(format!(
            "cannot reassign booking {id} once it is {stage}"
        )));
    }
    queries::update_assigned_cleaners(conn, id, &ids, &now())?;

    tracing::info!(booking_id = %id, cleaners = ?ids, "cleaners assigned");
    fetch_booking(conn, id)
}
