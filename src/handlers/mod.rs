pub mod admin;
pub mod bookings;
pub mod earnings;
pub mod events;
pub mod health;
pub mod reviews;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;

use crate::errors::AppError;
use crate::lifecycle::{Actor, Role};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/bookings", get(bookings::list_bookings))
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route("/api/bookings/:id/arrived", post(bookings::mark_arrived))
        .route("/api/bookings/:id/report", post(bookings::submit_report))
        .route(
            "/api/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route("/api/earnings", get(earnings::get_earnings))
        .route("/api/events", get(events::events_stream))
        .route(
            "/api/admin/bookings",
            get(admin::list_bookings).post(admin::create_booking),
        )
        .route(
            "/api/admin/bookings/:id/payment",
            post(admin::record_payment),
        )
        .route("/api/admin/bookings/:id/assign", post(admin::assign_cleaners))
        .route(
            "/api/admin/bookings/:id/report/decision",
            post(admin::decide_report),
        )
        .with_state(state)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> &str {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("")
}

pub(crate) fn check_admin(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    if expected_token.is_empty() || bearer_token(headers) != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

/// Resolves the caller from `X-Actor-Id` / `X-Actor-Role`. Claiming the
/// admin role also requires the admin bearer token.
pub(crate) fn actor_from_headers(
    headers: &HeaderMap,
    admin_token: &str,
) -> Result<Actor, AppError> {
    let id = header_value(headers, "x-actor-id").ok_or(AppError::Unauthorized)?;
    let role = header_value(headers, "x-actor-role")
        .and_then(Role::parse)
        .ok_or(AppError::Unauthorized)?;

    if role == Role::Admin {
        check_admin(headers, admin_token)?;
    }
    Ok(Actor::new(id, role))
}

pub(crate) fn admin_actor(headers: &HeaderMap, admin_token: &str) -> Result<Actor, AppError> {
    check_admin(headers, admin_token)?;
    let id = header_value(headers, "x-actor-id").unwrap_or("admin");
    Ok(Actor::new(id, Role::Admin))
}
