use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use serde::Deserialize;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::models::BookingEvent;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct EventsQuery {
    pub actor_id: Option<String>,
    pub token: Option<String>,
}

/// Who a stream is for. Admins see every event; everyone else only the
/// bookings they are party to.
enum Audience {
    Admin,
    Actor(String),
}

impl Audience {
    fn sees(&self, event: &BookingEvent) -> bool {
        match self {
            Audience::Admin => true,
            Audience::Actor(id) => event.is_visible_to(id),
        }
    }
}

// GET /api/events (SSE)
pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Query params, since EventSource can't set headers
    let token = query.token.as_deref().unwrap_or("");
    let audience = if !token.is_empty() && token == state.config.admin_token {
        Audience::Admin
    } else {
        let id = query
            .actor_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(AppError::Unauthorized)?;
        Audience::Actor(id.to_string())
    };

    let rx = state.events_tx.subscribe();

    let live_stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if audience.sees(&event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data).event("booking_event")))
        }
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "event subscriber lagged");
            None
        }
    });

    let keepalive_stream = IntervalStream::new(tokio::time::interval(Duration::from_secs(30)))
        .map(|_| Ok(Event::default().comment("keepalive")));

    Ok(Sse::new(live_stream.merge(keepalive_stream)))
}
