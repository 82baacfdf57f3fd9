pub mod webhook;

use async_trait::async_trait;

use crate::errors::ActionError;
use crate::models::BookingEvent;
use crate::state::AppState;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &BookingEvent) -> Result<(), ActionError>;
}

/// Used when no webhook is configured; events still reach SSE subscribers.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &BookingEvent) -> Result<(), ActionError> {
        tracing::debug!(booking_id = %event.booking_id, stage = %event.stage, "{}", event.message);
        Ok(())
    }
}

/// Fans a lifecycle event out to live subscribers and the configured
/// notifier. Delivery failures are logged; the action that caused the event
/// has already been committed.
pub async fn publish(state: &AppState, event: BookingEvent) {
    // No receivers is fine
    let _ = state.events_tx.send(event.clone());

    if let Err(e) = state.notifier.notify(&event).await {
        tracing::warn!(
            booking_id = %event.booking_id,
            error = %e,
            "failed to deliver booking notification"
        );
    }
}
