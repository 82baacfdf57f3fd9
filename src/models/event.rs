use serde::{Deserialize, Serialize};

use crate::lifecycle::{derive_stage, Stage};
use crate::models::Booking;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Assignment,
    Status,
}

/// Lifecycle change pushed to the booking's client and cleaners.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookingEvent {
    pub booking_id: String,
    pub kind: EventKind,
    pub stage: Stage,
    pub label: String,
    pub message: String,
    pub created_at: String,
    #[serde(skip)]
    pub recipients: Vec<String>,
}

impl BookingEvent {
    pub fn for_booking(booking: &Booking, kind: EventKind, message: impl Into<String>) -> Self {
        let stage = derive_stage(booking);
        let mut recipients = vec![booking.client_id.clone()];
        recipients.extend(booking.assigned_cleaner_ids.iter().cloned());

        Self {
            booking_id: booking.id.clone(),
            kind,
            stage,
            label: stage.label().to_string(),
            message: message.into(),
            created_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            recipients,
        }
    }

    pub fn is_visible_to(&self, actor_id: &str) -> bool {
        self.recipients.iter().any(|r| r == actor_id)
    }
}
