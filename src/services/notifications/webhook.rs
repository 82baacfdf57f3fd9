use std::time::Duration;

use async_trait::async_trait;

use super::Notifier;
use crate::errors::ActionError;
use crate::models::BookingEvent;

/// Posts each event as JSON to the realtime gateway, which forwards it to
/// the recipients' open sessions.
pub struct WebhookNotifier {
    url: String,
    token: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String, token: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url, token, client })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, event: &BookingEvent) -> Result<(), ActionError> {
        let body = serde_json::json!({
            "event": match event.kind {
                crate::models::EventKind::Assignment => "quote:assignment",
                crate::models::EventKind::Status => "quote:status",
            },
            "quoteId": event.booking_id,
            "status": event.stage,
            "title": event.label,
            "message": event.message,
            "recipients": event.recipients,
            "createdAt": event.created_at,
        });

        let mut request = self.client.post(&self.url).json(&body);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ActionError::from_status(status.as_u16(), &detail));
        }

        Ok(())
    }
}
