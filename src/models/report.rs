use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::booking::ReportStatus;

/// The cleaner's end-of-job report. At most one exists per booking and it is
/// never rewritten after submission; only its review status changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleaningReport {
    pub booking_id: String,
    pub cleaner_id: String,
    pub arrival_time: String,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
    pub before_photos: Vec<String>,
    pub after_photos: Vec<String>,
    pub status: ReportStatus,
    pub submitted_at: NaiveDateTime,
}

/// Report submission as sent by the job page. Photos are references to
/// already-uploaded files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportPayload {
    pub arrival_time: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub notes: Option<String>,
    pub before_photos: Vec<String>,
    pub after_photos: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportDecision {
    Approve,
    Reject,
}
