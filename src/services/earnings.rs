use serde::Serialize;

use crate::lifecycle::{derive_stage, Stage};
use crate::models::{Booking, ServiceType};

/// What the cleaner is paid for a job, in cents.
///
/// An explicit earning amount wins. Residential jobs otherwise pay the
/// cleaner's percentage of the total; commercial and post-construction
/// jobs are quoted per site visit and carry no derived earning.
pub fn cleaner_earning(booking: &Booking) -> Option<i64> {
    if let Some(cents) = booking.cleaner_earning_cents {
        return Some(cents);
    }
    if booking.service_type != ServiceType::Residential || booking.total_price_cents <= 0 {
        return None;
    }
    booking
        .cleaner_percentage
        .filter(|pct| pct.is_finite() && *pct > 0.0 && *pct <= 100.0)
        .map(|pct| (pct / 100.0 * booking.total_price_cents as f64).round() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Serialize)]
pub struct EarningLine {
    pub booking_id: String,
    pub service_type: ServiceType,
    pub service_date: Option<String>,
    /// `None` when the job carries no cleaner earning; the job page shows
    /// the client's total instead, which is not the cleaner's pay.
    pub amount_cents: Option<i64>,
    pub stage: Stage,
    pub payout: PayoutStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EarningsSummary {
    pub total_cents: i64,
    pub pending_cents: i64,
    pub paid_cents: i64,
    pub jobs: Vec<EarningLine>,
}

/// Rolls a cleaner's jobs into dashboard totals. A job's payout is released
/// once its stage reaches `completed`. Jobs without a derivable earning are
/// listed but add nothing to the totals.
pub fn summarize(jobs: &[Booking]) -> EarningsSummary {
    let mut summary = EarningsSummary::default();

    for job in jobs {
        let stage = derive_stage(job);
        let amount_cents = cleaner_earning(job);
        let payout = if stage == Stage::Completed {
            PayoutStatus::Paid
        } else {
            PayoutStatus::Pending
        };

        if let Some(cents) = amount_cents {
            summary.total_cents += cents;
            match payout {
                PayoutStatus::Paid => summary.paid_cents += cents,
                PayoutStatus::Pending => summary.pending_cents += cents,
            }
        }
        summary.jobs.push(EarningLine {
            booking_id: job.id.clone(),
            service_type: job.service_type,
            service_date: job.service_date.clone(),
            amount_cents,
            stage,
            payout,
        });
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::booking;
    use crate::models::{CleaningStatus, ReportStatus};

    #[test]
    fn test_explicit_earning_wins() {
        let mut b = booking(&["c1"], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        b.cleaner_earning_cents = Some(3500);
        b.cleaner_percentage = Some(50.0);
        assert_eq!(cleaner_earning(&b), Some(3500));
    }

    #[test]
    fn test_residential_percentage() {
        let mut b = booking(&["c1"], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        b.total_price_cents = 12345;
        b.cleaner_percentage = Some(40.0);
        assert_eq!(cleaner_earning(&b), Some(4938));
    }

    #[test]
    fn test_commercial_has_no_derived_earning() {
        let mut b = booking(&["c1"], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        b.service_type = ServiceType::Commercial;
        b.cleaner_percentage = Some(40.0);
        assert_eq!(cleaner_earning(&b), None);
    }

    #[test]
    fn test_percentage_above_full_price_ignored() {
        let mut b = booking(&["c1"], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        b.cleaner_percentage = Some(1e300);
        assert_eq!(cleaner_earning(&b), None);
    }

    #[test]
    fn test_completed_commercial_job_pays_nothing_without_earning() {
        let mut b = booking(&["c1"], CleaningStatus::Completed, ReportStatus::Approved);
        b.service_type = ServiceType::Commercial;
        b.total_price_cents = 150000;

        let summary = summarize(&[b]);
        assert_eq!(summary.paid_cents, 0);
        assert_eq!(summary.total_cents, 0);
        assert_eq!(summary.jobs[0].payout, PayoutStatus::Paid);
        assert_eq!(summary.jobs[0].amount_cents, None);
    }

    #[test]
    fn test_summary_splits_by_stage() {
        let mut done = booking(&["c1"], CleaningStatus::Completed, ReportStatus::Approved);
        done.id = "done".to_string();
        done.cleaner_earning_cents = Some(12000);

        let mut waiting = booking(&["c1"], CleaningStatus::Completed, ReportStatus::Pending);
        waiting.id = "waiting".to_string();
        waiting.cleaner_earning_cents = Some(2800);

        let mut commercial =
            booking(&["c1"], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        commercial.id = "commercial".to_string();
        commercial.service_type = ServiceType::Commercial;
        commercial.total_price_cents = 15000;

        let summary = summarize(&[done, waiting, commercial]);
        assert_eq!(summary.total_cents, 14800);
        assert_eq!(summary.paid_cents, 12000);
        assert_eq!(summary.pending_cents, 2800);
        assert_eq!(summary.jobs.len(), 3);
        assert_eq!(summary.jobs[2].amount_cents, None);
        assert_eq!(summary.jobs[1].stage, Stage::ReportSubmitted);
        assert_eq!(summary.jobs[1].payout, PayoutStatus::Pending);
    }
}
