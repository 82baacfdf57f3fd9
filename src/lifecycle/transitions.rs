//! Lifecycle triggers.
//!
//! Each trigger takes the latest record and returns the updated copy. The
//! input is never modified, so a failed trigger leaves the caller's record
//! exactly as it was and a retry always starts from a fresh fetch.

use chrono::NaiveDateTime;

use crate::errors::ActionError;
use crate::lifecycle::actions::{authorize, Action, Actor};
use crate::lifecycle::report_times::validate_report_times;
use crate::models::{
    Booking, CleaningReport, CleaningStatus, ReportDecision, ReportPayload, ReportStatus,
    ReviewIndex,
};

/// Cleaner confirms arrival: `assigned` → `ongoing`.
pub fn mark_arrived(
    booking: &Booking,
    actor: &Actor,
    now: NaiveDateTime,
) -> Result<Booking, ActionError> {
    authorize(Action::MarkArrived, actor, booking)?;

    let mut next = booking.clone();
    next.cleaning_status = CleaningStatus::CleaningInProgress;
    next.arrived_at = Some(now);
    next.updated_at = now;
    Ok(next)
}

/// Cleaner files the end-of-job report: `ongoing` → `report_submitted`.
///
/// A booking holds at most one report; a second submission is a conflict
/// even if the first was rejected.
pub fn submit_report(
    booking: &Booking,
    actor: &Actor,
    payload: &ReportPayload,
    now: NaiveDateTime,
) -> Result<(Booking, CleaningReport), ActionError> {
    if booking.report.is_some() || booking.report_status != ReportStatus::NotSubmitted {
        // Role and ownership still come first so strangers learn nothing.
        if let Err(e @ ActionError::Unauthorized(_)) =
            authorize(Action::SubmitReport, actor, booking)
        {
            return Err(e);
        }
        return Err(ActionError::Conflict(format!(
            "a report was already submitted for booking {}",
            booking.id
        )));
    }

    authorize(Action::SubmitReport, actor, booking)?;

    validate_report_times(
        payload.arrival_time.as_deref(),
        payload.start_time.as_deref(),
        payload.end_time.as_deref(),
    )?;

    let report = CleaningReport {
        booking_id: booking.id.clone(),
        cleaner_id: actor.id.clone(),
        arrival_time: trimmed(payload.arrival_time.as_deref()),
        start_time: trimmed(payload.start_time.as_deref()),
        end_time: trimmed(payload.end_time.as_deref()),
        notes: payload
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        before_photos: payload.before_photos.clone(),
        after_photos: payload.after_photos.clone(),
        status: ReportStatus::Pending,
        submitted_at: now,
    };

    let mut next = booking.clone();
    next.cleaning_status = CleaningStatus::Completed;
    next.report_status = ReportStatus::Pending;
    next.report = Some(report.clone());
    next.updated_at = now;
    Ok((next, report))
}

/// Admin decision on a submitted report. Approval completes the booking;
/// rejection sends it back to `ongoing` with the report kept on record.
pub fn decide_report(
    booking: &Booking,
    actor: &Actor,
    decision: ReportDecision,
    now: NaiveDateTime,
) -> Result<Booking, ActionError> {
    let action = match decision {
        ReportDecision::Approve => Action::ApproveReport,
        ReportDecision::Reject => Action::RejectReport,
    };
    authorize(action, actor, booking)?;

    let status = match decision {
        ReportDecision::Approve => ReportStatus::Approved,
        ReportDecision::Reject => ReportStatus::Rejected,
    };

    let mut next = booking.clone();
    next.report_status = status;
    if decision == ReportDecision::Reject {
        next.cleaning_status = CleaningStatus::CleaningInProgress;
    }
    if let Some(report) = next.report.as_mut() {
        report.status = status;
    }
    next.updated_at = now;
    Ok(next)
}

/// Client may review a completed booking once.
pub fn check_review(
    booking: &Booking,
    actor: &Actor,
    reviews: &ReviewIndex,
) -> Result<(), ActionError> {
    authorize(Action::LeaveReview, actor, booking)?;
    if reviews.contains(&booking.id) {
        return Err(ActionError::Conflict(format!(
            "booking {} has already been reviewed",
            booking.id
        )));
    }
    Ok(())
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use crate::lifecycle::actions::Role;
    use crate::lifecycle::stage::{derive_stage, Stage};
    use crate::lifecycle::testing::{booking, report};

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2025-12-10 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn cleaner() -> Actor {
        Actor::new("c1", Role::Cleaner)
    }

    fn admin() -> Actor {
        Actor::new("admin", Role::Admin)
    }

    fn payload() -> ReportPayload {
        ReportPayload {
            arrival_time: Some("2025-12-10T08:55:00Z".to_string()),
            start_time: Some("2025-12-10T09:00:00Z".to_string()),
            end_time: Some("2025-12-10T11:30:00Z".to_string()),
            notes: Some("  All rooms done ".to_string()),
            before_photos: vec!["before/1.jpg".to_string()],
            after_photos: vec!["after/1.jpg".to_string()],
        }
    }

    #[test]
    fn test_full_lifecycle_never_regresses() {
        let mut b = booking(&[], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        let mut stages = vec![derive_stage(&b)];

        b.assigned_cleaner_ids = vec!["c1".to_string()];
        stages.push(derive_stage(&b));

        b = mark_arrived(&b, &cleaner(), now()).unwrap();
        stages.push(derive_stage(&b));

        b = submit_report(&b, &cleaner(), &payload(), now()).unwrap().0;
        stages.push(derive_stage(&b));

        b = decide_report(&b, &admin(), ReportDecision::Approve, now()).unwrap();
        stages.push(derive_stage(&b));

        assert_eq!(
            stages,
            vec![
                Stage::Booked,
                Stage::Assigned,
                Stage::Ongoing,
                Stage::ReportSubmitted,
                Stage::Completed
            ]
        );
        assert!(stages.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(b.report.as_ref().map(|r| r.status), Some(ReportStatus::Approved));
    }

    #[test]
    fn test_mark_arrived_records_time() {
        let b = booking(&["c1"], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        let next = mark_arrived(&b, &cleaner(), now()).unwrap();
        assert_eq!(next.cleaning_status, CleaningStatus::CleaningInProgress);
        assert_eq!(next.arrived_at, Some(now()));
    }

    #[test]
    fn test_mark_arrived_twice_is_conflict() {
        let b = booking(&["c1"], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        let arrived = mark_arrived(&b, &cleaner(), now()).unwrap();
        let err = mark_arrived(&arrived, &cleaner(), now()).unwrap_err();
        assert!(matches!(err, ActionError::Conflict(_)));
        assert_eq!(arrived.cleaning_status, CleaningStatus::CleaningInProgress);
    }

    #[test]
    fn test_mark_arrived_by_unassigned_cleaner_is_unauthorized() {
        let b = booking(&[], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        let err = mark_arrived(&b, &cleaner(), now()).unwrap_err();
        // Not on the job at all, so this is an ownership failure.
        assert!(matches!(err, ActionError::Unauthorized(_)));
        assert_eq!(b.cleaning_status, CleaningStatus::NotStarted);
    }

    #[test]
    fn test_submit_report_requires_ongoing() {
        let b = booking(&["c1"], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        let err = submit_report(&b, &cleaner(), &payload(), now()).unwrap_err();
        assert!(matches!(err, ActionError::Conflict(_)));
    }

    #[test]
    fn test_submit_report_twice_is_conflict() {
        let b = booking(&["c1"], CleaningStatus::CleaningInProgress, ReportStatus::NotSubmitted);
        let (submitted, report) = submit_report(&b, &cleaner(), &payload(), now()).unwrap();
        assert_eq!(report.notes.as_deref(), Some("All rooms done"));
        assert_eq!(report.status, ReportStatus::Pending);

        let err = submit_report(&submitted, &cleaner(), &payload(), now()).unwrap_err();
        assert!(matches!(err, ActionError::Conflict(_)));
    }

    #[test]
    fn test_rejected_report_cannot_be_resubmitted() {
        let mut b = booking(&["c1"], CleaningStatus::CleaningInProgress, ReportStatus::Rejected);
        b.report = Some(report("c1"));
        let err = submit_report(&b, &cleaner(), &payload(), now()).unwrap_err();
        assert!(matches!(err, ActionError::Conflict(_)));
    }

    #[test]
    fn test_existing_report_still_checks_ownership() {
        let mut b = booking(&["c1"], CleaningStatus::Completed, ReportStatus::Pending);
        b.report = Some(report("c1"));
        let stranger = Actor::new("c2", Role::Cleaner);
        let err = submit_report(&b, &stranger, &payload(), now()).unwrap_err();
        assert!(matches!(err, ActionError::Unauthorized(_)));
    }

    #[test]
    fn test_submit_report_validates_times() {
        let b = booking(&["c1"], CleaningStatus::CleaningInProgress, ReportStatus::NotSubmitted);
        let mut bad = payload();
        bad.arrival_time = Some("10:00".to_string());
        bad.start_time = Some("09:30".to_string());
        bad.end_time = Some("11:00".to_string());

        let err = submit_report(&b, &cleaner(), &bad, now()).unwrap_err();
        assert!(matches!(
            err,
            ActionError::Validation(ValidationError::InvalidOrdering { .. })
        ));
    }

    #[test]
    fn test_reject_returns_to_ongoing() {
        let mut b = booking(&["c1"], CleaningStatus::Completed, ReportStatus::Pending);
        b.report = Some(report("c1"));
        let next = decide_report(&b, &admin(), ReportDecision::Reject, now()).unwrap();
        assert_eq!(derive_stage(&next), Stage::Ongoing);
        assert_eq!(next.report.map(|r| r.status), Some(ReportStatus::Rejected));
    }

    #[test]
    fn test_only_admin_decides() {
        let b = booking(&["c1"], CleaningStatus::Completed, ReportStatus::Pending);
        let err = decide_report(&b, &cleaner(), ReportDecision::Approve, now()).unwrap_err();
        assert!(matches!(err, ActionError::Unauthorized(_)));
    }

    #[test]
    fn test_decide_requires_submitted_report() {
        let b = booking(&["c1"], CleaningStatus::CleaningInProgress, ReportStatus::NotSubmitted);
        let err = decide_report(&b, &admin(), ReportDecision::Approve, now()).unwrap_err();
        assert!(matches!(err, ActionError::Conflict(_)));
    }

    #[test]
    fn test_review_once() {
        let b = booking(&["c1"], CleaningStatus::Completed, ReportStatus::Approved);
        let client = Actor::new("client-1", Role::Client);
        let mut reviews = ReviewIndex::default();
        assert!(check_review(&b, &client, &reviews).is_ok());
        reviews.insert(&b.id);
        assert!(matches!(
            check_review(&b, &client, &reviews).unwrap_err(),
            ActionError::Conflict(_)
        ));
    }
}
