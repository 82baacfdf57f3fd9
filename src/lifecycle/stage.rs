use serde::{Deserialize, Serialize};

use crate::lifecycle::actions::Role;
use crate::models::{Booking, CleaningStatus, ReportStatus};

/// Canonical lifecycle stage of a booking, in progress order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Booked,
    Assigned,
    Ongoing,
    ReportSubmitted,
    Completed,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Booked,
        Stage::Assigned,
        Stage::Ongoing,
        Stage::ReportSubmitted,
        Stage::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Booked => "booked",
            Stage::Assigned => "assigned",
            Stage::Ongoing => "ongoing",
            Stage::ReportSubmitted => "report_submitted",
            Stage::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Stage::ALL.into_iter().find(|stage| stage.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Booked => "Booked",
            Stage::Assigned => "Assigned",
            Stage::Ongoing => "Ongoing",
            Stage::ReportSubmitted => "Report Submitted",
            Stage::Completed => "Completed",
        }
    }

    /// Cleaners see the same stages under job-board wording.
    pub fn label_for(&self, role: Role) -> &'static str {
        match (role, self) {
            (Role::Cleaner, Stage::Booked) => "Pending",
            (Role::Cleaner, Stage::ReportSubmitted) => "Waiting for admin approval",
            _ => self.label(),
        }
    }

    pub fn view(self) -> StageView {
        StageView {
            key: self,
            label: self.label(),
        }
    }

    pub fn view_for(self, role: Role) -> StageView {
        StageView {
            key: self,
            label: self.label_for(role),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageView {
    pub key: Stage,
    pub label: &'static str,
}

/// Derives the single stage shown for `booking` on every screen.
///
/// First match wins:
/// 1. report approved, or upstream status `completed`/`reviewed` → `Completed`
/// 2. report pending and cleaning completed → `ReportSubmitted`
/// 3. cleaning in progress → `Ongoing`
/// 4. at least one cleaner assigned → `Assigned`
/// 5. otherwise → `Booked`
pub fn derive_stage(booking: &Booking) -> Stage {
    if booking.report_status == ReportStatus::Approved || booking.status_override.is_some() {
        return Stage::Completed;
    }
    if booking.report_status == ReportStatus::Pending
        && booking.cleaning_status == CleaningStatus::Completed
    {
        return Stage::ReportSubmitted;
    }
    if booking.cleaning_status == CleaningStatus::CleaningInProgress {
        return Stage::Ongoing;
    }
    if booking.has_cleaner() {
        return Stage::Assigned;
    }
    Stage::Booked
}

pub fn describe(booking: &Booking) -> StageView {
    derive_stage(booking).view()
}

pub fn describe_for(booking: &Booking, role: Role) -> StageView {
    derive_stage(booking).view_for(role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::booking;
    use crate::models::ExternalStatus;

    const CLEANING: [CleaningStatus; 3] = [
        CleaningStatus::NotStarted,
        CleaningStatus::CleaningInProgress,
        CleaningStatus::Completed,
    ];
    const REPORTS: [ReportStatus; 4] = [
        ReportStatus::NotSubmitted,
        ReportStatus::Pending,
        ReportStatus::Approved,
        ReportStatus::Rejected,
    ];

    #[test]
    fn test_fresh_booking_is_booked() {
        let b = booking(&[], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        assert_eq!(
            describe(&b),
            StageView {
                key: Stage::Booked,
                label: "Booked"
            }
        );
    }

    #[test]
    fn test_in_progress_is_ongoing() {
        let b = booking(&["c1"], CleaningStatus::CleaningInProgress, ReportStatus::NotSubmitted);
        assert_eq!(
            describe(&b),
            StageView {
                key: Stage::Ongoing,
                label: "Ongoing"
            }
        );
    }

    #[test]
    fn test_pending_report_is_report_submitted() {
        let b = booking(&["c1"], CleaningStatus::Completed, ReportStatus::Pending);
        assert_eq!(
            describe(&b),
            StageView {
                key: Stage::ReportSubmitted,
                label: "Report Submitted"
            }
        );
    }

    #[test]
    fn test_assigned_without_progress() {
        let b = booking(&["c1"], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        assert_eq!(derive_stage(&b), Stage::Assigned);
    }

    #[test]
    fn test_approval_dominates_everything() {
        let b = booking(&[], CleaningStatus::NotStarted, ReportStatus::Approved);
        assert_eq!(derive_stage(&b), Stage::Completed);
    }

    #[test]
    fn test_external_terminal_status_dominates() {
        for status in [ExternalStatus::Completed, ExternalStatus::Reviewed] {
            let mut b = booking(&["c1"], CleaningStatus::CleaningInProgress, ReportStatus::Pending);
            b.status_override = Some(status);
            assert_eq!(derive_stage(&b), Stage::Completed);
        }
    }

    #[test]
    fn test_pending_report_requires_completed_cleaning() {
        let b = booking(&["c1"], CleaningStatus::CleaningInProgress, ReportStatus::Pending);
        assert_eq!(derive_stage(&b), Stage::Ongoing);
    }

    #[test]
    fn test_every_combination_yields_a_stage() {
        let cleaner_sets: [&[&str]; 3] = [&[], &["c1"], &["c1", "c2"]];
        for cleaners in cleaner_sets {
            for cleaning in CLEANING {
                for report in REPORTS {
                    for status in [None, Some(ExternalStatus::Completed)] {
                        let mut b = booking(cleaners, cleaning, report);
                        b.status_override = status;
                        let stage = derive_stage(&b);
                        assert!(Stage::ALL.contains(&stage));
                        assert_eq!(Stage::parse(stage.as_str()), Some(stage));
                    }
                }
            }
        }
    }

    #[test]
    fn test_cleaner_labels_are_aliases() {
        assert_eq!(Stage::Booked.label_for(Role::Cleaner), "Pending");
        assert_eq!(
            Stage::ReportSubmitted.label_for(Role::Cleaner),
            "Waiting for admin approval"
        );
        assert_eq!(Stage::ReportSubmitted.label_for(Role::Client), "Report Submitted");

        let b = booking(&["c1"], CleaningStatus::Completed, ReportStatus::Pending);
        assert_eq!(describe_for(&b, Role::Cleaner).key, describe(&b).key);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_value(Stage::ReportSubmitted.view()).unwrap();
        assert_eq!(json["key"], "report_submitted");
        assert_eq!(json["label"], "Report Submitted");
    }
}
