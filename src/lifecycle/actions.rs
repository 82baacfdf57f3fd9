use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::ActionError;
use crate::lifecycle::stage::{derive_stage, Stage};
use crate::models::{Booking, ReviewIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Cleaner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Cleaner => "cleaner",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "client" => Some(Role::Client),
            "cleaner" => Some(Role::Cleaner),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    /// Clients own the bookings they made, cleaners the jobs they were
    /// given; admins see everything.
    pub fn owns(&self, booking: &Booking) -> bool {
        match self.role {
            Role::Client => booking.client_id == self.id,
            Role::Cleaner => booking.is_assigned_to(&self.id),
            Role::Admin => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    MarkArrived,
    SubmitReport,
    ApproveReport,
    RejectReport,
    LeaveReview,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::MarkArrived => "mark_arrived",
            Action::SubmitReport => "submit_report",
            Action::ApproveReport => "approve_report",
            Action::RejectReport => "reject_report",
            Action::LeaveReview => "leave_review",
        }
    }
}

struct Trigger {
    action: Action,
    role: Role,
    stages: &'static [Stage],
}

const TRIGGERS: &[Trigger] = &[
    Trigger {
        action: Action::MarkArrived,
        role: Role::Cleaner,
        stages: &[Stage::Assigned],
    },
    Trigger {
        action: Action::SubmitReport,
        role: Role::Cleaner,
        stages: &[Stage::Ongoing],
    },
    Trigger {
        action: Action::ApproveReport,
        role: Role::Admin,
        stages: &[Stage::ReportSubmitted],
    },
    Trigger {
        action: Action::RejectReport,
        role: Role::Admin,
        stages: &[Stage::ReportSubmitted],
    },
    Trigger {
        action: Action::LeaveReview,
        role: Role::Client,
        stages: &[Stage::Completed],
    },
];

fn trigger(action: Action) -> Option<&'static Trigger> {
    TRIGGERS.iter().find(|t| t.action == action)
}

/// Actions the trigger table allows `role` at `stage`, ignoring anything
/// about the particular record. Viewing is always allowed.
pub fn for_stage(stage: Stage, role: Role) -> BTreeSet<Action> {
    let mut actions: BTreeSet<Action> = TRIGGERS
        .iter()
        .filter(|t| t.role == role && t.stages.contains(&stage))
        .map(|t| t.action)
        .collect();
    actions.insert(Action::View);
    actions
}

/// Actions `actor` may take on `booking` right now. Narrows
/// [`for_stage`] by ownership, the at-most-one report rule and the
/// one-review-per-booking rule.
pub fn eligible_actions(
    stage: Stage,
    actor: &Actor,
    booking: &Booking,
    reviews: &ReviewIndex,
) -> BTreeSet<Action> {
    if !actor.owns(booking) {
        return BTreeSet::new();
    }

    for_stage(stage, actor.role)
        .into_iter()
        .filter(|action| match action {
            Action::SubmitReport => booking.report.is_none(),
            Action::LeaveReview => !reviews.contains(&booking.id),
            _ => true,
        })
        .collect()
}

/// Checks role and ownership for `action`, then that the booking's current
/// stage admits it. Returns the stage the check was made against.
pub fn authorize(action: Action, actor: &Actor, booking: &Booking) -> Result<Stage, ActionError> {
    if let Some(t) = trigger(action) {
        if t.role != actor.role {
            return Err(ActionError::Unauthorized(format!(
                "{} cannot {}",
                actor.role.as_str(),
                action.as_str()
            )));
        }
    }

    if !actor.owns(booking) {
        return Err(ActionError::Unauthorized(format!(
            "booking {} does not belong to {} {}",
            booking.id,
            actor.role.as_str(),
            actor.id
        )));
    }

    let stage = derive_stage(booking);
    if let Some(t) = trigger(action) {
        if !t.stages.contains(&stage) {
            return Err(ActionError::Conflict(format!(
                "cannot {} while booking {} is {}",
                action.as_str(),
                booking.id,
                stage
            )));
        }
    }

    Ok(stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::booking;
    use crate::models::{CleaningStatus, ReportStatus};

    fn cleaner() -> Actor {
        Actor::new("c1", Role::Cleaner)
    }

    fn client() -> Actor {
        Actor::new("client-1", Role::Client)
    }

    #[test]
    fn test_table_by_stage_and_role() {
        assert_eq!(
            for_stage(Stage::Assigned, Role::Cleaner),
            BTreeSet::from([Action::View, Action::MarkArrived])
        );
        assert_eq!(
            for_stage(Stage::Ongoing, Role::Cleaner),
            BTreeSet::from([Action::View, Action::SubmitReport])
        );
        assert_eq!(
            for_stage(Stage::ReportSubmitted, Role::Admin),
            BTreeSet::from([Action::View, Action::ApproveReport, Action::RejectReport])
        );
        assert_eq!(
            for_stage(Stage::Completed, Role::Client),
            BTreeSet::from([Action::View, Action::LeaveReview])
        );
        assert_eq!(for_stage(Stage::Assigned, Role::Client), BTreeSet::from([Action::View]));
        assert_eq!(for_stage(Stage::Booked, Role::Cleaner), BTreeSet::from([Action::View]));
    }

    #[test]
    fn test_review_gating() {
        let b = booking(&["c1"], CleaningStatus::Completed, ReportStatus::Approved);
        let mut reviews = ReviewIndex::default();

        let actions = eligible_actions(Stage::Completed, &client(), &b, &reviews);
        assert!(actions.contains(&Action::LeaveReview));

        reviews.insert(&b.id);
        let actions = eligible_actions(Stage::Completed, &client(), &b, &reviews);
        assert!(!actions.contains(&Action::LeaveReview));
        assert!(actions.contains(&Action::View));
    }

    #[test]
    fn test_review_not_offered_before_completion() {
        let b = booking(&["c1"], CleaningStatus::Completed, ReportStatus::Pending);
        let actions =
            eligible_actions(Stage::ReportSubmitted, &client(), &b, &ReviewIndex::default());
        assert_eq!(actions, BTreeSet::from([Action::View]));
    }

    #[test]
    fn test_strangers_get_nothing() {
        let b = booking(&["c1"], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        let other = Actor::new("c9", Role::Cleaner);
        assert!(eligible_actions(Stage::Assigned, &other, &b, &ReviewIndex::default()).is_empty());
        let other_client = Actor::new("client-2", Role::Client);
        assert!(
            eligible_actions(Stage::Assigned, &other_client, &b, &ReviewIndex::default()).is_empty()
        );
    }

    #[test]
    fn test_submit_hidden_once_report_exists() {
        let mut b = booking(&["c1"], CleaningStatus::CleaningInProgress, ReportStatus::Rejected);
        b.report = Some(crate::lifecycle::testing::report("c1"));
        let actions = eligible_actions(Stage::Ongoing, &cleaner(), &b, &ReviewIndex::default());
        assert!(!actions.contains(&Action::SubmitReport));
    }

    #[test]
    fn test_authorize_wrong_role() {
        let b = booking(&["c1"], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        let err = authorize(Action::MarkArrived, &Actor::new("client-1", Role::Client), &b)
            .unwrap_err();
        assert!(matches!(err, ActionError::Unauthorized(_)));
    }

    #[test]
    fn test_authorize_wrong_stage_is_conflict() {
        let b = booking(&["c1"], CleaningStatus::CleaningInProgress, ReportStatus::NotSubmitted);
        let err = authorize(Action::MarkArrived, &cleaner(), &b).unwrap_err();
        assert!(matches!(err, ActionError::Conflict(_)));
    }

    #[test]
    fn test_authorize_returns_stage() {
        let b = booking(&["c1"], CleaningStatus::NotStarted, ReportStatus::NotSubmitted);
        assert_eq!(authorize(Action::MarkArrived, &cleaner(), &b).unwrap(), Stage::Assigned);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("Cleaner"), Some(Role::Cleaner));
        assert_eq!(Role::parse("dispatcher"), None);
    }
}
