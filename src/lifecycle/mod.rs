//! Booking lifecycle: one canonical stage per booking, derived from the raw
//! record, plus the table of which actor may trigger which transition.
//!
//! Everything here is pure. Callers fetch the latest record, derive, and
//! re-derive after every mutation; nothing is cached between calls.

pub mod actions;
pub mod report_times;
pub mod stage;
pub mod transitions;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::{authorize, eligible_actions, for_stage, Action, Actor, Role};
pub use report_times::{validate_report_times, ReportTime, ReportWindow};
pub use stage::{derive_stage, describe, describe_for, Stage, StageView};
