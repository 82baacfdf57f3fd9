pub mod booking;
pub mod event;
pub mod pricing;
pub mod report;
pub mod review;
pub mod time_of_day;

pub use booking::{
    Booking, CleaningStatus, ExternalStatus, PaymentStatus, RawBooking, ReportStatus, ServiceType,
};
pub use event::{BookingEvent, EventKind};
pub use pricing::ServiceLine;
pub use report::{CleaningReport, ReportDecision, ReportPayload};
pub use review::{NewReview, Review, ReviewIndex};
