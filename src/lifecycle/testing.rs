use chrono::NaiveDateTime;

use crate::models::{
    Booking, CleaningReport, CleaningStatus, PaymentStatus, ReportStatus, ServiceType,
};

pub(crate) fn booking(
    cleaners: &[&str],
    cleaning: CleaningStatus,
    report: ReportStatus,
) -> Booking {
    let now = NaiveDateTime::default();
    Booking {
        id: "b1".to_string(),
        client_id: "client-1".to_string(),
        client_name: Some("Alice".to_string()),
        email: None,
        phone: None,
        address: None,
        service_type: ServiceType::Residential,
        service_date: Some("2025-12-10".to_string()),
        preferred_time: Some("09:00".to_string()),
        payment_status: PaymentStatus::Paid,
        assigned_cleaner_ids: cleaners.iter().map(|c| c.to_string()).collect(),
        cleaning_status: cleaning,
        report_status: report,
        status_override: None,
        services: vec![],
        total_price_cents: 8000,
        cleaner_earning_cents: None,
        cleaner_percentage: None,
        arrived_at: None,
        report: None,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn report(cleaner_id: &str) -> CleaningReport {
    CleaningReport {
        booking_id: "b1".to_string(),
        cleaner_id: cleaner_id.to_string(),
        arrival_time: "08:55".to_string(),
        start_time: "09:00".to_string(),
        end_time: "11:00".to_string(),
        notes: None,
        before_photos: vec![],
        after_photos: vec![],
        status: ReportStatus::Pending,
        submitted_at: NaiveDateTime::default(),
    }
}
