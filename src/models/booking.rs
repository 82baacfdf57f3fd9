use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::models::pricing::{quote_total, RawServiceLine, ServiceLine};
use crate::models::report::CleaningReport;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub client_id: String,
    pub client_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub service_type: ServiceType,
    pub service_date: Option<String>,
    pub preferred_time: Option<String>,
    pub payment_status: PaymentStatus,
    pub assigned_cleaner_ids: Vec<String>,
    pub cleaning_status: CleaningStatus,
    pub report_status: ReportStatus,
    /// Terminal status set upstream, outranks every other field.
    pub status_override: Option<ExternalStatus>,
    pub services: Vec<ServiceLine>,
    pub total_price_cents: i64,
    pub cleaner_earning_cents: Option<i64>,
    pub cleaner_percentage: Option<f64>,
    pub arrived_at: Option<NaiveDateTime>,
    pub report: Option<CleaningReport>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn has_cleaner(&self) -> bool {
        !self.assigned_cleaner_ids.is_empty()
    }

    pub fn is_assigned_to(&self, cleaner_id: &str) -> bool {
        self.assigned_cleaner_ids.iter().any(|id| id == cleaner_id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Residential,
    Commercial,
    PostConstruction,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Residential => "residential",
            ServiceType::Commercial => "commercial",
            ServiceType::PostConstruction => "post_construction",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "commercial" => ServiceType::Commercial,
            "post_construction" | "postconstruction" => ServiceType::PostConstruction,
            _ => ServiceType::Residential,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" => PaymentStatus::Pending,
            "paid" => PaymentStatus::Paid,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Unpaid,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStatus {
    NotStarted,
    CleaningInProgress,
    Completed,
}

impl CleaningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CleaningStatus::NotStarted => "not_started",
            CleaningStatus::CleaningInProgress => "cleaning_in_progress",
            CleaningStatus::Completed => "completed",
        }
    }

    /// Older records use `in_progress`; anything unrecognised means the
    /// cleaner has not started.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "cleaning_in_progress" | "in_progress" => CleaningStatus::CleaningInProgress,
            "completed" => CleaningStatus::Completed,
            _ => CleaningStatus::NotStarted,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[serde(rename = "none")]
    NotSubmitted,
    Pending,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::NotSubmitted => "none",
            ReportStatus::Pending => "pending",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" => ReportStatus::Pending,
            "approved" => ReportStatus::Approved,
            "rejected" => ReportStatus::Rejected,
            _ => ReportStatus::NotSubmitted,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExternalStatus {
    Completed,
    Reviewed,
}

impl ExternalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalStatus::Completed => "completed",
            ExternalStatus::Reviewed => "reviewed",
        }
    }

    /// Only terminal upstream statuses are kept; the rest carry no lifecycle
    /// meaning of their own.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "completed" => Some(ExternalStatus::Completed),
            "reviewed" => Some(ExternalStatus::Reviewed),
            _ => None,
        }
    }
}

/// A quote record as the upstream API or the booking form sends it.
///
/// Every field is optional and loosely typed. `normalize` turns it into a
/// [`Booking`] so the lifecycle code only ever sees strict enums.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBooking {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "userId")]
    pub client_id: Option<String>,
    #[serde(alias = "name")]
    pub client_name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "phoneNumber")]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub service_type: Option<String>,
    pub service_date: Option<String>,
    pub preferred_time: Option<String>,
    pub payment_status: Option<String>,
    pub assigned_cleaner_id: Option<String>,
    pub assigned_cleaner_ids: Option<Vec<String>>,
    pub cleaning_status: Option<String>,
    pub report_status: Option<String>,
    pub status: Option<String>,
    pub services: Vec<RawServiceLine>,
    /// Dollars.
    pub total_price: Option<f64>,
    /// Cents, as reported by the payment provider.
    pub payment_amount: Option<i64>,
    pub cleaner_earning_amount: Option<f64>,
    pub cleaner_percentage: Option<f64>,
}

impl RawBooking {
    pub fn normalize(self, now: NaiveDateTime) -> Result<Booking, ValidationError> {
        let client_id = non_empty(self.client_id).ok_or(ValidationError::MissingField("clientId"))?;

        let mut assigned_cleaner_ids: Vec<String> = self
            .assigned_cleaner_ids
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| non_empty(Some(id)))
            .collect();
        if let Some(single) = non_empty(self.assigned_cleaner_id) {
            if !assigned_cleaner_ids.contains(&single) {
                assigned_cleaner_ids.push(single);
            }
        }

        let services: Vec<ServiceLine> = self
            .services
            .into_iter()
            .map(RawServiceLine::into_line)
            .collect::<Result<_, _>>()?;

        let total_price_cents = match (self.total_price, self.payment_amount) {
            (Some(dollars), _) => dollars_to_cents("totalPrice", dollars)?,
            (None, Some(cents)) => check_cents("paymentAmount", cents)?,
            (None, None) => quote_total(&services)?,
        };

        let cleaner_earning_cents = self
            .cleaner_earning_amount
            .map(|dollars| dollars_to_cents("cleanerEarningAmount", dollars))
            .transpose()?;

        Ok(Booking {
            id: non_empty(self.id).unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            client_id,
            client_name: non_empty(self.client_name),
            email: non_empty(self.email),
            phone: non_empty(self.phone),
            address: non_empty(self.address),
            service_type: self
                .service_type
                .as_deref()
                .map(ServiceType::parse)
                .unwrap_or(ServiceType::Residential),
            service_date: non_empty(self.service_date),
            preferred_time: non_empty(self.preferred_time),
            payment_status: self
                .payment_status
                .as_deref()
                .map(PaymentStatus::parse)
                .unwrap_or(PaymentStatus::Unpaid),
            assigned_cleaner_ids,
            cleaning_status: self
                .cleaning_status
                .as_deref()
                .map(CleaningStatus::parse)
                .unwrap_or(CleaningStatus::NotStarted),
            report_status: self
                .report_status
                .as_deref()
                .map(ReportStatus::parse)
                .unwrap_or(ReportStatus::NotSubmitted),
            status_override: self.status.as_deref().and_then(ExternalStatus::parse),
            services,
            total_price_cents,
            cleaner_earning_cents,
            cleaner_percentage: self.cleaner_percentage,
            arrived_at: None,
            report: None,
            created_at: now,
            updated_at: now,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "undefined" && s != "null")
}

/// Largest amount accepted anywhere on a quote: $1,000,000,000.00.
pub(crate) const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

pub(crate) fn dollars_to_cents(field: &'static str, dollars: f64) -> Result<i64, ValidationError> {
    let cents = (dollars * 100.0).round();
    if !dollars.is_finite() || dollars < 0.0 || cents > MAX_AMOUNT_CENTS as f64 {
        return Err(ValidationError::InvalidValue {
            field,
            reason: format!("{dollars} is not a valid amount"),
        });
    }
    Ok(cents as i64)
}

pub(crate) fn check_cents(field: &'static str, cents: i64) -> Result<i64, ValidationError> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::InvalidValue {
            field,
            reason: format!("{cents} cents is not a valid amount"),
        });
    }
    Ok(cents)
}
