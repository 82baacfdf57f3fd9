use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::models::booking::{dollars_to_cents, Booking, MAX_AMOUNT_CENTS};

/// One selected service on a quote. Amounts are in cents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceLine {
    pub code: String,
    pub label: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

impl ServiceLine {
    pub fn new(
        code: &str,
        label: &str,
        quantity: u32,
        unit_price_cents: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            code: code.to_string(),
            label: label.to_string(),
            quantity,
            unit_price_cents,
            subtotal_cents: line_subtotal(label, quantity, unit_price_cents)?,
        })
    }
}

fn line_subtotal(
    label: &str,
    quantity: u32,
    unit_price_cents: i64,
) -> Result<i64, ValidationError> {
    i64::from(quantity)
        .checked_mul(unit_price_cents)
        .filter(|cents| (0..=MAX_AMOUNT_CENTS).contains(cents))
        .ok_or_else(|| ValidationError::InvalidValue {
            field: "services",
            reason: format!(
                "{quantity} x {} for {label} is out of range",
                format_money(unit_price_cents)
            ),
        })
}

/// Line item in the booking form's shape: dollar prices, `key`/`qty`
/// spellings, subtotal sometimes omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawServiceLine {
    #[serde(alias = "key")]
    pub code: Option<String>,
    #[serde(alias = "name")]
    pub label: Option<String>,
    #[serde(alias = "qty")]
    pub quantity: Option<u32>,
    #[serde(alias = "price")]
    pub unit_price: Option<f64>,
    pub subtotal: Option<f64>,
}

impl RawServiceLine {
    pub fn into_line(self) -> Result<ServiceLine, ValidationError> {
        let label = self
            .label
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "Service".to_string());
        let code = self.code.unwrap_or_else(|| label.to_lowercase().replace(' ', "_"));
        let quantity = self.quantity.unwrap_or(1);
        let unit_price_cents = dollars_to_cents("unitPrice", self.unit_price.unwrap_or(0.0))?;

        let mut line = ServiceLine::new(&code, &label, quantity, unit_price_cents)?;
        if let Some(subtotal) = self.subtotal {
            line.subtotal_cents = dollars_to_cents("subtotal", subtotal)?;
        }
        Ok(line)
    }
}

pub fn quote_total(lines: &[ServiceLine]) -> Result<i64, ValidationError> {
    lines
        .iter()
        .try_fold(0i64, |total, line| {
            total
                .checked_add(line.subtotal_cents)
                .filter(|sum| *sum <= MAX_AMOUNT_CENTS)
        })
        .ok_or_else(|| ValidationError::InvalidValue {
            field: "totalPrice",
            reason: format!("line items add up to more than {}", format_money(MAX_AMOUNT_CENTS)),
        })
}

/// Checks `subtotal == quantity * unit_price` per line and that the booking
/// total is the sum of its subtotals. Bookings without line items (site
/// visits priced later) only need a non-negative total.
pub fn check_line_items(booking: &Booking) -> Result<(), ValidationError> {
    for line in &booking.services {
        let expected = line_subtotal(&line.label, line.quantity, line.unit_price_cents)?;
        if line.subtotal_cents != expected {
            return Err(ValidationError::InvalidValue {
                field: "services",
                reason: format!(
                    "subtotal of {} is {} but {} x {} is {}",
                    line.label,
                    format_money(line.subtotal_cents),
                    line.quantity,
                    format_money(line.unit_price_cents),
                    format_money(expected)
                ),
            });
        }
    }

    if booking.total_price_cents < 0 {
        return Err(ValidationError::InvalidValue {
            field: "totalPrice",
            reason: "total cannot be negative".to_string(),
        });
    }

    if !booking.services.is_empty() {
        let sum = quote_total(&booking.services)?;
        if sum != booking.total_price_cents {
            return Err(ValidationError::InvalidValue {
                field: "totalPrice",
                reason: format!(
                    "total {} does not match line items {}",
                    format_money(booking.total_price_cents),
                    format_money(sum)
                ),
            });
        }
    }

    Ok(())
}

pub fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}
