use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: String,
    pub booking_id: String,
    pub client_id: String,
    pub client_name: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub booking_id: String,
    pub client_name: Option<String>,
    pub rating: i64,
    pub comment: Option<String>,
}

impl NewReview {
    pub fn rating(&self) -> Result<u8, ValidationError> {
        match u8::try_from(self.rating) {
            Ok(r @ 1..=5) => Ok(r),
            _ => Err(ValidationError::InvalidValue {
                field: "rating",
                reason: format!("{} is not between 1 and 5", self.rating),
            }),
        }
    }
}

/// Booking ids that already carry a review.
#[derive(Debug, Clone, Default)]
pub struct ReviewIndex {
    reviewed: HashSet<String>,
}

impl ReviewIndex {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        Self {
            reviewed: reviews.iter().map(|r| r.booking_id.clone()).collect(),
        }
    }

    pub fn contains(&self, booking_id: &str) -> bool {
        self.reviewed.contains(booking_id)
    }

    pub fn insert(&mut self, booking_id: &str) {
        self.reviewed.insert(booking_id.to_string());
    }
}
