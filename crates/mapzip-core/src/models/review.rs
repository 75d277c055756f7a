//! Visits waiting for a review.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A restaurant visit the user has not reviewed yet.
///
/// The review service addresses these by `restaurant_id` plus
/// `scheduled_time`; the time is kept exactly as the server sent it so the
/// composite key round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReview {
    #[serde(default)]
    pub id: String,
    pub restaurant_id: String,
    #[serde(default)]
    pub place_name: String,
    #[serde(default)]
    pub address_name: String,
    pub scheduled_time: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl fmt::Display for PendingReview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- {} at {} (restaurant {})",
            self.place_name, self.scheduled_time, self.restaurant_id
        )?;
        if !self.address_name.is_empty() {
            write!(f, ", {}", self.address_name)?;
        }
        writeln!(f)
    }
}
