//! Pending reviews and session teardown.

use log::info;

use super::TripPlanner;
use crate::{error::Result, models::PendingReview};

impl TripPlanner {
    pub async fn pending_reviews(&self) -> Result<Vec<PendingReview>> {
        self.check_session(self.reviews.pending_reviews().await)
    }

    /// One pending review, addressed by restaurant and scheduled time.
    pub async fn pending_review(
        &self,
        restaurant_id: &str,
        scheduled_time: &str,
    ) -> Result<PendingReview> {
        self.check_session(
            self.reviews
                .pending_review(restaurant_id, scheduled_time)
                .await,
        )
    }

    pub async fn delete_pending_review(&self, restaurant_id: &str, scheduled_time: &str) -> Result<()> {
        self.check_session(
            self.reviews
                .delete_pending_review(restaurant_id, scheduled_time)
                .await,
        )
    }

    /// Drops every session-scoped local value.
    pub fn logout(&self) -> Result<()> {
        self.local.clear_session()?;
        info!("Logged out");
        Ok(())
    }
}
