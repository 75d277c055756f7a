//! High-level trip planner API.
//!
//! [`TripPlanner`] coordinates the remote services with the device-local
//! state. It is the only place that decides when caches are written,
//! refreshed or dropped.
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for [`TripPlanner`] instances with configuration
//! - [`schedule_ops`]: Listing, fetching, deleting and editing schedules
//! - [`selection_ops`]: Selecting a schedule and keeping its summary cached
//! - [`review_ops`]: Pending reviews and session teardown
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use mapzip_core::TripPlannerBuilder;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = TripPlannerBuilder::new()
//!     .with_base_url("http://localhost:8080")
//!     .build()
//!     .await?;
//!
//! for schedule in planner.list_schedules().await? {
//!     println!("{}", schedule.title);
//! }
//!
//! let selected = planner.select_schedule("42", &CancellationToken::new()).await?;
//! println!("{}", selected.timeline());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use log::warn;

pub mod builder;
pub mod review_ops;
pub mod schedule_ops;
pub mod selection_ops;


pub use builder::TripPlannerBuilder;

use crate::{
    api::{RecommendService, ReviewService, ScheduleService},
    cache::LocalState,
    error::Result,
    poll::PollPolicy,
    store::Clock,
};

/// Main entry point for schedule management.
pub struct TripPlanner {
    pub(crate) schedules: Arc<dyn ScheduleService>,
    pub(crate) recommend: Arc<dyn RecommendService>,
    pub(crate) reviews: Arc<dyn ReviewService>,
    pub(crate) local: LocalState,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) poll: PollPolicy,
}

impl TripPlanner {
    pub fn poll_policy(&self) -> &PollPolicy {
        &self.poll
    }

    /// Device-local caches.
    pub fn local_state(&self) -> &LocalState {
        &self.local
    }

    /// Passes a collaborator result through, clearing the local session
    /// first when the gateway rejected our credentials.
    pub(crate) fn check_session<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_authentication() {
                if let Err(clear_err) = self.local.clear_session() {
                    warn!("Failed to clear local session after {e}: {clear_err}");
                }
            }
        }
        result
    }
}
