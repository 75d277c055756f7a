//! Interfaces to the schedule, recommend and review services.
//!
//! The planner and wizard only see the traits below. [`HttpApi`] implements
//! all three over the gateway; tests substitute in-process fakes.

mod http;
mod wire;

use async_trait::async_trait;

pub use http::{HttpApi, DEFAULT_BASE_URL};
pub use wire::{
    MealSlotPayload, ProcessAction, ProcessRequest, SchedulePayload, Submission,
};

use crate::{
    error::Result,
    models::{PendingReview, Schedule, ScheduleListItem},
};

/// Persistence and route processing for schedules.
#[async_trait]
pub trait ScheduleService: Send + Sync {
    /// Summaries of all schedules of the current user. Records that fail to
    /// decode are skipped.
    async fn list_schedules(&self) -> Result<Vec<ScheduleListItem>>;

    async fn get_schedule(&self, id: &str) -> Result<Schedule>;

    /// Stores a new schedule. The returned copy carries the assigned id and
    /// otherwise reflects what was submitted.
    async fn create_schedule(&self, payload: &SchedulePayload) -> Result<Schedule>;

    async fn update_schedule(&self, id: &str, payload: &SchedulePayload) -> Result<Schedule>;

    async fn delete_schedule(&self, id: &str) -> Result<()>;

    /// Asks the service to select a schedule or recompute its route. The
    /// outcome is read back through the recommend service.
    async fn process_schedule(&self, id: &str, request: &ProcessRequest) -> Result<()>;

    /// Sends a wizard submission to the matching endpoint.
    async fn submit(&self, submission: &Submission) -> Result<Schedule> {
        match submission {
            Submission::Create(payload) => self.create_schedule(payload).await,
            Submission::Update { id, payload } => self.update_schedule(id, payload).await,
        }
    }
}

/// Route summaries with calculated arrival times and recommendations.
#[async_trait]
pub trait RecommendService: Send + Sync {
    async fn summary(&self, id: &str) -> Result<Schedule>;

    /// The schedule currently selected on the server, if any.
    async fn active_summary(&self) -> Result<Option<Schedule>>;
}

#[async_trait]
pub trait ReviewService: Send + Sync {
    async fn pending_reviews(&self) -> Result<Vec<PendingReview>>;

    async fn pending_review(&self, restaurant_id: &str, scheduled_time: &str)
        -> Result<PendingReview>;

    async fn delete_pending_review(&self, restaurant_id: &str, scheduled_time: &str)
        -> Result<()>;
}
