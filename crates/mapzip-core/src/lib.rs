//! Core library for the Mapzip trip planner client.
//!
//! This crate holds everything the client does between the user and the
//! Mapzip backend: the three-step schedule wizard, the device-local caches,
//! the gateway client for the schedule, recommend and review services, and
//! the bounded wait for route calculation.
//!
//! # Layers
//!
//! - **Domain Models** ([`models`]): schedules, meal slots and places, each
//!   implementing [`std::fmt::Display`] as markdown
//! - **Wizard** ([`wizard`]): draft state machine and its async session
//! - **Local State** ([`cache`] over [`store`]): selected schedule with a
//!   24 hour expiry and the cached schedule list
//! - **Collaborators** ([`api`]): service traits and their HTTP client
//! - **Facade** ([`planner`]): [`TripPlanner`] ties the layers together
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::collections::BTreeSet;
//!
//! use mapzip_core::{
//!     models::{LocationPoint, MealSlot},
//!     wizard::LocationSelection,
//!     TripPlannerBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = TripPlannerBuilder::new()
//!     .with_store_path(Some("mapzip.db"))
//!     .build()
//!     .await?;
//!
//! let wizard = planner.new_wizard();
//! wizard.complete_location(LocationSelection::new(
//!     LocationPoint::new("Seoul Station", "", 37.55, 126.97),
//!     LocationPoint::new("Busan Station", "", 35.11, 129.04),
//! ))?;
//! wizard.complete_required(
//!     "Busan trip",
//!     "09:00".parse()?,
//!     vec![MealSlot::meal_at("12:00".parse()?)],
//! )?;
//! let schedule = wizard.complete_optional("", "", BTreeSet::new()).await?;
//! planner.record_submission(&schedule)?;
//! println!("{schedule}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod planner;
pub mod poll;
pub mod store;
pub mod wizard;

// Re-export commonly used types
pub use api::{HttpApi, RecommendService, ReviewService, ScheduleService};
pub use config::ClientConfig;
pub use display::{
    CreateResult, DeleteResult, OperationStatus, PendingReviews, ScheduleSummary, Schedules,
    UpdateResult,
};
pub use error::{MapzipError, Result};
pub use models::{
    ClockTime, Companion, LocationPoint, MealSlot, MealType, PendingReview, Restaurant, Schedule,
};
pub use planner::{TripPlanner, TripPlannerBuilder};
pub use poll::PollPolicy;
pub use wizard::{ScheduleWizard, WizardSession, WizardStep};
