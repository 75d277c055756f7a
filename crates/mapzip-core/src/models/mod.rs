//! Data models for schedules, meal slots and the places they connect.
//!
//! Each model implements [`std::fmt::Display`] as markdown so the CLI can
//! render it directly; list and result wrappers live in [`crate::display`].
//!
//! # Examples
//!
//! ```rust
//! use mapzip_core::models::{ClockTime, MealSlot, MealType};
//!
//! let time: ClockTime = "12:30".parse().unwrap();
//! let slot = MealSlot::new(MealType::Snack, time, 10_000);
//! assert_eq!(slot.to_string(), "Snack at 12:30 within 10km");
//! ```

mod clock;
mod companion;
mod location;
mod meal;
mod review;
mod schedule;
mod timeline;


pub use clock::ClockTime;
pub use companion::Companion;
pub use location::LocationPoint;
pub use meal::{
    parse_radius, MealSlot, MealType, SectionId, DEFAULT_RADIUS_METERS, MIN_SLOT_GAP_MINUTES,
    RADIUS_OPTIONS_METERS,
};
pub use review::PendingReview;
pub use schedule::{Restaurant, Schedule, ScheduleListItem, SelectedRestaurant};
pub use timeline::{Timeline, TimelineItem, TimelineKind};
