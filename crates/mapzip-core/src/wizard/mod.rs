//! Schedule creation and editing wizard.
//!
//! [`ScheduleWizard`] is the synchronous step machine
//! (`Location → Required → Optional → Submitted`) that owns the draft.
//! [`WizardSession`] wraps it for async callers and performs the single
//! create-or-update call when the optional step completes.
//!
//! # Examples
//!
//! ```rust
//! use mapzip_core::models::{ClockTime, LocationPoint, MealSlot};
//! use mapzip_core::wizard::{LocationSelection, ScheduleWizard, WizardStep};
//!
//! let mut wizard = ScheduleWizard::enter_location(None);
//! wizard
//!     .complete_location(LocationSelection::new(
//!         LocationPoint::new("Seoul Station", "", 37.55, 126.97),
//!         LocationPoint::new("Busan Station", "", 35.11, 129.04),
//!     ))
//!     .unwrap();
//!
//! let departure: ClockTime = "09:00".parse().unwrap();
//! let too_early = vec![MealSlot::meal_at("09:03".parse().unwrap())];
//! let err = wizard.complete_required("Trip", departure, too_early).unwrap_err();
//! assert!(err.to_string().contains("departure time + 5 minutes"));
//! assert_eq!(wizard.step(), WizardStep::Required);
//! ```

mod draft;
mod machine;
mod session;
mod validation;

#[cfg(test)]
mod tests;

pub use draft::{LocationData, LocationSelection, OptionalData, RequiredData, ScheduleDraft};
pub use machine::{ScheduleWizard, WizardStep};
pub use session::WizardSession;
pub use validation::{min_time_for_slot, validate_meal_slots};
