//! Display wrappers for collections and operation results.
//!
//! Models format themselves as markdown; the wrappers here add the list
//! structure, empty-collection messages and success lines the CLI prints.

use std::fmt;

use crate::models::{PendingReview, Schedule, ScheduleListItem};

/// Newtype wrapper for displaying a schedule list.
///
/// # Examples
///
/// ```rust
/// use mapzip_core::display::Schedules;
///
/// assert_eq!(Schedules(Vec::new()).to_string(), "No schedules found.\n");
/// ```
pub struct Schedules(pub Vec<ScheduleListItem>);

impl Schedules {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Schedules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No schedules found.");
        }
        for schedule in &self.0 {
            write!(
                f,
                "- **{}** (ID: {}): to {}, departs {}",
                schedule.title, schedule.id, schedule.destination_name, schedule.departure_time
            )?;
            match schedule.total_meal_slots {
                0 => {}
                1 => write!(f, ", 1 meal stop")?,
                n => write!(f, ", {n} meal stops")?,
            }
            if let Some(arrival) = schedule.calculated_arrival_time {
                write!(f, ", arrives {arrival}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A schedule together with its timeline.
pub struct ScheduleSummary<'a>(pub &'a Schedule);

impl fmt::Display for ScheduleSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        writeln!(f)?;
        write!(f, "{}", self.0.timeline())
    }
}

/// Wrapper type for displaying the result of create operations.
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<Schedule> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created schedule with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of update operations.
pub struct UpdateResult<T> {
    pub resource: T,
}

impl<T> UpdateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for UpdateResult<Schedule> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated schedule with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of delete operations.
pub struct DeleteResult {
    pub resource: &'static str,
    pub id: String,
}

impl DeleteResult {
    pub fn new(resource: &'static str, id: impl Into<String>) -> Self {
        Self {
            resource,
            id: id.into(),
        }
    }
}

impl fmt::Display for DeleteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deleted {} {}", self.resource, self.id)
    }
}

pub struct PendingReviews(pub Vec<PendingReview>);

impl fmt::Display for PendingReviews {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No pending reviews.");
        }
        writeln!(f, "## Pending reviews")?;
        writeln!(f)?;
        for review in &self.0 {
            write!(f, "{review}")?;
        }
        Ok(())
    }
}

/// One-line status message for operations without a resource to show.
pub struct OperationStatus(pub String);

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.0)
    }
}
