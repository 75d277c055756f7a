//! Time-ordered view of a schedule for the summary screen.

use std::fmt;

use super::{ClockTime, MealType, Schedule};

/// What a timeline entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineKind {
    Departure,
    Waypoint,
    Restaurant(MealType),
    Arrival,
}

impl TimelineKind {
    fn label(&self) -> &'static str {
        match self {
            TimelineKind::Departure => "Depart",
            TimelineKind::Waypoint => "Via",
            TimelineKind::Restaurant(MealType::Meal) => "Meal",
            TimelineKind::Restaurant(MealType::Snack) => "Snack",
            TimelineKind::Arrival => "Arrive",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineItem {
    pub kind: TimelineKind,
    /// `None` when the time is not known on the client
    pub time: Option<ClockTime>,
    pub title: String,
    pub detail: Option<String>,
}

/// Ordered list of timeline entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline(pub Vec<TimelineItem>);

impl Timeline {
    pub fn items(&self) -> &[TimelineItem] {
        &self.0
    }
}

impl Schedule {
    /// Builds the summary timeline: departure, waypoints, picked restaurants
    /// ordered by their slot time, then the destination.
    ///
    /// Restaurants whose section no longer matches a slot are listed after
    /// the timed ones without a time.
    pub fn timeline(&self) -> Timeline {
        let mut items = vec![TimelineItem {
            kind: TimelineKind::Departure,
            time: Some(self.departure_time),
            title: self.departure.name.clone(),
            detail: None,
        }];

        items.extend(self.waypoints.iter().map(|waypoint| TimelineItem {
            kind: TimelineKind::Waypoint,
            time: None,
            title: waypoint.name.clone(),
            detail: None,
        }));

        let mut restaurants: Vec<TimelineItem> = self
            .selected_restaurants
            .iter()
            .map(|selected| {
                let slot = self.slot_for_section(&selected.section_id);
                let meal_type = slot.map_or_else(
                    || {
                        if selected.section_id.starts_with("snack") {
                            MealType::Snack
                        } else {
                            MealType::Meal
                        }
                    },
                    |s| s.meal_type,
                );
                let detail = (!selected.restaurant.description.is_empty())
                    .then(|| selected.restaurant.description.clone());
                TimelineItem {
                    kind: TimelineKind::Restaurant(meal_type),
                    time: slot.map(|s| s.time),
                    title: selected.restaurant.name.clone(),
                    detail,
                }
            })
            .collect();
        // `None` sorts first for Option, so order unknown times last explicitly.
        restaurants.sort_by_key(|item| (item.time.is_none(), item.time));
        items.extend(restaurants);

        items.push(TimelineItem {
            kind: TimelineKind::Arrival,
            time: self.calculated_arrival_time,
            title: self.destination.name.clone(),
            detail: None,
        });

        Timeline(items)
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Timeline")?;
        writeln!(f)?;
        for item in &self.0 {
            let time = item
                .time
                .map_or_else(|| "--:--".to_string(), |t| t.to_string());
            write!(f, "- {time} {}: {}", item.kind.label(), item.title)?;
            if let Some(detail) = &item.detail {
                write!(f, " ({detail})")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
