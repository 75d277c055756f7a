//! Schedule model definition and related functionality.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use super::{ClockTime, Companion, LocationPoint, MealSlot, SectionId};

/// A restaurant suggested by the recommend service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Why the recommender picked this place
    #[serde(default)]
    pub ai_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A restaurant the user picked for one recommendation section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedRestaurant {
    pub section_id: String,
    pub restaurant: Restaurant,
}

/// A schedule persisted by the schedule service.
///
/// The client holds read-mostly copies; the identifier is assigned by the
/// server and never changed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Server-assigned identifier
    pub id: String,

    pub title: String,

    pub departure_time: ClockTime,

    /// Arrival time computed by the route calculator, once available
    #[serde(default)]
    pub calculated_arrival_time: Option<ClockTime>,

    pub departure: LocationPoint,

    pub destination: LocationPoint,

    /// Ordered stops between departure and destination
    #[serde(default)]
    pub waypoints: Vec<LocationPoint>,

    #[serde(default)]
    pub meal_slots: Vec<MealSlot>,

    #[serde(default)]
    pub user_note: String,

    #[serde(default)]
    pub purpose: String,

    #[serde(default)]
    pub companions: BTreeSet<Companion>,

    #[serde(default)]
    pub selected_restaurants: Vec<SelectedRestaurant>,
}

impl Schedule {
    /// Whether the backend has finished computing the route.
    pub fn has_arrival_time(&self) -> bool {
        self.calculated_arrival_time.is_some()
    }

    /// Meal slot a recommendation section refers to.
    pub fn slot_for_section(&self, section_id: &str) -> Option<&MealSlot> {
        section_id
            .parse::<SectionId>()
            .ok()
            .and_then(|section| section.resolve(&self.meal_slots))
    }

    /// Records the restaurant picked for a section, replacing any earlier
    /// pick for the same section.
    pub fn select_restaurant(&mut self, section_id: impl Into<String>, restaurant: Restaurant) {
        let section_id = section_id.into();
        match self
            .selected_restaurants
            .iter_mut()
            .find(|s| s.section_id == section_id)
        {
            Some(existing) => existing.restaurant = restaurant,
            None => self.selected_restaurants.push(SelectedRestaurant {
                section_id,
                restaurant,
            }),
        }
    }
}

/// One row of the schedule list.
///
/// The list endpoint only summarizes each schedule, so this carries what a
/// list line shows rather than the full [`Schedule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleListItem {
    pub id: String,

    pub title: String,

    pub departure_time: ClockTime,

    /// Name of the final destination
    #[serde(default)]
    pub destination_name: String,

    #[serde(default)]
    pub total_meal_slots: usize,

    #[serde(default)]
    pub calculated_arrival_time: Option<ClockTime>,
}

impl From<&Schedule> for ScheduleListItem {
    fn from(schedule: &Schedule) -> Self {
        Self {
            id: schedule.id.clone(),
            title: schedule.title.clone(),
            departure_time: schedule.departure_time,
            destination_name: schedule.destination.name.clone(),
            total_meal_slots: schedule.meal_slots.len(),
            calculated_arrival_time: schedule.calculated_arrival_time,
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Departure: {} at {}", self.departure, self.departure_time)?;
        for waypoint in &self.waypoints {
            writeln!(f, "- Via: {waypoint}")?;
        }
        match &self.calculated_arrival_time {
            Some(arrival) => writeln!(f, "- Destination: {} at {arrival}", self.destination)?,
            None => writeln!(f, "- Destination: {} (arrival pending)", self.destination)?,
        }
        if !self.purpose.is_empty() {
            writeln!(f, "- Purpose: {}", self.purpose)?;
        }
        if !self.companions.is_empty() {
            let names: Vec<String> = self.companions.iter().map(ToString::to_string).collect();
            writeln!(f, "- With: {}", names.join(", "))?;
        }

        if !self.user_note.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.user_note)?;
        }

        if self.meal_slots.is_empty() {
            writeln!(f, "\nNo meal slots in this schedule.")?;
        } else {
            writeln!(f, "\n## Meal slots")?;
            writeln!(f)?;
            for (index, slot) in self.meal_slots.iter().enumerate() {
                writeln!(f, "{}. {slot}", index + 1)?;
            }
        }

        Ok(())
    }
}
