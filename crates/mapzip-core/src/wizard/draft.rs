//! Data accumulated across the three wizard steps.

use std::collections::BTreeSet;

use crate::{
    api::{MealSlotPayload, SchedulePayload},
    error::{MapzipError, Result},
    models::{ClockTime, Companion, LocationPoint, MealSlot, Schedule, MIN_SLOT_GAP_MINUTES},
};

/// Points picked on the location step. Only resolved points get here.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationData {
    pub departure: LocationPoint,
    pub destination: LocationPoint,
    pub waypoints: Vec<LocationPoint>,
}

/// Raw input of the location step.
///
/// A `None` entry is a point the user typed but never resolved through
/// search. Unresolved waypoints are dropped; unresolved endpoints block the
/// step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationSelection {
    pub departure: Option<LocationPoint>,
    pub destination: Option<LocationPoint>,
    pub waypoints: Vec<Option<LocationPoint>>,
}

impl LocationSelection {
    pub fn new(departure: LocationPoint, destination: LocationPoint) -> Self {
        Self {
            departure: Some(departure),
            destination: Some(destination),
            waypoints: Vec::new(),
        }
    }

    pub fn via(mut self, waypoint: LocationPoint) -> Self {
        self.waypoints.push(Some(waypoint));
        self
    }
}

impl From<&LocationData> for LocationSelection {
    fn from(data: &LocationData) -> Self {
        Self {
            departure: Some(data.departure.clone()),
            destination: Some(data.destination.clone()),
            waypoints: data.waypoints.iter().cloned().map(Some).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequiredData {
    pub title: String,
    pub departure_time: ClockTime,
    pub meal_slots: Vec<MealSlot>,
}

impl Default for RequiredData {
    /// Empty title, departure at noon and one meal five minutes later.
    fn default() -> Self {
        let departure_time = ClockTime::NOON;
        let first_meal = departure_time
            .checked_add_minutes(MIN_SLOT_GAP_MINUTES)
            .unwrap_or(departure_time);
        Self {
            title: String::new(),
            departure_time,
            meal_slots: vec![MealSlot::meal_at(first_meal)],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionalData {
    pub user_note: String,
    pub purpose: String,
    pub companions: BTreeSet<Companion>,
}

/// Everything the wizard knows so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleDraft {
    /// `None` until the location step has been completed once.
    pub location: Option<LocationData>,
    pub required: RequiredData,
    pub optional: OptionalData,
}

impl ScheduleDraft {
    /// Pre-populates every step from a persisted schedule.
    pub fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            location: Some(LocationData {
                departure: schedule.departure.clone(),
                destination: schedule.destination.clone(),
                waypoints: schedule.waypoints.clone(),
            }),
            required: RequiredData {
                title: schedule.title.clone(),
                departure_time: schedule.departure_time,
                meal_slots: schedule.meal_slots.clone(),
            },
            optional: OptionalData {
                user_note: schedule.user_note.clone(),
                purpose: schedule.purpose.clone(),
                companions: schedule.companions.clone(),
            },
        }
    }

    /// Assembles the request body. The arrival time is never part of it.
    pub fn to_payload(&self) -> Result<SchedulePayload> {
        let location = self.location.as_ref().ok_or_else(|| {
            MapzipError::validation("location").with_reason("departure and destination are not set")
        })?;
        Ok(SchedulePayload {
            title: self.required.title.clone(),
            departure_time: self.required.departure_time,
            meal_slots: self
                .required
                .meal_slots
                .iter()
                .map(MealSlotPayload::from)
                .collect(),
            departure: location.departure.clone(),
            destination: location.destination.clone(),
            waypoints: location.waypoints.clone(),
            user_note: self.optional.user_note.clone(),
            purpose: self.optional.purpose.clone(),
            companions: self.optional.companions.iter().copied().collect(),
        })
    }
}
