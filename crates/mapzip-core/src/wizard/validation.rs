//! Input rules for the wizard steps.

use crate::{
    error::{MapzipError, Result},
    models::{ClockTime, MealSlot, MIN_SLOT_GAP_MINUTES},
};

use super::draft::{LocationData, LocationSelection};

/// Earliest allowed time for the slot at `index`.
///
/// The first slot is bounded by the departure time, every later one by the
/// slot before it; both plus [`MIN_SLOT_GAP_MINUTES`]. Returns `None` when
/// the bound falls past midnight, which makes the slot impossible.
pub fn min_time_for_slot(
    departure_time: ClockTime,
    slots: &[MealSlot],
    index: usize,
) -> Option<ClockTime> {
    let anchor = match index {
        0 => departure_time,
        i => slots.get(i - 1)?.time,
    };
    anchor.checked_add_minutes(MIN_SLOT_GAP_MINUTES)
}

fn bound_description(index: usize) -> String {
    let anchor = if index == 0 {
        "departure time"
    } else {
        "previous meal time"
    };
    format!("{anchor} + {MIN_SLOT_GAP_MINUTES} minutes")
}

/// Checks one slot against the bound computed from the slots before it.
pub fn validate_slot(
    departure_time: ClockTime,
    slots: &[MealSlot],
    index: usize,
    slot: &MealSlot,
) -> Result<()> {
    let field = format!("mealSlots[{index}]");
    if slot.radius_meters == 0 {
        return Err(MapzipError::validation(field).with_reason("search radius must be positive"));
    }

    let Some(min_time) = min_time_for_slot(departure_time, slots, index) else {
        return Err(MapzipError::validation(field).with_reason(format!(
            "{} falls after midnight, no meal can be scheduled here",
            bound_description(index)
        )));
    };
    if slot.time < min_time {
        return Err(MapzipError::validation(field).with_reason(format!(
            "{} {} at {} must be at or after {} ({})",
            slot.meal_type,
            index + 1,
            slot.time,
            min_time,
            bound_description(index)
        )));
    }
    Ok(())
}

/// Checks every slot in order. The first violation wins.
pub fn validate_meal_slots(departure_time: ClockTime, slots: &[MealSlot]) -> Result<()> {
    slots
        .iter()
        .enumerate()
        .try_for_each(|(index, slot)| validate_slot(departure_time, slots, index, slot))
}

pub fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(MapzipError::validation("title").with_reason("must not be empty"));
    }
    Ok(title.to_string())
}

/// Resolves the location step input, dropping unresolved waypoints.
pub fn resolve_locations(selection: LocationSelection) -> Result<LocationData> {
    let departure = selection.departure.ok_or_else(|| {
        MapzipError::validation("departure").with_reason("pick a departure from the search results")
    })?;
    let destination = selection.destination.ok_or_else(|| {
        MapzipError::validation("destination")
            .with_reason("pick a destination from the search results")
    })?;

    departure.validate("departure")?;
    destination.validate("destination")?;
    let waypoints = selection.waypoints.into_iter().flatten().collect::<Vec<_>>();
    for (index, waypoint) in waypoints.iter().enumerate() {
        waypoint.validate(&format!("waypoints[{index}]"))?;
    }

    Ok(LocationData {
        departure,
        destination,
        waypoints,
    })
}
