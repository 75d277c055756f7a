//! Meal slots: the eating windows a schedule asks recommendations for.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::ClockTime;
use crate::error::MapzipError;

/// Search radius used when a slot is added without an explicit choice.
pub const DEFAULT_RADIUS_METERS: u32 = 5000;

/// Radius choices offered by the required-information step.
pub const RADIUS_OPTIONS_METERS: [u32; 3] = [5000, 10000, 20000];

/// Minimum gap between departure and the first slot, and between slots.
pub const MIN_SLOT_GAP_MINUTES: i64 = 5;

/// Parses a search radius written as `"5km"`, `"500m"` or plain metres
/// (`"5000"`). Case and surrounding whitespace are ignored.
///
/// ```rust
/// use mapzip_core::models::parse_radius;
///
/// assert_eq!(parse_radius("10km"), Some(10_000));
/// assert_eq!(parse_radius("750m"), Some(750));
/// assert_eq!(parse_radius("far"), None);
/// ```
pub fn parse_radius(text: &str) -> Option<u32> {
    let text = text.trim().to_lowercase();
    if let Some(km) = text.strip_suffix("km") {
        return km.trim().parse::<u32>().ok()?.checked_mul(1000);
    }
    text.strip_suffix('m')
        .unwrap_or(&text)
        .trim()
        .parse()
        .ok()
}

/// Type-safe enumeration of slot kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MealType {
    /// A full meal
    #[default]
    Meal,
    /// A snack or coffee stop
    Snack,
}

impl MealType {
    /// Wire representation expected by the schedule service.
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Meal => "MEAL",
            MealType::Snack => "SNACK",
        }
    }

    /// Prefix used by recommendation section ids (`meal-1`, `snack-2`).
    pub fn section_prefix(&self) -> &'static str {
        match self {
            MealType::Meal => "meal",
            MealType::Snack => "snack",
        }
    }
}

impl FromStr for MealType {
    type Err = MapzipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "meal" | "식사" | "0" => Ok(MealType::Meal),
            "snack" | "간식" | "1" => Ok(MealType::Snack),
            _ => Err(MapzipError::validation("mealType")
                .with_reason(format!("Invalid meal type: {s}"))),
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealType::Meal => write!(f, "Meal"),
            MealType::Snack => write!(f, "Snack"),
        }
    }
}

/// One target eating window within a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSlot {
    pub meal_type: MealType,
    pub time: ClockTime,
    pub radius_meters: u32,
}

impl MealSlot {
    pub fn new(meal_type: MealType, time: ClockTime, radius_meters: u32) -> Self {
        Self {
            meal_type,
            time,
            radius_meters,
        }
    }

    /// A default meal at the given time with the default radius.
    pub fn meal_at(time: ClockTime) -> Self {
        Self::new(MealType::Meal, time, DEFAULT_RADIUS_METERS)
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let radius = self.radius_meters;
        if radius % 1000 == 0 {
            write!(f, "{} at {} within {}km", self.meal_type, self.time, radius / 1000)
        } else {
            write!(f, "{} at {} within {}m", self.meal_type, self.time, radius)
        }
    }
}

/// Identifies the N-th slot of a given type, as used by recommendation
/// sections (`meal-1` is the first meal, `snack-1` the first snack).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId {
    pub meal_type: MealType,
    /// 1-based position among slots of the same type
    pub ordinal: u32,
}

impl SectionId {
    /// Section id of the slot at `index` within `slots`.
    pub fn for_slot(slots: &[MealSlot], index: usize) -> Option<Self> {
        let slot = slots.get(index)?;
        let ordinal = slots[..=index]
            .iter()
            .filter(|s| s.meal_type == slot.meal_type)
            .count() as u32;
        Some(Self {
            meal_type: slot.meal_type,
            ordinal,
        })
    }

    /// Finds the slot this section refers to.
    pub fn resolve<'a>(&self, slots: &'a [MealSlot]) -> Option<&'a MealSlot> {
        if self.ordinal == 0 {
            return None;
        }
        slots
            .iter()
            .filter(|s| s.meal_type == self.meal_type)
            .nth(self.ordinal as usize - 1)
    }
}

impl FromStr for SectionId {
    type Err = MapzipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || MapzipError::validation("sectionId").with_reason(format!("Invalid section id: {s}"));
        let (prefix, ordinal) = s.split_once('-').ok_or_else(invalid)?;
        let meal_type = match prefix {
            "meal" => MealType::Meal,
            "snack" => MealType::Snack,
            _ => return Err(invalid()),
        };
        let ordinal: u32 = ordinal.parse().map_err(|_| invalid())?;
        if ordinal == 0 {
            return Err(invalid());
        }
        Ok(Self { meal_type, ordinal })
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.meal_type.section_prefix(), self.ordinal)
    }
}
