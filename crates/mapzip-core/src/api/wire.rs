//! Request and response shapes exchanged with the backend services.
//!
//! Requests are explicit structs serialized in camelCase. Responses are
//! decoded through loose record types first and then converted into the
//! domain models, so that historical variants the backend still emits
//! (JSON-encoded location strings, `"5km"` radii, numeric meal types,
//! Korean 12-hour times) are accepted while anything unusable in a required
//! field rejects the whole record.

use std::collections::BTreeSet;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{MapzipError, Result},
    models::{
        parse_radius, ClockTime, Companion, LocationPoint, MealSlot, MealType, PendingReview,
        Schedule, ScheduleListItem, SelectedRestaurant, DEFAULT_RADIUS_METERS,
    },
};

/// One meal slot as sent to the schedule service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSlotPayload {
    pub meal_type: MealType,
    pub scheduled_time: ClockTime,
    /// Search radius in metres
    pub radius: u32,
}

impl From<&MealSlot> for MealSlotPayload {
    fn from(slot: &MealSlot) -> Self {
        Self {
            meal_type: slot.meal_type,
            scheduled_time: slot.time,
            radius: slot.radius_meters,
        }
    }
}

/// Body shared by create and update requests.
///
/// There is deliberately no arrival time here: the wire bodies below always
/// send it empty because the route calculator owns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePayload {
    pub title: String,
    pub departure_time: ClockTime,
    pub meal_slots: Vec<MealSlotPayload>,
    pub departure: LocationPoint,
    pub destination: LocationPoint,
    pub waypoints: Vec<LocationPoint>,
    pub user_note: String,
    pub purpose: String,
    pub companions: Vec<Companion>,
}

impl SchedulePayload {
    /// The schedule as the client submitted it, under the identifier the
    /// service assigned.
    pub(crate) fn to_schedule(
        &self,
        id: String,
        calculated_arrival_time: Option<ClockTime>,
    ) -> Schedule {
        Schedule {
            id,
            title: self.title.clone(),
            departure_time: self.departure_time,
            calculated_arrival_time,
            departure: self.departure.clone(),
            destination: self.destination.clone(),
            waypoints: self.waypoints.clone(),
            meal_slots: self
                .meal_slots
                .iter()
                .map(|slot| MealSlot::new(slot.meal_type, slot.scheduled_time, slot.radius))
                .collect(),
            user_note: self.user_note.clone(),
            purpose: self.purpose.clone(),
            companions: self.companions.iter().copied().collect(),
            selected_restaurants: Vec::new(),
        }
    }
}

/// What the wizard hands to the schedule service on its final step.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// A brand-new schedule
    Create(SchedulePayload),
    /// Changes to an existing schedule
    Update { id: String, payload: SchedulePayload },
}

impl Submission {
    pub fn payload(&self) -> &SchedulePayload {
        match self {
            Submission::Create(payload) | Submission::Update { payload, .. } => payload,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateBody<'a> {
    #[serde(flatten)]
    pub payload: &'a SchedulePayload,
    pub arrival_time: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateBody<'a> {
    #[serde(flatten)]
    pub payload: &'a SchedulePayload,
    pub arrival_time: &'static str,
    pub schedule_id: &'a str,
}

/// Action requested from the schedule processing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessAction {
    /// Make the schedule the active one and compute its route
    Select,
    /// Recompute the route from the traveller's current position
    Update,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    #[serde(rename = "type")]
    pub action: ProcessAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_time: Option<ClockTime>,
}

impl ProcessRequest {
    pub fn select() -> Self {
        Self {
            action: ProcessAction::Select,
            current_lat: None,
            current_lng: None,
            current_time: None,
        }
    }

    pub fn update(position: Option<(f64, f64)>, current_time: Option<ClockTime>) -> Self {
        Self {
            action: ProcessAction::Update,
            current_lat: position.map(|(lat, _)| lat),
            current_lng: position.map(|(_, lng)| lng),
            current_time,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MealTypeRecord {
    Text(String),
    Number(i64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RadiusRecord {
    Meters(u32),
    Text(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MealSlotRecord {
    meal_type: MealTypeRecord,
    scheduled_time: String,
    #[serde(default)]
    radius: Option<RadiusRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRecord {
    #[serde(default)]
    schedule_id: Value,
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: String,
    departure_time: String,
    #[serde(default)]
    calculated_arrival_time: Option<String>,
    #[serde(default)]
    departure: Value,
    #[serde(default)]
    destination: Value,
    #[serde(default)]
    waypoints: Value,
    #[serde(default)]
    meal_slots: Vec<MealSlotRecord>,
    #[serde(default)]
    user_note: Option<String>,
    #[serde(default)]
    purpose: Option<String>,
    #[serde(default)]
    companions: Value,
    #[serde(default)]
    selected_restaurants: Vec<SelectedRestaurant>,
}

/// Ids arrive as numbers from some services and strings from others.
fn id_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// First non-empty identifier among `scheduleId` and `id`.
fn record_id(schedule_id: Value, id: Value) -> Option<String> {
    [schedule_id, id]
        .into_iter()
        .map(id_text)
        .find(|id| !id.is_empty())
}

/// Arrival is optional; an unreadable value just means "not yet".
fn parse_arrival(raw: Option<String>, schedule_id: &str) -> Option<ClockTime> {
    raw.filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| match raw.parse::<ClockTime>() {
            Ok(time) => Some(time),
            Err(_) => {
                warn!("Ignoring unreadable arrival time '{raw}' on schedule {schedule_id}");
                None
            }
        })
}

fn parse_departure_time(raw: &str) -> Result<ClockTime> {
    raw.parse()
        .map_err(|_| MapzipError::decode(format!("bad departure time '{raw}'")))
}

/// Decodes a value that may be the structure itself or a JSON string
/// containing it.
fn decode_embedded<T: serde::de::DeserializeOwned>(field: &str, value: Value) -> Result<T> {
    let decoded = match value {
        Value::String(encoded) => serde_json::from_str(&encoded),
        Value::Null => {
            return Err(MapzipError::decode(format!("missing required field '{field}'")));
        }
        other => serde_json::from_value(other),
    };
    decoded.map_err(|e| MapzipError::decode(format!("field '{field}': {e}")))
}

impl MealSlotRecord {
    fn into_slot(self) -> Result<MealSlot> {
        let meal_type = match self.meal_type {
            MealTypeRecord::Text(text) => text
                .parse()
                .map_err(|_| MapzipError::decode(format!("unknown meal type '{text}'")))?,
            MealTypeRecord::Number(0) => MealType::Meal,
            MealTypeRecord::Number(1) => MealType::Snack,
            MealTypeRecord::Number(other) => {
                return Err(MapzipError::decode(format!("unknown meal type {other}")));
            }
        };
        let time = self
            .scheduled_time
            .parse()
            .map_err(|_| MapzipError::decode(format!("bad slot time '{}'", self.scheduled_time)))?;
        let radius_meters = match self.radius {
            None => DEFAULT_RADIUS_METERS,
            Some(RadiusRecord::Meters(meters)) => meters,
            Some(RadiusRecord::Text(text)) => parse_radius(&text)
                .ok_or_else(|| MapzipError::decode(format!("bad radius '{text}'")))?,
        };
        Ok(MealSlot::new(meal_type, time, radius_meters))
    }
}

impl ScheduleRecord {
    /// Converts the record, taking the identifier from `known_id` when the
    /// record itself carries none. Detail replies omit it.
    fn into_schedule(self, known_id: Option<&str>) -> Result<Schedule> {
        let id = record_id(self.schedule_id, self.id)
            .or_else(|| known_id.filter(|id| !id.is_empty()).map(str::to_string))
            .ok_or_else(|| MapzipError::decode("schedule record has no identifier"))?;

        let departure_time = parse_departure_time(&self.departure_time)?;
        let calculated_arrival_time = parse_arrival(self.calculated_arrival_time, &id);

        let departure = decode_embedded("departure", self.departure)?;
        let destination = decode_embedded("destination", self.destination)?;
        let waypoints = match self.waypoints {
            Value::Null => Vec::new(),
            value => decode_embedded("waypoints", value)?,
        };

        let meal_slots = self
            .meal_slots
            .into_iter()
            .map(MealSlotRecord::into_slot)
            .collect::<Result<Vec<_>>>()?;

        let companions = decode_companions(&id, self.companions);

        Ok(Schedule {
            id,
            title: self.title,
            departure_time,
            calculated_arrival_time,
            departure,
            destination,
            waypoints,
            meal_slots,
            user_note: self.user_note.unwrap_or_default(),
            purpose: self.purpose.unwrap_or_default(),
            companions,
            selected_restaurants: self.selected_restaurants,
        })
    }
}

fn decode_companions(schedule_id: &str, value: Value) -> BTreeSet<Companion> {
    let labels: Vec<String> = match value {
        Value::Null => return BTreeSet::new(),
        Value::String(encoded) => serde_json::from_str(&encoded).unwrap_or_default(),
        other => serde_json::from_value(other).unwrap_or_default(),
    };
    labels
        .iter()
        .filter_map(|label| match label.parse::<Companion>() {
            Ok(companion) => Some(companion),
            Err(_) => {
                warn!("Ignoring unknown companion '{label}' on schedule {schedule_id}");
                None
            }
        })
        .collect()
}

fn wraps_schedule(body: &Value) -> bool {
    body.get("schedule").is_some_and(Value::is_object)
}

/// Decodes one schedule from a response body that is either the record
/// itself or wrapped as `{"schedule": {...}}`. `known_id` is the identifier
/// the caller asked for, used when the record does not repeat it.
pub(crate) fn decode_schedule(body: Value, known_id: Option<&str>) -> Result<Schedule> {
    let record = match body {
        Value::Object(mut map) if map.get("schedule").is_some_and(Value::is_object) => map
            .remove("schedule")
            .unwrap_or(Value::Null),
        other => other,
    };
    let record: ScheduleRecord = serde_json::from_value(record)
        .map_err(|e| MapzipError::decode(format!("schedule record: {e}")))?;
    record.into_schedule(known_id)
}

/// Decodes `{"schedule": null | {...}}`.
pub(crate) fn decode_optional_schedule(body: Value) -> Result<Option<Schedule>> {
    match body.get("schedule") {
        None | Some(Value::Null) => Ok(None),
        Some(_) => decode_schedule(body, None).map(Some),
    }
}

/// Acknowledgement returned by create: the new identifier and, when the
/// route is already known, the arrival time.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveAck {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    schedule_id: Value,
    #[serde(default)]
    calculated_arrival_time: Option<String>,
}

/// Decodes the reply to a create or update.
///
/// The service answers create with an acknowledgement and update with the
/// stored detail, which may lack the identifier. A full record is decoded
/// as such. Otherwise the schedule is rebuilt from what was submitted,
/// under the acknowledged identifier or `known_id`.
pub(crate) fn decode_saved_schedule(
    body: Value,
    payload: &SchedulePayload,
    known_id: Option<&str>,
) -> Result<Schedule> {
    if wraps_schedule(&body) || body.get("departure").is_some() {
        return decode_schedule(body, known_id);
    }

    let ack: SaveAck = match body {
        Value::Null => SaveAck::default(),
        other => serde_json::from_value(other)
            .map_err(|e| MapzipError::decode(format!("save reply: {e}")))?,
    };
    if ack.success == Some(false) {
        return Err(MapzipError::Api {
            status: 200,
            message: ack
                .message
                .unwrap_or_else(|| "schedule was not saved".to_string()),
        });
    }

    let id = record_id(ack.schedule_id, Value::Null)
        .or_else(|| known_id.filter(|id| !id.is_empty()).map(str::to_string))
        .ok_or_else(|| MapzipError::decode("save reply has no schedule identifier"))?;
    let arrival = parse_arrival(ack.calculated_arrival_time, &id);
    Ok(payload.to_schedule(id, arrival))
}

/// One list entry: either the summary the list endpoint sends or a full
/// record.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleSummaryRecord {
    #[serde(default)]
    schedule_id: Value,
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: String,
    departure_time: String,
    #[serde(default)]
    destination_name: Option<String>,
    #[serde(default)]
    destination: Value,
    #[serde(default)]
    total_meal_slots: Option<usize>,
    #[serde(default)]
    meal_slots: Vec<Value>,
    #[serde(default)]
    calculated_arrival_time: Option<String>,
}

impl ScheduleSummaryRecord {
    fn into_item(self) -> Result<ScheduleListItem> {
        let id = record_id(self.schedule_id, self.id)
            .ok_or_else(|| MapzipError::decode("schedule summary has no identifier"))?;
        let departure_time = parse_departure_time(&self.departure_time)?;
        let destination_name = match self.destination_name {
            Some(name) => name,
            None => match self.destination {
                Value::Null => String::new(),
                value => decode_embedded::<LocationPoint>("destination", value)?.name,
            },
        };
        let calculated_arrival_time = parse_arrival(self.calculated_arrival_time, &id);
        Ok(ScheduleListItem {
            id,
            title: self.title,
            departure_time,
            destination_name,
            total_meal_slots: self.total_meal_slots.unwrap_or(self.meal_slots.len()),
            calculated_arrival_time,
        })
    }
}

fn decode_list_item(record: Value) -> Result<ScheduleListItem> {
    serde_json::from_value::<ScheduleSummaryRecord>(record)
        .map_err(|e| MapzipError::decode(format!("schedule summary: {e}")))?
        .into_item()
}

/// Decodes `{"schedules": [...]}`, dropping records that fail to decode.
pub(crate) fn decode_schedule_list(body: Value) -> Result<Vec<ScheduleListItem>> {
    let records = match body {
        Value::Object(mut map) => match map.remove("schedules") {
            Some(Value::Array(records)) => records,
            None | Some(Value::Null) => Vec::new(),
            Some(_) => return Err(MapzipError::decode("'schedules' is not a list")),
        },
        Value::Array(records) => records,
        _ => return Err(MapzipError::decode("unexpected schedule list body")),
    };

    Ok(records
        .into_iter()
        .filter_map(|record| match decode_list_item(record) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Dropping undecodable schedule record: {e}");
                None
            }
        })
        .collect())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PendingReviewRecord {
    #[serde(default)]
    id: Value,
    restaurant_id: Value,
    #[serde(default)]
    place_name: String,
    #[serde(default)]
    address_name: String,
    scheduled_time: String,
    #[serde(default)]
    is_completed: bool,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<PendingReviewRecord> for PendingReview {
    fn from(record: PendingReviewRecord) -> Self {
        Self {
            id: id_text(record.id),
            restaurant_id: id_text(record.restaurant_id),
            place_name: record.place_name,
            address_name: record.address_name,
            scheduled_time: record.scheduled_time,
            is_completed: record.is_completed,
            // Server-local timestamps without an offset are not worth failing on.
            created_at: record.created_at.and_then(|raw| raw.parse().ok()),
        }
    }
}

/// Decodes `{"data": [...]}`, dropping entries that fail to decode.
pub(crate) fn decode_pending_reviews(body: Value) -> Result<Vec<PendingReview>> {
    let entries = match body.get("data") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries.clone(),
        Some(_) => return Err(MapzipError::decode("'data' is not a list")),
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<PendingReviewRecord>(entry) {
            Ok(record) => Some(record.into()),
            Err(e) => {
                warn!("Dropping undecodable pending review: {e}");
                None
            }
        })
        .collect())
}

/// Decodes `{"data": {...}}` for a single pending review.
pub(crate) fn decode_pending_review(body: Value) -> Result<PendingReview> {
    let entry = match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value::<PendingReviewRecord>(entry)
        .map(PendingReview::from)
        .map_err(|e| MapzipError::decode(format!("pending review: {e}")))
}

/// Error body returned by the gateway and services.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
