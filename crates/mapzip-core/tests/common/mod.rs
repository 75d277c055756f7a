#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use jiff::Timestamp;
use mapzip_core::{
    store::{ManualClock, SqliteStore},
    PollPolicy, TripPlanner, TripPlannerBuilder,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

/// Polling fast enough for real-time tests.
pub const FAST_POLL: PollPolicy = PollPolicy {
    attempts: 3,
    interval: Duration::from_millis(10),
};

/// Helper function to create a test planner against a mock gateway
pub async fn create_test_planner(server: &MockServer) -> (TempDir, TripPlanner) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store_path = temp_dir.path().join("test.db");
    let planner = TripPlannerBuilder::new()
        .with_base_url(server.uri())
        .with_store_path(Some(&store_path))
        .with_poll_policy(FAST_POLL)
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}

/// Planner over an existing store file with a controllable clock.
pub async fn planner_with_clock(
    server: &MockServer,
    temp_dir: &TempDir,
    clock: Arc<ManualClock>,
) -> TripPlanner {
    let store = SqliteStore::open(temp_dir.path().join("test.db")).expect("Failed to open store");
    TripPlannerBuilder::new()
        .with_base_url(server.uri())
        .with_store(Arc::new(store))
        .with_clock(clock)
        .with_poll_policy(FAST_POLL)
        .build()
        .await
        .expect("Failed to create planner")
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Timestamp::from_second(1_754_000_000).expect("valid timestamp"),
    ))
}

/// Acknowledgement the schedule service sends after a create.
pub fn create_ack_json(id: u64, arrival: &str) -> Value {
    json!({
        "success": true,
        "message": "Schedule created successfully",
        "scheduleId": id,
        "calculatedArrivalTime": arrival
    })
}

/// Detail reply for one schedule. The service does not repeat the
/// identifier; the arrival time appears once the route is calculated.
pub fn detail_json(arrival: &str) -> Value {
    let mut schedule = json!({
        "title": "Busan trip",
        "departureTime": "09:00",
        "departure": {"name": "Seoul Station", "address": "Yongsan-gu", "lat": 37.5547, "lng": 126.9706},
        "destination": {"name": "Busan Station", "address": "Dong-gu", "lat": 35.1151, "lng": 129.0422},
        "waypoints": [],
        "mealSlots": [
            {"mealType": "MEAL", "scheduledTime": "12:00", "radius": "5km"},
            {"mealType": "SNACK", "scheduledTime": "15:30", "radius": "10km"}
        ],
        "purpose": "",
        "companions": ["혼자"]
    });
    if !arrival.is_empty() {
        schedule["calculatedArrivalTime"] = json!(arrival);
    }
    json!({ "schedule": schedule })
}

/// One entry of the schedule list reply.
pub fn summary_json(id: u64, title: &str) -> Value {
    json!({
        "scheduleId": id,
        "title": title,
        "departureTime": "09:00",
        "destinationName": "Busan Station",
        "totalMealSlots": 2
    })
}

/// Reply to a select or route update request.
pub fn process_ack_json() -> Value {
    json!({"success": true, "message": "Schedule processed"})
}
