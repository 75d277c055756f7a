mod common;

use std::collections::BTreeSet;

use jiff::SignedDuration;
use mapzip_core::{
    cache::{SCHEDULE_LIST_KEY, SCHEDULE_SELECTED_FLAG_KEY, SELECTED_SCHEDULE_KEY},
    models::{Companion, LocationPoint, MealSlot, MealType},
    store::{KeyValueStore, SqliteStore},
    wizard::{LocationSelection, WizardStep},
    MapzipError,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use common::{
    create_ack_json, create_test_planner, detail_json, manual_clock, planner_with_clock,
    process_ack_json, summary_json,
};

#[tokio::test]
async fn test_wizard_creates_schedule_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/schedule"))
        .and(body_partial_json(json!({
            "title": "Busan trip",
            "departureTime": "09:00",
            "arrivalTime": "",
            "mealSlots": [{"mealType": "MEAL", "scheduledTime": "09:10", "radius": 5000}],
            "waypoints": [{"name": "Daejeon"}],
            "companions": ["부모님"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_ack_json(42, "")))
        .expect(1)
        .mount(&server)
        .await;

    let (_temp_dir, planner) = create_test_planner(&server).await;
    let session = planner.new_wizard();
    session
        .complete_location(
            LocationSelection::new(
                LocationPoint::new("Seoul Station", "", 37.5547, 126.9706),
                LocationPoint::new("Busan Station", "", 35.1151, 129.0422),
            )
            .via(LocationPoint::new("Daejeon", "", 36.3504, 127.3845)),
        )
        .unwrap();

    // Back and forward again must not reach the server.
    session.back().unwrap();
    assert_eq!(session.step(), WizardStep::Location);
    let selection = LocationSelection::from(session.draft().location.as_ref().unwrap());
    session.complete_location(selection).unwrap();

    session
        .complete_required(
            "Busan trip",
            "09:00".parse().unwrap(),
            vec![MealSlot::new(MealType::Meal, "09:10".parse().unwrap(), 5000)],
        )
        .unwrap();
    let saved = session
        .complete_optional("", "", BTreeSet::from([Companion::Parents]))
        .await
        .unwrap();
    planner.record_submission(&saved).unwrap();

    assert_eq!(saved.id, "42");
    assert_eq!(saved.title, "Busan trip");
    assert!(!saved.has_arrival_time());
    assert_eq!(session.step(), WizardStep::Submitted);

    let cached = planner.cached_schedules().unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id, "42");
    assert_eq!(cached[0].destination_name, "Busan Station");
    assert_eq!(cached[0].total_meal_slots, 1);
}

#[tokio::test]
async fn test_edit_wizard_keeps_requested_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schedule/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_json("")))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/schedule/42"))
        .and(body_partial_json(json!({"scheduleId": "42", "title": "Renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_json("")))
        .expect(1)
        .mount(&server)
        .await;

    let (_temp_dir, planner) = create_test_planner(&server).await;
    let session = planner.edit_wizard("42").await.unwrap();
    let draft = session.draft();
    assert_eq!(draft.required.meal_slots[1].radius_meters, 10_000);
    let selection = LocationSelection::from(draft.location.as_ref().unwrap());
    session.complete_location(selection).unwrap();
    session
        .complete_required("Renamed", draft.required.departure_time, draft.required.meal_slots)
        .unwrap();
    let saved = session
        .complete_optional("", "", BTreeSet::new())
        .await
        .unwrap();

    assert_eq!(saved.id, "42");
    assert_eq!(session.step(), WizardStep::Submitted);
}

#[tokio::test]
async fn test_rejected_slot_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let (_temp_dir, planner) = create_test_planner(&server).await;
    let session = planner.new_wizard();
    session
        .complete_location(LocationSelection::new(
            LocationPoint::new("A", "", 37.5, 127.0),
            LocationPoint::new("B", "", 35.1, 129.0),
        ))
        .unwrap();

    let err = session
        .complete_required(
            "Trip",
            "09:00".parse().unwrap(),
            vec![MealSlot::meal_at("09:03".parse().unwrap())],
        )
        .unwrap_err();
    assert!(err.to_string().contains("departure time + 5 minutes"));
    assert_eq!(session.step(), WizardStep::Required);
}

#[tokio::test]
async fn test_select_polls_until_arrival() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/schedule/42"))
        .and(body_partial_json(json!({"type": "SELECT"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(process_ack_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/schedule/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_json("")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/schedule/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_json("오후 01:45")))
        .mount(&server)
        .await;

    let (_temp_dir, planner) = create_test_planner(&server).await;
    let selected = planner
        .select_schedule("42", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        selected.calculated_arrival_time.unwrap().to_string(),
        "13:45"
    );

    let active = planner.active_schedule().await.unwrap().unwrap();
    assert_eq!(active.id, "42");
}

#[tokio::test]
async fn test_select_times_out_without_caching() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/schedule/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(process_ack_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/schedule/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_json("")))
        .expect(3)
        .mount(&server)
        .await;

    let (_temp_dir, planner) = create_test_planner(&server).await;
    let err = planner
        .select_schedule("42", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, MapzipError::Timeout { attempts: 3 }));
    assert!(!planner.local_state().selected.is_selected().unwrap());
}

#[tokio::test]
async fn test_expired_token_clears_persisted_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schedules": [summary_json(1, "Busan trip"), summary_json(2, "Gangneung")]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/schedule"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "TOKEN_EXPIRED"})))
        .mount(&server)
        .await;

    let (temp_dir, planner) = create_test_planner(&server).await;
    let listed = planner.list_schedules().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].id, "2");
    assert_eq!(planner.cached_schedules().unwrap(), listed);

    let err = planner.list_schedules().await.unwrap_err();
    match err {
        MapzipError::Authentication { code } => assert_eq!(code, "TOKEN_EXPIRED"),
        other => panic!("unexpected error: {other:?}"),
    }
    drop(planner);

    let store = SqliteStore::open(temp_dir.path().join("test.db")).unwrap();
    for key in [SCHEDULE_LIST_KEY, SELECTED_SCHEDULE_KEY, SCHEDULE_SELECTED_FLAG_KEY] {
        assert_eq!(store.get(key).unwrap(), None, "{key} should be cleared");
    }
}

#[tokio::test]
async fn test_selection_expires_after_a_day() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/schedule/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(process_ack_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/schedule/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_json("12:10")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/recommend/summary/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"schedule": null})))
        .expect(1)
        .mount(&server)
        .await;

    let (temp_dir, _planner) = create_test_planner(&server).await;
    let clock = manual_clock();
    let planner = planner_with_clock(&server, &temp_dir, clock.clone()).await;
    planner
        .select_schedule("7", &CancellationToken::new())
        .await
        .unwrap();

    clock.advance(SignedDuration::from_hours(24) - SignedDuration::from_secs(1));
    assert!(planner.active_schedule().await.unwrap().is_some());

    clock.advance(SignedDuration::from_secs(2));
    assert_eq!(
        planner.local_state().selected.get().unwrap(),
        None,
        "expired entry must not be served"
    );
    assert_eq!(planner.active_schedule().await.unwrap(), None);
    assert!(!planner.local_state().selected.is_selected().unwrap());
}

#[tokio::test]
async fn test_delete_conflict_and_pending_reviews() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/schedule/9"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "in use"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/review/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"id": 1, "restaurantId": "r-1", "placeName": "Haeundae Gukbap",
             "addressName": "Busan", "scheduledTime": "12:30", "isCompleted": false}
        ]})))
        .mount(&server)
        .await;

    let (_temp_dir, planner) = create_test_planner(&server).await;
    let err = planner.delete_schedule("9").await.unwrap_err();
    assert!(matches!(err, MapzipError::Conflict { .. }));

    let reviews = planner.pending_reviews().await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].place_name, "Haeundae Gukbap");
}
