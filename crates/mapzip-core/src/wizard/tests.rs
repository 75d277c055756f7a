use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use super::*;
use crate::{
    api::{ProcessRequest, SchedulePayload, ScheduleService},
    error::{MapzipError, Result},
    models::{
        ClockTime, Companion, LocationPoint, MealSlot, MealType, Schedule, ScheduleListItem,
    },
};

fn t(s: &str) -> ClockTime {
    s.parse().unwrap()
}

fn seoul() -> LocationPoint {
    LocationPoint::new("Seoul Station", "Yongsan-gu", 37.5547, 126.9706)
}

fn busan() -> LocationPoint {
    LocationPoint::new("Busan Station", "Dong-gu", 35.1151, 129.0422)
}

fn daejeon() -> LocationPoint {
    LocationPoint::new("Daejeon", "", 36.3504, 127.3845)
}

fn at_required() -> ScheduleWizard {
    let mut wizard = ScheduleWizard::enter_location(None);
    wizard
        .complete_location(LocationSelection::new(seoul(), busan()))
        .unwrap();
    wizard
}

fn at_optional() -> ScheduleWizard {
    let mut wizard = at_required();
    wizard
        .complete_required("Busan trip", t("09:00"), vec![MealSlot::meal_at(t("09:10"))])
        .unwrap();
    wizard
}

fn existing_schedule() -> Schedule {
    Schedule {
        id: "sch-7".to_string(),
        title: "Weekend".to_string(),
        departure_time: t("08:00"),
        calculated_arrival_time: Some(t("13:00")),
        departure: seoul(),
        destination: busan(),
        waypoints: vec![daejeon()],
        meal_slots: vec![
            MealSlot::meal_at(t("10:00")),
            MealSlot::new(MealType::Snack, t("11:30"), 10_000),
        ],
        user_note: "window seat".to_string(),
        purpose: "family".to_string(),
        companions: BTreeSet::from([Companion::Parents]),
        selected_restaurants: Vec::new(),
    }
}

#[derive(Default)]
struct FakeScheduleService {
    creates: AtomicUsize,
    updates: AtomicUsize,
    delay: Option<Duration>,
    hang: bool,
    fail: bool,
    payloads: Mutex<Vec<SchedulePayload>>,
}

impl FakeScheduleService {
    fn calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst) + self.updates.load(Ordering::SeqCst)
    }

    async fn respond(&self, id: &str, payload: &SchedulePayload) -> Result<Schedule> {
        self.payloads.lock().unwrap().push(payload.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(MapzipError::Api {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(payload.to_schedule(id.to_string(), None))
    }
}

#[async_trait]
impl ScheduleService for FakeScheduleService {
    async fn list_schedules(&self) -> Result<Vec<ScheduleListItem>> {
        Ok(Vec::new())
    }

    async fn get_schedule(&self, id: &str) -> Result<Schedule> {
        Err(MapzipError::NotFound { id: id.to_string() })
    }

    async fn create_schedule(&self, payload: &SchedulePayload) -> Result<Schedule> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.respond("new-1", payload).await
    }

    async fn update_schedule(&self, id: &str, payload: &SchedulePayload) -> Result<Schedule> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.respond(id, payload).await
    }

    async fn delete_schedule(&self, id: &str) -> Result<()> {
        Err(MapzipError::NotFound { id: id.to_string() })
    }

    async fn process_schedule(&self, id: &str, _request: &ProcessRequest) -> Result<()> {
        Err(MapzipError::NotFound { id: id.to_string() })
    }
}

mod step_machine {
    use super::*;

    #[test]
    fn test_new_wizard_defaults() {
        let wizard = ScheduleWizard::enter_location(None);
        assert_eq!(wizard.step(), WizardStep::Location);
        assert_eq!(wizard.editing_id(), None);

        let required = &wizard.draft().required;
        assert_eq!(required.departure_time, t("12:00"));
        assert_eq!(required.meal_slots, vec![MealSlot::meal_at(t("12:05"))]);
        assert_eq!(required.meal_slots[0].radius_meters, 5000);
    }

    #[test]
    fn test_valid_build_is_accepted() {
        let mut wizard = at_required();
        wizard
            .complete_required("Trip", t("09:00"), vec![MealSlot::meal_at(t("09:10"))])
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::Optional);
        assert_eq!(wizard.draft().required.meal_slots[0].time, t("09:10"));
    }

    #[test]
    fn test_slot_too_close_to_departure_is_rejected() {
        let mut wizard = at_required();
        let before = wizard.draft().clone();

        let err = wizard
            .complete_required("Trip", t("09:00"), vec![MealSlot::meal_at(t("09:03"))])
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("departure time + 5 minutes"));
        assert_eq!(wizard.step(), WizardStep::Required);
        assert_eq!(wizard.draft(), &before);
    }

    #[test]
    fn test_slot_too_close_to_previous_meal_is_rejected() {
        let mut wizard = at_required();
        let slots = vec![
            MealSlot::meal_at(t("10:00")),
            MealSlot::new(MealType::Snack, t("10:04"), 5000),
        ];
        let err = wizard
            .complete_required("Trip", t("09:00"), slots)
            .unwrap_err();
        assert!(err.to_string().contains("previous meal time + 5 minutes"));
        assert!(err.to_string().contains("mealSlots[1]"));
    }

    #[test]
    fn test_exact_bound_is_allowed() {
        let mut wizard = at_required();
        let slots = vec![
            MealSlot::meal_at(t("09:05")),
            MealSlot::new(MealType::Snack, t("09:10"), 20_000),
        ];
        wizard.complete_required("Trip", t("09:00"), slots).unwrap();
    }

    #[test]
    fn test_accepted_drafts_keep_slot_ordering() {
        let departures = ["00:00", "06:30", "11:55", "23:00"];
        let offsets = [5_i64, 7, 30, 125];
        for departure in departures {
            let mut wizard = at_required();
            let departure = t(departure);
            let mut slots = Vec::new();
            let mut last = departure;
            for offset in offsets {
                match last.checked_add_minutes(offset) {
                    Some(next) => {
                        slots.push(MealSlot::meal_at(next));
                        last = next;
                    }
                    None => break,
                }
            }
            wizard.complete_required("Trip", departure, slots).unwrap();

            let accepted = &wizard.draft().required;
            let mut bound = accepted.departure_time;
            for slot in &accepted.meal_slots {
                assert!(slot.time >= bound.checked_add_minutes(5).unwrap());
                bound = slot.time;
            }
        }
    }

    #[test]
    fn test_empty_title_is_rejected() {
        let mut wizard = at_required();
        let err = wizard
            .complete_required("   ", t("09:00"), Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("title"));
        assert_eq!(wizard.step(), WizardStep::Required);
    }

    #[test]
    fn test_title_is_trimmed_and_slots_optional() {
        let mut wizard = at_required();
        wizard
            .complete_required("  Trip  ", t("09:00"), Vec::new())
            .unwrap();
        assert_eq!(wizard.draft().required.title, "Trip");
    }

    #[test]
    fn test_unresolved_endpoints_block_location_step() {
        let mut wizard = ScheduleWizard::enter_location(None);
        let err = wizard
            .complete_location(LocationSelection {
                departure: Some(seoul()),
                destination: None,
                waypoints: Vec::new(),
            })
            .unwrap_err();
        assert!(err.to_string().contains("destination"));
        assert_eq!(wizard.step(), WizardStep::Location);
        assert_eq!(wizard.draft().location, None);
    }

    #[test]
    fn test_unresolved_waypoints_are_dropped() {
        let mut wizard = ScheduleWizard::enter_location(None);
        wizard
            .complete_location(LocationSelection {
                departure: Some(seoul()),
                destination: Some(busan()),
                waypoints: vec![None, Some(daejeon()), None],
            })
            .unwrap();
        let location = wizard.draft().location.as_ref().unwrap();
        assert_eq!(location.waypoints, vec![daejeon()]);
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        let mut wizard = ScheduleWizard::enter_location(None);
        let err = wizard
            .complete_location(LocationSelection::new(
                LocationPoint::new("Nowhere", "", 123.0, 0.0),
                busan(),
            ))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_wrong_step_operations_fail() {
        let mut wizard = ScheduleWizard::enter_location(None);
        let err = wizard
            .complete_required("Trip", t("09:00"), Vec::new())
            .unwrap_err();
        assert!(matches!(err, MapzipError::InvalidTransition { .. }));
        assert!(wizard.add_meal_slot().is_err());
        assert!(wizard.toggle_companion(Companion::Alone).is_err());
        assert_eq!(wizard.step(), WizardStep::Location);
    }

    #[test]
    fn test_back_navigation_is_idempotent() {
        let mut wizard = at_optional();
        let draft = wizard.draft().clone();

        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Required);
        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Location);
        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Location);
        assert_eq!(wizard.draft(), &draft);

        // Same input again yields the same state.
        let selection = wizard.location_selection();
        wizard.complete_location(selection).unwrap();
        assert_eq!(wizard.draft(), &draft);
        let required = wizard.draft().required.clone();
        wizard
            .complete_required(&required.title, required.departure_time, required.meal_slots)
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::Optional);
        assert_eq!(wizard.draft(), &draft);
    }

    #[test]
    fn test_add_meal_slot_uses_min_time() {
        let mut wizard = at_required();
        let added = wizard.add_meal_slot().unwrap();
        assert_eq!(added, MealSlot::meal_at(t("12:10")));

        wizard.remove_meal_slot(0).unwrap();
        assert_eq!(wizard.draft().required.meal_slots, vec![added]);

        wizard.remove_meal_slot(0).unwrap();
        let first = wizard.add_meal_slot().unwrap();
        assert_eq!(first.time, t("12:05"));
        assert!(wizard.remove_meal_slot(3).is_err());
    }

    #[test]
    fn test_add_meal_slot_near_midnight_fails() {
        let mut wizard = at_required();
        wizard.remove_meal_slot(0).unwrap();
        let mut late = wizard.clone();
        // Complete and come back so the late departure becomes the anchor.
        late.complete_required("Late", t("23:57"), Vec::new()).unwrap();
        late.back();
        assert!(late.add_meal_slot().is_err());
        assert!(late.draft().required.meal_slots.is_empty());
    }

    #[test]
    fn test_set_meal_slot_validates_bound() {
        let mut wizard = at_required();
        let err = wizard
            .set_meal_slot(0, MealSlot::meal_at(t("12:01")))
            .unwrap_err();
        assert!(err.to_string().contains("departure time + 5 minutes"));
        assert_eq!(wizard.draft().required.meal_slots[0].time, t("12:05"));

        let snack = MealSlot::new(MealType::Snack, t("15:00"), 10_000);
        wizard.set_meal_slot(0, snack).unwrap();
        assert_eq!(wizard.draft().required.meal_slots[0], snack);
    }

    #[test]
    fn test_toggle_companion() {
        let mut wizard = at_optional();
        assert!(wizard.toggle_companion(Companion::Friends).unwrap());
        assert!(!wizard.toggle_companion(Companion::Friends).unwrap());
        assert!(wizard.draft().optional.companions.is_empty());
    }

    #[test]
    fn test_edit_seeds_every_step() {
        let schedule = existing_schedule();
        let mut wizard = ScheduleWizard::enter_location(Some(&schedule));
        assert_eq!(wizard.editing_id(), Some("sch-7"));
        assert_eq!(wizard.draft().required.title, "Weekend");
        assert_eq!(wizard.draft().optional.purpose, "family");

        let selection = wizard.location_selection();
        wizard.complete_location(selection).unwrap();
        let required = wizard.draft().required.clone();
        wizard
            .complete_required(&required.title, required.departure_time, required.meal_slots)
            .unwrap();

        let submission = wizard
            .prepare_submission(wizard.draft().optional.clone())
            .unwrap();
        match submission {
            crate::api::Submission::Update { id, payload } => {
                assert_eq!(id, "sch-7");
                assert_eq!(payload.waypoints, vec![daejeon()]);
                assert_eq!(payload.meal_slots.len(), 2);
                assert_eq!(payload.companions, vec![Companion::Parents]);
            }
            other => panic!("expected an update, got {other:?}"),
        }
        assert_eq!(wizard.step(), WizardStep::Optional);
    }
}

mod session {
    use super::*;

    fn session(service: Arc<FakeScheduleService>) -> WizardSession {
        WizardSession::new(at_optional(), service)
    }

    #[tokio::test]
    async fn test_submit_creates_schedule() {
        let service = Arc::new(FakeScheduleService::default());
        let session = session(service.clone());

        let saved = session
            .complete_optional("aisle", "", BTreeSet::from([Companion::Alone]))
            .await
            .unwrap();
        assert_eq!(saved.id, "new-1");
        assert_eq!(session.step(), WizardStep::Submitted);
        assert_eq!(service.creates.load(Ordering::SeqCst), 1);

        let payloads = service.payloads.lock().unwrap();
        assert_eq!(payloads[0].user_note, "aisle");
        assert_eq!(payloads[0].meal_slots[0].scheduled_time, t("09:10"));
    }

    #[tokio::test]
    async fn test_edit_submits_update() {
        let service = Arc::new(FakeScheduleService::default());
        let mut wizard = ScheduleWizard::enter_location(Some(&existing_schedule()));
        let selection = wizard.location_selection();
        wizard.complete_location(selection).unwrap();
        wizard
            .complete_required("Weekend", t("08:00"), vec![MealSlot::meal_at(t("10:00"))])
            .unwrap();
        let session = WizardSession::new(wizard, service.clone());

        let saved = session
            .complete_optional("", "", BTreeSet::new())
            .await
            .unwrap();
        assert_eq!(saved.id, "sch-7");
        assert_eq!(service.updates.load(Ordering::SeqCst), 1);
        assert_eq!(service.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_submit_makes_one_call() {
        let service = Arc::new(FakeScheduleService {
            delay: Some(Duration::from_secs(3)),
            ..Default::default()
        });
        let session = session(service.clone());

        let (first, second) = tokio::join!(
            session.complete_optional("", "", BTreeSet::new()),
            session.complete_optional("", "", BTreeSet::new()),
        );
        assert!(first.is_ok());
        assert!(matches!(second, Err(MapzipError::SubmissionInFlight)));
        assert_eq!(service.calls(), 1);
        assert!(!session.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_are_rejected_while_submitting() {
        let service = Arc::new(FakeScheduleService {
            delay: Some(Duration::from_secs(3)),
            ..Default::default()
        });
        let session = session(service.clone());

        let (result, back) = tokio::join!(
            session.complete_optional("", "", BTreeSet::new()),
            async {
                tokio::task::yield_now().await;
                session.back()
            },
        );
        assert!(result.is_ok());
        assert!(matches!(back, Err(MapzipError::SubmissionInFlight)));
        assert_eq!(session.step(), WizardStep::Submitted);
    }

    #[tokio::test]
    async fn test_failed_submit_stays_on_optional_step() {
        let service = Arc::new(FakeScheduleService {
            fail: true,
            ..Default::default()
        });
        let session = session(service.clone());

        let err = session
            .complete_optional("note", "purpose", BTreeSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MapzipError::Api { status: 503, .. }));
        assert_eq!(session.step(), WizardStep::Optional);
        assert!(!session.is_submitting());

        let draft = session.draft();
        assert_eq!(draft.required.title, "Busan trip");
        assert_eq!(draft.optional.user_note, "note");
    }

    #[tokio::test]
    async fn test_submitted_session_is_terminal() {
        let service = Arc::new(FakeScheduleService::default());
        let session = session(service.clone());
        session
            .complete_optional("", "", BTreeSet::new())
            .await
            .unwrap();

        let err = session
            .complete_optional("", "", BTreeSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MapzipError::InvalidTransition { .. }));
        session.back().unwrap();
        assert_eq!(session.step(), WizardStep::Submitted);
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_close_cancels_pending_submit() {
        let service = Arc::new(FakeScheduleService {
            hang: true,
            ..Default::default()
        });
        let session = session(service.clone());

        let (result, ()) = tokio::join!(
            session.complete_optional("", "", BTreeSet::new()),
            async {
                tokio::task::yield_now().await;
                session.close();
            },
        );
        assert!(matches!(result, Err(MapzipError::Cancelled)));
        assert_eq!(session.step(), WizardStep::Optional);
        assert!(!session.is_submitting());
        assert!(session.is_closed());
        assert!(matches!(
            session.add_meal_slot(),
            Err(MapzipError::Cancelled)
        ));
    }
}
