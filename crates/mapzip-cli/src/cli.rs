//! Command definitions and their handlers.
//!
//! Argument structures carry clap attributes and parse straight into core
//! model types, so the handlers only see values the wizard understands:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Models → TripPlanner
//! ```
//!
//! Places are written `NAME@LAT,LNG` or `NAME|ADDRESS@LAT,LNG`, meal slots
//! `TYPE@HH:MM[/RADIUS]` where the radius is metres or `5km`.

use std::collections::BTreeSet;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use log::{debug, info};
use mapzip_core::{
    models::{
        self, ClockTime, Companion, LocationPoint, MealSlot, MealType, DEFAULT_RADIUS_METERS,
    },
    wizard::{LocationData, LocationSelection, WizardSession},
    CreateResult, DeleteResult, MapzipError, OperationStatus, PendingReviews, ScheduleSummary,
    Schedules, TripPlanner, UpdateResult,
};
use tokio_util::sync::CancellationToken;

use crate::renderer::TerminalRenderer;

#[derive(Subcommand)]
pub enum ScheduleCommands {
    /// List your schedules
    #[command(alias = "ls")]
    List,
    /// Show a schedule with its timeline
    Show(ScheduleIdArgs),
    /// Create a schedule through the wizard
    Create(CreateScheduleArgs),
    /// Edit a schedule; omitted flags keep the stored values
    Edit(EditScheduleArgs),
    /// Delete a schedule
    #[command(alias = "rm")]
    Delete(ScheduleIdArgs),
    /// Select a schedule for today's trip and wait for its route
    Select(ScheduleIdArgs),
    /// Recalculate the route from the current position
    Refresh(RefreshScheduleArgs),
    /// Show the selected schedule
    Active,
    /// Forget the selected schedule
    Deselect,
}

#[derive(Subcommand)]
pub enum ReviewCommands {
    /// List reviews waiting to be written
    Pending,
    /// Dismiss a pending review
    Delete(DeleteReviewArgs),
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Remove the cached selection and schedule list
    Clear,
}

#[derive(Args)]
pub struct ScheduleIdArgs {
    /// Schedule ID
    pub id: String,
}

/// Arguments for creating a schedule.
///
/// Each group of flags feeds one wizard step: the places, then the title,
/// departure time and meals, then the optional details.
#[derive(Args)]
pub struct CreateScheduleArgs {
    /// Schedule title
    #[arg(long)]
    pub title: String,

    /// Departure time (HH:MM)
    #[arg(long, value_parser = parse_clock_time)]
    pub departure_time: ClockTime,

    /// Departure point (NAME@LAT,LNG or NAME|ADDRESS@LAT,LNG)
    #[arg(long, value_parser = parse_point)]
    pub from: LocationPoint,

    /// Destination point
    #[arg(long, value_parser = parse_point)]
    pub to: LocationPoint,

    #[command(flatten)]
    pub details: ScheduleDetailsArgs,
}

#[derive(Args)]
pub struct EditScheduleArgs {
    /// Schedule ID
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New departure time (HH:MM)
    #[arg(long, value_parser = parse_clock_time)]
    pub departure_time: Option<ClockTime>,

    /// New departure point
    #[arg(long, value_parser = parse_point)]
    pub from: Option<LocationPoint>,

    /// New destination point
    #[arg(long, value_parser = parse_point)]
    pub to: Option<LocationPoint>,

    #[command(flatten)]
    pub details: ScheduleDetailsArgs,
}

/// Flags shared by create and edit. On edit, a repeated flag replaces the
/// whole stored list.
#[derive(Args)]
pub struct ScheduleDetailsArgs {
    /// Waypoint, repeat for several
    #[arg(long = "via", value_parser = parse_point)]
    pub via: Vec<LocationPoint>,

    /// Meal slot (TYPE@HH:MM[/RADIUS]), repeat for several
    #[arg(long = "meal", value_parser = parse_meal)]
    pub meals: Vec<MealSlot>,

    /// Free-form note
    #[arg(long)]
    pub note: Option<String>,

    /// Trip purpose
    #[arg(long)]
    pub purpose: Option<String>,

    /// Companion (alone, parents, partner, friends, children), repeat for
    /// several
    #[arg(long = "with", value_parser = parse_companion)]
    pub companions: Vec<Companion>,
}

#[derive(Args)]
pub struct RefreshScheduleArgs {
    /// Schedule ID
    pub id: String,

    /// Current position (LAT,LNG)
    #[arg(long, value_parser = parse_coordinates)]
    pub at: Option<(f64, f64)>,

    /// Current time (HH:MM), defaults to the local time
    #[arg(long, value_parser = parse_clock_time)]
    pub time: Option<ClockTime>,
}

#[derive(Args)]
pub struct DeleteReviewArgs {
    /// Restaurant ID of the pending review
    pub restaurant_id: String,

    /// Scheduled time of the visit (HH:MM)
    #[arg(long)]
    pub time: String,
}

fn parse_clock_time(s: &str) -> Result<ClockTime, String> {
    s.parse().map_err(|e: MapzipError| e.to_string())
}

fn parse_companion(s: &str) -> Result<Companion, String> {
    s.parse().map_err(|e: MapzipError| e.to_string())
}

fn parse_coordinates(s: &str) -> Result<(f64, f64), String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("'{s}' is not LAT,LNG"))?;
    let lat = lat.trim().parse().map_err(|_| format!("invalid latitude '{lat}'"))?;
    let lng = lng.trim().parse().map_err(|_| format!("invalid longitude '{lng}'"))?;
    Ok((lat, lng))
}

/// Parses `NAME@LAT,LNG` or `NAME|ADDRESS@LAT,LNG`.
fn parse_point(s: &str) -> Result<LocationPoint, String> {
    let (label, coordinates) = s
        .rsplit_once('@')
        .ok_or_else(|| format!("'{s}' is not NAME@LAT,LNG"))?;
    let (lat, lng) = parse_coordinates(coordinates)?;
    let (name, address) = label.split_once('|').unwrap_or((label, ""));
    let point = LocationPoint::new(name.trim(), address.trim(), lat, lng);
    point.validate("point").map_err(|e| e.to_string())?;
    Ok(point)
}

/// Parses `TYPE@HH:MM[/RADIUS]`.
fn parse_meal(s: &str) -> Result<MealSlot, String> {
    let (meal_type, rest) = s
        .split_once('@')
        .ok_or_else(|| format!("'{s}' is not TYPE@HH:MM[/RADIUS]"))?;
    let meal_type: MealType = meal_type.parse().map_err(|e: MapzipError| e.to_string())?;
    let (time, radius) = match rest.split_once('/') {
        Some((time, radius)) => (time, parse_meal_radius(radius)?),
        None => (rest, DEFAULT_RADIUS_METERS),
    };
    Ok(MealSlot::new(meal_type, parse_clock_time(time)?, radius))
}

/// A search radius the user can ask for: any positive distance.
fn parse_meal_radius(s: &str) -> Result<u32, String> {
    models::parse_radius(s)
        .filter(|meters| *meters > 0)
        .ok_or_else(|| format!("invalid radius '{s}'"))
}

/// Cancels the returned token when the user presses Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let guard = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            guard.cancel();
        }
    });
    cancel
}

/// Everything the wizard needs, after edit flags are merged over the
/// stored schedule.
struct WizardInput {
    location: LocationSelection,
    title: String,
    departure_time: ClockTime,
    meals: Vec<MealSlot>,
    note: String,
    purpose: String,
    companions: BTreeSet<Companion>,
}

impl From<CreateScheduleArgs> for WizardInput {
    fn from(args: CreateScheduleArgs) -> Self {
        let details = args.details;
        Self {
            location: LocationSelection {
                departure: Some(args.from),
                destination: Some(args.to),
                waypoints: details.via.into_iter().map(Some).collect(),
            },
            title: args.title,
            departure_time: args.departure_time,
            meals: details.meals,
            note: details.note.unwrap_or_default(),
            purpose: details.purpose.unwrap_or_default(),
            companions: details.companions.into_iter().collect(),
        }
    }
}

/// Dispatches parsed commands to the planner and renders the results.
pub struct Cli {
    planner: TripPlanner,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(planner: TripPlanner, renderer: TerminalRenderer) -> Self {
        Self { planner, renderer }
    }

    pub async fn handle_schedule_command(&self, command: ScheduleCommands) -> Result<()> {
        match command {
            ScheduleCommands::List => self.list_schedules().await,
            ScheduleCommands::Show(args) => self.show_schedule(&args.id).await,
            ScheduleCommands::Create(args) => self.create_schedule(args).await,
            ScheduleCommands::Edit(args) => self.edit_schedule(args).await,
            ScheduleCommands::Delete(args) => self.delete_schedule(&args.id).await,
            ScheduleCommands::Select(args) => self.select_schedule(&args.id).await,
            ScheduleCommands::Refresh(args) => self.refresh_schedule(args).await,
            ScheduleCommands::Active => self.active_schedule().await,
            ScheduleCommands::Deselect => {
                self.planner.deselect()?;
                self.renderer
                    .render(&OperationStatus("Selection cleared.".to_string()).to_string())
            }
        }
    }

    pub async fn handle_review_command(&self, command: ReviewCommands) -> Result<()> {
        match command {
            ReviewCommands::Pending => {
                let reviews = self
                    .planner
                    .pending_reviews()
                    .await
                    .context("Failed to load pending reviews")?;
                self.renderer.render(&PendingReviews(reviews).to_string())
            }
            ReviewCommands::Delete(args) => {
                self.planner
                    .delete_pending_review(&args.restaurant_id, &args.time)
                    .await
                    .context("Failed to delete pending review")?;
                self.renderer.render(
                    &DeleteResult::new("pending review", args.restaurant_id).to_string(),
                )
            }
        }
    }

    pub async fn handle_cache_command(&self, command: CacheCommands) -> Result<()> {
        match command {
            CacheCommands::Clear => {
                self.planner.logout()?;
                self.renderer
                    .render(&OperationStatus("Local session cleared.".to_string()).to_string())
            }
        }
    }

    pub async fn list_schedules(&self) -> Result<()> {
        let schedules = self
            .planner
            .list_schedules()
            .await
            .context("Failed to list schedules")?;
        self.renderer.render(&Schedules(schedules).to_string())
    }

    async fn show_schedule(&self, id: &str) -> Result<()> {
        let schedule = self.planner.get_schedule(id).await?;
        self.renderer.render(&ScheduleSummary(&schedule).to_string())
    }

    async fn delete_schedule(&self, id: &str) -> Result<()> {
        self.planner.delete_schedule(id).await?;
        self.renderer
            .render(&DeleteResult::new("schedule", id).to_string())
    }

    async fn active_schedule(&self) -> Result<()> {
        match self.planner.active_schedule().await? {
            Some(schedule) => self.renderer.render(&ScheduleSummary(&schedule).to_string()),
            None => self
                .renderer
                .render(&OperationStatus("No active schedule.".to_string()).to_string()),
        }
    }

    async fn select_schedule(&self, id: &str) -> Result<()> {
        match self.planner.select_schedule(id, &cancel_on_ctrl_c()).await {
            Ok(schedule) => self.renderer.render(&ScheduleSummary(&schedule).to_string()),
            Err(e @ MapzipError::Timeout { .. }) => {
                self.renderer.render(
                    &OperationStatus(format!("{e}. Try selecting the schedule again later."))
                        .to_string(),
                )?;
                self.list_schedules().await
            }
            Err(e) => Err(e).context(format!("Failed to select schedule {id}")),
        }
    }

    async fn refresh_schedule(&self, args: RefreshScheduleArgs) -> Result<()> {
        let schedule = self
            .planner
            .refresh_schedule(&args.id, args.at, args.time, &cancel_on_ctrl_c())
            .await
            .with_context(|| format!("Failed to refresh schedule {}", args.id))?;
        self.renderer.render(&ScheduleSummary(&schedule).to_string())
    }

    async fn create_schedule(&self, args: CreateScheduleArgs) -> Result<()> {
        let session = self.planner.new_wizard();
        let schedule = run_wizard(&session, args.into()).await?;
        self.planner.record_submission(&schedule)?;
        self.renderer.render(&CreateResult::new(schedule).to_string())
    }

    async fn edit_schedule(&self, args: EditScheduleArgs) -> Result<()> {
        let session = self
            .planner
            .edit_wizard(&args.id)
            .await
            .with_context(|| format!("Failed to load schedule {}", args.id))?;
        let input = merge_edit(&session, args)?;
        let schedule = run_wizard(&session, input).await?;
        self.planner.record_submission(&schedule)?;
        self.renderer.render(&UpdateResult::new(schedule).to_string())
    }
}

/// Lays edit flags over the draft seeded from the stored schedule.
fn merge_edit(session: &WizardSession, args: EditScheduleArgs) -> Result<WizardInput> {
    let draft = session.draft();
    let Some(stored) = draft.location.as_ref() else {
        bail!("Schedule {} has no stored locations", args.id);
    };
    let details = args.details;

    let waypoints = if details.via.is_empty() {
        stored.waypoints.clone()
    } else {
        details.via
    };
    let location = LocationSelection::from(&LocationData {
        departure: args.from.unwrap_or_else(|| stored.departure.clone()),
        destination: args.to.unwrap_or_else(|| stored.destination.clone()),
        waypoints,
    });

    let required = draft.required;
    let optional = draft.optional;
    Ok(WizardInput {
        location,
        title: args.title.unwrap_or(required.title),
        departure_time: args.departure_time.unwrap_or(required.departure_time),
        meals: if details.meals.is_empty() {
            required.meal_slots
        } else {
            details.meals
        },
        note: details.note.unwrap_or(optional.user_note),
        purpose: details.purpose.unwrap_or(optional.purpose),
        companions: if details.companions.is_empty() {
            optional.companions
        } else {
            details.companions.into_iter().collect()
        },
    })
}

/// Walks the three wizard steps and submits once. Ctrl-C during the
/// submission closes the session and discards the result.
async fn run_wizard(session: &WizardSession, input: WizardInput) -> Result<mapzip_core::Schedule> {
    session.complete_location(input.location)?;
    debug!("Location step done");
    session.complete_required(&input.title, input.departure_time, input.meals)?;
    debug!("Required step done");

    tokio::select! {
        result = session.complete_optional(&input.note, &input.purpose, input.companions) => {
            Ok(result?)
        }
        _ = tokio::signal::ctrl_c() => {
            session.close();
            info!("Wizard closed by the user");
            Err(MapzipError::Cancelled.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point_with_address() {
        let point = parse_point("Seoul Station|405 Hangang-daero@37.5547,126.9706").unwrap();
        assert_eq!(point.name, "Seoul Station");
        assert_eq!(point.address, "405 Hangang-daero");
        assert_eq!(point.lat, 37.5547);
        assert_eq!(point.lng, 126.9706);
    }

    #[test]
    fn test_parse_point_rejects_bad_input() {
        assert!(parse_point("Seoul Station").is_err());
        assert!(parse_point("Nowhere@91.0,0.0").is_err());
        assert!(parse_point("@37.5,127.0").is_err());
    }

    #[test]
    fn test_parse_meal_forms() {
        let slot = parse_meal("meal@12:30").unwrap();
        assert_eq!(slot.meal_type, MealType::Meal);
        assert_eq!(slot.time.to_string(), "12:30");
        assert_eq!(slot.radius_meters, DEFAULT_RADIUS_METERS);

        let slot = parse_meal("snack@15:00/10km").unwrap();
        assert_eq!(slot.meal_type, MealType::Snack);
        assert_eq!(slot.radius_meters, 10_000);

        assert_eq!(parse_meal("meal@12:30/2500").unwrap().radius_meters, 2500);
        assert_eq!(parse_meal("meal@12:30/750m").unwrap().radius_meters, 750);
        assert_eq!(parse_meal("meal@12:30/ 20KM").unwrap().radius_meters, 20_000);
    }

    #[test]
    fn test_parse_meal_rejects_bad_input() {
        assert!(parse_meal("brunch@12:30").is_err());
        assert!(parse_meal("meal@25:00").is_err());
        assert!(parse_meal("meal@12:30/0").is_err());
        assert!(parse_meal("meal@12:30/0km").is_err());
        assert!(parse_meal("meal@12:30/far").is_err());
        assert!(parse_meal("12:30").is_err());
    }

    #[test]
    fn test_create_args_feed_wizard_input() {
        let input = WizardInput::from(CreateScheduleArgs {
            title: "Trip".to_string(),
            departure_time: "09:00".parse().unwrap(),
            from: LocationPoint::new("A", "", 37.5, 127.0),
            to: LocationPoint::new("B", "", 35.1, 129.0),
            details: ScheduleDetailsArgs {
                via: vec![LocationPoint::new("C", "", 36.3, 127.3)],
                meals: Vec::new(),
                note: None,
                purpose: Some("family".to_string()),
                companions: vec![Companion::Parents, Companion::Parents],
            },
        });
        assert_eq!(input.location.waypoints.len(), 1);
        assert_eq!(input.note, "");
        assert_eq!(input.purpose, "family");
        assert_eq!(input.companions.len(), 1);
    }
}
