//! The three-step schedule wizard as a synchronous state machine.

use std::fmt;

use log::debug;

use super::{
    draft::{LocationSelection, OptionalData, RequiredData, ScheduleDraft},
    validation,
};
use crate::{
    api::Submission,
    error::{MapzipError, Result},
    models::{ClockTime, Companion, MealSlot, MealType, Schedule, DEFAULT_RADIUS_METERS},
};

/// Wizard steps in the order they are completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Location,
    Required,
    Optional,
    /// Terminal. The schedule has been persisted.
    Submitted,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Location => "location",
            WizardStep::Required => "required",
            WizardStep::Optional => "optional",
            WizardStep::Submitted => "submitted",
        };
        f.write_str(name)
    }
}

/// Draft state plus the step it is on.
///
/// Every operation either applies fully or fails without touching the
/// draft. Steps advance only through the `complete_*` operations and go
/// back only through [`ScheduleWizard::back`].
#[derive(Debug, Clone)]
pub struct ScheduleWizard {
    step: WizardStep,
    /// Id of the schedule being edited; `None` for a new one.
    editing: Option<String>,
    draft: ScheduleDraft,
}

impl ScheduleWizard {
    /// Opens the wizard on the location step, seeded from `initial` when
    /// editing an existing schedule.
    pub fn enter_location(initial: Option<&Schedule>) -> Self {
        match initial {
            Some(schedule) => {
                debug!("Opening wizard to edit schedule {}", schedule.id);
                Self {
                    step: WizardStep::Location,
                    editing: Some(schedule.id.clone()),
                    draft: ScheduleDraft::from_schedule(schedule),
                }
            }
            None => Self {
                step: WizardStep::Location,
                editing: None,
                draft: ScheduleDraft::default(),
            },
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &ScheduleDraft {
        &self.draft
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Current location input, for re-display after going back.
    pub fn location_selection(&self) -> LocationSelection {
        self.draft
            .location
            .as_ref()
            .map(LocationSelection::from)
            .unwrap_or_default()
    }

    fn expect_step(&self, expected: WizardStep, action: &'static str) -> Result<()> {
        if self.step != expected {
            return Err(MapzipError::InvalidTransition {
                action,
                step: self.step.to_string(),
            });
        }
        Ok(())
    }

    fn advance(&mut self, to: WizardStep) {
        debug!("Wizard {} -> {}", self.step, to);
        self.step = to;
    }

    pub fn complete_location(&mut self, selection: LocationSelection) -> Result<()> {
        self.expect_step(WizardStep::Location, "complete the location step")?;
        let location = validation::resolve_locations(selection)?;
        self.draft.location = Some(location);
        self.advance(WizardStep::Required);
        Ok(())
    }

    pub fn complete_required(
        &mut self,
        title: &str,
        departure_time: ClockTime,
        meal_slots: Vec<MealSlot>,
    ) -> Result<()> {
        self.expect_step(WizardStep::Required, "complete the required step")?;
        let title = validation::validate_title(title)?;
        validation::validate_meal_slots(departure_time, &meal_slots)?;

        self.draft.required = RequiredData {
            title,
            departure_time,
            meal_slots,
        };
        self.advance(WizardStep::Optional);
        Ok(())
    }

    /// Appends a meal at the earliest allowed time with the default radius.
    pub fn add_meal_slot(&mut self) -> Result<MealSlot> {
        self.expect_step(WizardStep::Required, "add a meal slot")?;
        let required = &mut self.draft.required;
        let index = required.meal_slots.len();
        let time = validation::min_time_for_slot(
            required.departure_time,
            &required.meal_slots,
            index,
        )
        .ok_or_else(|| {
            MapzipError::validation(format!("mealSlots[{index}]"))
                .with_reason("no time is left before midnight for another meal")
        })?;

        let slot = MealSlot::new(MealType::Meal, time, DEFAULT_RADIUS_METERS);
        required.meal_slots.push(slot);
        Ok(slot)
    }

    /// Removes a slot by position. The remaining slots are re-checked on
    /// the next edit or on completion.
    pub fn remove_meal_slot(&mut self, index: usize) -> Result<MealSlot> {
        self.expect_step(WizardStep::Required, "remove a meal slot")?;
        let slots = &mut self.draft.required.meal_slots;
        if index >= slots.len() {
            return Err(MapzipError::validation(format!("mealSlots[{index}]"))
                .with_reason(format!("there are only {} meal slots", slots.len())));
        }
        Ok(slots.remove(index))
    }

    /// Replaces one slot, rejecting a time below its bound.
    pub fn set_meal_slot(&mut self, index: usize, slot: MealSlot) -> Result<()> {
        self.expect_step(WizardStep::Required, "edit a meal slot")?;
        let required = &mut self.draft.required;
        if index >= required.meal_slots.len() {
            return Err(MapzipError::validation(format!("mealSlots[{index}]"))
                .with_reason(format!("there are only {} meal slots", required.meal_slots.len())));
        }
        validation::validate_slot(required.departure_time, &required.meal_slots, index, &slot)?;
        required.meal_slots[index] = slot;
        Ok(())
    }

    /// Flips a companion on or off. Returns whether it is now selected.
    pub fn toggle_companion(&mut self, companion: Companion) -> Result<bool> {
        self.expect_step(WizardStep::Optional, "change companions")?;
        let companions = &mut self.draft.optional.companions;
        if companions.remove(&companion) {
            return Ok(false);
        }
        companions.insert(companion);
        Ok(true)
    }

    /// Records the optional step and builds the submission for it.
    ///
    /// The wizard stays on the optional step; call
    /// [`ScheduleWizard::mark_submitted`] once the service accepted it.
    pub fn prepare_submission(&mut self, optional: OptionalData) -> Result<Submission> {
        self.expect_step(WizardStep::Optional, "submit")?;
        let mut draft = self.draft.clone();
        draft.optional = optional;
        let payload = draft.to_payload()?;

        self.draft = draft;
        Ok(match &self.editing {
            Some(id) => Submission::Update {
                id: id.clone(),
                payload,
            },
            None => Submission::Create(payload),
        })
    }

    pub fn mark_submitted(&mut self) -> Result<()> {
        self.expect_step(WizardStep::Optional, "finish")?;
        self.advance(WizardStep::Submitted);
        Ok(())
    }

    /// Goes back one step. Does nothing on the first and terminal steps.
    pub fn back(&mut self) {
        match self.step {
            WizardStep::Required => self.advance(WizardStep::Location),
            WizardStep::Optional => self.advance(WizardStep::Required),
            WizardStep::Location | WizardStep::Submitted => {}
        }
    }
}
