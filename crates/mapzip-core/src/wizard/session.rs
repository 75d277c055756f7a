//! Async owner of a wizard: serializes submissions and ties them to the
//! lifetime of the screen or command that opened it.

use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use super::{
    draft::{LocationSelection, OptionalData, ScheduleDraft},
    machine::{ScheduleWizard, WizardStep},
};
use crate::{
    api::ScheduleService,
    error::{MapzipError, Result},
    models::{ClockTime, Companion, MealSlot, Schedule},
};

/// Clears the in-flight flag on every exit path, including cancellation.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| MapzipError::SubmissionInFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A wizard bound to a schedule service.
///
/// Only one submission may be pending at a time; a second one is rejected
/// rather than queued. Closing the session cancels a pending submission and
/// its result is discarded.
pub struct WizardSession {
    wizard: Mutex<ScheduleWizard>,
    in_flight: AtomicBool,
    cancel: CancellationToken,
    service: Arc<dyn ScheduleService>,
}

impl WizardSession {
    pub fn new(wizard: ScheduleWizard, service: Arc<dyn ScheduleService>) -> Self {
        Self::with_cancellation(wizard, service, CancellationToken::new())
    }

    /// Creates a session that is also closed when `cancel` fires.
    pub fn with_cancellation(
        wizard: ScheduleWizard,
        service: Arc<dyn ScheduleService>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            wizard: Mutex::new(wizard),
            in_flight: AtomicBool::new(false),
            cancel,
            service,
        }
    }

    fn wizard(&self) -> MutexGuard<'_, ScheduleWizard> {
        self.wizard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs a synchronous wizard operation unless a submission is pending.
    fn edit<T>(&self, op: impl FnOnce(&mut ScheduleWizard) -> Result<T>) -> Result<T> {
        if self.cancel.is_cancelled() {
            return Err(MapzipError::Cancelled);
        }
        if self.is_submitting() {
            return Err(MapzipError::SubmissionInFlight);
        }
        op(&mut self.wizard())
    }

    pub fn step(&self) -> WizardStep {
        self.wizard().step()
    }

    /// Snapshot of the draft.
    pub fn draft(&self) -> ScheduleDraft {
        self.wizard().draft().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Tears the session down. A pending submission resolves to
    /// [`MapzipError::Cancelled`].
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn complete_location(&self, selection: LocationSelection) -> Result<()> {
        self.edit(|wizard| wizard.complete_location(selection))
    }

    pub fn complete_required(
        &self,
        title: &str,
        departure_time: ClockTime,
        meal_slots: Vec<MealSlot>,
    ) -> Result<()> {
        self.edit(|wizard| wizard.complete_required(title, departure_time, meal_slots))
    }

    pub fn add_meal_slot(&self) -> Result<MealSlot> {
        self.edit(ScheduleWizard::add_meal_slot)
    }

    pub fn remove_meal_slot(&self, index: usize) -> Result<MealSlot> {
        self.edit(|wizard| wizard.remove_meal_slot(index))
    }

    pub fn set_meal_slot(&self, index: usize, slot: MealSlot) -> Result<()> {
        self.edit(|wizard| wizard.set_meal_slot(index, slot))
    }

    pub fn toggle_companion(&self, companion: Companion) -> Result<bool> {
        self.edit(|wizard| wizard.toggle_companion(companion))
    }

    pub fn back(&self) -> Result<()> {
        self.edit(|wizard| {
            wizard.back();
            Ok(())
        })
    }

    /// Completes the optional step and persists the schedule.
    ///
    /// On success the wizard is [`WizardStep::Submitted`]. On failure it
    /// stays on the optional step with the draft intact so the call can be
    /// retried.
    pub async fn complete_optional(
        &self,
        user_note: &str,
        purpose: &str,
        companions: BTreeSet<Companion>,
    ) -> Result<Schedule> {
        if self.cancel.is_cancelled() {
            return Err(MapzipError::Cancelled);
        }
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let submission = self.wizard().prepare_submission(OptionalData {
            user_note: user_note.to_string(),
            purpose: purpose.to_string(),
            companions,
        })?;

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                info!("Wizard closed while a submission was pending, discarding the result");
                return Err(MapzipError::Cancelled);
            }
            result = self.service.submit(&submission) => result,
        };

        match result {
            Ok(schedule) => {
                self.wizard().mark_submitted()?;
                info!("Schedule {} saved", schedule.id);
                Ok(schedule)
            }
            Err(e) => {
                warn!("Schedule submission failed: {e}");
                Err(e)
            }
        }
    }
}
