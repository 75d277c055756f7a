//! Schedule listing, lookup, deletion and the edit wizard.

use log::{debug, info};

use super::TripPlanner;
use crate::{
    error::Result,
    models::{Schedule, ScheduleListItem},
    wizard::{ScheduleWizard, WizardSession},
};

impl TripPlanner {
    /// Fetches the user's schedules and refreshes the cached list.
    pub async fn list_schedules(&self) -> Result<Vec<ScheduleListItem>> {
        let schedules = self.check_session(self.schedules.list_schedules().await)?;
        self.local.schedules.replace(&schedules)?;
        debug!("Cached {} schedules", schedules.len());
        Ok(schedules)
    }

    /// The list as of the last successful fetch.
    pub fn cached_schedules(&self) -> Result<Vec<ScheduleListItem>> {
        self.local.schedules.load()
    }

    pub async fn get_schedule(&self, id: &str) -> Result<Schedule> {
        self.check_session(self.schedules.get_schedule(id).await)
    }

    /// Deletes a schedule and forgets every local copy of it.
    ///
    /// A selection flag whose entry has already expired cannot be matched
    /// against `id`, so it is cleared as well.
    pub async fn delete_schedule(&self, id: &str) -> Result<()> {
        self.check_session(self.schedules.delete_schedule(id).await)?;
        self.local.schedules.remove(id)?;
        let invalidate = match self.local.selected.get()? {
            Some(selected) => selected.id == id,
            None => self.local.selected.is_selected()?,
        };
        if invalidate {
            self.local.selected.invalidate()?;
        }
        info!("Deleted schedule {id}");
        Ok(())
    }

    /// Opens a wizard for a new schedule.
    pub fn new_wizard(&self) -> WizardSession {
        WizardSession::new(ScheduleWizard::enter_location(None), self.schedules.clone())
    }

    /// Opens a wizard pre-populated from an existing schedule.
    pub async fn edit_wizard(&self, id: &str) -> Result<WizardSession> {
        let schedule = self.get_schedule(id).await?;
        Ok(WizardSession::new(
            ScheduleWizard::enter_location(Some(&schedule)),
            self.schedules.clone(),
        ))
    }

    /// Brings local copies up to date after a wizard submission.
    pub fn record_submission(&self, schedule: &Schedule) -> Result<()> {
        self.local.schedules.upsert(schedule)?;
        if self
            .local
            .selected
            .get()?
            .is_some_and(|selected| selected.id == schedule.id)
        {
            self.local.selected.put(schedule)?;
        }
        Ok(())
    }
}
