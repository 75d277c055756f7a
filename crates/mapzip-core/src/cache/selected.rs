//! Cache for the schedule currently driving the home summary.

use jiff::{SignedDuration, Timestamp};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{SCHEDULE_SELECTED_FLAG_KEY, SELECTED_SCHEDULE_KEY};
use crate::{
    error::{MapzipError, Result},
    models::{Restaurant, Schedule},
    store::{Clock, KeyValueStore},
};

/// How long a cached selection stays valid after it was written.
pub const SELECTED_SCHEDULE_TTL: SignedDuration = SignedDuration::from_hours(24);

/// Persisted shape of the selected schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedScheduleEntry {
    pub schedule: Schedule,
    pub expires_at: Timestamp,
}

/// Selected-schedule cache with read-time expiry.
///
/// Reads never return an entry the cache itself considers invalid: expired
/// or unparseable values are deleted on the read that finds them and the
/// read reports a miss.
pub struct SelectedScheduleCache<S, C> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore, C: Clock> SelectedScheduleCache<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Writes the schedule with a fresh 24 hour expiry, replacing any
    /// existing entry, and marks a schedule as selected.
    pub fn put(&self, schedule: &Schedule) -> Result<()> {
        let expires_at = self
            .clock
            .now()
            .checked_add(SELECTED_SCHEDULE_TTL)
            .map_err(|e| MapzipError::Configuration {
                message: format!("Cannot compute cache expiry: {e}"),
            })?;
        let entry = SelectedScheduleEntry {
            schedule: schedule.clone(),
            expires_at,
        };

        self.store
            .set(SELECTED_SCHEDULE_KEY, &serde_json::to_string(&entry)?)?;
        self.store.set(SCHEDULE_SELECTED_FLAG_KEY, "true")?;
        debug!("Cached selected schedule {} until {}", schedule.id, expires_at);
        Ok(())
    }

    /// Returns the cached schedule, or `None` on a miss.
    ///
    /// A miss is reported when no schedule is flagged as selected, when the
    /// entry is absent or malformed, or when `now >= expiresAt`. The last two
    /// cases delete the entry. The selection flag survives expiry so the
    /// caller knows to re-request the summary.
    pub fn get(&self) -> Result<Option<Schedule>> {
        if !self.is_selected()? {
            return Ok(None);
        }
        let Some(raw) = self.store.get(SELECTED_SCHEDULE_KEY)? else {
            return Ok(None);
        };

        let entry = match serde_json::from_str::<SelectedScheduleEntry>(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding malformed selected schedule entry: {e}");
                self.store.delete(SELECTED_SCHEDULE_KEY)?;
                return Ok(None);
            }
        };

        if self.clock.now() >= entry.expires_at {
            debug!(
                "Selected schedule {} expired at {}",
                entry.schedule.id, entry.expires_at
            );
            self.store.delete(SELECTED_SCHEDULE_KEY)?;
            return Ok(None);
        }

        Ok(Some(entry.schedule))
    }

    /// Drops the cached entry and the selection flag.
    pub fn invalidate(&self) -> Result<()> {
        self.store.delete(SELECTED_SCHEDULE_KEY)?;
        self.store.delete(SCHEDULE_SELECTED_FLAG_KEY)
    }

    /// Whether a schedule was selected on this device.
    pub fn is_selected(&self) -> Result<bool> {
        Ok(self
            .store
            .get(SCHEDULE_SELECTED_FLAG_KEY)?
            .is_some_and(|flag| flag == "true"))
    }

    /// Records a restaurant pick on the cached schedule and rewrites the
    /// entry. Returns the updated schedule, or `None` when nothing valid is
    /// cached.
    pub fn record_restaurant(
        &self,
        section_id: &str,
        restaurant: Restaurant,
    ) -> Result<Option<Schedule>> {
        let Some(mut schedule) = self.get()? else {
            return Ok(None);
        };
        schedule.select_restaurant(section_id, restaurant);
        self.put(&schedule)?;
        Ok(Some(schedule))
    }
}
