//! Device-local caches layered over a [`KeyValueStore`].
//!
//! Everything here is an optimization: a miss or a discarded entry only
//! means the caller goes back to the schedule or recommend service.

mod list;
mod selected;

use std::sync::Arc;

use log::info;

pub use list::ScheduleListCache;
pub use selected::{SelectedScheduleCache, SelectedScheduleEntry, SELECTED_SCHEDULE_TTL};

use crate::{
    error::Result,
    store::{Clock, KeyValueStore},
};

/// Key holding the selected schedule entry.
pub const SELECTED_SCHEDULE_KEY: &str = "selectedSchedule";
/// Key holding the "a schedule is selected" flag.
pub const SCHEDULE_SELECTED_FLAG_KEY: &str = "scheduleSelected";
/// Key holding the flat schedule list.
pub const SCHEDULE_LIST_KEY: &str = "schedules";

const SESSION_KEYS: [&str; 3] = [
    SELECTED_SCHEDULE_KEY,
    SCHEDULE_SELECTED_FLAG_KEY,
    SCHEDULE_LIST_KEY,
];

/// All local state of one device, sharing a single store.
pub struct LocalState {
    store: Arc<dyn KeyValueStore>,
    pub selected: SelectedScheduleCache<Arc<dyn KeyValueStore>, Arc<dyn Clock>>,
    pub schedules: ScheduleListCache<Arc<dyn KeyValueStore>>,
}

impl LocalState {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            selected: SelectedScheduleCache::new(store.clone(), clock),
            schedules: ScheduleListCache::new(store.clone()),
            store,
        }
    }

    /// Removes every session-scoped key. Used on logout and when the
    /// gateway rejects our credentials.
    pub fn clear_session(&self) -> Result<()> {
        for key in SESSION_KEYS {
            self.store.delete(key)?;
        }
        info!("Cleared local session data");
        Ok(())
    }
}
