//! Flat cached copy of the user's schedule list.

use log::warn;

use super::SCHEDULE_LIST_KEY;
use crate::{
    error::Result,
    models::{Schedule, ScheduleListItem},
    store::KeyValueStore,
};

/// Cached schedule list. No expiry: the list is refreshed whenever the
/// schedule service is asked for it.
pub struct ScheduleListCache<S> {
    store: S,
}

impl<S: KeyValueStore> ScheduleListCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Cached list, empty when nothing (valid) is stored.
    pub fn load(&self) -> Result<Vec<ScheduleListItem>> {
        let Some(raw) = self.store.get(SCHEDULE_LIST_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(schedules) => Ok(schedules),
            Err(e) => {
                warn!("Discarding malformed schedule list: {e}");
                self.store.delete(SCHEDULE_LIST_KEY)?;
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the cached list.
    pub fn replace(&self, schedules: &[ScheduleListItem]) -> Result<()> {
        self.store
            .set(SCHEDULE_LIST_KEY, &serde_json::to_string(schedules)?)
    }

    /// Replaces the entry with the same id, or appends one.
    pub fn upsert(&self, schedule: &Schedule) -> Result<()> {
        let item = ScheduleListItem::from(schedule);
        let mut schedules = self.load()?;
        match schedules.iter_mut().find(|s| s.id == item.id) {
            Some(existing) => *existing = item,
            None => schedules.push(item),
        }
        self.replace(&schedules)
    }

    /// Removes a schedule by id. Returns whether it was present.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut schedules = self.load()?;
        let before = schedules.len();
        schedules.retain(|s| s.id != id);
        if schedules.len() == before {
            return Ok(false);
        }
        self.replace(&schedules)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{ClockTime, LocationPoint},
        store::MemoryStore,
    };

    fn schedule(id: &str, title: &str) -> Schedule {
        Schedule {
            id: id.to_string(),
            title: title.to_string(),
            departure_time: "08:30".parse::<ClockTime>().unwrap(),
            calculated_arrival_time: None,
            departure: LocationPoint::new("A", "", 37.5, 127.0),
            destination: LocationPoint::new("B", "", 35.1, 129.0),
            waypoints: Vec::new(),
            meal_slots: Vec::new(),
            user_note: String::new(),
            purpose: String::new(),
            companions: Default::default(),
            selected_restaurants: Vec::new(),
        }
    }

    #[test]
    fn test_upsert_and_remove() {
        let cache = ScheduleListCache::new(MemoryStore::new());
        assert!(cache.load().unwrap().is_empty());

        cache.upsert(&schedule("1", "first")).unwrap();
        cache.upsert(&schedule("2", "second")).unwrap();
        cache.upsert(&schedule("1", "renamed")).unwrap();

        let list = cache.load().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, "renamed");
        assert_eq!(list[0].destination_name, "B");

        assert!(cache.remove("1").unwrap());
        assert!(!cache.remove("1").unwrap());
        assert_eq!(cache.load().unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_list_is_discarded() {
        let store = MemoryStore::new();
        store.set(SCHEDULE_LIST_KEY, "[{\"id\":").unwrap();
        let cache = ScheduleListCache::new(store);

        assert!(cache.load().unwrap().is_empty());
        assert!(cache.store.get(SCHEDULE_LIST_KEY).unwrap().is_none());
    }
}
