//! Selecting a schedule and keeping its route summary cached.

use jiff::tz::TimeZone;
use log::{debug, info};
use tokio_util::sync::CancellationToken;

use super::TripPlanner;
use crate::{
    api::ProcessRequest,
    error::{MapzipError, Result},
    models::{ClockTime, Restaurant, Schedule},
    poll,
};

impl TripPlanner {
    /// Makes `id` the active schedule and waits for its route.
    ///
    /// The schedule is cached only once the route calculator reported an
    /// arrival time. On [`MapzipError::Timeout`] nothing is cached.
    pub async fn select_schedule(&self, id: &str, cancel: &CancellationToken) -> Result<Schedule> {
        self.check_session(
            self.schedules
                .process_schedule(id, &ProcessRequest::select())
                .await,
        )?;
        let schedule = self.await_route(id, cancel).await?;

        self.local.selected.put(&schedule)?;
        self.local.schedules.upsert(&schedule)?;
        info!("Selected schedule {id}");
        Ok(schedule)
    }

    /// The active schedule, from the cache when it is still valid and from
    /// the recommend service otherwise.
    pub async fn active_schedule(&self) -> Result<Option<Schedule>> {
        if let Some(schedule) = self.local.selected.get()? {
            debug!("Active schedule {} served from cache", schedule.id);
            return Ok(Some(schedule));
        }

        match self.check_session(self.recommend.active_summary().await)? {
            Some(schedule) => {
                self.local.selected.put(&schedule)?;
                Ok(Some(schedule))
            }
            None => {
                self.local.selected.invalidate()?;
                Ok(None)
            }
        }
    }

    /// Route summary for any schedule, without touching the cache.
    pub async fn schedule_summary(&self, id: &str) -> Result<Schedule> {
        self.check_session(self.recommend.summary(id).await)
    }

    /// Recomputes the route from where the traveller is now.
    ///
    /// `current_time` defaults to the local wall-clock time. Only the active
    /// schedule is refreshed this way, so the result becomes the cached
    /// selection.
    pub async fn refresh_schedule(
        &self,
        id: &str,
        position: Option<(f64, f64)>,
        current_time: Option<ClockTime>,
        cancel: &CancellationToken,
    ) -> Result<Schedule> {
        let current_time = match current_time {
            Some(time) => time,
            None => self.local_clock_time()?,
        };
        let request = ProcessRequest::update(position, Some(current_time));
        self.check_session(self.schedules.process_schedule(id, &request).await)?;
        let schedule = self.await_route(id, cancel).await?;

        self.local.selected.put(&schedule)?;
        self.local.schedules.upsert(&schedule)?;
        Ok(schedule)
    }

    /// Stores a restaurant pick on the cached selection. `None` when no
    /// valid selection is cached.
    pub fn record_restaurant(
        &self,
        section_id: &str,
        restaurant: Restaurant,
    ) -> Result<Option<Schedule>> {
        self.local.selected.record_restaurant(section_id, restaurant)
    }

    /// Forgets the local selection.
    pub fn deselect(&self) -> Result<()> {
        self.local.selected.invalidate()
    }

    async fn await_route(&self, id: &str, cancel: &CancellationToken) -> Result<Schedule> {
        let result = poll::await_arrival_time(self.schedules.as_ref(), id, &self.poll, cancel).await;
        self.check_session(result)
    }

    fn local_clock_time(&self) -> Result<ClockTime> {
        let now = self.clock.now().to_zoned(TimeZone::system()).time();
        ClockTime::new(now.hour() as u8, now.minute() as u8).map_err(|e| {
            MapzipError::Configuration {
                message: format!("Cannot read local time: {e}"),
            }
        })
    }
}
