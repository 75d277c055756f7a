//! Bounded polling for the route calculator's arrival time.

use std::time::Duration;

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::{
    api::ScheduleService,
    error::{MapzipError, Result},
    models::Schedule,
};

/// How often and how long to wait for a calculated arrival time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total number of detail fetches, at least one
    pub attempts: u32,
    /// Fixed pause between fetches
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_secs(2),
        }
    }
}

/// Fetches the schedule until it carries a calculated arrival time.
///
/// Transient fetch failures use up an attempt and polling continues;
/// authentication failures end it immediately. Fails with
/// [`MapzipError::Timeout`] once every attempt came back without an arrival
/// time and with [`MapzipError::Cancelled`] as soon as `cancel` fires.
pub async fn await_arrival_time(
    service: &dyn ScheduleService,
    id: &str,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<Schedule> {
    let attempts = policy.attempts.max(1);

    for attempt in 1..=attempts {
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(MapzipError::Cancelled),
            fetched = service.get_schedule(id) => fetched,
        };

        match fetched {
            Ok(schedule) if schedule.has_arrival_time() => {
                debug!("Arrival time for {id} ready after {attempt} attempt(s)");
                return Ok(schedule);
            }
            Ok(_) => debug!("Arrival time for {id} pending ({attempt}/{attempts})"),
            Err(e) if e.is_authentication() => return Err(e),
            Err(e) => warn!("Polling schedule {id} failed ({attempt}/{attempts}): {e}"),
        }

        if attempt < attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(MapzipError::Cancelled),
                _ = tokio::time::sleep(policy.interval) => {}
            }
        }
    }

    Err(MapzipError::Timeout { attempts })
}
