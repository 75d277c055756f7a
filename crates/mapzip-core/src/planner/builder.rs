//! Builder for creating and configuring TripPlanner instances.

use std::{path::Path, sync::Arc};

use tokio::task;

use super::TripPlanner;
use crate::{
    api::{HttpApi, RecommendService, ReviewService, ScheduleService},
    cache::LocalState,
    config::ClientConfig,
    error::{MapzipError, Result},
    poll::PollPolicy,
    store::{Clock, KeyValueStore, SqliteStore, SystemClock},
};

struct Services {
    schedules: Arc<dyn ScheduleService>,
    recommend: Arc<dyn RecommendService>,
    reviews: Arc<dyn ReviewService>,
}

/// Builder for creating and configuring TripPlanner instances.
///
/// Without overrides the planner talks to the gateway named in the
/// configuration and keeps its local state in SQLite.
pub struct TripPlannerBuilder {
    config: ClientConfig,
    store: Option<Arc<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
    services: Option<Services>,
}

impl TripPlannerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ClientConfig::default())
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            store: None,
            clock: None,
            services: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    /// Sets a custom store file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/mapzip/mapzip.db` or `~/.local/share/mapzip/mapzip.db`
    pub fn with_store_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.config.store_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Uses an already opened store instead of the SQLite file.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.config.poll = poll;
        self
    }

    /// Uses one object for all three collaborators instead of the gateway
    /// client.
    pub fn with_services<T>(mut self, services: Arc<T>) -> Self
    where
        T: ScheduleService + RecommendService + ReviewService + 'static,
    {
        self.services = Some(Services {
            schedules: services.clone(),
            recommend: services.clone(),
            reviews: services,
        });
        self
    }

    /// Builds the configured planner instance.
    ///
    /// # Errors
    ///
    /// Returns `MapzipError::Configuration` if the base URL is invalid
    /// Returns `MapzipError::Store` if the store cannot be opened
    pub async fn build(self) -> Result<TripPlanner> {
        let services = match self.services {
            Some(services) => services,
            None => {
                let api = Arc::new(HttpApi::new(
                    &self.config.api_base_url,
                    self.config.http_timeout,
                    self.config.session_cookie.as_deref(),
                )?);
                Services {
                    schedules: api.clone(),
                    recommend: api.clone(),
                    reviews: api,
                }
            }
        };

        let store: Arc<dyn KeyValueStore> = match self.store {
            Some(store) => store,
            None => {
                let path = match self.config.store_path {
                    Some(path) => path,
                    None => SqliteStore::default_path()?,
                };
                let store = task::spawn_blocking(move || SqliteStore::open(path))
                    .await
                    .map_err(|e| MapzipError::Configuration {
                        message: format!("Task join error: {e}"),
                    })??;
                Arc::new(store)
            }
        };

        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };

        Ok(TripPlanner {
            schedules: services.schedules,
            recommend: services.recommend,
            reviews: services.reviews,
            local: LocalState::new(store, clock.clone()),
            clock,
            poll: self.config.poll,
        })
    }
}

impl Default for TripPlannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
