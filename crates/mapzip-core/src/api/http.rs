//! HTTP client for the mapzip gateway.
//!
//! Provides [`HttpApi`], which implements every collaborator trait over a
//! single pooled [`reqwest::Client`]. Requests are never retried.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue, COOKIE},
    Method, RequestBuilder, Response, StatusCode, Url,
};
use serde_json::Value;

use super::{
    wire::{self, CreateBody, ErrorBody, UpdateBody},
    ProcessRequest, RecommendService, ReviewService, SchedulePayload, ScheduleService,
};
use crate::{
    error::{MapzipError, Result},
    models::{PendingReview, Schedule, ScheduleListItem},
};

/// Default gateway address.
pub const DEFAULT_BASE_URL: &str = "https://api.mapzip.shop";

/// Code reported when a 401 carries no error code of its own.
const UNAUTHORIZED_CODE: &str = "UNAUTHORIZED";

/// Gateway client for the schedule, recommend and review services.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpApi {
    /// Creates a client for `base_url` with a per-request timeout.
    ///
    /// `session_cookie`, when given, is sent as the `Cookie` header on every
    /// request so the gateway can authenticate it.
    pub fn new(base_url: &str, timeout: Duration, session_cookie: Option<&str>) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| MapzipError::Configuration {
            message: format!("invalid API base URL '{base_url}': {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(MapzipError::Configuration {
                message: format!("API base URL '{base_url}' cannot carry paths"),
            });
        }

        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            headers.insert(
                COOKIE,
                HeaderValue::from_str(cookie).map_err(|e| MapzipError::Configuration {
                    message: format!("invalid session cookie: {e}"),
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| MapzipError::Network {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(e),
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments onto the base URL, escaping each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MapzipError::Configuration {
                message: format!("API base URL '{}' cannot carry paths", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!("{method} {url}");
        Ok(self.client.request(method, url))
    }

    /// Sends a request and maps non-success statuses to errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!("Response status {status}");
        if status.is_success() {
            return Ok(response);
        }
        Err(error_for_status(status, response).await)
    }

    async fn send_json(&self, request: RequestBuilder) -> Result<Value> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| MapzipError::decode(e.to_string()))
    }
}

async fn error_for_status(status: StatusCode, response: Response) -> MapzipError {
    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let message = parsed
        .message
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED => {
            let code = parsed
                .error
                .filter(|code| !code.is_empty())
                .unwrap_or_else(|| UNAUTHORIZED_CODE.to_string());
            warn!("Gateway rejected credentials: {code}");
            MapzipError::Authentication { code }
        }
        StatusCode::CONFLICT => MapzipError::Conflict { message },
        _ => MapzipError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl ScheduleService for HttpApi {
    async fn list_schedules(&self) -> Result<Vec<ScheduleListItem>> {
        let body = self
            .send_json(self.request(Method::GET, &["schedule"])?)
            .await?;
        wire::decode_schedule_list(body)
    }

    async fn get_schedule(&self, id: &str) -> Result<Schedule> {
        let request = self.request(Method::GET, &["schedule", id])?;
        match self.send_json(request).await {
            Err(MapzipError::Api { status: 404, .. }) => Err(MapzipError::NotFound {
                id: id.to_string(),
            }),
            result => wire::decode_schedule(result?, Some(id)),
        }
    }

    async fn create_schedule(&self, payload: &SchedulePayload) -> Result<Schedule> {
        let request = self.request(Method::POST, &["schedule"])?.json(&CreateBody {
            payload,
            arrival_time: "",
        });
        wire::decode_saved_schedule(self.send_json(request).await?, payload, None)
    }

    async fn update_schedule(&self, id: &str, payload: &SchedulePayload) -> Result<Schedule> {
        let request = self.request(Method::PUT, &["schedule", id])?.json(&UpdateBody {
            payload,
            arrival_time: "",
            schedule_id: id,
        });
        wire::decode_saved_schedule(self.send_json(request).await?, payload, Some(id))
    }

    async fn delete_schedule(&self, id: &str) -> Result<()> {
        let request = self.request(Method::DELETE, &["schedule", id])?;
        match self.send(request).await {
            Err(MapzipError::Api { status: 404, .. }) => Err(MapzipError::NotFound {
                id: id.to_string(),
            }),
            result => result.map(|_| ()),
        }
    }

    async fn process_schedule(&self, id: &str, request: &ProcessRequest) -> Result<()> {
        let builder = self.request(Method::POST, &["schedule", id])?.json(request);
        self.send(builder).await.map(|_| ())
    }
}

#[async_trait]
impl RecommendService for HttpApi {
    async fn summary(&self, id: &str) -> Result<Schedule> {
        let request = self.request(Method::GET, &["recommend", "summary", id])?;
        wire::decode_schedule(self.send_json(request).await?, Some(id))
    }

    async fn active_summary(&self) -> Result<Option<Schedule>> {
        let request = self.request(Method::GET, &["recommend", "summary", "active"])?;
        wire::decode_optional_schedule(self.send_json(request).await?)
    }
}

#[async_trait]
impl ReviewService for HttpApi {
    async fn pending_reviews(&self) -> Result<Vec<PendingReview>> {
        let request = self.request(Method::GET, &["review", "pending"])?;
        wire::decode_pending_reviews(self.send_json(request).await?)
    }

    async fn pending_review(
        &self,
        restaurant_id: &str,
        scheduled_time: &str,
    ) -> Result<PendingReview> {
        let request = self
            .request(Method::GET, &["review", "pending", restaurant_id])?
            .query(&[("scheduledTime", scheduled_time)]);
        wire::decode_pending_review(self.send_json(request).await?)
    }

    async fn delete_pending_review(&self, restaurant_id: &str, scheduled_time: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, &["review", "pending", restaurant_id])?
            .query(&[("scheduledTime", scheduled_time)]);
        self.send(request).await.map(|_| ())
    }
}
