//! Provider implementation for municipal schedules hosted on the `ReCollect` API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use curbside_core::{
    model::{DATE_FORMAT, DateRange, LocationId, RawEvent},
    ports::{AddressPort, PortError, SchedulePort},
    service::CurbsideService,
};

/// Public API root of the provider.
pub const DEFAULT_BASE_URL: &str = "https://api.recollect.net/api";
/// Municipality served when nothing else is configured (Cary, NC).
pub const DEFAULT_AREA: &str = "CaryNC";
/// Curbside collection service of [`DEFAULT_AREA`].
pub const DEFAULT_SERVICE_ID: u32 = 1087;
/// Upper bound for each upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "curbside/0.1";

/// Candidate returned by /areas/{area}/services/{service}/address-suggest
#[derive(Debug, Deserialize)]
struct AddressSuggestion {
    place_id: String,
    // name, source and the rest are not needed
}

/// Response from /places/{place}/services/{service}/events
#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Clone)]
/// Connection settings for a `ReCollect` municipality.
pub struct RecollectConfig {
    base_url: String,
    area: String,
    service_id: u32,
    timeout: Duration,
}

impl RecollectConfig {
    /// Settings for the given area and service on the public API.
    #[must_use]
    pub fn new<S: Into<String>>(area: S, service_id: u32) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            area: area.into(),
            service_id,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point the provider at another API root.
    #[must_use]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Replace the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// API root requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Municipality slug, e.g. `CaryNC`.
    #[must_use]
    pub fn area(&self) -> &str {
        &self.area
    }

    /// Collection service identifier within the area.
    #[must_use]
    pub fn service_id(&self) -> u32 {
        self.service_id
    }

    /// Upper bound for each upstream call.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn address_suggest_url(&self) -> String {
        format!(
            "{}/areas/{}/services/{}/address-suggest",
            self.base_url, self.area, self.service_id
        )
    }

    fn events_url(&self, location: &LocationId) -> String {
        format!(
            "{}/places/{location}/services/{}/events",
            self.base_url, self.service_id
        )
    }
}

impl Default for RecollectConfig {
    fn default() -> Self {
        Self::new(DEFAULT_AREA, DEFAULT_SERVICE_ID)
    }
}

/// Address resolution against the address-suggest endpoint.
pub struct RecollectAddressPort {
    client: Client,
    config: Arc<RecollectConfig>,
}

impl RecollectAddressPort {
    /// Create a new address port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: Arc<RecollectConfig>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl AddressPort for RecollectAddressPort {
    async fn resolve(&self, address: &str) -> Result<LocationId, PortError> {
        let request = self
            .client
            .get(self.config.address_suggest_url())
            .query(&[("q", address)])
            .build()?;

        let suggestions = execute(&self.client, request)
            .await?
            .json::<Vec<AddressSuggestion>>()
            .await
            .inspect_err(|err| warn!(error = %err, "failed to decode the address lookup response"))?;

        // The first suggestion is the most accurate one.
        let Some(first) = suggestions.into_iter().next() else {
            info!(address, "the address wasn't found");
            return Err(PortError::AddressNotFound);
        };

        info!(place_id = %first.place_id, "found the address id");
        Ok(LocationId(first.place_id))
    }
}

/// Pickup events from the events endpoint.
pub struct RecollectSchedulePort {
    client: Client,
    config: Arc<RecollectConfig>,
}

impl RecollectSchedulePort {
    /// Create a new schedule port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: Arc<RecollectConfig>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SchedulePort for RecollectSchedulePort {
    async fn events(
        &self,
        location: &LocationId,
        range: DateRange,
    ) -> Result<Vec<RawEvent>, PortError> {
        let after = range.start.format(DATE_FORMAT).to_string();
        let before = range.end.format(DATE_FORMAT).to_string();

        let request = self
            .client
            .get(self.config.events_url(location))
            .query(&[
                ("nomerge", "1"),
                ("hide", "reminder_only"),
                ("after", after.as_str()),
                ("before", before.as_str()),
            ])
            .build()?;

        let schedule = execute(&self.client, request)
            .await?
            .json::<EventsResponse>()
            .await
            .map_err(|err| {
                warn!(error = %err, "failed to decode the schedule lookup response");
                if err.is_decode() {
                    PortError::ScheduleParse(err.to_string())
                } else {
                    PortError::from(err)
                }
            })?;

        debug!(events = schedule.events.len(), "received schedule events");
        Ok(schedule.events)
    }
}

/// Build an HTTP client that enforces the configured timeout on every call.
///
/// # Errors
///
/// Returns [`PortError::UpstreamUnavailable`] when the TLS backend cannot be initialised.
pub fn client(config: &RecollectConfig) -> Result<Client, PortError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout)
        .build()
        .map_err(PortError::from)
}

/// Build the query service backed by this provider.
///
/// # Errors
///
/// Returns [`PortError::UpstreamUnavailable`] when the HTTP client cannot be built.
pub fn service(config: RecollectConfig) -> Result<CurbsideService, PortError> {
    let client = client(&config)?;
    let config = Arc::new(config);

    let address_port = Arc::new(RecollectAddressPort::new(client.clone(), Arc::clone(&config)));
    let schedule_port = Arc::new(RecollectSchedulePort::new(client, config));

    Ok(CurbsideService::new(address_port, schedule_port))
}

// Send a prepared request and reject anything but 200 OK.
async fn execute(client: &Client, request: Request) -> Result<Response, PortError> {
    debug!(url = %request.url(), "making an HTTP request");
    let response = client
        .execute(request)
        .await
        .and_then(Response::error_for_status)
        .inspect_err(|err| warn!(error = %err, "the upstream request failed"))?;

    let status = response.status();
    if status != StatusCode::OK {
        warn!(%status, url = %response.url(), "the upstream request did not return 200 OK");
        return Err(PortError::from(status));
    }

    Ok(response)
}
