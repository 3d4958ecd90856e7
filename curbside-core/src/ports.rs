//! Traits describing the upstream schedule provider and its error taxonomy.

use async_trait::async_trait;
use reqwest::{Error as ReqwestError, StatusCode};

use crate::model::{DateRange, LocationId, RawEvent};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the schedule provider.
pub enum PortError {
    /// Address resolution returned no candidates.
    #[error("Address not found")]
    AddressNotFound,
    /// Transport failure, a status other than 200 OK, or an undecodable address lookup.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] UpstreamFailure),
    /// Schedule response did not match the expected shape.
    #[error("Schedule parse error: {0}")]
    ScheduleParse(String),
}

#[derive(thiserror::Error, Debug)]
/// Cause of an unavailable upstream.
pub enum UpstreamFailure {
    /// Request could not be sent, timed out, got a 4xx/5xx status, or its body could not be read.
    #[error(transparent)]
    Transport(#[from] ReqwestError),
    /// Upstream answered with a status other than 200 OK.
    #[error("unexpected status {0}")]
    Status(StatusCode),
}

impl From<ReqwestError> for PortError {
    fn from(err: ReqwestError) -> Self {
        Self::UpstreamUnavailable(UpstreamFailure::Transport(err))
    }
}

impl From<StatusCode> for PortError {
    fn from(status: StatusCode) -> Self {
        Self::UpstreamUnavailable(UpstreamFailure::Status(status))
    }
}

#[async_trait]
/// Trait for turning a free-text address into an upstream location.
pub trait AddressPort: Send + Sync {
    /// Resolve the address to the most relevant location.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::AddressNotFound`] when nothing matches, or
    /// [`PortError::UpstreamUnavailable`] when the provider request fails.
    async fn resolve(&self, address: &str) -> Result<LocationId, PortError>;
}

#[async_trait]
/// Trait for fetching upcoming pickup events of a location.
pub trait SchedulePort: Send + Sync {
    /// Fetch raw events for a location within the given window.
    ///
    /// Events are returned in ascending day order.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UpstreamUnavailable`] when the provider request fails
    /// and [`PortError::ScheduleParse`] when the response cannot be decoded.
    async fn events(
        &self,
        location: &LocationId,
        range: DateRange,
    ) -> Result<Vec<RawEvent>, PortError>;
}
