//! Traits describing external capabilities and shared error types.

use std::io::Error as IoError;

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;

use crate::model::{Detection, FacilityCandidate, FacilitySearch, StatisticsAggregate};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to external capabilities.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The capability has no credentials or endpoint.
    #[error("Not configured")]
    NotConfigured,
    /// The provider answered with an error status.
    #[error("Provider error: {0}")]
    Provider(String),
    /// The provider response could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(thiserror::Error, Debug)]
/// Errors raised while loading or persisting the statistics document.
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
    /// The stored document could not be encoded or decoded.
    #[error("Corrupt statistics document: {0}")]
    Json(#[from] JsonError),
    /// The backing storage refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    /// The writer task stopped before finishing.
    #[error("Statistics writer aborted: {0}")]
    Aborted(String),
}

/// Outcome of classifying a single image.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The best-scoring region.
    Detected(Detection),
    /// The classifier found nothing.
    NoDetection,
}

#[async_trait]
/// Image classifier backend.
pub trait ClassifierPort: Send + Sync {
    /// Whether the backend is ready to accept images.
    fn is_configured(&self) -> bool;

    /// Classify the given encoded image.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::NotConfigured`] when the backend is not set up, or another
    /// [`PortError`] when the request fails.
    async fn classify(&self, image: &[u8]) -> Result<Classification, PortError>;
}

#[async_trait]
/// Nearby facility search backend.
pub trait FacilitySearchPort: Send + Sync {
    /// Whether the backend has the credentials it needs.
    fn is_configured(&self) -> bool;

    /// Find facilities around `query.origin`, in provider order.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::NotConfigured`] when the backend is not set up, or another
    /// [`PortError`] when the request fails.
    async fn search(&self, query: &FacilitySearch) -> Result<Vec<FacilityCandidate>, PortError>;
}

#[async_trait]
/// Durable document store holding the statistics aggregate.
pub trait StatsRepository: Send + Sync {
    /// Load the stored aggregate, `None` when nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the storage cannot be read or the document is corrupt.
    async fn load(&self) -> Result<Option<StatisticsAggregate>, StoreError>;

    /// Replace the stored aggregate as one unit.
    ///
    /// Implementations must leave the previous document intact when they fail.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the document cannot be written.
    async fn save(&self, aggregate: &StatisticsAggregate) -> Result<(), StoreError>;
}
