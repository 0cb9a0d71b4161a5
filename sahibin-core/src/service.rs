//! High-level service facade combining the catalog, statistics, and external backends.

use chrono::{DateTime, Utc};

use crate::capabilities::{Capabilities, CapabilityStatus};
use crate::catalog::WasteCatalog;
use crate::model::{Coordinate, FacilitySearch, RankedFacility, StatsSnapshot, WasteCategoryInfo};
use crate::ports::{Classification, PortError, StoreError};
use crate::proximity::{DEFAULT_RANK_LIMIT, rank, search_keyword};
use crate::stats::StatisticsStore;

/// Default facility search radius in kilometres.
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 5.0;

/// Largest radius accepted by the facility search.
pub const MAX_SEARCH_RADIUS_KM: f64 = 50.0;

#[derive(thiserror::Error, Debug)]
/// Failures of the service operations.
pub enum ServiceError {
    /// The image classifier is not set up.
    #[error("Image classifier is not configured")]
    AdapterUnavailable,
    /// An external backend other than the classifier is not set up.
    #[error("{0} is not configured")]
    UpstreamUnavailable(&'static str),
    /// The request is missing or has malformed fields.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A configured backend failed.
    #[error("Upstream request failed: {0}")]
    Upstream(#[source] PortError),
    /// The statistics could not be read or written.
    #[error("Statistics storage failed: {0}")]
    Persistence(#[from] StoreError),
}

/// Result of a detect request that reached the classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectOutcome {
    /// A known category was detected and recorded.
    Detected(DetectionReport),
    /// Nothing was recognised in the image.
    NoDetection,
    /// The classifier returned a label the catalog does not know.
    UnknownCategory {
        /// Label as reported by the classifier.
        label: String,
    },
}

/// Disposal guidance for a recorded scan.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionReport {
    /// Catalog entry of the detected category.
    pub info: &'static WasteCategoryInfo,
    /// Confidence percentage, two decimals.
    pub confidence_percent: f64,
    /// When the scan was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Parameters of a facility lookup.
#[derive(Debug, Clone)]
pub struct CenterQuery {
    /// User position.
    pub origin: Coordinate,
    /// Search radius in kilometres.
    pub radius_km: f64,
    /// Category used to pick the facility type.
    pub waste_type: Option<String>,
}

/// Facilities near a user, closest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CentersReport {
    /// User position.
    pub origin: Coordinate,
    /// Radius that was searched.
    pub radius_km: f64,
    /// Keyword sent to the search backend.
    pub keyword: &'static str,
    /// Ranked facilities.
    pub centers: Vec<RankedFacility>,
}

/// Public entry point for detection, statistics, and facility lookup.
pub struct SahibinService {
    catalog: WasteCatalog,
    capabilities: Capabilities,
    stats: StatisticsStore,
}

impl SahibinService {
    /// Create a service over the given catalog, backends, and statistics store.
    #[must_use]
    pub fn new(catalog: WasteCatalog, capabilities: Capabilities, stats: StatisticsStore) -> Self {
        Self {
            catalog,
            capabilities,
            stats,
        }
    }

    /// Waste catalog used for lookups.
    #[must_use]
    pub fn catalog(&self) -> &WasteCatalog {
        &self.catalog
    }

    /// Readiness of the external backends.
    #[must_use]
    pub fn capability_status(&self) -> CapabilityStatus {
        self.capabilities.status()
    }

    /// Classify an image and record the scan when the category is known.
    ///
    /// Images without a detection or with an unknown label leave the
    /// statistics untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] for an empty image,
    /// [`ServiceError::AdapterUnavailable`] when no classifier is configured,
    /// [`ServiceError::Upstream`] when the classifier fails, and
    /// [`ServiceError::Persistence`] when the scan cannot be stored.
    pub async fn detect(&self, image: &[u8]) -> Result<DetectOutcome, ServiceError> {
        if image.is_empty() {
            return Err(ServiceError::InvalidInput("image is empty".to_owned()));
        }

        let classifier = &self.capabilities.classifier;
        if !classifier.is_configured() {
            return Err(ServiceError::AdapterUnavailable);
        }

        let detection = match classifier.classify(image).await {
            Ok(Classification::Detected(detection)) => detection,
            Ok(Classification::NoDetection) => return Ok(DetectOutcome::NoDetection),
            Err(PortError::NotConfigured) => return Err(ServiceError::AdapterUnavailable),
            Err(err) => return Err(ServiceError::Upstream(err)),
        };

        let Some(info) = self.catalog.lookup(&detection.label) else {
            log::warn!("Classifier returned unknown category {:?}", detection.label);
            return Ok(DetectOutcome::UnknownCategory {
                label: detection.label,
            });
        };

        let recorded = self
            .stats
            .record_scan(info, detection.confidence_percent())
            .await?;

        Ok(DetectOutcome::Detected(DetectionReport {
            info,
            confidence_percent: recorded.record.confidence_percent,
            timestamp: recorded.record.timestamp,
        }))
    }

    /// Current statistics.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Persistence`] when the statistics cannot be loaded.
    pub async fn stats(&self) -> Result<StatsSnapshot, ServiceError> {
        Ok(self.stats.snapshot().await?)
    }

    /// Find disposal facilities around a position, closest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] for out-of-range coordinates or radius,
    /// [`ServiceError::UpstreamUnavailable`] when facility search is not configured,
    /// and [`ServiceError::Upstream`] when the search fails.
    pub async fn find_centers(&self, query: CenterQuery) -> Result<CentersReport, ServiceError> {
        if !query.origin.is_valid() {
            return Err(ServiceError::InvalidInput(format!(
                "coordinates out of range: {}",
                query.origin
            )));
        }
        if !(query.radius_km > 0.0 && query.radius_km <= MAX_SEARCH_RADIUS_KM) {
            return Err(ServiceError::InvalidInput(format!(
                "radius must be within (0, {MAX_SEARCH_RADIUS_KM}] km"
            )));
        }

        let search = &self.capabilities.facility_search;
        if !search.is_configured() {
            return Err(ServiceError::UpstreamUnavailable("Facility search"));
        }

        let keyword = search_keyword(query.waste_type.as_deref());
        let request = FacilitySearch {
            origin: query.origin,
            radius_km: query.radius_km,
            keyword,
        };
        let candidates = match search.search(&request).await {
            Ok(candidates) => candidates,
            Err(PortError::NotConfigured) => {
                return Err(ServiceError::UpstreamUnavailable("Facility search"));
            }
            Err(err) => return Err(ServiceError::Upstream(err)),
        };

        Ok(CentersReport {
            origin: query.origin,
            radius_km: query.radius_km,
            keyword,
            centers: rank(query.origin, candidates, DEFAULT_RANK_LIMIT),
        })
    }
}
