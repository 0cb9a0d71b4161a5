//! Bundle of external capabilities injected into the service.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::model::{FacilityCandidate, FacilitySearch};
use crate::ports::{Classification, ClassifierPort, FacilitySearchPort, PortError};

/// External backends used by [`crate::service::SahibinService`].
#[derive(Clone)]
pub struct Capabilities {
    /// Image classifier.
    pub classifier: Arc<dyn ClassifierPort>,
    /// Nearby facility search.
    pub facility_search: Arc<dyn FacilitySearchPort>,
}

impl Capabilities {
    /// Bundle the given backends.
    #[must_use]
    pub fn new(
        classifier: Arc<dyn ClassifierPort>,
        facility_search: Arc<dyn FacilitySearchPort>,
    ) -> Self {
        Self {
            classifier,
            facility_search,
        }
    }

    /// Bundle where no backend is configured.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::new(Arc::new(Unconfigured), Arc::new(Unconfigured))
    }

    /// Which backends are ready for use.
    #[must_use]
    pub fn status(&self) -> CapabilityStatus {
        CapabilityStatus {
            classifier: self.classifier.is_configured(),
            facility_search: self.facility_search.is_configured(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Readiness of each external backend.
pub struct CapabilityStatus {
    /// Whether images can be classified.
    pub classifier: bool,
    /// Whether facilities can be searched.
    pub facility_search: bool,
}

/// Placeholder backend that reports itself as not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait]
impl ClassifierPort for Unconfigured {
    fn is_configured(&self) -> bool {
        false
    }

    async fn classify(&self, _image: &[u8]) -> Result<Classification, PortError> {
        Err(PortError::NotConfigured)
    }
}

#[async_trait]
impl FacilitySearchPort for Unconfigured {
    fn is_configured(&self) -> bool {
        false
    }

    async fn search(&self, _query: &FacilitySearch) -> Result<Vec<FacilityCandidate>, PortError> {
        Err(PortError::NotConfigured)
    }
}
