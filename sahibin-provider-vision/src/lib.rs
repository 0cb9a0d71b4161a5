//! Image classifier calling an HTTP object detection endpoint.
//!
//! The endpoint receives the encoded image as the request body and answers
//! with the detected regions:
//!
//! ```json
//! { "predictions": [ { "class": "GLASS", "confidence": 0.93 } ] }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use sahibin_core::{
    model::Detection,
    ports::{Classification, ClassifierPort, PortError},
};

/// Connection settings for the detection endpoint.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// URL receiving the image.
    pub endpoint: String,
    /// Optional key sent as the `api_key` query parameter.
    pub api_key: Option<String>,
}

/// Response from the detection endpoint
#[derive(Debug, Deserialize)]
struct InferenceResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

/// Single detected region
#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(rename = "class", alias = "label")]
    class_name: String,
    confidence: f64,
}

/// Classifier backed by the detection endpoint.
pub struct HttpClassifier {
    client: Client,
    config: Option<VisionConfig>,
}

impl HttpClassifier {
    /// Create a classifier bound to the given HTTP client. Without a config the
    /// classifier reports itself as not configured.
    #[must_use]
    pub fn new(client: Client, config: Option<VisionConfig>) -> Self {
        let config = config.filter(|config| !config.endpoint.trim().is_empty());
        Self { client, config }
    }
}

#[async_trait]
impl ClassifierPort for HttpClassifier {
    fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    async fn classify(&self, image: &[u8]) -> Result<Classification, PortError> {
        let Some(config) = &self.config else {
            return Err(PortError::NotConfigured);
        };

        let mut req = self
            .client
            .post(&config.endpoint)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec());

        if let Some(api_key) = config.api_key.as_deref() {
            req = req.query(&[("api_key", api_key)]);
        }

        let resp = fetch_json::<InferenceResponse>(req).await?;
        let classification = best_prediction(resp)?;

        if let Classification::Detected(detection) = &classification {
            log::debug!(
                "Classifier detected {} ({:.3})",
                detection.label,
                detection.confidence
            );
        }

        Ok(classification)
    }
}

/// Build the classifier port for the detection endpoint.
#[must_use]
pub fn plugin(client: Client, config: Option<VisionConfig>) -> Arc<dyn ClassifierPort> {
    Arc::new(HttpClassifier::new(client, config))
}

/// Pick the highest-confidence region, rejecting malformed predictions.
fn best_prediction(resp: InferenceResponse) -> Result<Classification, PortError> {
    let mut best: Option<Prediction> = None;

    for prediction in resp.predictions {
        if prediction.class_name.trim().is_empty() {
            return Err(PortError::InvalidResponse("prediction without class".into()));
        }
        if !(0.0..=1.0).contains(&prediction.confidence) {
            return Err(PortError::InvalidResponse(format!(
                "confidence {} outside [0, 1]",
                prediction.confidence
            )));
        }

        // Strictly greater keeps the first of equal scores.
        if best
            .as_ref()
            .is_none_or(|current| prediction.confidence > current.confidence)
        {
            best = Some(prediction);
        }
    }

    Ok(best.map_or(Classification::NoDetection, |prediction| {
        Classification::Detected(Detection::new(prediction.class_name, prediction.confidence))
    }))
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}
