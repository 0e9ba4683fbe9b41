//! Cloud Vision REST client

use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::wire::{AnnotateRequest, AnnotateResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use stepsense_core::{Annotator, CapturedImage, Detections};
use tracing::{debug, warn};
use url::Url;

/// Largest error body echoed into an error message
const MAX_ERROR_BODY: usize = 512;

/// Client for the `images:annotate` endpoint
pub struct CloudVisionClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    max_objects: u32,
    max_labels: u32,
}

impl CloudVisionClient {
    /// Create a client; fails when the config is invalid or no API key is available
    pub fn new(config: &VisionConfig) -> Result<Self, VisionError> {
        config.validate().map_err(VisionError::Config)?;

        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| VisionError::Config("Vision API key not provided".to_string()))?;

        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| VisionError::Config(format!("Invalid vision endpoint: {}", e)))?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| VisionError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            max_objects: config.max_objects,
            max_labels: config.max_labels,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Request body for one captured image
    pub fn build_request(&self, image: &CapturedImage) -> AnnotateRequest {
        AnnotateRequest::objects_and_labels(image.content.clone(), self.max_objects, self.max_labels)
    }

    /// Send one image and return its objects and labels
    pub async fn annotate_image(&self, image: &CapturedImage) -> Result<Detections, VisionError> {
        let request = self.build_request(image);
        debug!(
            "POST {} ({} base64 bytes)",
            self.endpoint,
            image.content.len()
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();
            warn!("Vision API returned {}", status);
            return Err(VisionError::Api(format!("HTTP {}: {}", status, excerpt)));
        }

        let detections = AnnotateResponse::from_json(&body)?.into_detections()?;
        debug!(
            "Vision API found {} objects and {} labels",
            detections.objects.len(),
            detections.labels.len()
        );
        Ok(detections)
    }
}

#[async_trait]
impl Annotator for CloudVisionClient {
    async fn annotate(&self, image: &CapturedImage) -> stepsense_core::Result<Detections> {
        Ok(self.annotate_image(image).await?)
    }
}
