//! JSON shapes of the `images:annotate` REST call

use crate::error::VisionError;
use serde::{Deserialize, Serialize};
use stepsense_core::{DetectedLabel, DetectedObject, Detections, Vertex};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotateRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotateImageRequest {
    pub image: ImageContent,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageContent {
    /// Base64-encoded image bytes
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub max_results: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    ObjectLocalization,
    LabelDetection,
}

impl AnnotateRequest {
    /// Single-image request asking for objects and labels
    pub fn objects_and_labels(content: String, max_objects: u32, max_labels: u32) -> Self {
        Self {
            requests: vec![AnnotateImageRequest {
                image: ImageContent { content },
                features: vec![
                    Feature {
                        kind: FeatureType::ObjectLocalization,
                        max_results: max_objects,
                    },
                    Feature {
                        kind: FeatureType::LabelDetection,
                        max_results: max_labels,
                    },
                ],
            }],
        }
    }
}

/// Top-level response; every field may be missing
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    pub localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    #[serde(default)]
    pub label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    pub error: Option<Status>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedObjectAnnotation {
    #[serde(default)]
    pub mid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub bounding_poly: BoundingPoly,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingPoly {
    #[serde(default)]
    pub normalized_vertices: Vec<Vertex>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAnnotation {
    #[serde(default)]
    pub mid: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub topicality: f64,
}

/// `google.rpc.Status` carried in a per-image error
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl AnnotateResponse {
    /// Parse a raw response body
    pub fn from_json(body: &str) -> Result<Self, VisionError> {
        serde_json::from_str(body)
            .map_err(|e| VisionError::Response(format!("Malformed annotate response: {}", e)))
    }

    /// Objects and labels of the first image. A missing first response
    /// yields empty detections; a per-image error is returned as an error.
    pub fn into_detections(self) -> Result<Detections, VisionError> {
        let first = match self.responses.into_iter().next() {
            Some(first) => first,
            None => return Ok(Detections::default()),
        };

        if let Some(status) = first.error {
            if status.code != 0 || !status.message.is_empty() {
                return Err(VisionError::Api(format!(
                    "annotate failed with code {}: {}",
                    status.code, status.message
                )));
            }
        }

        let objects = first
            .localized_object_annotations
            .into_iter()
            .map(|o| DetectedObject::new(o.name, o.bounding_poly.normalized_vertices))
            .collect();
        let labels = first
            .label_annotations
            .into_iter()
            .map(|l| DetectedLabel::new(l.description, l.score))
            .collect();

        Ok(Detections::new(objects, labels))
    }
}
