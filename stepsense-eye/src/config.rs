//! Configuration for stepsense-eye

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::{Host, Url};

/// Default annotate endpoint of the Cloud Vision REST API
pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "GOOGLE_VISION_API_KEY";

/// Vision service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Annotate endpoint URL
    pub endpoint: String,

    /// API key (falls back to `GOOGLE_VISION_API_KEY`)
    pub api_key: Option<String>,

    /// Transport timeout; `None` waits indefinitely
    pub timeout_secs: Option<u64>,

    /// OBJECT_LOCALIZATION max results
    pub max_objects: u32,

    /// LABEL_DETECTION max results
    pub max_labels: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: None,
            max_objects: 5,
            max_labels: 10,
        }
    }
}

impl VisionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("Vision endpoint cannot be empty".to_string());
        }

        if self.endpoint.len() > 2048 {
            return Err("Vision endpoint URL too long (max 2048 chars)".to_string());
        }

        let url = Url::parse(&self.endpoint)
            .map_err(|e| format!("Invalid vision endpoint '{}': {}", self.endpoint, e))?;

        // Plain HTTP only for local test servers
        let loopback = match url.host() {
            Some(Host::Domain(d)) => d == "localhost",
            Some(Host::Ipv4(ip)) => ip.is_loopback(),
            Some(Host::Ipv6(ip)) => ip.is_loopback(),
            None => false,
        };
        if url.scheme() != "https" && !(url.scheme() == "http" && loopback) {
            return Err("Vision endpoint must use HTTPS".to_string());
        }

        if let Some(ref key) = self.api_key {
            if key.trim().is_empty() {
                return Err("API key cannot be empty if provided".to_string());
            }
            if key.chars().any(|c| c.is_control() || c.is_whitespace()) {
                return Err("API key contains invalid characters".to_string());
            }
        }

        if let Some(timeout) = self.timeout_secs {
            if timeout == 0 {
                return Err("Vision timeout must be greater than 0".to_string());
            }
            if timeout > 300 {
                return Err("Vision timeout too large (max 300 seconds)".to_string());
            }
        }

        if self.max_objects == 0 || self.max_objects > 100 {
            return Err("max_objects must be between 1 and 100".to_string());
        }

        if self.max_labels == 0 || self.max_labels > 100 {
            return Err("max_labels must be between 1 and 100".to_string());
        }

        Ok(())
    }

    /// Configured key, else the environment; blank values count as missing
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Where frames come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSourceKind {
    /// One image file, re-read on every capture
    File,
    /// Every image in a directory, in name order, wrapping around
    Directory,
    /// USB camera (requires the `opencv-camera` feature)
    Camera,
}

/// Capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub source: CaptureSourceKind,

    /// File or directory path for the file-based sources
    pub path: Option<PathBuf>,

    /// USB camera device index (0, 1, 2, etc.)
    pub camera_id: u32,

    /// Frames larger than this are downscaled, keeping the aspect ratio
    pub max_resolution: (u32, u32),

    /// JPEG quality 1-100
    pub jpeg_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: CaptureSourceKind::Camera,
            path: None,
            camera_id: 0,
            max_resolution: (1280, 720),
            jpeg_quality: 70,
        }
    }
}

impl CaptureConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        match self.source {
            CaptureSourceKind::File | CaptureSourceKind::Directory => {
                if self.path.is_none() {
                    return Err(format!("capture.path is required for the {:?} source", self.source));
                }
            }
            CaptureSourceKind::Camera => {
                if self.camera_id > 100 {
                    return Err("Camera ID too large (max 100)".to_string());
                }
            }
        }

        if self.max_resolution.0 == 0 || self.max_resolution.1 == 0 {
            return Err("Resolution must be non-zero".to_string());
        }

        if self.max_resolution.0 > 7680 || self.max_resolution.1 > 4320 {
            return Err("Resolution too large (max 8K)".to_string());
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err("JPEG quality must be between 1 and 100".to_string());
        }

        Ok(())
    }
}
