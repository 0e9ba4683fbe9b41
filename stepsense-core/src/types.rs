//! Data model for one detection cycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Normalized polygon vertex, both coordinates in [0, 1] relative to the image
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Localized object returned by the vision service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectedObject {
    pub name: String,
    /// Outline in normalized coordinates, usually four corners clockwise from top-left
    #[serde(default)]
    pub bounding_poly: Vec<Vertex>,
}

impl DetectedObject {
    pub fn new(name: impl Into<String>, bounding_poly: Vec<Vertex>) -> Self {
        Self {
            name: name.into(),
            bounding_poly,
        }
    }
}

/// Whole-image label returned by the vision service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectedLabel {
    pub description: String,
    /// Confidence in [0, 1]
    #[serde(default)]
    pub score: f64,
}

impl DetectedLabel {
    pub fn new(description: impl Into<String>, score: f64) -> Self {
        Self {
            description: description.into(),
            score,
        }
    }
}

/// Everything one annotate call produced
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Detections {
    #[serde(default)]
    pub objects: Vec<DetectedObject>,
    #[serde(default)]
    pub labels: Vec<DetectedLabel>,
}

impl Detections {
    pub fn new(objects: Vec<DetectedObject>, labels: Vec<DetectedLabel>) -> Self {
        Self { objects, labels }
    }

    /// True when neither objects nor labels were found
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.labels.is_empty()
    }

    /// Lower-cased object names followed by lower-cased label descriptions
    pub fn names(&self) -> Vec<String> {
        self.objects
            .iter()
            .map(|o| o.name.to_lowercase())
            .chain(self.labels.iter().map(|l| l.description.to_lowercase()))
            .collect()
    }
}

/// Alert class used to pick a sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleCategory {
    Stairs,
    Wall,
    Low,
    Head,
    Ceiling,
    Default,
}

impl ObstacleCategory {
    /// Every category, `Default` last
    pub const ALL: [ObstacleCategory; 6] = [
        ObstacleCategory::Stairs,
        ObstacleCategory::Wall,
        ObstacleCategory::Low,
        ObstacleCategory::Head,
        ObstacleCategory::Ceiling,
        ObstacleCategory::Default,
    ];

    /// Categories that carry keywords, in matching priority
    pub const PRIORITY: [ObstacleCategory; 5] = [
        ObstacleCategory::Stairs,
        ObstacleCategory::Wall,
        ObstacleCategory::Low,
        ObstacleCategory::Head,
        ObstacleCategory::Ceiling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleCategory::Stairs => "stairs",
            ObstacleCategory::Wall => "wall",
            ObstacleCategory::Low => "low",
            ObstacleCategory::Head => "head",
            ObstacleCategory::Ceiling => "ceiling",
            ObstacleCategory::Default => "default",
        }
    }

    /// Sound file played for this category
    pub fn sound_asset(&self) -> &'static str {
        match self {
            ObstacleCategory::Stairs => "whistle.wav",
            ObstacleCategory::Wall => "thud.wav",
            ObstacleCategory::Low => "click.wav",
            ObstacleCategory::Head => "beep.wav",
            ObstacleCategory::Ceiling => "swoosh.wav",
            ObstacleCategory::Default => "beep.wav",
        }
    }
}

impl fmt::Display for ObstacleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObstacleCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ObstacleCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

/// What the alert volume was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionBasis {
    /// At least one localized object
    Objects,
    /// Labels only, no localized objects
    LabelsOnly,
}

/// Outcome of classifying one set of detections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub category: ObstacleCategory,
    /// Display text, e.g. `STAIRS: Stairs, Handrail`
    pub summary: String,
    /// 0-100
    pub confidence: u8,
    /// Playback volume in [0.1, 1.0]
    pub volume: f64,
    pub basis: DetectionBasis,
}

/// One still frame ready for the vision service
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    /// Base64-encoded JPEG
    pub content: String,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Utc>,
}

impl CapturedImage {
    pub fn new(content: String, width: u32, height: u32) -> Self {
        Self {
            content,
            width,
            height,
            captured_at: Utc::now(),
        }
    }
}
