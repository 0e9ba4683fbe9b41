//! Side-effect seams used by the scanner

use crate::error::Result;
use crate::types::{CapturedImage, Detections, ObstacleCategory};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Produces one encoded still image per call
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn capture(&self) -> Result<CapturedImage>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Sends an image to a vision service and returns what it found
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Annotator: Send + Sync {
    async fn annotate(&self, image: &CapturedImage) -> Result<Detections>;
}

/// Plays the alert sound for a category.
///
/// Implementations must stop the sound, unmute it, set the volume and then
/// start it, in that order, so a repeated alert never overlaps or inherits
/// an older mute or volume state.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AlertPlayer: Send + Sync {
    async fn play_alert(&self, category: ObstacleCategory, volume: f64) -> Result<()>;
}
