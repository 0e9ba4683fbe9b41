//! Still-image sources

pub mod encode;
pub mod file;
#[cfg(feature = "opencv-camera")]
pub mod camera;

pub use file::{DirectorySource, FileSource};

use crate::config::{CaptureConfig, CaptureSourceKind};
use crate::error::VisionError;
use std::sync::Arc;
use stepsense_core::ImageSource;

/// Build the source selected in the config
pub fn source_from_config(config: &CaptureConfig) -> Result<Arc<dyn ImageSource>, VisionError> {
    config.validate().map_err(VisionError::Config)?;

    let path = || {
        config
            .path
            .clone()
            .ok_or_else(|| VisionError::Config("capture.path is required".to_string()))
    };

    let source: Arc<dyn ImageSource> = match config.source {
        CaptureSourceKind::File => Arc::new(FileSource::new(
            path()?,
            config.max_resolution,
            config.jpeg_quality,
        )?),
        CaptureSourceKind::Directory => Arc::new(DirectorySource::new(
            path()?,
            config.max_resolution,
            config.jpeg_quality,
        )?),
        #[cfg(feature = "opencv-camera")]
        CaptureSourceKind::Camera => Arc::new(camera::CameraSource::new(
            config.camera_id,
            config.max_resolution,
            config.jpeg_quality,
        )?),
        #[cfg(not(feature = "opencv-camera"))]
        CaptureSourceKind::Camera => {
            return Err(VisionError::Config(
                "camera capture is not built in; rebuild with `--features opencv-camera` \
                 or set capture.source = \"file\" or \"directory\" with capture.path"
                    .to_string(),
            ))
        }
    };

    Ok(source)
}
