//! Error types for stepsense-eye

use stepsense_core::Error as CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Camera error: {0}")]
    Camera(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Response error: {0}")]
    Response(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("OpenCV error: {0}")]
    OpenCv(String),
}

impl From<VisionError> for CoreError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::Config(msg) => CoreError::Configuration(msg),
            VisionError::Camera(_)
            | VisionError::Io(_)
            | VisionError::Image(_)
            | VisionError::OpenCv(_) => CoreError::Capture(err.to_string()),
            VisionError::Api(_) | VisionError::Response(_) | VisionError::Network(_) => {
                CoreError::Vision(err.to_string())
            }
        }
    }
}

#[cfg(feature = "opencv-camera")]
impl From<opencv::Error> for VisionError {
    fn from(err: opencv::Error) -> Self {
        VisionError::OpenCv(err.message)
    }
}
