//! stepsense-eye: capture and annotation
//!
//! Turns a camera frame or image file into a base64 JPEG and asks a cloud
//! vision service what is in it. Implements the `ImageSource` and
//! `Annotator` ports of stepsense-core.

pub mod error;
pub mod config;
pub mod capture;
pub mod wire;
pub mod client;

pub use error::VisionError;
pub use config::{CaptureConfig, CaptureSourceKind, VisionConfig};
pub use capture::{source_from_config, DirectorySource, FileSource};
pub use client::CloudVisionClient;

#[cfg(feature = "opencv-camera")]
pub use capture::camera::CameraSource;
