//! USB webcam capture

use crate::error::VisionError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use opencv::{
    core::{Mat, Size, Vector},
    imgcodecs, imgproc,
    prelude::*,
    videoio::{VideoCapture, CAP_ANY},
};
use parking_lot::Mutex;
use std::sync::Arc;
use stepsense_core::{CapturedImage, ImageSource};
use tracing::{debug, info};

/// Camera opened lazily on first capture and kept open afterwards
pub struct CameraSource {
    camera_id: u32,
    max_resolution: (u32, u32),
    jpeg_quality: u8,
    capture: Arc<Mutex<Option<VideoCapture>>>,
}

impl CameraSource {
    pub fn new(camera_id: u32, max_resolution: (u32, u32), jpeg_quality: u8) -> Result<Self, VisionError> {
        Ok(Self {
            camera_id,
            max_resolution,
            jpeg_quality,
            capture: Arc::new(Mutex::new(None)),
        })
    }

    fn open(camera_id: u32) -> Result<VideoCapture, VisionError> {
        let capture = VideoCapture::new(camera_id as i32, CAP_ANY)
            .map_err(|e| VisionError::Camera(format!("Failed to open camera {}: {}", camera_id, e)))?;

        if !capture.is_opened()? {
            return Err(VisionError::Camera(format!("Camera {} failed to open", camera_id)));
        }
        info!("Camera {} opened", camera_id);
        Ok(capture)
    }

    fn grab(
        slot: &Mutex<Option<VideoCapture>>,
        camera_id: u32,
        max: (u32, u32),
        quality: u8,
    ) -> Result<CapturedImage, VisionError> {
        let mut guard = slot.lock();
        if guard.is_none() {
            *guard = Some(Self::open(camera_id)?);
        }
        let capture = guard
            .as_mut()
            .ok_or_else(|| VisionError::Camera("Camera not initialized".to_string()))?;

        let mut frame = Mat::default();
        if !capture.read(&mut frame)? || frame.empty() {
            // Drop the handle so the next trigger reopens the device
            *guard = None;
            return Err(VisionError::Camera(format!("Camera {} returned no frame", camera_id)));
        }
        drop(guard);

        let frame = fit_within(frame, max)?;
        let (width, height) = (frame.cols() as u32, frame.rows() as u32);

        let params = Vector::<i32>::from_slice(&[imgcodecs::IMWRITE_JPEG_QUALITY, quality as i32]);
        let mut jpeg = Vector::<u8>::new();
        if !imgcodecs::imencode(".jpg", &frame, &mut jpeg, &params)? {
            return Err(VisionError::Camera("JPEG encoding failed".to_string()));
        }

        debug!("Captured {}x{} frame ({} JPEG bytes)", width, height, jpeg.len());
        Ok(CapturedImage::new(STANDARD.encode(jpeg.to_vec()), width, height))
    }
}

/// Downscale keeping the aspect ratio when the frame exceeds `max`
fn fit_within(frame: Mat, max: (u32, u32)) -> Result<Mat, VisionError> {
    let (width, height) = (frame.cols() as f64, frame.rows() as f64);
    let scale = (max.0 as f64 / width).min(max.1 as f64 / height);
    if scale >= 1.0 {
        return Ok(frame);
    }

    let target = Size::new(
        ((width * scale).round() as i32).max(1),
        ((height * scale).round() as i32).max(1),
    );
    let mut resized = Mat::default();
    imgproc::resize(&frame, &mut resized, target, 0.0, 0.0, imgproc::INTER_AREA)?;
    Ok(resized)
}

#[async_trait]
impl ImageSource for CameraSource {
    async fn capture(&self) -> stepsense_core::Result<CapturedImage> {
        let slot = self.capture.clone();
        let (camera_id, max, quality) = (self.camera_id, self.max_resolution, self.jpeg_quality);
        let image = tokio::task::spawn_blocking(move || Self::grab(&slot, camera_id, max, quality))
            .await
            .map_err(|e| VisionError::Camera(format!("Capture task failed: {}", e)))??;
        Ok(image)
    }

    fn describe(&self) -> String {
        format!("camera {}", self.camera_id)
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        *self.capture.lock() = None;
        info!("Camera {} released", self.camera_id);
    }
}
