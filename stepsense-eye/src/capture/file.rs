//! File-backed image sources

use crate::capture::encode::encode_bytes;
use crate::error::VisionError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use stepsense_core::{CapturedImage, ImageSource};
use tracing::debug;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

async fn load(path: &Path, max: (u32, u32), quality: u8) -> Result<CapturedImage, VisionError> {
    let bytes = tokio::fs::read(path).await?;
    // Decoding and re-encoding are CPU bound
    tokio::task::spawn_blocking(move || encode_bytes(&bytes, max, quality))
        .await
        .map_err(|e| VisionError::Camera(format!("Encoder task failed: {}", e)))?
}

/// A single image file, re-read on every capture
pub struct FileSource {
    path: PathBuf,
    max_resolution: (u32, u32),
    jpeg_quality: u8,
}

impl FileSource {
    pub fn new(path: PathBuf, max_resolution: (u32, u32), jpeg_quality: u8) -> Result<Self, VisionError> {
        if !path.is_file() {
            return Err(VisionError::Camera(format!("Image file not found: {}", path.display())));
        }
        Ok(Self {
            path,
            max_resolution,
            jpeg_quality,
        })
    }
}

#[async_trait]
impl ImageSource for FileSource {
    async fn capture(&self) -> stepsense_core::Result<CapturedImage> {
        debug!("Reading frame from {}", self.path.display());
        Ok(load(&self.path, self.max_resolution, self.jpeg_quality).await?)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Every image in a directory, taken in name order and wrapping around
pub struct DirectorySource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    next: Mutex<usize>,
    max_resolution: (u32, u32),
    jpeg_quality: u8,
}

impl DirectorySource {
    pub fn new(dir: PathBuf, max_resolution: (u32, u32), jpeg_quality: u8) -> Result<Self, VisionError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_image_extension(p))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(VisionError::Camera(format!(
                "No images found in {}",
                dir.display()
            )));
        }

        Ok(Self {
            dir,
            files,
            next: Mutex::new(0),
            max_resolution,
            jpeg_quality,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Path the next capture will read, advancing the cursor
    fn advance(&self) -> PathBuf {
        let mut next = self.next.lock();
        let path = self.files[*next % self.files.len()].clone();
        *next = (*next + 1) % self.files.len();
        path
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[async_trait]
impl ImageSource for DirectorySource {
    async fn capture(&self) -> stepsense_core::Result<CapturedImage> {
        let path = self.advance();
        debug!("Reading frame from {}", path.display());
        Ok(load(&path, self.max_resolution, self.jpeg_quality).await?)
    }

    fn describe(&self) -> String {
        format!("directory {} ({} images)", self.dir.display(), self.files.len())
    }
}
