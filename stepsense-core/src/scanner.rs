//! Scanner: one capture → annotate → classify → play cycle per trigger

use crate::classifier::Classifier;
use crate::error::{Error, Result};
use crate::pipeline::evaluate;
use crate::ports::{AlertPlayer, Annotator, ImageSource};
use crate::types::{DetectedLabel, DetectionResult, Detections};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Where the current cycle is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanPhase {
    Idle,
    Capturing,
    Annotating,
    Classifying,
    Playing,
}

/// What the user currently sees
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayState {
    /// Empty when nothing is shown
    pub summary: String,
    /// Raw labels of the last successful annotate call
    pub labels: Vec<DetectedLabel>,
    /// 0-100, 0 hides the score
    pub confidence: u8,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Result of a cycle that completed
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Something was detected and its alert played (or was skipped on replay)
    Alerted(DetectionResult),
    /// The vision service found neither objects nor labels
    NothingDetected,
}

impl ScanOutcome {
    pub fn result(&self) -> Option<&DetectionResult> {
        match self {
            ScanOutcome::Alerted(result) => Some(result),
            ScanOutcome::NothingDetected => None,
        }
    }
}

/// Drives detection cycles and owns the display state.
///
/// Only one cycle runs at a time; a trigger while busy fails with
/// [`Error::Busy`]. Any failure inside a cycle is logged, zeroes the
/// confidence and leaves the rest of the display untouched.
pub struct Scanner {
    source: Arc<dyn ImageSource>,
    annotator: Arc<dyn Annotator>,
    player: Arc<dyn AlertPlayer>,
    classifier: Classifier,
    busy: AtomicBool,
    phase: RwLock<ScanPhase>,
    display: RwLock<DisplayState>,
}

/// Holds the busy flag for the duration of one cycle
struct BusyGuard<'a> {
    scanner: &'a Scanner,
}

impl<'a> BusyGuard<'a> {
    fn acquire(scanner: &'a Scanner) -> Result<Self> {
        scanner
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy)?;
        Ok(Self { scanner })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.scanner.phase.write() = ScanPhase::Idle;
        self.scanner.busy.store(false, Ordering::Release);
    }
}

impl Scanner {
    pub fn new(
        source: Arc<dyn ImageSource>,
        annotator: Arc<dyn Annotator>,
        player: Arc<dyn AlertPlayer>,
        classifier: Classifier,
    ) -> Self {
        Self {
            source,
            annotator,
            player,
            classifier,
            busy: AtomicBool::new(false),
            phase: RwLock::new(ScanPhase::Idle),
            display: RwLock::new(DisplayState::default()),
        }
    }

    pub fn phase(&self) -> ScanPhase {
        *self.phase.read()
    }

    /// True while a cycle is in flight; the trigger should be disabled
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn display(&self) -> DisplayState {
        self.display.read().clone()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Run one full detection cycle
    pub async fn scan(&self) -> Result<ScanOutcome> {
        let _guard = BusyGuard::acquire(self)?;
        let result = self.run_cycle().await;
        self.finish(result)
    }

    /// Present detections obtained elsewhere (e.g. a saved response),
    /// skipping capture and annotate. Playback only happens when `play` is set.
    pub async fn present(&self, detections: Detections, play: bool) -> Result<ScanOutcome> {
        let _guard = BusyGuard::acquire(self)?;
        let result = self.feedback(detections, play).await;
        self.finish(result)
    }

    async fn run_cycle(&self) -> Result<ScanOutcome> {
        self.enter(ScanPhase::Capturing);
        let image = self.source.capture().await?;
        debug!("Captured {}x{} frame", image.width, image.height);

        self.enter(ScanPhase::Annotating);
        let detections = self.annotator.annotate(&image).await?;

        self.feedback(detections, true).await
    }

    async fn feedback(&self, detections: Detections, play: bool) -> Result<ScanOutcome> {
        self.display.write().labels = detections.labels.clone();

        self.enter(ScanPhase::Classifying);
        let outcome = match evaluate(&self.classifier, &detections) {
            None => {
                info!("No obstacle detected");
                self.display.write().summary.clear();
                ScanOutcome::NothingDetected
            }
            Some(result) => {
                info!(
                    category = %result.category,
                    objects = detections.objects.len(),
                    labels = detections.labels.len(),
                    "Obstacle detected: {}",
                    result.summary
                );
                self.display.write().summary = result.summary.clone();

                if play {
                    self.enter(ScanPhase::Playing);
                    debug!(
                        "Playing {} at volume {:.2}",
                        result.category.sound_asset(),
                        result.volume
                    );
                    self.player.play_alert(result.category, result.volume).await?;
                }
                ScanOutcome::Alerted(result)
            }
        };

        let confidence = outcome.result().map(|r| r.confidence).unwrap_or(0);
        let mut display = self.display.write();
        display.confidence = confidence;
        display.updated_at = Some(Utc::now());
        Ok(outcome)
    }

    fn finish(&self, result: Result<ScanOutcome>) -> Result<ScanOutcome> {
        if let Err(ref e) = result {
            error!("Detection error: {}", e);
            self.display.write().confidence = 0;
        }
        result
    }

    fn enter(&self, phase: ScanPhase) {
        debug!("Scan phase → {:?}", phase);
        *self.phase.write() = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockAlertPlayer, MockAnnotator, MockImageSource};
    use crate::types::{CapturedImage, DetectedObject, ObstacleCategory, Vertex};
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use tokio::sync::Notify;

    fn frame() -> CapturedImage {
        CapturedImage::new("aGVsbG8=".to_string(), 4, 3)
    }

    fn stairs() -> Detections {
        Detections::new(
            vec![DetectedObject::new(
                "stairs",
                vec![
                    Vertex::new(0.0, 0.0),
                    Vertex::new(1.0, 0.0),
                    Vertex::new(1.0, 1.0),
                    Vertex::new(0.0, 1.0),
                ],
            )],
            vec![DetectedLabel::new("stairs", 0.9)],
        )
    }

    fn source_ok() -> MockImageSource {
        let mut source = MockImageSource::new();
        source.expect_capture().returning(|| Ok(frame()));
        source
    }

    fn annotator_with(detections: Detections) -> MockAnnotator {
        let mut annotator = MockAnnotator::new();
        annotator
            .expect_annotate()
            .returning(move |_| Ok(detections.clone()));
        annotator
    }

    fn scanner(source: MockImageSource, annotator: MockAnnotator, player: MockAlertPlayer) -> Scanner {
        Scanner::new(
            Arc::new(source),
            Arc::new(annotator),
            Arc::new(player),
            Classifier::default(),
        )
    }

    #[tokio::test]
    async fn test_scan_plays_alert_and_updates_display() {
        let mut player = MockAlertPlayer::new();
        player
            .expect_play_alert()
            .with(eq(ObstacleCategory::Stairs), eq(1.0f64))
            .times(1)
            .returning(|_, _| Ok(()));

        let scanner = scanner(source_ok(), annotator_with(stairs()), player);
        let outcome = scanner.scan().await.unwrap();

        let result = outcome.result().unwrap();
        assert_eq!(result.category, ObstacleCategory::Stairs);
        assert_eq!(result.confidence, 100);

        let display = scanner.display();
        assert_eq!(display.summary, "STAIRS: stairs");
        assert_eq!(display.confidence, 100);
        assert_eq!(display.labels.len(), 1);
        assert!(display.updated_at.is_some());
        assert_eq!(scanner.phase(), ScanPhase::Idle);
        assert!(!scanner.is_busy());
    }

    #[tokio::test]
    async fn test_nothing_detected_clears_summary_without_playing() {
        let mut annotator = MockAnnotator::new();
        let mut responses = vec![Detections::default(), stairs()];
        annotator
            .expect_annotate()
            .times(2)
            .returning(move |_| Ok(responses.pop().unwrap_or_default()));

        let mut player = MockAlertPlayer::new();
        player.expect_play_alert().times(1).returning(|_, _| Ok(()));

        let scanner = scanner(source_ok(), annotator, player);
        scanner.scan().await.unwrap();
        assert_eq!(scanner.display().confidence, 100);

        let outcome = scanner.scan().await.unwrap();
        assert_eq!(outcome, ScanOutcome::NothingDetected);
        let display = scanner.display();
        assert!(display.summary.is_empty());
        assert!(display.labels.is_empty());
        assert_eq!(display.confidence, 0);
    }

    #[tokio::test]
    async fn test_capture_failure_resets_confidence_only() {
        let mut source = MockImageSource::new();
        let mut calls = 0;
        source.expect_capture().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(frame())
            } else {
                Err(Error::Capture("camera unplugged".to_string()))
            }
        });
        let mut annotator = MockAnnotator::new();
        annotator
            .expect_annotate()
            .times(1)
            .returning(|_| Ok(stairs()));
        let mut player = MockAlertPlayer::new();
        player.expect_play_alert().returning(|_, _| Ok(()));

        let scanner = scanner(source, annotator, player);
        scanner.scan().await.unwrap();

        let err = scanner.scan().await.unwrap_err();
        assert!(matches!(err, Error::Capture(_)));
        let display = scanner.display();
        assert_eq!(display.summary, "STAIRS: stairs");
        assert_eq!(display.labels.len(), 1);
        assert_eq!(display.confidence, 0);
        assert_eq!(scanner.phase(), ScanPhase::Idle);
        assert!(!scanner.is_busy());
    }

    #[tokio::test]
    async fn test_playback_failure_keeps_labels_and_summary() {
        let mut player = MockAlertPlayer::new();
        player
            .expect_play_alert()
            .returning(|_, _| Err(Error::Playback("device lost".to_string())));

        let scanner = scanner(source_ok(), annotator_with(stairs()), player);
        let err = scanner.scan().await.unwrap_err();
        assert!(matches!(err, Error::Playback(_)));

        let display = scanner.display();
        assert_eq!(display.labels, stairs().labels);
        assert_eq!(display.summary, "STAIRS: stairs");
        assert_eq!(display.confidence, 0);
        assert_eq!(scanner.phase(), ScanPhase::Idle);
    }

    #[tokio::test]
    async fn test_annotate_failure_skips_playback() {
        let mut annotator = MockAnnotator::new();
        annotator
            .expect_annotate()
            .returning(|_| Err(Error::Vision("HTTP 403".to_string())));
        let mut player = MockAlertPlayer::new();
        player.expect_play_alert().never();

        let scanner = scanner(source_ok(), annotator, player);
        assert!(matches!(scanner.scan().await, Err(Error::Vision(_))));
        assert_eq!(scanner.display(), DisplayState::default());
    }

    #[tokio::test]
    async fn test_repeated_scans_are_identical() {
        let mut player = MockAlertPlayer::new();
        player.expect_play_alert().times(2).returning(|_, _| Ok(()));
        let scanner = scanner(source_ok(), annotator_with(stairs()), player);

        let first = scanner.scan().await.unwrap();
        let second = scanner.scan().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_present_without_playback() {
        let mut source = MockImageSource::new();
        source.expect_capture().never();
        let mut annotator = MockAnnotator::new();
        annotator.expect_annotate().never();
        let mut player = MockAlertPlayer::new();
        player.expect_play_alert().never();

        let scanner = scanner(source, annotator, player);
        let outcome = scanner.present(stairs(), false).await.unwrap();
        assert_eq!(outcome.result().unwrap().category, ObstacleCategory::Stairs);
        assert_eq!(scanner.display().confidence, 100);
    }

    struct GatedAnnotator {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Annotator for GatedAnnotator {
        async fn annotate(&self, _image: &CapturedImage) -> Result<Detections> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(Detections::default())
        }
    }

    #[tokio::test]
    async fn test_second_trigger_while_busy_is_rejected() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut player = MockAlertPlayer::new();
        player.expect_play_alert().never();

        let scanner = Arc::new(Scanner::new(
            Arc::new(source_ok()),
            Arc::new(GatedAnnotator {
                entered: entered.clone(),
                release: release.clone(),
            }),
            Arc::new(player),
            Classifier::default(),
        ));

        let running = {
            let scanner = scanner.clone();
            tokio::spawn(async move { scanner.scan().await })
        };

        entered.notified().await;
        assert!(scanner.is_busy());
        assert_eq!(scanner.phase(), ScanPhase::Annotating);
        assert!(matches!(scanner.scan().await, Err(Error::Busy)));

        release.notify_one();
        let outcome = running.await.unwrap().unwrap();
        assert_eq!(outcome, ScanOutcome::NothingDetected);
        assert!(!scanner.is_busy());
        assert_eq!(scanner.phase(), ScanPhase::Idle);
    }
}
