//! Alert volume and confidence heuristics

use crate::types::{DetectedLabel, Vertex};

pub const MIN_VOLUME: f64 = 0.1;
pub const MAX_VOLUME: f64 = 1.0;

/// Volume for detections that carry labels but no localized object
pub const LABEL_ONLY_VOLUME: f64 = 0.8;

/// Volume when objects exist but the first polygon is unusable
pub const FULL_VOLUME: f64 = 1.0;

const VOLUME_GAIN: f64 = 1.5;
const OBJECT_BONUS: f64 = 0.15;
const DISTANCE_BONUS: f64 = 0.10;

/// Normalized area of the box spanned by the first and third vertex.
///
/// `None` when fewer than four vertices are present.
pub fn polygon_area(vertices: &[Vertex]) -> Option<f64> {
    if vertices.len() < 4 {
        return None;
    }
    let width = (vertices[2].x - vertices[0].x).abs();
    let height = (vertices[2].y - vertices[0].y).abs();
    Some(width * height)
}

/// Map a normalized area to a playback volume; bigger (closer) is louder
pub fn volume_for_area(area: f64) -> f64 {
    let raw = area.max(0.0).sqrt() * VOLUME_GAIN;
    raw.clamp(MIN_VOLUME, MAX_VOLUME)
}

/// Volume from a bounding polygon, `None` if the polygon is unusable
pub fn volume_for_polygon(vertices: &[Vertex]) -> Option<f64> {
    polygon_area(vertices).map(volume_for_area)
}

/// Detection quality score in 0..=100.
///
/// Average label score, plus a bonus when objects were localized, plus a
/// bonus when the volume came from a real distance estimate (strictly
/// between the clamp bounds).
pub fn confidence_score(object_count: usize, labels: &[DetectedLabel], volume: f64) -> u8 {
    if object_count == 0 && labels.is_empty() {
        return 0;
    }

    let avg_label = if labels.is_empty() {
        0.0
    } else {
        labels.iter().map(|l| l.score).sum::<f64>() / labels.len() as f64
    };
    let object_bonus = if object_count > 0 { OBJECT_BONUS } else { 0.0 };
    let distance_bonus = if volume > MIN_VOLUME && volume < MAX_VOLUME {
        DISTANCE_BONUS
    } else {
        0.0
    };

    let score = ((avg_label + object_bonus + distance_bonus) * 100.0).min(100.0);
    score.round().max(0.0) as u8
}
