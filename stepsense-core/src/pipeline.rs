//! Pure detections → result evaluation

use crate::classifier::Classifier;
use crate::heuristics::{confidence_score, volume_for_polygon, FULL_VOLUME, LABEL_ONLY_VOLUME};
use crate::types::{DetectionBasis, DetectionResult, Detections};

/// Number of label descriptions shown in a label-only summary
const SUMMARY_LABELS: usize = 3;

/// Evaluate one annotate response.
///
/// Returns `None` when nothing at all was detected; in that case no alert
/// should play. Otherwise the result always carries a category, possibly
/// `Default`.
pub fn evaluate(classifier: &Classifier, detections: &Detections) -> Option<DetectionResult> {
    if detections.is_empty() {
        return None;
    }

    let category = classifier.classify(detections);
    let heading = category.as_str().to_uppercase();

    let (summary, volume, basis) = match detections.objects.first() {
        None => {
            let names: Vec<&str> = detections
                .labels
                .iter()
                .take(SUMMARY_LABELS)
                .map(|l| l.description.as_str())
                .collect();
            (
                format!("{}: {}", heading, names.join(", ")),
                LABEL_ONLY_VOLUME,
                DetectionBasis::LabelsOnly,
            )
        }
        Some(primary) => {
            let names: Vec<&str> = detections.objects.iter().map(|o| o.name.as_str()).collect();
            let volume = volume_for_polygon(&primary.bounding_poly).unwrap_or(FULL_VOLUME);
            (
                format!("{}: {}", heading, names.join(", ")),
                volume,
                DetectionBasis::Objects,
            )
        }
    };

    let confidence = confidence_score(detections.objects.len(), &detections.labels, volume);

    Some(DetectionResult {
        category,
        summary,
        confidence,
        volume,
        basis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DetectedLabel, DetectedObject, ObstacleCategory, Vertex};

    fn unit_square() -> Vec<Vertex> {
        vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(1.0, 0.0),
            Vertex::new(1.0, 1.0),
            Vertex::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_nothing_detected() {
        assert_eq!(evaluate(&Classifier::default(), &Detections::default()), None);
    }

    #[test]
    fn test_stairs_unit_square() {
        let detections = Detections::new(
            vec![DetectedObject::new("stairs", unit_square())],
            vec![DetectedLabel::new("stairs", 0.9)],
        );
        let result = evaluate(&Classifier::default(), &detections).unwrap();
        assert_eq!(result.category, ObstacleCategory::Stairs);
        assert_eq!(result.volume, 1.0);
        assert_eq!(result.confidence, 100);
        assert_eq!(result.summary, "STAIRS: stairs");
        assert_eq!(result.basis, DetectionBasis::Objects);
    }

    #[test]
    fn test_label_only_uses_fallback_volume() {
        let detections = Detections::new(
            vec![],
            vec![
                DetectedLabel::new("Wall", 0.9),
                DetectedLabel::new("Paint", 0.7),
                DetectedLabel::new("Wood", 0.6),
                DetectedLabel::new("Tints and shades", 0.4),
            ],
        );
        let result = evaluate(&Classifier::default(), &detections).unwrap();
        assert_eq!(result.category, ObstacleCategory::Wall);
        assert_eq!(result.volume, LABEL_ONLY_VOLUME);
        assert_eq!(result.summary, "WALL: Wall, Paint, Wood");
        assert_eq!(result.basis, DetectionBasis::LabelsOnly);
        // avg 0.65 + distance bonus 0.10
        assert_eq!(result.confidence, 75);
    }

    #[test]
    fn test_objects_summary_lists_all_objects() {
        let detections = Detections::new(
            vec![
                DetectedObject::new("Person", vec![]),
                DetectedObject::new("Table", vec![]),
            ],
            vec![],
        );
        let result = evaluate(&Classifier::default(), &detections).unwrap();
        assert_eq!(result.summary, "LOW: Person, Table");
        assert_eq!(result.volume, FULL_VOLUME);
        assert_eq!(result.confidence, 15);
    }

    #[test]
    fn test_unmatched_detection_is_default_not_none() {
        let detections = Detections::new(vec![], vec![DetectedLabel::new("Sky", 0.5)]);
        let result = evaluate(&Classifier::default(), &detections).unwrap();
        assert_eq!(result.category, ObstacleCategory::Default);
        assert_eq!(result.summary, "DEFAULT: Sky");
    }

    #[test]
    fn test_distance_estimate_from_first_object() {
        let small = vec![
            Vertex::new(0.4, 0.4),
            Vertex::new(0.6, 0.4),
            Vertex::new(0.6, 0.6),
            Vertex::new(0.4, 0.6),
        ];
        let detections = Detections::new(
            vec![
                DetectedObject::new("Bottle", small),
                DetectedObject::new("Door", unit_square()),
            ],
            vec![DetectedLabel::new("Bottle", 0.5)],
        );
        let result = evaluate(&Classifier::default(), &detections).unwrap();
        // sqrt(0.04) * 1.5
        assert!((result.volume - 0.3).abs() < 1e-5);
        assert_eq!(result.category, ObstacleCategory::Wall);
        assert_eq!(result.confidence, 75);
    }

    #[test]
    fn test_confidence_rounds_on_double_precision_sum() {
        // (0.195 + 0.10) * 100 = 29.500000000000004
        let detections = Detections::new(vec![], vec![DetectedLabel::new("Sky", 0.195)]);
        let result = evaluate(&Classifier::default(), &detections).unwrap();
        assert_eq!(result.confidence, 30);

        // (0.015 + 0.15) * 100 = 16.499999999999996
        let detections = Detections::new(
            vec![DetectedObject::new("Person", vec![])],
            vec![DetectedLabel::new("Sky", 0.015)],
        );
        let result = evaluate(&Classifier::default(), &detections).unwrap();
        assert_eq!(result.confidence, 16);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let detections = Detections::new(
            vec![DetectedObject::new("Shoe", unit_square())],
            vec![DetectedLabel::new("Footwear", 0.8)],
        );
        let classifier = Classifier::default();
        assert_eq!(evaluate(&classifier, &detections), evaluate(&classifier, &detections));
    }
}
