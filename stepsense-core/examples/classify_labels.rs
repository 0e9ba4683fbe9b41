//! Classify a handful of labels given on the command line
//!
//! cargo run -p stepsense-core --example classify_labels -- "Ceiling fan" "Lamp"

use stepsense_core::{evaluate, Classifier, DetectedLabel, Detections};

fn main() {
    let labels: Vec<DetectedLabel> = std::env::args()
        .skip(1)
        .map(|description| DetectedLabel::new(description, 1.0))
        .collect();

    let detections = Detections::new(Vec::new(), labels);
    match evaluate(&Classifier::default(), &detections) {
        Some(result) => {
            println!("{}", result.summary);
            println!("Confidence: {}%  volume: {:.2}", result.confidence, result.volume);
        }
        None => println!("No obstacles detected"),
    }
}
