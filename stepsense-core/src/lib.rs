//! stepsense-core: obstacle classification and alert pipeline
//!
//! Holds the data model shared by every stepsense crate, the keyword
//! classifier, the volume and confidence heuristics, and the scanner that
//! drives one capture → annotate → classify → play cycle through the
//! traits in [`ports`].

pub mod types;
pub mod error;
pub mod keywords;
pub mod classifier;
pub mod heuristics;
pub mod pipeline;
pub mod ports;
pub mod scanner;

pub use error::{Error, Result};
pub use types::{
    CapturedImage, DetectedLabel, DetectedObject, DetectionBasis, DetectionResult, Detections,
    ObstacleCategory, Vertex,
};
pub use keywords::KeywordTable;
pub use classifier::Classifier;
pub use pipeline::evaluate;
pub use ports::{AlertPlayer, Annotator, ImageSource};
pub use scanner::{DisplayState, ScanOutcome, ScanPhase, Scanner};
