//! First-match keyword classifier

use crate::keywords::KeywordTable;
use crate::types::{Detections, ObstacleCategory};
use tracing::debug;

/// Maps detected names to an obstacle category.
///
/// Categories are tried in table order and the first one with a keyword
/// contained in any name wins. Returns [`ObstacleCategory::Default`] when
/// nothing matches, including for empty input; callers that need to know
/// whether anything was detected must check the detections themselves.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    table: KeywordTable,
}

impl Classifier {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Classify already lower-cased names
    pub fn classify_names<S: AsRef<str>>(&self, names: &[S]) -> ObstacleCategory {
        for (category, keywords) in self.table.iter() {
            let hit = names.iter().find_map(|name| {
                let name = name.as_ref();
                keywords
                    .iter()
                    .find(|kw| name.contains(kw.as_str()))
                    .map(|kw| (name, kw))
            });
            if let Some((name, keyword)) = hit {
                debug!("'{}' matched keyword '{}' → {}", name, keyword, category);
                return category;
            }
        }
        ObstacleCategory::Default
    }

    /// Classify object names and label descriptions together
    pub fn classify(&self, detections: &Detections) -> ObstacleCategory {
        self.classify_names(&detections.names())
    }
}
