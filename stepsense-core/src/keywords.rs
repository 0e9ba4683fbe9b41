//! Keyword table mapping detected names to obstacle categories

use crate::error::{Error, Result};
use crate::types::ObstacleCategory;
use std::collections::HashMap;

const STAIRS_KEYWORDS: &[&str] = &["stairs", "staircase", "step"];

const WALL_KEYWORDS: &[&str] = &["wall", "door", "window", "partition"];

const LOW_KEYWORDS: &[&str] = &[
    "shoe", "bed", "floor", "box", "backpack", "bottle", "cabinet", "dresser",
    "chest of drawers", "rug", "mat", "robot vacuum", "dog", "cat", "toy", "bag", "table",
];

const HEAD_KEYWORDS: &[&str] = &[
    "lamp", "fan", "ceiling fan", "tv", "doorframe", "shelf", "cabinetry", "lighting",
    "mirror", "hanger", "clothing", "curtain rod", "window blind",
];

const CEILING_KEYWORDS: &[&str] = &["ceiling", "ceiling light", "light fixture", "chandelier"];

/// Built-in keywords for a category (`Default` has none)
pub fn builtin_keywords(category: ObstacleCategory) -> &'static [&'static str] {
    match category {
        ObstacleCategory::Stairs => STAIRS_KEYWORDS,
        ObstacleCategory::Wall => WALL_KEYWORDS,
        ObstacleCategory::Low => LOW_KEYWORDS,
        ObstacleCategory::Head => HEAD_KEYWORDS,
        ObstacleCategory::Ceiling => CEILING_KEYWORDS,
        ObstacleCategory::Default => &[],
    }
}

/// Ordered category → keywords table.
///
/// Entries are always kept in [`ObstacleCategory::PRIORITY`] order; only the
/// keyword lists can change.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTable {
    entries: Vec<(ObstacleCategory, Vec<String>)>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        let entries = ObstacleCategory::PRIORITY
            .iter()
            .map(|&category| {
                let keywords = builtin_keywords(category)
                    .iter()
                    .map(|k| k.to_string())
                    .collect();
                (category, keywords)
            })
            .collect();
        Self { entries }
    }
}

impl KeywordTable {
    /// Built-in table with some keyword lists replaced.
    ///
    /// Keywords are trimmed and lower-cased. Empty keywords and keywords for
    /// `Default` are rejected.
    pub fn with_overrides(overrides: &HashMap<ObstacleCategory, Vec<String>>) -> Result<Self> {
        if overrides.contains_key(&ObstacleCategory::Default) {
            return Err(Error::Configuration(
                "the default category cannot have keywords".to_string(),
            ));
        }

        let mut table = Self::default();
        for (category, keywords) in table.entries.iter_mut() {
            if let Some(replacement) = overrides.get(category) {
                let mut normalized = Vec::with_capacity(replacement.len());
                for keyword in replacement {
                    let keyword = keyword.trim().to_lowercase();
                    if keyword.is_empty() {
                        return Err(Error::Configuration(format!(
                            "empty keyword for category '{}'",
                            category
                        )));
                    }
                    normalized.push(keyword);
                }
                *keywords = normalized;
            }
        }
        Ok(table)
    }

    /// Iterate in priority order
    pub fn iter(&self) -> impl Iterator<Item = (ObstacleCategory, &[String])> {
        self.entries.iter().map(|(c, k)| (*c, k.as_slice()))
    }

    pub fn keywords(&self, category: ObstacleCategory) -> &[String] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, k)| k.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_order() {
        let order: Vec<_> = KeywordTable::default().iter().map(|(c, _)| c).collect();
        assert_eq!(order, ObstacleCategory::PRIORITY.to_vec());
    }

    #[test]
    fn test_default_table_contents() {
        let table = KeywordTable::default();
        assert!(table.keywords(ObstacleCategory::Low).contains(&"chest of drawers".to_string()));
        assert_eq!(table.keywords(ObstacleCategory::Stairs).len(), 3);
        assert!(table.keywords(ObstacleCategory::Default).is_empty());
    }

    #[test]
    fn test_overrides_keep_order_and_normalize() {
        let mut overrides = HashMap::new();
        overrides.insert(ObstacleCategory::Ceiling, vec!["  Beam ".to_string()]);
        let table = KeywordTable::with_overrides(&overrides).unwrap();

        assert_eq!(table.keywords(ObstacleCategory::Ceiling), &["beam".to_string()]);
        assert_eq!(table.keywords(ObstacleCategory::Wall).len(), WALL_KEYWORDS.len());
        let order: Vec<_> = table.iter().map(|(c, _)| c).collect();
        assert_eq!(order, ObstacleCategory::PRIORITY.to_vec());
    }

    #[test]
    fn test_overrides_reject_default_and_empty() {
        let mut overrides = HashMap::new();
        overrides.insert(ObstacleCategory::Default, vec!["thing".to_string()]);
        assert!(KeywordTable::with_overrides(&overrides).is_err());

        let mut overrides = HashMap::new();
        overrides.insert(ObstacleCategory::Low, vec!["   ".to_string()]);
        assert!(matches!(
            KeywordTable::with_overrides(&overrides),
            Err(Error::Configuration(_))
        ));
    }
}
