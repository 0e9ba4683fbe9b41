//! Layered settings: defaults, optional TOML file, then `STEPSENSE__*` env vars

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use stepsense_core::{Classifier, KeywordTable, ObstacleCategory};
use stepsense_eye::{CaptureConfig, VisionConfig};
use stepsense_spk::AudioConfig;

pub const ENV_PREFIX: &str = "STEPSENSE";

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub vision: VisionConfig,
    pub capture: CaptureConfig,
    pub audio: AudioConfig,
    /// Keyword list overrides keyed by category name
    pub keywords: BTreeMap<String, Vec<String>>,
    pub watch: WatchConfig,
}

/// Periodic scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_ms: 2000 }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_ms < 100 {
            return Err("Watch interval too short (min 100 ms)".to_string());
        }
        if self.interval_ms > 3_600_000 {
            return Err("Watch interval too long (max 1 hour)".to_string());
        }
        Ok(())
    }
}

impl Settings {
    /// Load from the optional file and the process environment
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load with an explicit environment map instead of the process environment
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> anyhow::Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let settings: Settings = builder
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        settings
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid settings: {}", e))?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.vision.validate().map_err(|e| format!("vision: {}", e))?;
        self.capture.validate().map_err(|e| format!("capture: {}", e))?;
        self.audio.validate().map_err(|e| format!("audio: {}", e))?;
        self.watch.validate().map_err(|e| format!("watch: {}", e))?;
        self.keyword_overrides().map(|_| ())
    }

    /// Parse the `keywords` section into category overrides
    pub fn keyword_overrides(&self) -> Result<HashMap<ObstacleCategory, Vec<String>>, String> {
        self.keywords
            .iter()
            .map(|(name, keywords)| {
                name.parse::<ObstacleCategory>()
                    .map(|category| (category, keywords.clone()))
                    .map_err(|e| format!("keywords: {}", e))
            })
            .collect()
    }

    pub fn classifier(&self) -> anyhow::Result<Classifier> {
        let overrides = self.keyword_overrides().map_err(anyhow::Error::msg)?;
        Ok(Classifier::new(KeywordTable::with_overrides(&overrides)?))
    }

    /// Effective settings as TOML with the API key hidden
    pub fn to_redacted_toml(&self) -> anyhow::Result<String> {
        let mut shown = self.clone();
        if shown.vision.api_key.is_some() {
            shown.vision.api_key = Some(REDACTED.to_string());
        }
        Ok(toml::to_string_pretty(&shown)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use stepsense_eye::CaptureSourceKind;
    use stepsense_spk::PlaybackEngineKind;

    fn empty_env() -> Option<config::Map<String, String>> {
        Some(config::Map::new())
    }

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load_with_env(None, empty_env()).unwrap();
        assert_eq!(settings.watch.interval_ms, 2000);
        assert_eq!(settings.capture.source, CaptureSourceKind::Camera);
        assert_eq!(settings.capture.jpeg_quality, 70);
        assert!(settings.audio.exclusive);
        assert!(settings.keywords.is_empty());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_toml(
            r#"
[vision]
api_key = "abc123"
timeout_secs = 15

[capture]
source = "directory"
path = "frames"

[audio]
engine = "silent"

[keywords]
stairs = ["ladder", "Step Stool"]

[watch]
interval_ms = 500
"#,
        );

        let settings = Settings::load_with_env(Some(file.path()), empty_env()).unwrap();
        assert_eq!(settings.vision.api_key.as_deref(), Some("abc123"));
        assert_eq!(settings.vision.timeout_secs, Some(15));
        assert_eq!(settings.vision.max_objects, 5);
        assert_eq!(settings.capture.source, CaptureSourceKind::Directory);
        assert_eq!(settings.audio.engine, PlaybackEngineKind::Silent);
        assert_eq!(settings.watch.interval_ms, 500);

        let classifier = settings.classifier().unwrap();
        assert_eq!(classifier.classify_names(&["step stool"]), ObstacleCategory::Stairs);
        assert_eq!(classifier.classify_names(&["staircase"]), ObstacleCategory::Default);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml("[watch]\ninterval_ms = 500\n");
        let mut env = config::Map::new();
        env.insert("STEPSENSE__WATCH__INTERVAL_MS".to_string(), "750".to_string());
        env.insert("STEPSENSE__AUDIO__ENGINE".to_string(), "silent".to_string());

        let settings = Settings::load_with_env(Some(file.path()), Some(env)).unwrap();
        assert_eq!(settings.watch.interval_ms, 750);
        assert_eq!(settings.audio.engine, PlaybackEngineKind::Silent);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Settings::load_with_env(Some(Path::new("/nonexistent/stepsense.toml")), empty_env());
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_toml("[watch]\ninterval_ms = 5\n");
        assert!(Settings::load_with_env(Some(file.path()), empty_env()).is_err());

        let file = write_toml("[keywords]\nbalcony = [\"railing\"]\n");
        let err = Settings::load_with_env(Some(file.path()), empty_env()).unwrap_err();
        assert!(err.to_string().contains("balcony"));

        let file = write_toml("[capture]\nsource = \"file\"\n");
        assert!(Settings::load_with_env(Some(file.path()), empty_env()).is_err());
    }

    #[test]
    fn test_default_keywords_rejected() {
        let mut settings = Settings::default();
        settings
            .keywords
            .insert("default".to_string(), vec!["anything".to_string()]);
        assert!(settings.classifier().is_err());
    }

    #[test]
    fn test_redacted_toml_hides_api_key() {
        let mut settings = Settings::default();
        settings.vision.api_key = Some("super-secret".to_string());

        let dumped = settings.to_redacted_toml().unwrap();
        assert!(!dumped.contains("super-secret"));
        assert!(dumped.contains(REDACTED));
        assert!(dumped.contains("[watch]"));

        let reparsed: Settings = toml::from_str(&dumped).unwrap();
        assert_eq!(reparsed.watch.interval_ms, settings.watch.interval_ms);
        assert_eq!(reparsed.capture.max_resolution, settings.capture.max_resolution);
    }
}
