use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{PilotError, PilotResult};
use crate::perception::border::{BorderRegionSpec, SignatureMatcher};
use crate::perception::button::ButtonPalette;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Substring matched against window titles to find the game.
    #[serde(default = "default_title_fragment")]
    pub title_fragment: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title_fragment: default_title_fragment(),
        }
    }
}

fn default_title_fragment() -> String {
    "WidgetInc".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_inset_fraction")]
    pub inset_fraction: f64,
    #[serde(default = "default_strip_fraction")]
    pub strip_fraction: f64,
    /// Best-score acceptance cutoff; empirically tuned, see border matcher.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    #[serde(default = "default_confidence_divisor")]
    pub confidence_divisor: f64,
    /// Max color distance for button state classification.
    #[serde(default = "default_button_tolerance")]
    pub button_tolerance: f64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// How long a detection result stays valid before re-sampling.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            inset_fraction: default_inset_fraction(),
            strip_fraction: default_strip_fraction(),
            match_threshold: default_match_threshold(),
            confidence_divisor: default_confidence_divisor(),
            button_tolerance: default_button_tolerance(),
            poll_interval_ms: default_poll_interval_ms(),
            cache_ttl_ms: default_cache_ttl_ms(),
        }
    }
}

impl DetectionConfig {
    pub fn border_spec(&self) -> BorderRegionSpec {
        BorderRegionSpec {
            inset_fraction: self.inset_fraction,
            strip_fraction: self.strip_fraction,
        }
    }
}

fn default_inset_fraction() -> f64 {
    BorderRegionSpec::default().inset_fraction
}

fn default_strip_fraction() -> f64 {
    BorderRegionSpec::default().strip_fraction
}

fn default_match_threshold() -> f64 {
    SignatureMatcher::DEFAULT_THRESHOLD
}

fn default_confidence_divisor() -> f64 {
    SignatureMatcher::DEFAULT_CONFIDENCE_DIVISOR
}

fn default_button_tolerance() -> f64 {
    ButtonPalette::DEFAULT_TOLERANCE
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_cache_ttl_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_signatures_file")]
    pub signatures_file: String,
    /// Optional override; the built-in palette is used when absent.
    #[serde(default)]
    pub palette_file: Option<String>,
    #[serde(default)]
    pub probes_file: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            signatures_file: default_signatures_file(),
            palette_file: None,
            probes_file: None,
        }
    }
}

fn default_signatures_file() -> String {
    "data/signatures.json".to_string()
}

fn resolve_config_path() -> PilotResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(PilotError::Config(
        "config.toml not found next to executable or in working directory".into(),
    ))
}

pub fn load_config() -> PilotResult<AppConfig> {
    let path = resolve_config_path()?;
    let content = std::fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!(
        path = %path.display(),
        window = %config.window.title_fragment,
        signatures = %config.data.signatures_file,
        "config loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.window.title_fragment, "WidgetInc");
        assert_eq!(config.detection.match_threshold, 100.0);
        assert_eq!(config.detection.confidence_divisor, 200.0);
        assert_eq!(config.detection.inset_fraction, 0.05);
        assert_eq!(config.detection.cache_ttl_ms, 2000);
        assert_eq!(config.data.signatures_file, "data/signatures.json");
        assert!(config.data.palette_file.is_none());
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let toml = r#"
            [detection]
            match_threshold = 80.0
            poll_interval_ms = 250

            [window]
            title_fragment = "OtherGame"
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.detection.match_threshold, 80.0);
        assert_eq!(config.detection.poll_interval_ms, 250);
        assert_eq!(config.detection.strip_fraction, 0.20);
        assert_eq!(config.window.title_fragment, "OtherGame");
    }
}
