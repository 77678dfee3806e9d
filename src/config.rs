use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use crate::data::loader::Source;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "PITCH_SCOPE_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "pitch-scope.json";

const DEFAULT_SOURCES: [&str; 2] = [
    "https://github.com/JUNG-PFe/pitcher-visualization/raw/refs/heads/main/24_merged_data_%EC%88%98%EC%A0%95.xlsx",
    "https://github.com/JUNG-PFe/pitcher-visualization/raw/refs/heads/main/23_merged_data_%EC%88%98%EC%A0%95.xlsx",
];

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// Settings read once at startup.
///
/// ```json
/// {
///   "sources": ["data/2024.xlsx", "https://example.org/2023.xlsx"],
///   "font_path": "fonts/NanumGothic.ttf",
///   "export_file_name": "filtered_data.csv",
///   "http_timeout_secs": 60
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Data locations, loaded in order and concatenated.
    pub sources: Vec<String>,
    /// Font with Hangul glyphs; egui's bundled fonts have none.
    pub font_path: Option<PathBuf>,
    pub export_file_name: String,
    pub http_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            font_path: None,
            export_file_name: "filtered_data.csv".to_string(),
            http_timeout_secs: 60,
        }
    }
}

impl AppConfig {
    /// Defaults, overlaid by the config file, overlaid by command-line
    /// sources.
    pub fn resolve<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        let cli_sources: Vec<String> = args.into_iter().filter(|a| !a.starts_with('-')).collect();
        if !cli_sources.is_empty() {
            config.sources = cli_sources;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn sources(&self) -> Vec<Source> {
        self.sources.iter().map(|s| Source::parse(s)).collect()
    }

    /// Per-request HTTP timeout; `0` in the config means no limit.
    pub fn http_timeout(&self) -> Option<Duration> {
        (self.http_timeout_secs > 0).then(|| Duration::from_secs(self.http_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_both_seasons() {
        let config = AppConfig::default();
        assert_eq!(config.sources.len(), 2);
        assert!(config.sources().iter().all(|s| matches!(s, Source::Url(_))));
        assert_eq!(config.export_file_name, "filtered_data.csv");
        assert_eq!(config.http_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn file_fields_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pitch-scope.json");
        std::fs::write(&path, r#"{ "sources": ["local.csv"], "http_timeout_secs": 5 }"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.sources, vec!["local.csv".to_string()]);
        assert_eq!(config.http_timeout_secs, 5);
        assert_eq!(config.export_file_name, "filtered_data.csv");
        assert_eq!(config.font_path, None);
    }

    #[test]
    fn zero_timeout_disables_the_limit() {
        let config = AppConfig {
            http_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.http_timeout(), None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ sources: ").unwrap();
        assert!(AppConfig::from_file(&path).is_err());
    }
}
