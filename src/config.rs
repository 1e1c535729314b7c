use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::strip::{DEFAULT_CLEAN_SUFFIX, DEFAULT_JPEG_QUALITY};

/// Top-level configuration for the exif-scrub library.
///
/// Controls the strip re-encoder (quality, output naming) and output
/// behavior (dry run, destination directory).
///
/// # Loading
///
/// ```rust,no_run
/// use exif_scrub::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.strip.jpeg_quality = 85;
/// config.output.dry_run = true;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Strip re-encoder settings.
    pub strip: StripConfig,
    /// Output behavior (dry run, destination directory).
    pub output: OutputConfig,
}

/// Strip re-encoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripConfig {
    /// JPEG quality for the clean copy, 1-100. Values outside the range
    /// are clamped at encode time.
    pub jpeg_quality: u8,
    /// Suffix inserted before the `.jpg` extension of the clean copy.
    pub clean_suffix: String,
}

/// Output and behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// If `true`, run the full scan and strip but write no files.
    pub dry_run: bool,
    /// Directory for clean copies; `None` writes next to the original.
    pub directory: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strip: StripConfig {
                jpeg_quality: DEFAULT_JPEG_QUALITY,
                clean_suffix: DEFAULT_CLEAN_SUFFIX.to_string(),
            },
            output: OutputConfig {
                dry_run: false,
                directory: None,
            },
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}
