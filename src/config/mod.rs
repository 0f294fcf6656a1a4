use std::path::PathBuf;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::engine::EngineOptions;
use crate::error::{Result, UnveilError};
use crate::host::HostOptions;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Detection heuristic tunables
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Reveal strategy tunables
    #[serde(default)]
    pub reveal: RevealConfig,

    /// Companion lifecycle tunables
    #[serde(default)]
    pub companion: CompanionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Below this natural size, only elements with interactive content
    /// count as meaningful
    #[serde(default = "default_tiny_size")]
    pub tiny_size: f64,

    /// Below this natural size, elements are dropped in the dedup pass
    #[serde(default = "default_small_size")]
    pub small_size: f64,

    /// Left/top offsets below this mark the offscreen-dump pattern
    #[serde(default = "default_offscreen_threshold")]
    pub offscreen_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            tiny_size: default_tiny_size(),
            small_size: default_small_size(),
            offscreen_threshold: default_offscreen_threshold(),
        }
    }
}

fn default_tiny_size() -> f64 {
    5.0
}

fn default_small_size() -> f64 {
    10.0
}

fn default_offscreen_threshold() -> f64 {
    -9000.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Ancestor levels the chain-reveal strategy walks
    #[serde(default = "default_max_ancestor_depth")]
    pub max_ancestor_depth: usize,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            max_ancestor_depth: default_max_ancestor_depth(),
        }
    }
}

fn default_max_ancestor_depth() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionConfig {
    /// Delay after injection before the confirming liveness probe (ms)
    #[serde(default = "default_init_delay_ms")]
    pub init_delay_ms: u64,

    /// Per-request timeout against a companion (ms)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            init_delay_ms: default_init_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_init_delay_ms() -> u64 {
    100
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            reveal: RevealConfig::default(),
            companion: CompanionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from all sources (file, env, defaults)
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let config: Config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Merge config file if exists
            .merge(Toml::file(&config_path))
            // Merge environment variables (UNVEIL_*)
            .merge(Env::prefixed("UNVEIL_").split("_"))
            .extract()
            .map_err(|e| UnveilError::ConfigError(e.to_string()))?;

        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("unveil")
            .join("config.toml")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| UnveilError::ConfigError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            tiny_size: self.detector.tiny_size,
            small_size: self.detector.small_size,
            offscreen_threshold: self.detector.offscreen_threshold,
            max_ancestor_depth: self.reveal.max_ancestor_depth,
        }
    }

    pub fn host_options(&self) -> HostOptions {
        HostOptions {
            init_delay: Duration::from_millis(self.companion.init_delay_ms),
            request_timeout: Duration::from_millis(self.companion.request_timeout_ms),
            engine: self.engine_options(),
        }
    }
}
