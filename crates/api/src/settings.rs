//! Server settings, layered from defaults, file, and environment

use config::{Config, ConfigError, Environment, File, FileFormat, FileSourceFile};
use detection_core::DEFAULT_SAMPLE_TARGET;
use inference_engine::{ModelPaths, YoloConfig};
use serde::{Deserialize, Serialize};

/// Optional config file in the working directory, any supported extension
const CONFIG_FILE: &str = "astrovision";

const ENV_PREFIX: &str = "ASTROVISION";

/// Unprefixed variables honoured for compatibility, as (key, variable)
const LEGACY_VARS: &[(&str, &str)] = &[
    ("host", "HOST"),
    ("port", "PORT"),
    ("models.waste", "YOLO_MODEL_PATH"),
    ("models.drone", "DRONE_MODEL_PATH"),
    ("models.space", "SPACE_MODEL_PATH"),
    ("models.space_anomaly", "SPACE_ANOMALY_MODEL_PATH"),
];

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Largest accepted request body (bytes)
    pub max_upload_bytes: usize,

    /// Frames sampled per video
    pub sample_frames: u64,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Model file locations
    pub models: ModelPaths,

    /// YOLO backend settings
    pub yolo: YoloConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: 256 * 1024 * 1024,
            sample_frames: DEFAULT_SAMPLE_TARGET,
            log_json: false,
            models: ModelPaths::default(),
            yolo: YoloConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load defaults, then the config file, then the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(
            Some(File::with_name(CONFIG_FILE).required(false)),
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
            |name| std::env::var(name).ok(),
        )
    }

    fn build<F>(
        file: Option<File<FileSourceFile, FileFormat>>,
        environment: Environment,
        legacy: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(file) = file {
            builder = builder.add_source(file);
        }
        builder = builder.add_source(environment);

        for &(key, var) in LEGACY_VARS {
            builder = builder.set_override_option(key, legacy(var))?;
        }

        builder.build()?.try_deserialize()
    }

    /// `host:port` to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
