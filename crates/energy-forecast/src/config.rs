//! Configuration for loading a predictor and running the binary.
//!
//! [`PredictorConfig`] names the two input files and has no defaults for
//! them: a deployment must say where its model lives. It can be built in
//! code through its `bon` builder or read, together with logging settings,
//! from a TOML file by [`AppConfig::load_from_path`].
//!
//! ```toml
//! [predictor]
//! model_path = "models/lgbm_energy_model.txt"
//! metadata_path = "models/model_metadata.json"
//! n_threads = 1
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```
//!
//! Any key can be overridden from the environment with the `ENERGY_FORECAST`
//! prefix and `__` as separator, e.g. `ENERGY_FORECAST__PREDICTOR__MODEL_PATH`.

use std::path::{Path, PathBuf};

use bon::Builder;
use serde::Deserialize;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    EmptyPath(&'static str),
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

// =============================================================================
// PredictorConfig
// =============================================================================

/// Where to find the model and metadata, and how to run inference.
///
/// ```
/// use energy_forecast::PredictorConfig;
///
/// let config = PredictorConfig::builder()
///     .model_path("models/lgbm_energy_model.txt")
///     .metadata_path("models/model_metadata.json")
///     .build()
///     .unwrap();
/// assert_eq!(config.n_threads, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Builder)]
#[builder(derive(Clone, Debug), finish_fn(vis = "", name = __build_internal))]
pub struct PredictorConfig {
    /// LightGBM text model file.
    #[builder(into)]
    pub model_path: PathBuf,

    /// JSON metadata sidecar.
    #[builder(into)]
    pub metadata_path: PathBuf,

    /// Prediction threads: 0 = auto, 1 = sequential, >1 = exact count.
    #[builder(default = 1)]
    #[serde(default = "default_n_threads")]
    pub n_threads: usize,
}

fn default_n_threads() -> usize {
    1
}

impl<S: predictor_config_builder::IsComplete> PredictorConfigBuilder<S> {
    /// Build and validate the configuration.
    pub fn build(self) -> Result<PredictorConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl PredictorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("model_path"));
        }
        if self.metadata_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("metadata_path"));
        }
        Ok(())
    }
}

// =============================================================================
// Application configuration
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Configuration of the `energy-forecast` binary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    pub predictor: PredictorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from a config file, then apply `ENERGY_FORECAST__*` overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            .add_source(
                ::config::Environment::with_prefix("ENERGY_FORECAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.predictor.validate()?;
        Ok(config)
    }
}
