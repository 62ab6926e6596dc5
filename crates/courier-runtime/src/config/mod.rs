//! Configuration for the Courier runtime.
//!
//! Settings come from built-in defaults, optional TOML/YAML files and
//! `COURIER_*` environment variables, layered by [`ConfigLoader`].
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "pretty"
//!
//! [logging.filters]
//! courier_handler = "trace"
//!
//! [dispatcher]
//! update_buffer = 256
//! ```

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    CourierConfig, DispatcherConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
    SpanEventConfig,
};
pub use validation::validate_config;

/// Loads configuration from the default locations and validates it.
pub fn load_config() -> ConfigResult<CourierConfig> {
    let config = ConfigLoader::new().load()?;
    validate_config(&config)?;
    Ok(config)
}

/// Loads configuration from `path` (plus environment overrides) and validates it.
pub fn load_config_from_file(path: impl AsRef<std::path::Path>) -> ConfigResult<CourierConfig> {
    let config = ConfigLoader::new().file(path).load()?;
    validate_config(&config)?;
    Ok(config)
}
