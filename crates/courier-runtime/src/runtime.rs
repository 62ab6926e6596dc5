//! Process-level shell around a [`BotHandler`].
//!
//! The runtime loads configuration, initializes logging, sizes the update
//! channel, and ties the handler's lifecycle to process signals.
//!
//! ```rust,ignore
//! use courier_runtime::CourierRuntime;
//!
//! let runtime = CourierRuntime::new();
//! let (tx, rx) = runtime.update_channel();
//! let mut bh = BotHandler::new(bot, rx);
//! bh.handle_message(on_start, [predicates::command_equal("start")]);
//!
//! tokio::spawn(poll_updates(tx));
//! runtime.run(&bh).await?; // until Ctrl+C, SIGTERM or the source closes
//! ```

use std::future::Future;
use std::path::Path;

use courier_core::Update;
use courier_handler::{BotHandler, HandlerError};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::{ConfigLoader, ConfigResult, CourierConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// Runs update handlers with configuration, logging and signal handling.
#[derive(Debug, Clone)]
pub struct CourierRuntime {
    config: CourierConfig,
}

impl CourierRuntime {
    /// Creates a runtime from the configuration found in the current
    /// directory, falling back to defaults when it cannot be loaded.
    pub fn new() -> Self {
        let config = ConfigLoader::new()
            .with_current_dir()
            .load()
            .and_then(|config| validate_config(&config).map(|()| config))
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config ({e}), using defaults");
                CourierConfig::default()
            });

        Self::from_config(&config)
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration and initializes logging.
    ///
    /// Logging is left untouched if a global subscriber already exists.
    pub fn from_config(config: &CourierConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            update_buffer = config.dispatcher.update_buffer,
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    /// Creates an update channel sized by `dispatcher.update_buffer`.
    pub fn update_channel(&self) -> (mpsc::Sender<Update>, mpsc::Receiver<Update>) {
        courier_handler::update_channel(self.config.dispatcher.update_buffer)
    }

    /// Runs `handler` until Ctrl+C or SIGTERM, then stops it gracefully.
    ///
    /// Returns early once the handler's source closes and its callbacks have
    /// drained.
    pub async fn run(&self, handler: &BotHandler) -> RuntimeResult<()> {
        let mut signal_error = None;
        self.run_until(handler, async {
            if let Err(e) = shutdown_signal().await {
                error!(error = %e, "Failed to listen for shutdown signal, stopping");
                signal_error = Some(e);
            }
        })
        .await?;

        match signal_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Runs `handler` until `shutdown` resolves, then stops it gracefully.
    ///
    /// Returns once the dispatch loop has exited and every launched callback
    /// has finished.
    pub async fn run_until<F>(&self, handler: &BotHandler, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let start = handler.start();
        tokio::pin!(start);

        tokio::select! {
            biased;
            result = &mut start => {
                result?;
                info!("Update source closed, runtime exiting");
                return Ok(());
            }
            () = shutdown => {
                info!("Shutdown requested, stopping update handler");
            }
        }

        // The loop must keep running until it observes the stop signal.
        let (started, stopped) = tokio::join!(start, handler.stop());
        started?;
        match stopped {
            // The source closed concurrently and the loop drained on its own.
            Ok(()) | Err(HandlerError::NotRunning(_)) => {}
            Err(e) => return Err(e.into()),
        }

        info!("Runtime stopped");
        Ok(())
    }
}

impl Default for CourierRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for Ctrl+C, or SIGTERM on Unix.
pub async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`CourierRuntime`] with custom configuration.
///
/// ```rust,ignore
/// let runtime = CourierRuntime::builder()
///     .config_file("config/production.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    pub fn merge(mut self, config: CourierConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads and validates the configuration, then builds the runtime.
    pub fn build(self) -> ConfigResult<CourierRuntime> {
        let config = self.config_loader.load()?;
        validate_config(&config)?;
        Ok(CourierRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
