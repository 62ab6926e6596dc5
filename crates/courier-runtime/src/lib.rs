//! Courier Runtime - process shell for the Courier update dispatcher.
//!
//! This crate provides:
//! - Layered configuration (`config`): defaults, TOML/YAML files, `COURIER_*`
//!   environment variables
//! - Logging setup (`logging`) over `tracing-subscriber` and `tracing-appender`
//! - [`CourierRuntime`], which sizes the update channel from configuration and
//!   runs a [`BotHandler`](courier_handler::BotHandler) until Ctrl+C, SIGTERM,
//!   or a custom shutdown future
//!
//! ```ignore
//! use courier_runtime::CourierRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = CourierRuntime::new();
//!     let (tx, rx) = runtime.update_channel();
//!
//!     let mut bh = BotHandler::new(bot, rx);
//!     bh.handle_message(echo, [predicates::any_message_with_text()]);
//!
//!     tokio::spawn(long_poll(tx));
//!     runtime.run(&bh).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, CourierConfig, DispatcherConfig, LoggingConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{CourierRuntime, RuntimeBuilder, shutdown_signal};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for handler code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
