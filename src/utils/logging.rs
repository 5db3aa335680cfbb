//! Structured logging setup.
//!
//! The codec itself only emits `tracing` events; embedding applications call
//! [`init_logging`] once to install a subscriber driven by [`LoggingConfig`].

use crate::config::LoggingConfig;
use std::path::Path;
use std::sync::{Once, OnceLock};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::Layered,
    prelude::*,
    registry, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

static INIT: Once = Once::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize the tracing system with the given configuration.
///
/// Later calls are ignored.
///
/// # Example
/// ```
/// use winny_protocol::config::LoggingConfig;
/// use winny_protocol::utils::logging::init_logging;
/// use tracing::Level;
///
/// let config = LoggingConfig {
///     app_name: "winny-node".to_string(),
///     log_level: Level::DEBUG,
///     ..Default::default()
/// };
///
/// init_logging(&config);
/// ```
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("winny_protocol={}", config.log_level)));

        let file_writer = match (&config.log_file_path, config.log_to_file) {
            (Some(path), true) => {
                let path = Path::new(path);
                let dir = path.parent().unwrap_or_else(|| Path::new("."));
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("{}.log", config.app_name));
                let (writer, guard) =
                    tracing_appender::non_blocking(rolling::daily(dir, file_name));
                let _ = FILE_GUARD.set(guard);
                Some(writer)
            }
            _ => None,
        };

        let console_enabled = config.log_to_console || file_writer.is_none();

        let mut layers: Vec<BoxedLayer> = Vec::new();

        if console_enabled {
            if config.json_format {
                layers.push(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stdout)
                        .with_span_events(FmtSpan::CLOSE)
                        .boxed(),
                );
            } else {
                layers.push(
                    fmt::layer()
                        .with_writer(std::io::stdout)
                        .with_ansi(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .boxed(),
                );
            }
        }

        if let Some(writer) = file_writer {
            if config.json_format {
                layers.push(
                    fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_span_events(FmtSpan::CLOSE)
                        .boxed(),
                );
            } else {
                layers.push(
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_span_events(FmtSpan::CLOSE)
                        .boxed(),
                );
            }
        }

        if registry().with(filter).with(layers).try_init().is_err() {
            // another subscriber was installed by the host application
            return;
        }

        if !config.log_to_console && !config.log_to_file {
            tracing::warn!("No log output configured, defaulting to stdout");
        }
        tracing::info!("Logging initialized at {} level", config.log_level);
    });
}

/// Setup default logging configuration for quick startup
pub fn setup_default_logging() {
    init_logging(&LoggingConfig::default());
}
