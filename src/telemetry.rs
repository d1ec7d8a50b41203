//! Tracing subscriber setup for hosts that don't install their own.

use crate::config::LoggingConfig;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "bgsubs";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `config.level`. When a log directory is configured the
/// returned guard must be kept alive to flush the file writer. Returns `None`
/// without touching anything if a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let mut file_error = None;
    let (file_layer, guard) = match &config.directory {
        Some(directory) => match RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix("log")
            .build(directory)
        {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer().with_ansi(false).with_writer(writer);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                file_error = Some(format!("{}: {e}", directory.display()));
                (None, None)
            }
        },
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    let installed = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };

    if installed.is_err() {
        return None;
    }

    if let Some(error) = file_error {
        warn!(%error, "file logging disabled");
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "debug".to_string(),
            json: true,
            directory: Some(dir.path().to_path_buf()),
        };

        // Another test may have installed a subscriber already; neither call may panic
        let _first = init_tracing(&config);
        let second = init_tracing(&LoggingConfig::default());
        assert!(second.is_none());
    }
}
