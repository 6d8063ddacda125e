//! Diagnostic logging setup
//!
//! User-facing build output goes through the log sink. `tracing` carries
//! diagnostics only: quiet by default, `RUST_LOG` honoured on stderr, and
//! `--debug` writes structured JSON to a log file.

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_DEBUG_FILTER: &str =
    "info,shdeps=debug,shdeps_ops=debug,shdeps_net=debug,shdeps_store=debug";

/// Initialise the global subscriber. Returns the debug log path, if any.
pub fn init_tracing(debug_enabled: bool) -> Option<PathBuf> {
    if debug_enabled {
        let log_dir = std::env::temp_dir().join("shdeps");
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!("Warning: Failed to create log directory: {e}");
        }

        let log_file = log_dir.join(format!(
            "shdeps-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DEBUG_FILTER)),
                    )
                    .init();
                return Some(log_file);
            }
            Err(e) => {
                eprintln!("Warning: Failed to create log file: {e}");
            }
        }
    }

    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    }
    None
}
