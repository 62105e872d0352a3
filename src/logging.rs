use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::domain::ExplorerError;

pub const LOG_FILE: &str = concat!(env!("CARGO_PKG_NAME"), ".log");

/// Logs go to a file; the terminal belongs to the ui. An explicit level
/// overrides `RUST_LOG`, which otherwise defaults to WARN.
pub fn init(
    log_path: Option<&Path>,
    level: Option<tracing::Level>,
) -> Result<PathBuf, ExplorerError> {
    let log_path = match log_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            path.to_path_buf()
        }
        None => std::env::current_dir()?.join(LOG_FILE),
    };

    let env_filter = match level {
        Some(lvl) => EnvFilter::builder()
            .with_default_directive(lvl.into())
            .parse_lossy(""),
        None => EnvFilter::builder()
            .with_default_directive(tracing::Level::WARN.into())
            .from_env_lossy(),
    };

    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
    let file_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(log_path)
}
