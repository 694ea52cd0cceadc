//! Logging Infrastructure
//!
//! Structured logging for development (pretty console) and production (JSON).
//! With a log directory, application events go to `app/` and events with
//! target `security` (see [`security_log!`](crate::security_log)) go to
//! `security/`, both rotated daily.

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the logger with defaults (info, console only)
pub fn init_logger() {
    init_logger_with_file(None, None, None);
}

fn file_layer(dir: &Path, name: &str, json: bool, security: bool) -> std::io::Result<BoxedLayer> {
    let sub_dir = dir.join(name);
    fs::create_dir_all(&sub_dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, sub_dir, name);
    let only = tracing_subscriber::filter::filter_fn(move |meta| {
        (meta.target() == "security") == security
    });

    let layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(appender));
    Ok(if json {
        layer.json().with_filter(only).boxed()
    } else {
        layer.with_filter(only).boxed()
    })
}

/// Initialize the logger with optional JSON formatting and file output
///
/// `RUST_LOG` overrides `log_level` when set. Calling this twice keeps the
/// first subscriber.
pub fn init_logger_with_file(log_level: Option<&str>, json: Option<bool>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let json = json.unwrap_or(false);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console: BoxedLayer = if json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let mut layers = vec![console];
    if let Some(dir) = log_dir {
        let dir = Path::new(dir);
        for (name, security) in [("app", false), ("security", true)] {
            match file_layer(dir, name, json, security) {
                Ok(layer) => layers.push(layer),
                Err(e) => eprintln!("Log directory {} unavailable: {e}", dir.display()),
            }
        }
    }

    let result = tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init();
    if let Err(e) = result {
        eprintln!("Logger already initialized: {e}");
    }
}
