use shared::i18n::Locale;
use std::path::PathBuf;

/// Default association name used in report titles
pub const DEFAULT_ASSOCIATION_NAME: &str = "ZIKOBOUÉ POUR LA VIE";

/// Back-office configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Working directory (database, uploads, logs) |
/// | DATABASE_PATH | <WORK_DIR>/office.db | SQLite database file |
/// | UPLOAD_DIR | <WORK_DIR>/uploads | Blob store root |
/// | LOG_LEVEL | info | Max log level |
/// | LOG_DIR | - | Daily rolling log files (`app/`, `security/`) |
/// | LOG_JSON | false | JSON log lines |
/// | ENVIRONMENT | development | Runtime environment |
/// | LOCALE | fr | Default locale for user-facing text |
/// | ASSOCIATION_NAME | ZIKOBOUÉ POUR LA VIE | Name printed in report titles |
/// | MAX_UPLOAD_BYTES | 10485760 | Attachment size limit |
/// | UP_TO_DATE_WINDOW_DAYS | 30 | Member standing window |
/// | ADMIN_EMAIL | - | Bootstrap administrator account |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/srv/office LOCALE=fr cargo run -p office-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub database_path: String,
    pub upload_dir: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    /// development | staging | production
    pub environment: String,
    pub locale: Locale,
    pub association_name: String,
    pub max_upload_bytes: u64,
    pub up_to_date_window_days: i64,
    pub admin_email: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn join(dir: &str, name: &str) -> String {
    PathBuf::from(dir).join(name).to_string_lossy().into_owned()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to their defaults.
    pub fn from_env() -> Self {
        let work_dir = env_or("WORK_DIR", "./data");
        Self {
            database_path: env_or("DATABASE_PATH", &join(&work_dir, "office.db")),
            upload_dir: env_or("UPLOAD_DIR", &join(&work_dir, "uploads")),
            log_level: env_or("LOG_LEVEL", "info"),
            log_dir: std::env::var("LOG_DIR").ok().filter(|v| !v.trim().is_empty()),
            log_json: env_parse("LOG_JSON", false),
            environment: env_or("ENVIRONMENT", "development"),
            locale: env_parse("LOCALE", Locale::Fr),
            association_name: env_or("ASSOCIATION_NAME", DEFAULT_ASSOCIATION_NAME),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            up_to_date_window_days: env_parse("UP_TO_DATE_WINDOW_DAYS", 30),
            admin_email: std::env::var("ADMIN_EMAIL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            work_dir,
        }
    }

    /// Override the working directory and the paths derived from it
    ///
    /// Used by tests
    pub fn with_overrides(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        let work_dir = work_dir.into();
        config.database_path = join(&work_dir, "office.db");
        config.upload_dir = join(&work_dir, "uploads");
        config.work_dir = work_dir;
        config
    }

    /// Attachment size limit in kilobytes (for messages)
    pub fn max_upload_kb(&self) -> u64 {
        self.max_upload_bytes / 1024
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
