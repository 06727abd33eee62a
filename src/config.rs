use crate::error::Error;
use crate::permissions::PermissionPolicy;
use crate::scheduler::Schedule;
use crate::transfer::TransferMode;
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

/// Raw settings as they arrive from `Config.toml` and the environment.
/// Everything lenient or optional stays a string here; `validate` turns
/// it into the typed [`AppConfig`] the rest of the crate consumes.
#[derive(Debug, Deserialize)]
struct RawConfig {
    source_dir: Option<String>,
    dest_dir: Option<String>,
    mode: String,
    permissions: String,
    schedule: String,
    email: Option<String>,
    smtp_host: Option<String>,
    smtp_port: u16,
    smtp_user: Option<String>,
    smtp_password: Option<String>,
    smtp_use_tls: bool,
    ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
}

/// Validated, immutable process settings. Constructed once at startup
/// and passed into the engine; nothing downstream reads the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub mode: TransferMode,
    pub permissions: PermissionPolicy,
    pub schedule: Schedule,
    pub email: Option<String>,
    pub smtp: Option<SmtpConfig>,
    pub ignore_patterns: Vec<String>,
}

/// Load settings from an optional `Config.toml` plus the environment
/// (a `.env` file is folded in by `dotenv` before we get here).
pub fn load_configuration() -> Result<AppConfig, Error> {
    let builder = Config::builder()
        .set_default("mode", "copy")?
        .set_default("permissions", "original")?
        .set_default("schedule", "daily")?
        .set_default("smtp_port", 587)?
        .set_default("smtp_use_tls", true)?
        .set_default("ignore_patterns", Vec::<String>::new())?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::default())
        .build()?;

    let raw = builder.try_deserialize::<RawConfig>()?;
    validate(raw)
}

fn validate(raw: RawConfig) -> Result<AppConfig, Error> {
    let source_dir = raw
        .source_dir
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidConfig("SOURCE_DIR must be set".to_string()))?;
    let dest_dir = raw
        .dest_dir
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidConfig("DEST_DIR must be set".to_string()))?;

    let mode = match raw.mode.to_lowercase().as_str() {
        "move" => TransferMode::Move,
        "copy" => TransferMode::Copy,
        other => {
            warn!("Invalid MODE value: {}. Using 'copy'.", other);
            TransferMode::Copy
        }
    };

    let permissions = PermissionPolicy::parse_lenient(&raw.permissions);
    let schedule = Schedule::parse(&raw.schedule);

    let smtp = raw.smtp_host.filter(|h| !h.is_empty()).map(|host| SmtpConfig {
        host,
        port: raw.smtp_port,
        user: raw.smtp_user,
        password: raw.smtp_password,
        use_tls: raw.smtp_use_tls,
    });

    Ok(AppConfig {
        source_dir: PathBuf::from(source_dir),
        dest_dir: PathBuf::from(dest_dir),
        mode,
        permissions,
        schedule,
        email: raw.email.filter(|e| !e.is_empty()),
        smtp,
        ignore_patterns: raw.ignore_patterns,
    })
}
