use std::env;

use thiserror::Error;

use crate::domain::types::ClipboardEventKind;

const DEFAULT_CLIPBOARD_SUPPRESSED: &[ClipboardEventKind] =
    &[ClipboardEventKind::Copy, ClipboardEventKind::Cut, ClipboardEventKind::Paste];

const DEFAULT_WARNING_THRESHOLD: u32 = 3;
const DEFAULT_TICK_SECONDS: u64 = 1;

#[derive(Debug, Clone)]
pub struct Settings {
    runtime: RuntimeSettings,
    integrity: IntegritySettings,
    timer: TimerSettings,
    telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub struct IntegritySettings {
    pub warning_threshold: u32,
    pub clipboard_suppressed: Vec<ClipboardEventKind>,
}

#[derive(Debug, Clone)]
pub struct TimerSettings {
    pub tick_interval_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub environment: Environment,
    pub strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Test => "test",
        }
    }

    fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("invalid clipboard event list: {0}")]
    InvalidClipboardList(String),
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment =
            parse_environment(env_optional("LUMORA_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("LUMORA_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let warning_threshold = parse_u32(
            "LUMORA_INTEGRITY_WARNING_THRESHOLD",
            env_or_default("LUMORA_INTEGRITY_WARNING_THRESHOLD", "3"),
        )?;
        let clipboard_suppressed =
            parse_clipboard_kinds(env_optional("LUMORA_CLIPBOARD_SUPPRESSED"))?;

        let tick_interval_seconds = parse_u64(
            "LUMORA_TIMER_TICK_SECONDS",
            env_or_default("LUMORA_TIMER_TICK_SECONDS", "1"),
        )?;

        let log_level = env_or_default("LUMORA_LOG_LEVEL", "info");
        let json = env_optional("LUMORA_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);

        let mut settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            integrity: IntegritySettings { warning_threshold, clipboard_suppressed },
            timer: TimerSettings { tick_interval_seconds },
            telemetry: TelemetrySettings { log_level, json },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub fn integrity(&self) -> &IntegritySettings {
        &self.integrity
    }

    pub fn timer(&self) -> &TimerSettings {
        &self.timer
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    /// Strict mode (explicit opt-in, or any production environment) turns
    /// unusable values into hard errors; lenient mode logs and falls back
    /// to the defaults so a local session can still start.
    fn validate(&mut self) -> Result<(), ConfigError> {
        let strict = self.runtime.strict_config || self.runtime.environment.is_production();

        if self.integrity.warning_threshold == 0 {
            if strict {
                return Err(ConfigError::InvalidValue {
                    field: "LUMORA_INTEGRITY_WARNING_THRESHOLD",
                    value: String::from("0"),
                });
            }
            tracing::warn!(
                fallback = DEFAULT_WARNING_THRESHOLD,
                "LUMORA_INTEGRITY_WARNING_THRESHOLD must be at least 1, using default"
            );
            self.integrity.warning_threshold = DEFAULT_WARNING_THRESHOLD;
        }

        if self.timer.tick_interval_seconds == 0 {
            if strict {
                return Err(ConfigError::InvalidValue {
                    field: "LUMORA_TIMER_TICK_SECONDS",
                    value: String::from("0"),
                });
            }
            tracing::warn!(
                fallback = DEFAULT_TICK_SECONDS,
                "LUMORA_TIMER_TICK_SECONDS must be at least 1, using default"
            );
            self.timer.tick_interval_seconds = DEFAULT_TICK_SECONDS;
        }

        Ok(())
    }
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_u32(field: &'static str, value: String) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref().map(|val| val.to_lowercase()) {
        Some(ref val) if val == "production" || val == "prod" => Environment::Production,
        Some(ref val) if val == "staging" => Environment::Staging,
        Some(ref val) if val == "test" || val == "testing" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_clipboard_kinds(
    value: Option<String>,
) -> Result<Vec<ClipboardEventKind>, ConfigError> {
    let Some(raw) = value else {
        return Ok(DEFAULT_CLIPBOARD_SUPPRESSED.to_vec());
    };

    if raw.trim().is_empty() {
        return Ok(DEFAULT_CLIPBOARD_SUPPRESSED.to_vec());
    }

    let items: Vec<String> = if raw.trim_start().starts_with('[') {
        serde_json::from_str(&raw).map_err(|_| ConfigError::InvalidClipboardList(raw.clone()))?
    } else {
        raw.split(',')
            .map(|item| item.trim().to_ascii_lowercase())
            .filter(|item| !item.is_empty())
            .collect()
    };

    if items.is_empty() {
        return Ok(DEFAULT_CLIPBOARD_SUPPRESSED.to_vec());
    }

    items
        .into_iter()
        .map(|item| match item.as_str() {
            "copy" => Ok(ClipboardEventKind::Copy),
            "cut" => Ok(ClipboardEventKind::Cut),
            "paste" => Ok(ClipboardEventKind::Paste),
            other => Err(ConfigError::InvalidClipboardList(other.to_string())),
        })
        .collect()
}
