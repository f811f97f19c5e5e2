use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::calibration::CalibrationPolicy;
use crate::pricing::PricingOptions;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct PricingConfig {
    pub risk_module_enabled: bool,
    pub calibration_enabled: bool,
    /// CPM used when the benchmark lookup fails or has no row for a segment.
    pub seed_cpm: Decimal,
    pub min_segment_samples: u32,
    pub min_creator_samples: u32,
    pub cache_enabled: bool,
}

impl PricingConfig {
    pub fn options(&self) -> PricingOptions {
        PricingOptions {
            risk_module_enabled: self.risk_module_enabled,
            calibration_enabled: self.calibration_enabled,
            calibration_policy: CalibrationPolicy {
                min_segment_samples: self.min_segment_samples,
                min_creator_samples: self.min_creator_samples,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub server_port: Option<u16>,
    pub risk_module_enabled: Option<bool>,
    pub calibration_enabled: Option<bool>,
    pub cache_enabled: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let policy = CalibrationPolicy::default();
        Self {
            database: DatabaseConfig {
                url: "sqlite://dealband.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            pricing: PricingConfig {
                risk_module_enabled: true,
                calibration_enabled: true,
                seed_cpm: Decimal::from(10),
                min_segment_samples: policy.min_segment_samples,
                min_creator_samples: policy.min_creator_samples,
                cache_enabled: true,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("dealband.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(enabled) = pricing.risk_module_enabled {
                self.pricing.risk_module_enabled = enabled;
            }
            if let Some(enabled) = pricing.calibration_enabled {
                self.pricing.calibration_enabled = enabled;
            }
            if let Some(seed_cpm) = pricing.seed_cpm {
                self.pricing.seed_cpm = seed_cpm;
            }
            if let Some(samples) = pricing.min_segment_samples {
                self.pricing.min_segment_samples = samples;
            }
            if let Some(samples) = pricing.min_creator_samples {
                self.pricing.min_creator_samples = samples;
            }
            if let Some(enabled) = pricing.cache_enabled {
                self.pricing.cache_enabled = enabled;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("DEALBAND_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("DEALBAND_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("DEALBAND_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("DEALBAND_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("DEALBAND_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("DEALBAND_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("DEALBAND_SERVER_PORT") {
            self.server.port = parse_u16("DEALBAND_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("DEALBAND_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("DEALBAND_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("DEALBAND_PRICING_RISK_MODULE_ENABLED") {
            self.pricing.risk_module_enabled =
                parse_bool("DEALBAND_PRICING_RISK_MODULE_ENABLED", &value)?;
        }
        if let Some(value) = read_env("DEALBAND_PRICING_CALIBRATION_ENABLED") {
            self.pricing.calibration_enabled =
                parse_bool("DEALBAND_PRICING_CALIBRATION_ENABLED", &value)?;
        }
        if let Some(value) = read_env("DEALBAND_PRICING_SEED_CPM") {
            self.pricing.seed_cpm = parse_decimal("DEALBAND_PRICING_SEED_CPM", &value)?;
        }
        if let Some(value) = read_env("DEALBAND_PRICING_MIN_SEGMENT_SAMPLES") {
            self.pricing.min_segment_samples =
                parse_u32("DEALBAND_PRICING_MIN_SEGMENT_SAMPLES", &value)?;
        }
        if let Some(value) = read_env("DEALBAND_PRICING_MIN_CREATOR_SAMPLES") {
            self.pricing.min_creator_samples =
                parse_u32("DEALBAND_PRICING_MIN_CREATOR_SAMPLES", &value)?;
        }
        if let Some(value) = read_env("DEALBAND_PRICING_CACHE_ENABLED") {
            self.pricing.cache_enabled = parse_bool("DEALBAND_PRICING_CACHE_ENABLED", &value)?;
        }

        let log_level =
            read_env("DEALBAND_LOGGING_LEVEL").or_else(|| read_env("DEALBAND_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("DEALBAND_LOGGING_FORMAT").or_else(|| read_env("DEALBAND_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(enabled) = overrides.risk_module_enabled {
            self.pricing.risk_module_enabled = enabled;
        }
        if let Some(enabled) = overrides.calibration_enabled {
            self.pricing.calibration_enabled = enabled;
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.pricing.cache_enabled = enabled;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_pricing(&self.pricing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("dealband.toml"), PathBuf::from("config/dealband.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    if pricing.seed_cpm <= Decimal::ZERO {
        return Err(ConfigError::Validation(
            "pricing.seed_cpm must be greater than zero".to_string(),
        ));
    }

    if pricing.min_segment_samples == 0 || pricing.min_creator_samples == 0 {
        return Err(ConfigError::Validation(
            "pricing.min_segment_samples and pricing.min_creator_samples must be at least 1"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| invalid_override(key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| invalid_override(key, value))
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value.trim()).map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    risk_module_enabled: Option<bool>,
    calibration_enabled: Option<bool>,
    seed_cpm: Option<Decimal>,
    min_segment_samples: Option<u32>,
    min_creator_samples: Option<u32>,
    cache_enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
