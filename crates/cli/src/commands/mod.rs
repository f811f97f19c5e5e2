pub mod chat;
pub mod config;
pub mod doctor;
pub mod migrate;
pub mod parse;
pub mod price;

use std::future::Future;
use std::sync::Arc;

use dealband_agent::{AgentRuntime, PricingResolvers};
use dealband_core::config::{AppConfig, LoadOptions};
use dealband_core::pricing::DeterministicPricingCalculator;
use dealband_db::{
    connect_with_config, migrations, DbPool, SqlCalibrationResolver, SqlCpmResolver,
    SqlMetricsResolver,
};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Failure triple threaded through command bodies: error class, message, exit code.
pub(crate) type CommandFailure = (&'static str, String, u8);

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config() -> Result<AppConfig, CommandFailure> {
    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| ("config_validation", format!("configuration issue: {error}"), 2))?;
    init_logging(&config);
    Ok(config)
}

/// Diagnostics go to stderr so stdout stays a single JSON envelope. Repeat
/// calls within one process keep the first subscriber.
fn init_logging(config: &AppConfig) {
    use dealband_core::config::LogFormat::*;

    let filter = EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    let _ = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}

/// Runs an async command body on a fresh current-thread runtime.
pub(crate) fn block_on<T, F>(body: F) -> Result<T, CommandFailure>
where
    F: Future<Output = Result<T, CommandFailure>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| ("runtime_init", format!("failed to initialize async runtime: {error}"), 3))?;
    runtime.block_on(body)
}

pub(crate) async fn open_database(config: &AppConfig) -> Result<DbPool, CommandFailure> {
    let pool = connect_with_config(&config.database)
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4))?;
    migrations::run_pending(&pool).await.map_err(|error| ("migration", error.to_string(), 5))?;
    Ok(pool)
}

/// Pricing runtime over the configured reference database. The CLI is one-shot,
/// so no price cache is attached.
pub(crate) fn pricing_runtime(config: &AppConfig, pool: &DbPool) -> AgentRuntime {
    AgentRuntime::new(
        PricingResolvers {
            metrics: Arc::new(SqlMetricsResolver::new(pool.clone())),
            cpm: Arc::new(SqlCpmResolver::new(pool.clone())),
            calibration: Arc::new(SqlCalibrationResolver::new(pool.clone())),
        },
        DeterministicPricingCalculator::new(config.pricing.options()),
        config.pricing.seed_cpm,
    )
}

pub(crate) fn correlation_id(command: &str) -> String {
    format!("cli-{command}-{}", uuid::Uuid::new_v4())
}

pub(crate) fn to_value<T: Serialize>(value: &T) -> Result<Value, CommandFailure> {
    serde_json::to_value(value).map_err(|error| ("serialization", error.to_string(), 6))
}

pub(crate) fn finish(command: &str, result: Result<CommandResult, CommandFailure>) -> CommandResult {
    result.unwrap_or_else(|(error_class, message, exit_code)| {
        CommandResult::failure(command, error_class, message, exit_code)
    })
}
