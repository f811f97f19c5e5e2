use std::sync::Arc;

use dealband_agent::{AgentRuntime, PricingResolvers};
use dealband_core::config::{AppConfig, ConfigError, LoadOptions};
use dealband_core::pricing::DeterministicPricingCalculator;
use dealband_db::{
    connect_with_config, migrations, DbPool, InMemoryPriceCache, SqlCalibrationResolver,
    SqlCpmResolver, SqlMetricsResolver,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runtime: Arc<AgentRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let runtime = Arc::new(build_runtime(&config, &db_pool));
    info!(
        event_name = "system.bootstrap.pricing_ready",
        correlation_id = "bootstrap",
        risk_module_enabled = config.pricing.risk_module_enabled,
        calibration_enabled = config.pricing.calibration_enabled,
        cache_enabled = config.pricing.cache_enabled,
        "pricing runtime initialized"
    );

    Ok(Application { config, db_pool, runtime })
}

/// SQL-backed resolvers over the reference tables.
pub fn build_runtime(config: &AppConfig, db_pool: &DbPool) -> AgentRuntime {
    let resolvers = PricingResolvers {
        metrics: Arc::new(SqlMetricsResolver::new(db_pool.clone())),
        cpm: Arc::new(SqlCpmResolver::new(db_pool.clone())),
        calibration: Arc::new(SqlCalibrationResolver::new(db_pool.clone())),
    };
    let runtime = AgentRuntime::new(
        resolvers,
        DeterministicPricingCalculator::new(config.pricing.options()),
        config.pricing.seed_cpm,
    );

    if config.pricing.cache_enabled {
        runtime.with_cache(Arc::new(InMemoryPriceCache::default()))
    } else {
        runtime
    }
}

#[cfg(test)]
mod tests {
    use dealband_agent::PriceDealRequest;
    use dealband_core::config::{ConfigOverrides, LoadOptions};
    use dealband_core::domain::deal::{
        CreatorId, DealParametersDraft, Exclusivity, FormatLabel, UsageRightsKind,
    };
    use dealband_core::domain::metrics::CpmSource;
    use dealband_core::pricing::PricingOutcome;
    use rust_decimal::Decimal;

    use crate::bootstrap::bootstrap;

    fn memory_options() -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_applies_reference_schema() {
        let app = bootstrap(memory_options()).await.expect("bootstrap");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('creator_metrics', 'segment_cpm_benchmarks', 'ad_deal_calibration')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("reference tables");
        assert_eq!(table_count, 3);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn empty_reference_data_yields_seeded_provisional_estimate() {
        let app = bootstrap(memory_options()).await.expect("bootstrap");

        let outcome = app
            .runtime
            .price_deal(
                &PriceDealRequest {
                    creator_id: CreatorId("creator-new".to_string()),
                    params: DealParametersDraft {
                        format: Some(FormatLabel::Reels),
                        exclusivity: Some(Exclusivity::Nenhuma),
                        usage_rights: Some(UsageRightsKind::Organico),
                        ..DealParametersDraft::default()
                    },
                    segment: None,
                },
                "bootstrap-test",
            )
            .await
            .expect("outcome");

        let PricingOutcome::InsufficientData(estimate) = outcome else {
            panic!("expected provisional estimate");
        };
        assert_eq!(estimate.cpm.source, CpmSource::Seed);
        assert_eq!(estimate.per_thousand_reach.justo, Decimal::from(14));

        app.db_pool.close().await;
    }
}
