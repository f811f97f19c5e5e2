//! Readiness for pricing traffic.
//!
//! A reachable database is required. A missing default-segment CPM benchmark
//! still lets requests through, priced from the seed CPM, so it only degrades
//! the report.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use dealband_core::reply::format_brl;
use dealband_core::resolvers::{CpmResolver, ResolverError, DEFAULT_SEGMENT};
use dealband_db::{ping, DbPool, SqlCpmResolver};

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    benchmarks: Arc<dyn CpmResolver>,
    seed_cpm: Decimal,
}

impl HealthState {
    pub fn new(db_pool: DbPool, seed_cpm: Decimal) -> Self {
        let benchmarks = Arc::new(SqlCpmResolver::new(db_pool.clone()));
        Self { db_pool, benchmarks, seed_cpm }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Ready,
    Degraded,
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: Readiness,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: Readiness,
    pub database: HealthCheck,
    pub cpm_benchmark: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let cpm_benchmark = if database.status == Readiness::Ready {
        benchmark_check(state.benchmarks.as_ref(), state.seed_cpm).await
    } else {
        HealthCheck {
            status: Readiness::Unavailable,
            detail: "skipped: database unreachable".to_string(),
        }
    };

    let status = match (database.status, cpm_benchmark.status) {
        (Readiness::Ready, Readiness::Ready) => Readiness::Ready,
        (Readiness::Ready, _) => Readiness::Degraded,
        _ => Readiness::Unavailable,
    };
    let status_code = match status {
        Readiness::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Readiness::Ready | Readiness::Degraded => StatusCode::OK,
    };

    let payload = HealthResponse {
        status,
        database,
        cpm_benchmark,
        checked_at: Utc::now().to_rfc3339(),
    };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match ping(pool).await {
        Ok(()) => HealthCheck {
            status: Readiness::Ready,
            detail: "reference database answered".to_string(),
        },
        Err(error) => HealthCheck {
            status: Readiness::Unavailable,
            detail: format!("reference database query failed: {error}"),
        },
    }
}

/// Mirrors the pricing fallback: a missing or non-positive default benchmark
/// means every unknown segment is priced from the seed CPM.
async fn benchmark_check(benchmarks: &dyn CpmResolver, seed_cpm: Decimal) -> HealthCheck {
    let seed_fallback = || HealthCheck {
        status: Readiness::Degraded,
        detail: format!(
            "no usable `{DEFAULT_SEGMENT}` benchmark, seed CPM fallback in use ({})",
            format_brl(seed_cpm)
        ),
    };

    match benchmarks.segment_cpm(DEFAULT_SEGMENT).await {
        Ok(quote) if quote.value > Decimal::ZERO => HealthCheck {
            status: Readiness::Ready,
            detail: format!("`{DEFAULT_SEGMENT}` benchmark CPM {}", format_brl(quote.value)),
        },
        Ok(_) | Err(ResolverError::NotFound(_)) => seed_fallback(),
        Err(error) => HealthCheck {
            status: Readiness::Degraded,
            detail: format!("benchmark lookup failed, seed CPM fallback in use: {error}"),
        },
    }
}
