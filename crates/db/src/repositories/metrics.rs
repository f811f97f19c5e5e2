use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use dealband_core::domain::deal::CreatorId;
use dealband_core::domain::metrics::CreatorMetricsSnapshot;
use dealband_core::resolvers::{MetricsResolver, ResolverError};

use super::{parse_decimal, RepositoryError};
use crate::DbPool;

pub struct SqlMetricsResolver {
    pool: DbPool,
}

impl SqlMetricsResolver {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find(
        &self,
        creator_id: &CreatorId,
    ) -> Result<Option<CreatorMetricsSnapshot>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT avg_reach, avg_engagement_rate, profile_segment
            FROM creator_metrics
            WHERE creator_id = ?
            "#,
        )
        .bind(&creator_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| metrics_from_row(&row)).transpose()
    }
}

#[async_trait]
impl MetricsResolver for SqlMetricsResolver {
    async fn creator_metrics(
        &self,
        creator_id: &CreatorId,
    ) -> Result<CreatorMetricsSnapshot, ResolverError> {
        self.find(creator_id)
            .await?
            .ok_or_else(|| ResolverError::NotFound(format!("metrics for creator {}", creator_id.0)))
    }
}

fn metrics_from_row(row: &SqliteRow) -> Result<CreatorMetricsSnapshot, RepositoryError> {
    let avg_reach: String = row.try_get("avg_reach")?;
    let avg_engagement_rate: String = row.try_get("avg_engagement_rate")?;

    Ok(CreatorMetricsSnapshot {
        avg_reach: parse_decimal("avg_reach", &avg_reach)?,
        avg_engagement_rate: parse_decimal("avg_engagement_rate", &avg_engagement_rate)?,
        profile_segment: row.try_get("profile_segment")?,
    })
}
