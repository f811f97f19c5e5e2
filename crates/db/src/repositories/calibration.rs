//! Calibration halves read from creator- and segment-scoped rows.
//!
//! The creator row carries the factor and its quality metrics. The segment
//! row only contributes its sample size and window.

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use dealband_core::domain::deal::CreatorId;
use dealband_core::domain::metrics::{ConfidenceBand, CreatorCalibration, SegmentHistory};
use dealband_core::resolvers::{CalibrationResolver, ResolverError};

use super::{parse_count, parse_decimal, RepositoryError};
use crate::DbPool;

const CREATOR_SCOPE: &str = "creator";
const SEGMENT_SCOPE: &str = "segment";

#[derive(Clone, Debug, PartialEq)]
struct CalibrationRow {
    factor_raw: rust_decimal::Decimal,
    confidence: f64,
    confidence_band: ConfidenceBand,
    sample_size: u32,
    manual_link_rate: f64,
    link_quality: f64,
    mad: f64,
    window_days: u32,
}

pub struct SqlCalibrationResolver {
    pool: DbPool,
}

impl SqlCalibrationResolver {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_row(
        &self,
        scope: &str,
        scope_id: &str,
    ) -> Result<Option<CalibrationRow>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT factor_raw, confidence, confidence_band, sample_size,
                   manual_link_rate, link_quality, mad, window_days
            FROM ad_deal_calibration
            WHERE scope = ? AND scope_id = ?
            "#,
        )
        .bind(scope)
        .bind(scope_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| calibration_row_from_row(&row)).transpose()
    }
}

#[async_trait]
impl CalibrationResolver for SqlCalibrationResolver {
    async fn creator_calibration(
        &self,
        creator_id: &CreatorId,
    ) -> Result<CreatorCalibration, ResolverError> {
        let row = self.find_row(CREATOR_SCOPE, &creator_id.0).await?.ok_or_else(|| {
            ResolverError::NotFound(format!("calibration for creator {}", creator_id.0))
        })?;

        Ok(CreatorCalibration {
            factor_raw: row.factor_raw,
            confidence: row.confidence,
            confidence_band: row.confidence_band,
            sample_size: row.sample_size,
            manual_link_rate: row.manual_link_rate,
            link_quality: row.link_quality,
            mad: row.mad,
            window_days: row.window_days,
        })
    }

    async fn segment_history(&self, segment: &str) -> Result<SegmentHistory, ResolverError> {
        let row = self.find_row(SEGMENT_SCOPE, segment).await?.ok_or_else(|| {
            ResolverError::NotFound(format!("calibration history for segment {segment}"))
        })?;

        Ok(SegmentHistory { sample_size: row.sample_size, window_days: row.window_days })
    }
}

fn calibration_row_from_row(row: &SqliteRow) -> Result<CalibrationRow, RepositoryError> {
    let factor_raw: String = row.try_get("factor_raw")?;
    let confidence_band: String = row.try_get("confidence_band")?;

    Ok(CalibrationRow {
        factor_raw: parse_decimal("factor_raw", &factor_raw)?,
        confidence: row.try_get("confidence")?,
        confidence_band: confidence_band.parse().map_err(RepositoryError::Decode)?,
        sample_size: parse_count("sample_size", row.try_get("sample_size")?)?,
        manual_link_rate: row.try_get("manual_link_rate")?,
        link_quality: row.try_get("link_quality")?,
        mad: row.try_get("mad")?,
        window_days: parse_count("window_days", row.try_get("window_days")?)?,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use dealband_core::domain::deal::CreatorId;
    use dealband_core::domain::metrics::{ConfidenceBand, SegmentHistory};
    use dealband_core::resolvers::{CalibrationResolver, ResolverError};

    use super::SqlCalibrationResolver;
    use crate::repositories::test_support::setup_pool;
    use crate::DbPool;

    async fn insert_row(
        pool: &DbPool,
        scope: &str,
        scope_id: &str,
        factor_raw: &str,
        band: &str,
        sample_size: i64,
    ) {
        sqlx::query(
            "INSERT INTO ad_deal_calibration (
                scope, scope_id, factor_raw, confidence, confidence_band, sample_size,
                manual_link_rate, link_quality, mad, window_days, updated_at
             ) VALUES (?, ?, ?, 0.8, ?, ?, 0.25, 0.9, 0.1, 180, '2026-03-01T00:00:00Z')",
        )
        .bind(scope)
        .bind(scope_id)
        .bind(factor_raw)
        .bind(band)
        .bind(sample_size)
        .execute(pool)
        .await
        .expect("insert calibration");
    }

    #[tokio::test]
    async fn creator_half_carries_factor_and_quality() {
        let pool = setup_pool().await;
        insert_row(&pool, "creator", "creator-1", "1.82", "alta", 6).await;
        insert_row(&pool, "segment", "beleza", "1.05", "media", 140).await;

        let creator = SqlCalibrationResolver::new(pool.clone())
            .creator_calibration(&CreatorId("creator-1".to_string()))
            .await
            .expect("creator calibration");

        assert_eq!(creator.factor_raw, Decimal::new(182, 2));
        assert_eq!(creator.confidence_band, ConfidenceBand::Alta);
        assert_eq!(creator.sample_size, 6);
        assert_eq!(creator.window_days, 180);
        pool.close().await;
    }

    #[tokio::test]
    async fn segment_half_reports_only_history_depth() {
        let pool = setup_pool().await;
        insert_row(&pool, "segment", "beleza", "1.05", "media", 140).await;

        let history = SqlCalibrationResolver::new(pool.clone())
            .segment_history("beleza")
            .await
            .expect("segment history");

        assert_eq!(history, SegmentHistory { sample_size: 140, window_days: 180 });
        pool.close().await;
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let pool = setup_pool().await;
        insert_row(&pool, "segment", "beleza", "1.05", "media", 140).await;
        let resolver = SqlCalibrationResolver::new(pool.clone());

        let creator = resolver
            .creator_calibration(&CreatorId("creator-1".to_string()))
            .await
            .expect_err("no creator row");
        assert!(matches!(creator, ResolverError::NotFound(_)));

        let segment = resolver.segment_history("games").await.expect_err("no segment row");
        assert!(matches!(segment, ResolverError::NotFound(_)));
        pool.close().await;
    }

    #[tokio::test]
    async fn creator_row_is_not_read_as_segment_history() {
        let pool = setup_pool().await;
        insert_row(&pool, "creator", "beleza", "1.2", "alta", 9).await;

        let error = SqlCalibrationResolver::new(pool.clone())
            .segment_history("beleza")
            .await
            .expect_err("scope mismatch");
        assert!(matches!(error, ResolverError::NotFound(_)));
        pool.close().await;
    }
}
