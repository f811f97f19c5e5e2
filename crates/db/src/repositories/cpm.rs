use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use dealband_core::domain::metrics::{CpmQuote, CpmSource};
use dealband_core::resolvers::{CpmResolver, ResolverError, DEFAULT_SEGMENT};

use super::{parse_decimal, RepositoryError};
use crate::DbPool;

/// Segment benchmarks, falling back to the `geral` row for unknown segments.
pub struct SqlCpmResolver {
    pool: DbPool,
}

impl SqlCpmResolver {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, segment: &str) -> Result<Option<CpmQuote>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT cpm, source
            FROM segment_cpm_benchmarks
            WHERE segment = ?
            "#,
        )
        .bind(segment)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| quote_from_row(&row)).transpose()
    }
}

#[async_trait]
impl CpmResolver for SqlCpmResolver {
    async fn segment_cpm(&self, segment: &str) -> Result<CpmQuote, ResolverError> {
        if let Some(quote) = self.find(segment).await? {
            return Ok(quote);
        }
        if segment != DEFAULT_SEGMENT {
            if let Some(quote) = self.find(DEFAULT_SEGMENT).await? {
                return Ok(quote);
            }
        }
        Err(ResolverError::NotFound(format!("CPM benchmark for segment {segment}")))
    }
}

fn quote_from_row(row: &SqliteRow) -> Result<CpmQuote, RepositoryError> {
    let cpm: String = row.try_get("cpm")?;
    let source: String = row.try_get("source")?;

    Ok(CpmQuote {
        value: parse_decimal("cpm", &cpm)?,
        source: match source.as_str() {
            "dynamic" => CpmSource::Dynamic,
            "seed" => CpmSource::Seed,
            other => return Err(RepositoryError::Decode(format!("invalid cpm source: {other}"))),
        },
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use dealband_core::domain::metrics::CpmSource;
    use dealband_core::resolvers::{CpmResolver, ResolverError};

    use super::SqlCpmResolver;
    use crate::repositories::test_support::setup_pool;
    use crate::DbPool;

    async fn insert_benchmark(pool: &DbPool, segment: &str, cpm: &str, source: &str) {
        sqlx::query(
            "INSERT INTO segment_cpm_benchmarks (segment, cpm, source, updated_at)
             VALUES (?, ?, ?, '2026-03-01T00:00:00Z')",
        )
        .bind(segment)
        .bind(cpm)
        .bind(source)
        .execute(pool)
        .await
        .expect("insert benchmark");
    }

    #[tokio::test]
    async fn known_segment_returns_its_benchmark() {
        let pool = setup_pool().await;
        insert_benchmark(&pool, "beleza", "14.75", "dynamic").await;

        let quote = SqlCpmResolver::new(pool.clone()).segment_cpm("beleza").await.expect("quote");
        assert_eq!(quote.value, Decimal::new(1475, 2));
        assert_eq!(quote.source, CpmSource::Dynamic);
        pool.close().await;
    }

    #[tokio::test]
    async fn unknown_segment_uses_the_general_row() {
        let pool = setup_pool().await;
        insert_benchmark(&pool, "geral", "10", "seed").await;

        let quote = SqlCpmResolver::new(pool.clone()).segment_cpm("games").await.expect("quote");
        assert_eq!(quote.value, Decimal::from(10));
        assert_eq!(quote.source, CpmSource::Seed);
        pool.close().await;
    }

    #[tokio::test]
    async fn empty_table_is_not_found() {
        let pool = setup_pool().await;
        let error =
            SqlCpmResolver::new(pool.clone()).segment_cpm("games").await.expect_err("no rows");
        assert!(matches!(error, ResolverError::NotFound(_)));
        pool.close().await;
    }
}
