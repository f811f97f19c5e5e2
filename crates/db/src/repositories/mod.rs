use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use dealband_core::resolvers::ResolverError;

pub mod calibration;
pub mod cpm;
pub mod memory;
pub mod metrics;

pub use calibration::SqlCalibrationResolver;
pub use cpm::SqlCpmResolver;
pub use memory::{
    InMemoryCalibrationResolver, InMemoryCpmResolver, InMemoryMetricsResolver,
    InMemoryPriceCache,
};
pub use metrics::SqlMetricsResolver;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ResolverError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Database(error) => Self::Unavailable(error.to_string()),
            RepositoryError::Decode(message) => Self::Decode(message),
        }
    }
}

/// Decimal columns are stored as TEXT.
pub(crate) fn parse_decimal(column: &str, value: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(value.trim())
        .map_err(|error| RepositoryError::Decode(format!("invalid {column} `{value}`: {error}")))
}

pub(crate) fn parse_count(column: &str, value: i64) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::Decode(format!("{column} out of range: {value}")))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{connect_with_settings, migrations, DbPool};

    pub async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30)
            .await
            .expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use dealband_core::resolvers::ResolverError;

    use super::{parse_count, parse_decimal, RepositoryError};

    #[test]
    fn text_decimals_are_parsed_exactly() {
        assert_eq!(parse_decimal("cpm", " 12.50 ").expect("decimal"), Decimal::new(1250, 2));
        assert!(matches!(parse_decimal("cpm", "doze"), Err(RepositoryError::Decode(_))));
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert!(parse_count("sample_size", -1).is_err());
        assert_eq!(parse_count("sample_size", 12).expect("count"), 12);
    }

    #[test]
    fn decode_failures_map_to_resolver_decode_errors() {
        let error = ResolverError::from(RepositoryError::Decode("bad row".to_string()));
        assert_eq!(error, ResolverError::Decode("bad row".to_string()));
    }
}
