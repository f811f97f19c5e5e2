//! Read-only collaborators consulted before pricing.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::deal::CreatorId;
use crate::domain::metrics::{
    CpmQuote, CreatorCalibration, CreatorMetricsSnapshot, SegmentHistory,
};

/// Segment used when neither the request nor the creator profile names one.
pub const DEFAULT_SEGMENT: &str = "geral";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolverError {
    #[error("no data found for {0}")]
    NotFound(String),
    #[error("resolver unavailable: {0}")]
    Unavailable(String),
    #[error("could not decode resolver data: {0}")]
    Decode(String),
}

#[async_trait]
pub trait MetricsResolver: Send + Sync {
    async fn creator_metrics(
        &self,
        creator_id: &CreatorId,
    ) -> Result<CreatorMetricsSnapshot, ResolverError>;
}

#[async_trait]
pub trait CpmResolver: Send + Sync {
    async fn segment_cpm(&self, segment: &str) -> Result<CpmQuote, ResolverError>;
}

/// Calibration comes in two independently keyed halves so the creator half
/// can be fetched before the segment is known.
#[async_trait]
pub trait CalibrationResolver: Send + Sync {
    async fn creator_calibration(
        &self,
        creator_id: &CreatorId,
    ) -> Result<CreatorCalibration, ResolverError>;

    async fn segment_history(&self, segment: &str) -> Result<SegmentHistory, ResolverError>;
}
