use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorMetricsSnapshot {
    pub avg_reach: Decimal,
    /// Percentage, e.g. `4.2` for 4.2%.
    pub avg_engagement_rate: Decimal,
    pub profile_segment: String,
}

impl CreatorMetricsSnapshot {
    pub fn is_usable(&self) -> bool {
        self.avg_reach > Decimal::ZERO
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpmSource {
    Dynamic,
    Seed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpmQuote {
    pub value: Decimal,
    pub source: CpmSource,
}

impl CpmQuote {
    pub fn seed(value: Decimal) -> Self {
        Self { value, source: CpmSource::Seed }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    Baixa,
    Media,
    Alta,
}

impl std::str::FromStr for ConfidenceBand {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "baixa" => Ok(Self::Baixa),
            "media" => Ok(Self::Media),
            "alta" => Ok(Self::Alta),
            other => Err(format!("unknown confidence band `{other}`")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationSnapshot {
    pub factor_raw: Decimal,
    pub confidence: f64,
    pub confidence_band: ConfidenceBand,
    pub segment_sample_size: u32,
    pub creator_sample_size: u32,
    pub manual_link_rate: f64,
    pub link_quality: f64,
    pub mad: f64,
    pub window_days_segment: u32,
    pub window_days_creator: u32,
}

/// Creator-scoped calibration row: the historical factor and the quality of
/// the deals behind it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorCalibration {
    pub factor_raw: Decimal,
    pub confidence: f64,
    pub confidence_band: ConfidenceBand,
    pub sample_size: u32,
    pub manual_link_rate: f64,
    pub link_quality: f64,
    pub mad: f64,
    pub window_days: u32,
}

/// How much deal history backs a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentHistory {
    pub sample_size: u32,
    pub window_days: u32,
}

impl CalibrationSnapshot {
    /// Joins both halves. Without segment history the segment sample size is
    /// zero, which keeps the snapshot below any usable threshold.
    pub fn from_parts(creator: CreatorCalibration, segment: Option<SegmentHistory>) -> Self {
        let segment = segment.unwrap_or(SegmentHistory { sample_size: 0, window_days: 0 });
        Self {
            factor_raw: creator.factor_raw,
            confidence: creator.confidence,
            confidence_band: creator.confidence_band,
            segment_sample_size: segment.sample_size,
            creator_sample_size: creator.sample_size,
            manual_link_rate: creator.manual_link_rate,
            link_quality: creator.link_quality,
            mad: creator.mad,
            window_days_segment: segment.window_days,
            window_days_creator: creator.window_days,
        }
    }
}
