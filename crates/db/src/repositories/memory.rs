use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use dealband_core::cache::{PriceCache, PriceCacheKey};
use dealband_core::domain::deal::CreatorId;
use dealband_core::domain::metrics::{
    CpmQuote, CreatorCalibration, CreatorMetricsSnapshot, SegmentHistory,
};
use dealband_core::pricing::PricingResult;
use dealband_core::resolvers::{
    CalibrationResolver, CpmResolver, MetricsResolver, ResolverError, DEFAULT_SEGMENT,
};

#[derive(Default)]
pub struct InMemoryMetricsResolver {
    metrics: RwLock<HashMap<String, CreatorMetricsSnapshot>>,
}

impl InMemoryMetricsResolver {
    pub async fn insert(&self, creator_id: &CreatorId, snapshot: CreatorMetricsSnapshot) {
        let mut metrics = self.metrics.write().await;
        metrics.insert(creator_id.0.clone(), snapshot);
    }
}

#[async_trait]
impl MetricsResolver for InMemoryMetricsResolver {
    async fn creator_metrics(
        &self,
        creator_id: &CreatorId,
    ) -> Result<CreatorMetricsSnapshot, ResolverError> {
        let metrics = self.metrics.read().await;
        metrics
            .get(&creator_id.0)
            .cloned()
            .ok_or_else(|| ResolverError::NotFound(format!("metrics for creator {}", creator_id.0)))
    }
}

#[derive(Default)]
pub struct InMemoryCpmResolver {
    benchmarks: RwLock<HashMap<String, CpmQuote>>,
}

impl InMemoryCpmResolver {
    pub async fn insert(&self, segment: &str, quote: CpmQuote) {
        let mut benchmarks = self.benchmarks.write().await;
        benchmarks.insert(segment.to_string(), quote);
    }
}

#[async_trait]
impl CpmResolver for InMemoryCpmResolver {
    async fn segment_cpm(&self, segment: &str) -> Result<CpmQuote, ResolverError> {
        let benchmarks = self.benchmarks.read().await;
        benchmarks
            .get(segment)
            .or_else(|| benchmarks.get(DEFAULT_SEGMENT))
            .copied()
            .ok_or_else(|| ResolverError::NotFound(format!("CPM benchmark for segment {segment}")))
    }
}

#[derive(Default)]
pub struct InMemoryCalibrationResolver {
    creators: RwLock<HashMap<String, CreatorCalibration>>,
    segments: RwLock<HashMap<String, SegmentHistory>>,
}

impl InMemoryCalibrationResolver {
    pub async fn insert_creator(&self, creator_id: &CreatorId, calibration: CreatorCalibration) {
        let mut creators = self.creators.write().await;
        creators.insert(creator_id.0.clone(), calibration);
    }

    pub async fn insert_segment(&self, segment: &str, history: SegmentHistory) {
        let mut segments = self.segments.write().await;
        segments.insert(segment.to_string(), history);
    }
}

#[async_trait]
impl CalibrationResolver for InMemoryCalibrationResolver {
    async fn creator_calibration(
        &self,
        creator_id: &CreatorId,
    ) -> Result<CreatorCalibration, ResolverError> {
        let creators = self.creators.read().await;
        creators.get(&creator_id.0).cloned().ok_or_else(|| {
            ResolverError::NotFound(format!("calibration for creator {}", creator_id.0))
        })
    }

    async fn segment_history(&self, segment: &str) -> Result<SegmentHistory, ResolverError> {
        let segments = self.segments.read().await;
        segments.get(segment).copied().ok_or_else(|| {
            ResolverError::NotFound(format!("calibration history for segment {segment}"))
        })
    }
}

/// Process-local price cache. Entries from earlier days are dropped on write.
#[derive(Default)]
pub struct InMemoryPriceCache {
    entries: RwLock<HashMap<PriceCacheKey, PricingResult>>,
}

impl InMemoryPriceCache {
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl PriceCache for InMemoryPriceCache {
    async fn get(&self, key: &PriceCacheKey) -> Option<PricingResult> {
        let entries = self.entries.read().await;
        entries.get(key).cloned()
    }

    async fn put(&self, key: PriceCacheKey, result: PricingResult) {
        let mut entries = self.entries.write().await;
        entries.retain(|existing, _| existing.day >= key.day);
        entries.insert(key, result);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use dealband_core::cache::{PriceCache, PriceCacheKey};
    use dealband_core::domain::deal::{
        CreatorId, DealParametersDraft, Exclusivity, FormatLabel, UsageRightsKind,
    };
    use dealband_core::domain::metrics::{
        ConfidenceBand, CpmQuote, CpmSource, CreatorCalibration, CreatorMetricsSnapshot,
        SegmentHistory,
    };
    use dealband_core::pricing::{calculate_price, PricingInput, PricingOptions};
    use dealband_core::resolvers::{
        CalibrationResolver, CpmResolver, MetricsResolver, ResolverError,
    };

    use crate::repositories::{
        InMemoryCalibrationResolver, InMemoryCpmResolver, InMemoryMetricsResolver,
        InMemoryPriceCache,
    };

    fn creator() -> CreatorId {
        CreatorId("creator-1".to_string())
    }

    fn metrics() -> CreatorMetricsSnapshot {
        CreatorMetricsSnapshot {
            avg_reach: Decimal::from(10_000),
            avg_engagement_rate: Decimal::new(42, 1),
            profile_segment: "beleza".to_string(),
        }
    }

    #[tokio::test]
    async fn in_memory_metrics_round_trip() {
        let resolver = InMemoryMetricsResolver::default();
        resolver.insert(&creator(), metrics()).await;

        let found = resolver.creator_metrics(&creator()).await.expect("metrics");
        assert_eq!(found, metrics());

        let missing = resolver.creator_metrics(&CreatorId("other".to_string())).await;
        assert!(matches!(missing, Err(ResolverError::NotFound(_))));
    }

    #[tokio::test]
    async fn in_memory_cpm_falls_back_to_general_segment() {
        let resolver = InMemoryCpmResolver::default();
        resolver.insert("geral", CpmQuote::seed(Decimal::from(10))).await;

        let quote = resolver.segment_cpm("games").await.expect("quote");
        assert_eq!(quote.source, CpmSource::Seed);
    }

    #[tokio::test]
    async fn in_memory_calibration_keeps_halves_apart() {
        let resolver = InMemoryCalibrationResolver::default();
        resolver
            .insert_creator(
                &creator(),
                CreatorCalibration {
                    factor_raw: Decimal::new(11, 1),
                    confidence: 0.8,
                    confidence_band: ConfidenceBand::Alta,
                    sample_size: 7,
                    manual_link_rate: 0.1,
                    link_quality: 0.9,
                    mad: 0.05,
                    window_days: 365,
                },
            )
            .await;
        resolver.insert_segment("beleza", SegmentHistory { sample_size: 90, window_days: 180 }).await;

        let creator_half = resolver.creator_calibration(&creator()).await.expect("creator half");
        assert_eq!(creator_half.sample_size, 7);
        let history = resolver.segment_history("beleza").await.expect("segment half");
        assert_eq!(history.sample_size, 90);
        assert!(matches!(resolver.segment_history("games").await, Err(ResolverError::NotFound(_))));
    }

    #[tokio::test]
    async fn price_cache_evicts_previous_days_on_write() {
        let params = DealParametersDraft {
            format: Some(FormatLabel::Reels),
            exclusivity: Some(Exclusivity::Nenhuma),
            usage_rights: Some(UsageRightsKind::Organico),
            ..DealParametersDraft::default()
        }
        .into_params()
        .expect("valid params");
        let result = calculate_price(
            PricingInput {
                metrics: &metrics(),
                cpm: &CpmQuote { value: Decimal::from(10), source: CpmSource::Dynamic },
                calibration: None,
                params: &params,
            },
            &PricingOptions::default(),
        );

        let monday = NaiveDate::from_ymd_opt(2026, 3, 9).expect("date");
        let tuesday = NaiveDate::from_ymd_opt(2026, 3, 10).expect("date");
        let cache = InMemoryPriceCache::default();
        let old_key = PriceCacheKey::new(&creator(), &params, monday).expect("key");
        let new_key = PriceCacheKey::new(&creator(), &params, tuesday).expect("key");

        cache.put(old_key.clone(), result.clone()).await;
        assert_eq!(cache.get(&old_key).await, Some(result.clone()));

        cache.put(new_key.clone(), result.clone()).await;
        assert!(cache.get(&old_key).await.is_none());
        assert_eq!(cache.len().await, 1);
        assert!(!cache.is_empty().await);
    }
}
