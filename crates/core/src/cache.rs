//! Day-scoped price cache contract.
//!
//! A cached [`PricingResult`] never carries logistics: travel and hotel costs
//! are trip-specific, so they are stripped before storing and recomputed from
//! the live request on every hit.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::deal::{CreatorId, DealParameters, Delivery};
use crate::errors::DomainError;
use crate::pricing::{logistics_estimate, PricingResult};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PriceCacheKey {
    pub creator_id: String,
    pub shape_hash: String,
    pub day: NaiveDate,
}

impl PriceCacheKey {
    pub fn new(
        creator_id: &CreatorId,
        params: &DealParameters,
        day: NaiveDate,
    ) -> Result<Self, DomainError> {
        Ok(Self { creator_id: creator_id.0.clone(), shape_hash: shape_hash(params)?, day })
    }
}

/// blake3 of the normalized deal shape. Hotel nights only move logistics, so
/// they are left out.
pub fn shape_hash(params: &DealParameters) -> Result<String, DomainError> {
    let mut draft = params.to_draft();
    if let Some(details) = draft.event_details.as_mut() {
        details.hotel_nights = None;
    }

    let canonical = serde_json::to_vec(&draft).map_err(|error| {
        DomainError::InvariantViolation(format!("deal shape is not serializable: {error}"))
    })?;
    Ok(blake3::hash(&canonical).to_hex().to_string())
}

/// Copy of `result` safe to store under a [`PriceCacheKey`].
pub fn cacheable(result: &PricingResult) -> PricingResult {
    let mut stored = result.clone();
    stored.breakdown.logistics_suggested = None;
    stored.breakdown.logistics_included_in_cache = false;
    if let Some(details) = stored.params.event_details.as_mut() {
        details.hotel_nights = None;
    }
    stored
}

/// Re-attaches the requester's own logistics and params echo to a cache hit.
pub fn rehydrate(mut cached: PricingResult, params: &DealParameters) -> PricingResult {
    cached.breakdown.logistics_suggested = match &params.delivery {
        Delivery::Evento(deal) => logistics_estimate(&deal.details),
        Delivery::Conteudo(_) => None,
    };
    cached.breakdown.logistics_included_in_cache = false;
    cached.params = params.to_draft();
    cached
}

#[async_trait]
pub trait PriceCache: Send + Sync {
    async fn get(&self, key: &PriceCacheKey) -> Option<PricingResult>;
    async fn put(&self, key: PriceCacheKey, result: PricingResult);
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{cacheable, rehydrate, PriceCacheKey};
    use crate::domain::deal::{
        CreatorId, DealParameters, DealParametersDraft, DeliveryType, EventDetailsDraft,
        TravelTier,
    };
    use crate::domain::metrics::{CpmQuote, CpmSource, CreatorMetricsSnapshot};
    use crate::pricing::{calculate_price, PricingInput, PricingOptions};

    fn event(hotel_nights: u32, travel_tier: TravelTier) -> DealParameters {
        DealParametersDraft {
            delivery_type: Some(DeliveryType::Evento),
            event_details: Some(EventDetailsDraft {
                duration_hours: Some(Decimal::from(4)),
                travel_tier: Some(travel_tier),
                hotel_nights: Some(hotel_nights),
            }),
            ..DealParametersDraft::default()
        }
        .into_params()
        .expect("valid event")
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
    }

    #[test]
    fn hotel_nights_do_not_change_the_key() {
        let creator = CreatorId("creator-1".to_string());
        let one = PriceCacheKey::new(&creator, &event(1, TravelTier::Nacional), day()).expect("key");
        let three = PriceCacheKey::new(&creator, &event(3, TravelTier::Nacional), day()).expect("key");
        assert_eq!(one, three);
    }

    #[test]
    fn travel_tier_and_day_do_change_the_key() {
        let creator = CreatorId("creator-1".to_string());
        let national = PriceCacheKey::new(&creator, &event(0, TravelTier::Nacional), day()).expect("key");
        let local = PriceCacheKey::new(&creator, &event(0, TravelTier::Local), day()).expect("key");
        let tomorrow = PriceCacheKey::new(
            &creator,
            &event(0, TravelTier::Nacional),
            day().succ_opt().expect("next day"),
        )
        .expect("key");
        assert_ne!(national, local);
        assert_ne!(national, tomorrow);
    }

    #[test]
    fn stored_results_drop_logistics_and_hits_recompute_it() {
        let metrics = CreatorMetricsSnapshot {
            avg_reach: Decimal::from(10_000),
            avg_engagement_rate: Decimal::new(42, 1),
            profile_segment: "lifestyle".to_string(),
        };
        let cpm = CpmQuote { value: Decimal::from(10), source: CpmSource::Dynamic };
        let first = event(2, TravelTier::Nacional);
        let result = calculate_price(
            PricingInput { metrics: &metrics, cpm: &cpm, calibration: None, params: &first },
            &PricingOptions::default(),
        );
        assert_eq!(result.breakdown.logistics_suggested, Some(Decimal::from(2_100)));

        let stored = cacheable(&result);
        assert!(stored.breakdown.logistics_suggested.is_none());
        assert_eq!(stored.result, result.result);

        let hit = rehydrate(stored, &event(4, TravelTier::Nacional));
        assert_eq!(hit.breakdown.logistics_suggested, Some(Decimal::from(2_700)));
        assert!(!hit.breakdown.logistics_included_in_cache);
        assert_eq!(hit.result.justo, Decimal::from(240));
    }
}
