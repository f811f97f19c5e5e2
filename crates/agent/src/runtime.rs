use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use dealband_core::cache::{cacheable, rehydrate, PriceCache, PriceCacheKey};
use dealband_core::domain::deal::{CreatorId, DealParameters, DealParametersDraft};
use dealband_core::domain::intent::ClarificationRequest;
use dealband_core::domain::metrics::{
    CalibrationSnapshot, CpmQuote, CreatorCalibration, CreatorMetricsSnapshot, SegmentHistory,
};
use dealband_core::errors::{ApplicationError, DomainError};
use dealband_core::pricing::{
    DeterministicPricingCalculator, PricingCalculator, PricingInput, PricingOutcome,
};
use dealband_core::reply::{describe_deal, render_outcome_with_assumptions, ChatReply};
use dealband_core::resolvers::{
    CalibrationResolver, CpmResolver, MetricsResolver, ResolverError, DEFAULT_SEGMENT,
};

use crate::conversation::{DealIntentParser, ParsedDealIntent};
use crate::guardrails::{GuardrailDecision, GuardrailPolicy};

/// The three read-only lookups a pricing request depends on.
#[derive(Clone)]
pub struct PricingResolvers {
    pub metrics: Arc<dyn MetricsResolver>,
    pub cpm: Arc<dyn CpmResolver>,
    pub calibration: Arc<dyn CalibrationResolver>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDealRequest {
    pub creator_id: CreatorId,
    pub params: DealParametersDraft,
    /// Skips the metrics-first segment lookup when the caller already knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub user_id: CreatorId,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_topic: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub handled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default)]
    pub buttons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<PricingOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
}

impl ChatResponse {
    fn unhandled(reason_code: &str) -> Self {
        Self {
            handled: false,
            reply: None,
            buttons: Vec::new(),
            outcome: None,
            reason_code: Some(reason_code.to_string()),
        }
    }

    fn answered(reply: ChatReply, outcome: PricingOutcome) -> Self {
        Self {
            handled: true,
            reply: Some(reply.text),
            buttons: reply.buttons,
            outcome: Some(outcome),
            reason_code: None,
        }
    }
}

pub struct AgentRuntime {
    resolvers: PricingResolvers,
    calculator: DeterministicPricingCalculator,
    cache: Option<Arc<dyn PriceCache>>,
    seed_cpm: Decimal,
    parser: DealIntentParser,
    guardrails: GuardrailPolicy,
}

impl AgentRuntime {
    pub fn new(
        resolvers: PricingResolvers,
        calculator: DeterministicPricingCalculator,
        seed_cpm: Decimal,
    ) -> Self {
        Self {
            resolvers,
            calculator,
            cache: None,
            seed_cpm,
            parser: DealIntentParser::new(),
            guardrails: GuardrailPolicy::default(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn PriceCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_guardrails(mut self, guardrails: GuardrailPolicy) -> Self {
        self.guardrails = guardrails;
        self
    }

    pub fn parser(&self) -> &DealIntentParser {
        &self.parser
    }

    /// Prices structured parameters. Missing required fields come back as a
    /// clarification outcome, contradictory shapes as a domain error.
    pub async fn price_deal(
        &self,
        request: &PriceDealRequest,
        correlation_id: &str,
    ) -> Result<PricingOutcome, ApplicationError> {
        let missing = request.params.missing_fields();
        if !missing.is_empty() {
            info!(
                event_name = "pricing.clarification_required",
                correlation_id,
                creator_id = %request.creator_id.0,
                missing = missing.len(),
                "structured request is missing required fields"
            );
            return Ok(PricingOutcome::NeedsClarification(ClarificationRequest {
                missing,
                deliverables_summary: describe_deal(&request.params),
                assumptions: Vec::new(),
            }));
        }

        let params = request.params.into_params()?;
        self.price_params(&request.creator_id, &params, request.segment.as_deref(), correlation_id)
            .await
    }

    pub async fn handle_chat_message(
        &self,
        message: &ChatMessage,
        correlation_id: &str,
    ) -> Result<ChatResponse, ApplicationError> {
        let intent = self.parser.parse(&message.message);
        let decision = self.guardrails.evaluate(&intent, message.previous_topic.as_deref());

        match decision {
            GuardrailDecision::Deny { reason_code, .. } => {
                debug!(
                    event_name = "pricing.chat_skipped",
                    correlation_id,
                    reason_code,
                    "chat message not routed to pricing"
                );
                Ok(ChatResponse::unhandled(reason_code))
            }
            GuardrailDecision::Degrade { .. } => Ok(self.clarify(&intent, correlation_id)),
            GuardrailDecision::Allow => {
                let params = match intent.params.into_params() {
                    Ok(params) => params,
                    Err(DomainError::MissingFields(_)) => {
                        return Ok(self.clarify(&intent, correlation_id));
                    }
                    Err(error) => return Err(error.into()),
                };
                let outcome =
                    self.price_params(&message.user_id, &params, None, correlation_id).await?;
                let reply = render_outcome_with_assumptions(&outcome, &intent.assumptions);
                Ok(ChatResponse::answered(reply, outcome))
            }
        }
    }

    fn clarify(&self, intent: &ParsedDealIntent, correlation_id: &str) -> ChatResponse {
        let request = intent.clarification().unwrap_or_else(|| ClarificationRequest {
            missing: intent.missing.clone(),
            deliverables_summary: intent.deliverables_summary.clone(),
            assumptions: intent.assumptions.clone(),
        });
        info!(
            event_name = "pricing.clarification_required",
            correlation_id,
            missing = request.missing.len(),
            "asking for missing deal fields"
        );
        let outcome = PricingOutcome::NeedsClarification(request);
        let reply = render_outcome_with_assumptions(&outcome, &[]);
        ChatResponse::answered(reply, outcome)
    }

    async fn price_params(
        &self,
        creator_id: &CreatorId,
        params: &DealParameters,
        segment: Option<&str>,
        correlation_id: &str,
    ) -> Result<PricingOutcome, ApplicationError> {
        let cache_key = self.cache_key(creator_id, params, correlation_id);
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(hit) = cache.get(key).await {
                debug!(
                    event_name = "pricing.cache_hit",
                    correlation_id,
                    creator_id = %creator_id.0,
                    "serving cached price band"
                );
                return Ok(PricingOutcome::Priced(rehydrate(hit, params)));
            }
        }

        let Lookups { metrics, cpm, calibration, degraded } =
            self.gather(creator_id, segment, correlation_id).await;
        let Some(metrics) = usable_metrics(metrics, creator_id, correlation_id) else {
            return Ok(PricingOutcome::InsufficientData(self.calculator.provisional(&cpm, params)));
        };

        let result = self.calculator.calculate(PricingInput {
            metrics: &metrics,
            cpm: &cpm,
            calibration: calibration.as_ref(),
            params,
        });

        if result.calibration.guardrail_applied {
            debug!(
                event_name = "pricing.calibration_clamped",
                correlation_id,
                factor_raw = %result.calibration.factor_raw,
                factor_applied = %result.calibration.factor_applied,
                "calibration factor clamped"
            );
        }
        if result.calibration.low_confidence_range_expanded {
            debug!(
                event_name = "pricing.range_widened",
                correlation_id,
                "low calibration confidence widened the band"
            );
        }
        info!(
            event_name = "pricing.priced",
            correlation_id,
            creator_id = %creator_id.0,
            format = result.format_label().as_str(),
            justo = %result.result.justo,
            "deal priced"
        );

        match (&self.cache, cache_key) {
            (Some(_), Some(_)) if degraded => debug!(
                event_name = "pricing.cache_skipped",
                correlation_id,
                "fallback inputs in use, result not cached"
            ),
            (Some(cache), Some(key)) => cache.put(key, cacheable(&result)).await,
            _ => {}
        }
        Ok(PricingOutcome::Priced(result))
    }

    fn cache_key(
        &self,
        creator_id: &CreatorId,
        params: &DealParameters,
        correlation_id: &str,
    ) -> Option<PriceCacheKey> {
        self.cache.as_ref()?;
        match PriceCacheKey::new(creator_id, params, Utc::now().date_naive()) {
            Ok(key) => Some(key),
            Err(error) => {
                warn!(
                    event_name = "pricing.cache_key_failed",
                    correlation_id,
                    error = %error,
                    "price cache bypassed"
                );
                None
            }
        }
    }

    /// Runs the reference lookups. A known segment lets all four start at
    /// once. Otherwise the creator calibration runs beside the metrics lookup
    /// and the segment-keyed lookups wait for the profile segment.
    async fn gather(
        &self,
        creator_id: &CreatorId,
        segment: Option<&str>,
        correlation_id: &str,
    ) -> Lookups {
        let (metrics, cpm, history, creator) = match segment {
            Some(segment) => {
                tokio::join!(
                    self.resolvers.metrics.creator_metrics(creator_id),
                    self.resolve_cpm(segment, correlation_id),
                    self.resolve_segment_history(segment, correlation_id),
                    self.resolve_creator_calibration(creator_id, correlation_id),
                )
            }
            None => {
                let (by_segment, creator) = tokio::join!(
                    async {
                        let metrics = self.resolvers.metrics.creator_metrics(creator_id).await;
                        let segment = profile_segment(&metrics);
                        let (cpm, history) = tokio::join!(
                            self.resolve_cpm(&segment, correlation_id),
                            self.resolve_segment_history(&segment, correlation_id),
                        );
                        (metrics, cpm, history)
                    },
                    self.resolve_creator_calibration(creator_id, correlation_id),
                );
                let (metrics, cpm, history) = by_segment;
                (metrics, cpm, history, creator)
            }
        };

        Lookups {
            metrics,
            cpm: cpm.value,
            calibration: creator
                .value
                .map(|creator| CalibrationSnapshot::from_parts(creator, history.value)),
            degraded: cpm.degraded || history.degraded || creator.degraded,
        }
    }

    async fn resolve_cpm(&self, segment: &str, correlation_id: &str) -> Resolved<CpmQuote> {
        match self.resolvers.cpm.segment_cpm(segment).await {
            Ok(quote) if quote.value > Decimal::ZERO => Resolved::fresh(quote),
            Ok(_) => {
                warn!(
                    event_name = "pricing.cpm_seed_fallback",
                    correlation_id,
                    segment,
                    "segment CPM is not positive, using seed CPM"
                );
                Resolved::fresh(CpmQuote::seed(self.seed_cpm))
            }
            Err(ResolverError::NotFound(_)) => {
                debug!(
                    event_name = "pricing.cpm_seed_fallback",
                    correlation_id,
                    segment,
                    "no CPM benchmark, using seed CPM"
                );
                Resolved::fresh(CpmQuote::seed(self.seed_cpm))
            }
            Err(error) => {
                warn!(
                    event_name = "pricing.cpm_seed_fallback",
                    correlation_id,
                    segment,
                    error = %error,
                    "CPM resolver failed, using seed CPM"
                );
                Resolved::fallback(CpmQuote::seed(self.seed_cpm))
            }
        }
    }

    async fn resolve_creator_calibration(
        &self,
        creator_id: &CreatorId,
        correlation_id: &str,
    ) -> Resolved<Option<CreatorCalibration>> {
        if !self.calculator.options().calibration_enabled {
            return Resolved::fresh(None);
        }
        match self.resolvers.calibration.creator_calibration(creator_id).await {
            Ok(calibration) => Resolved::fresh(Some(calibration)),
            Err(ResolverError::NotFound(_)) => Resolved::fresh(None),
            Err(error) => {
                warn!(
                    event_name = "pricing.calibration_unavailable",
                    correlation_id,
                    creator_id = %creator_id.0,
                    error = %error,
                    "calibration resolver failed, pricing without history"
                );
                Resolved::fallback(None)
            }
        }
    }

    async fn resolve_segment_history(
        &self,
        segment: &str,
        correlation_id: &str,
    ) -> Resolved<Option<SegmentHistory>> {
        if !self.calculator.options().calibration_enabled {
            return Resolved::fresh(None);
        }
        match self.resolvers.calibration.segment_history(segment).await {
            Ok(history) => Resolved::fresh(Some(history)),
            Err(ResolverError::NotFound(_)) => Resolved::fresh(None),
            Err(error) => {
                warn!(
                    event_name = "pricing.calibration_unavailable",
                    correlation_id,
                    segment,
                    error = %error,
                    "segment history lookup failed, treating calibration as low confidence"
                );
                Resolved::fallback(None)
            }
        }
    }
}

/// Reference inputs for one request. `degraded` is set when a resolver
/// failed and a fallback stands in, so the result must not be cached.
struct Lookups {
    metrics: Result<CreatorMetricsSnapshot, ResolverError>,
    cpm: CpmQuote,
    calibration: Option<CalibrationSnapshot>,
    degraded: bool,
}

struct Resolved<T> {
    value: T,
    degraded: bool,
}

impl<T> Resolved<T> {
    fn fresh(value: T) -> Self {
        Self { value, degraded: false }
    }

    fn fallback(value: T) -> Self {
        Self { value, degraded: true }
    }
}

fn profile_segment(metrics: &Result<CreatorMetricsSnapshot, ResolverError>) -> String {
    metrics
        .as_ref()
        .ok()
        .map(|snapshot| snapshot.profile_segment.trim())
        .filter(|segment| !segment.is_empty())
        .unwrap_or(DEFAULT_SEGMENT)
        .to_string()
}

fn usable_metrics(
    metrics: Result<CreatorMetricsSnapshot, ResolverError>,
    creator_id: &CreatorId,
    correlation_id: &str,
) -> Option<CreatorMetricsSnapshot> {
    match metrics {
        Ok(snapshot) if snapshot.is_usable() => Some(snapshot),
        Ok(_) => {
            info!(
                event_name = "pricing.insufficient_metrics",
                correlation_id,
                creator_id = %creator_id.0,
                "creator metrics have no usable reach"
            );
            None
        }
        Err(error) => {
            info!(
                event_name = "pricing.insufficient_metrics",
                correlation_id,
                creator_id = %creator_id.0,
                error = %error,
                "creator metrics unavailable"
            );
            None
        }
    }
}
