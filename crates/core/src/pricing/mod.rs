//! Deterministic ad-deal pricing.
//!
//! The calculator is a pure function of creator metrics, segment CPM, an
//! optional calibration snapshot and the deal parameters. It never performs
//! I/O and never fails for a well-typed [`DealParameters`].

pub mod calibration;
pub mod risk;
pub mod weights;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use self::calibration::{CalibrationOutcome, CalibrationPolicy};
use self::risk::{content_model_label, RiskAssessment, RISK_FLOOR_MARKER, STRATEGIC_WAIVER_MARKER};
use self::weights::{
    authority_multiplier, complexity_multiplier, content_units, coverage_bundle_factor,
    event_hourly_units, exclusivity_multiplier, format_weight, hotel_night_cost,
    repost_multiplier, seasonality_multiplier, travel_cost, travel_tier_multiplier,
    usage_rights_multiplier, DEFAULT_SPREAD,
};
use crate::domain::deal::{
    Authority, ContentDeal, ContentDeliverables, DealParameters, DealParametersDraft, Delivery,
    EventDeal, EventDetails, FormatLabel, Seasonality, UsageRights,
};
use crate::domain::intent::ClarificationRequest;
use crate::domain::metrics::{CalibrationSnapshot, CpmQuote, CpmSource, CreatorMetricsSnapshot};
use crate::reply::format_brl;

pub const CPM_SEED_MARKER: &str = "[cpm_seed]";
pub const CALIBRATION_GUARDRAIL_MARKER: &str = "[guardrail_calibracao]";
pub const LOW_CONFIDENCE_MARKER: &str = "[faixa_ampliada]";
pub const ENGAGEMENT_CLAMP_MARKER: &str = "[engajamento_ajustado]";

/// Upper bound for the engagement percentage.
pub fn max_engagement() -> Decimal {
    Decimal::from(25)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBand {
    pub estrategico: Decimal,
    pub justo: Decimal,
    pub premium: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_units: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_presence_justo: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_justo: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistics_suggested: Option<Decimal>,
    /// Always false: logistics is advisory and trip-specific.
    pub logistics_included_in_cache: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingMetrics {
    pub engagement: Decimal,
    pub engagement_clamped: bool,
    pub avg_reach: Decimal,
    pub cpm: Decimal,
    pub cpm_source: CpmSource,
    /// `(avg reach / 1000) × CPM`, the value of one content unit.
    pub unit_value: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub factor: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub result: PriceBand,
    pub breakdown: PricingBreakdown,
    pub metrics: PricingMetrics,
    pub calibration: CalibrationOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskAssessment>,
    pub params: DealParametersDraft,
    pub trace: Vec<PricingTraceStep>,
    pub explanation: String,
}

/// CPM-only estimate offered when creator metrics are unusable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionalEstimate {
    pub per_thousand_reach: PriceBand,
    pub cpm: CpmQuote,
    pub params: DealParametersDraft,
    pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PricingOutcome {
    Priced(PricingResult),
    InsufficientData(ProvisionalEstimate),
    NeedsClarification(ClarificationRequest),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingOptions {
    pub risk_module_enabled: bool,
    pub calibration_enabled: bool,
    pub calibration_policy: CalibrationPolicy,
}

#[derive(Clone, Copy, Debug)]
pub struct PricingInput<'a> {
    pub metrics: &'a CreatorMetricsSnapshot,
    pub cpm: &'a CpmQuote,
    pub calibration: Option<&'a CalibrationSnapshot>,
    pub params: &'a DealParameters,
}

pub trait PricingCalculator: Send + Sync {
    fn calculate(&self, input: PricingInput<'_>) -> PricingResult;

    fn provisional(&self, cpm: &CpmQuote, params: &DealParameters) -> ProvisionalEstimate;
}

#[derive(Clone, Debug, Default)]
pub struct DeterministicPricingCalculator {
    options: PricingOptions,
}

impl DeterministicPricingCalculator {
    pub fn new(options: PricingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PricingOptions {
        &self.options
    }
}

impl PricingCalculator for DeterministicPricingCalculator {
    fn calculate(&self, input: PricingInput<'_>) -> PricingResult {
        calculate_price(input, &self.options)
    }

    fn provisional(&self, cpm: &CpmQuote, params: &DealParameters) -> ProvisionalEstimate {
        provisional_estimate(cpm, params, &self.options)
    }
}

pub fn calculate_price(input: PricingInput<'_>, options: &PricingOptions) -> PricingResult {
    let metrics = input.metrics;
    let engagement = metrics.avg_engagement_rate.clamp(Decimal::ZERO, max_engagement());
    let unit_value = unit_value(metrics.avg_reach, input.cpm.value);

    let mut trace = vec![PricingTraceStep {
        stage: "unit_value".to_string(),
        detail: format!(
            "alcance médio {} × CPM {} / 1000",
            metrics.avg_reach.normalize(),
            format_brl(input.cpm.value)
        ),
        factor: unit_value,
    }];

    let deal = DealValuation::for_params(unit_value, input.params, options, &mut trace);

    let calibration = if options.calibration_enabled {
        calibration::resolve(&options.calibration_policy, input.calibration)
    } else {
        CalibrationOutcome::disabled()
    };
    if calibration.factor_applied != Decimal::ONE {
        trace.push(PricingTraceStep {
            stage: "calibration".to_string(),
            detail: "fator histórico de negociações".to_string(),
            factor: calibration.factor_applied,
        });
    }

    let justo = deal.uncalibrated_justo().saturating_mul(calibration.factor_applied);
    let band = deal.band(justo, calibration.spread());
    let scale = deal.scale().saturating_mul(calibration.factor_applied);

    let breakdown = PricingBreakdown {
        content_units: deal.package_units,
        event_presence_justo: deal.event_presence.map(|value| round_money(value.saturating_mul(scale))),
        coverage_justo: deal.coverage.map(|value| round_money(value.saturating_mul(scale))),
        logistics_suggested: deal.logistics,
        logistics_included_in_cache: false,
    };

    let pricing_metrics = PricingMetrics {
        engagement,
        engagement_clamped: engagement != metrics.avg_engagement_rate,
        avg_reach: metrics.avg_reach,
        cpm: input.cpm.value,
        cpm_source: input.cpm.source,
        unit_value,
    };

    let explanation = explain(&ExplanationInput {
        band: &band,
        metrics: &pricing_metrics,
        calibration: &calibration,
        risk: deal.risk.as_ref(),
        risk_ignored: deal.risk_ignored,
        trace: &trace,
    });

    PricingResult {
        result: band,
        breakdown,
        metrics: pricing_metrics,
        calibration,
        risk: deal.risk,
        params: input.params.to_draft(),
        trace,
        explanation,
    }
}

/// Band for 1,000 reach at the given CPM, without calibration.
pub fn provisional_estimate(
    cpm: &CpmQuote,
    params: &DealParameters,
    options: &PricingOptions,
) -> ProvisionalEstimate {
    let mut trace = Vec::new();
    let deal = DealValuation::for_params(cpm.value.max(Decimal::ZERO), params, options, &mut trace);
    let band = deal.band(deal.uncalibrated_justo(), DEFAULT_SPREAD);

    let mut lines = vec![format!(
        "Estimativa provisória por mil de alcance: CPM {} aplicado ao formato {}.",
        format_brl(cpm.value),
        params.format_label().as_str()
    )];
    lines.extend(trace.iter().skip(1).map(render_step));
    if cpm.source == CpmSource::Seed {
        lines.push(format!("{CPM_SEED_MARKER} CPM de referência conservador, não um valor de mercado ao vivo."));
    }

    ProvisionalEstimate {
        per_thousand_reach: band,
        cpm: *cpm,
        params: params.to_draft(),
        explanation: lines.join("\n"),
    }
}

/// Suggested travel and hotel costs; advisory only.
pub fn logistics_estimate(details: &EventDetails) -> Option<Decimal> {
    let total =
        travel_cost(details.travel_tier) + Decimal::from(details.hotel_nights) * hotel_night_cost();
    (total > Decimal::ZERO).then_some(total)
}

/// Value of one weighted content unit. Negative reach or CPM count as zero
/// and products saturate, so the band stays ordered for any snapshot.
pub fn unit_value(avg_reach: Decimal, cpm: Decimal) -> Decimal {
    let reach = avg_reach.max(Decimal::ZERO);
    (reach / Decimal::from(1_000)).saturating_mul(cpm.max(Decimal::ZERO))
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

struct DealValuation {
    /// Unit value times delivery weight, before commercial multipliers.
    base: Decimal,
    content_multiplier: Decimal,
    common_multiplier: Decimal,
    risk: Option<RiskAssessment>,
    risk_ignored: bool,
    package_units: Option<Decimal>,
    event_presence: Option<Decimal>,
    coverage: Option<Decimal>,
    logistics: Option<Decimal>,
}

impl DealValuation {
    fn for_params(
        unit_value: Decimal,
        params: &DealParameters,
        options: &PricingOptions,
        trace: &mut Vec<PricingTraceStep>,
    ) -> Self {
        let mut valuation = match &params.delivery {
            Delivery::Conteudo(deal) => Self::content(unit_value, deal, trace),
            Delivery::Evento(deal) => Self::event(unit_value, deal, trace),
        };

        valuation.common_multiplier = common_multiplier(params.authority, params.seasonality, trace);

        match (&params.brand_risk, options.risk_module_enabled) {
            (Some(brand_risk), true) => {
                let assessment = risk::assess(brand_risk, params.authority);
                if assessment.risk_multiplier != Decimal::ONE {
                    trace.push(step("brand_risk", "risco de marca e ganho estratégico", assessment.risk_multiplier));
                }
                if assessment.content_model_multiplier != Decimal::ONE {
                    trace.push(step(
                        "content_model",
                        content_model_label(brand_risk.content_model),
                        assessment.content_model_multiplier,
                    ));
                }
                valuation.risk = Some(assessment);
            }
            (Some(_), false) => valuation.risk_ignored = true,
            (None, _) => {}
        }

        valuation
    }

    fn content(unit_value: Decimal, deal: &ContentDeal, trace: &mut Vec<PricingTraceStep>) -> Self {
        let (units, package_units) = match &deal.deliverables {
            ContentDeliverables::Single(format) => {
                let weight = format_weight(*format);
                trace.push(step("format", &format!("peso do formato {}", format.label()), weight));
                (weight, None)
            }
            ContentDeliverables::Package(quantities) => {
                let units = content_units(quantities);
                trace.push(step(
                    "content_units",
                    &format!(
                        "pacote {} Reels, {} Posts, {} Stories",
                        quantities.reels, quantities.post, quantities.stories
                    ),
                    units,
                ));
                (units, Some(units))
            }
        };

        let exclusivity = exclusivity_multiplier(deal.exclusivity);
        push_if_active(trace, "exclusivity", deal.exclusivity.label(), exclusivity);

        let usage = usage_rights_multiplier(deal.usage_rights);
        let usage_detail = match deal.usage_rights {
            UsageRights::Organico => deal.usage_rights.kind().label().to_string(),
            UsageRights::MidiaPaga { duration } | UsageRights::Global { duration } => {
                format!("{} por {} dias", deal.usage_rights.kind().label(), duration.days())
            }
        };
        push_if_active(trace, "usage_rights", &usage_detail, usage);

        let repost = repost_multiplier(deal.repost_tiktok);
        push_if_active(trace, "repost_tiktok", "repost no TikTok", repost);
        if deal.instagram_collab {
            trace.push(step("instagram_collab", "collab no Instagram (informativo, sem custo)", Decimal::ONE));
        }

        let complexity = complexity_multiplier(deal.complexity);
        push_if_active(trace, "complexity", "complexidade de produção", complexity);

        Self {
            base: unit_value.saturating_mul(units),
            content_multiplier: exclusivity * usage * repost * complexity,
            common_multiplier: Decimal::ONE,
            risk: None,
            risk_ignored: false,
            package_units,
            event_presence: None,
            coverage: None,
            logistics: None,
        }
    }

    fn event(unit_value: Decimal, deal: &EventDeal, trace: &mut Vec<PricingTraceStep>) -> Self {
        let details = &deal.details;
        let presence = unit_value
            .saturating_mul(event_hourly_units())
            .saturating_mul(details.duration_hours)
            .saturating_mul(travel_tier_multiplier(details.travel_tier));
        trace.push(step(
            "event_presence",
            &format!("{}h de presença em evento", details.duration_hours.normalize()),
            event_hourly_units().saturating_mul(details.duration_hours),
        ));
        push_if_active(
            trace,
            "travel_tier",
            "deslocamento do evento",
            travel_tier_multiplier(details.travel_tier),
        );

        let coverage = deal.coverage.map(|quantities| {
            let units = content_units(&quantities);
            trace.push(step("event_coverage", "cobertura de conteúdo do evento", units * coverage_bundle_factor()));
            unit_value.saturating_mul(units).saturating_mul(coverage_bundle_factor())
        });

        Self {
            base: presence.saturating_add(coverage.unwrap_or(Decimal::ZERO)),
            content_multiplier: Decimal::ONE,
            common_multiplier: Decimal::ONE,
            risk: None,
            risk_ignored: false,
            package_units: None,
            event_presence: Some(presence),
            coverage,
            logistics: logistics_estimate(details),
        }
    }

    /// Everything applied on top of the delivery base, before calibration.
    fn scale(&self) -> Decimal {
        let risk = self.risk.as_ref().map_or(Decimal::ONE, RiskAssessment::combined_multiplier);
        self.content_multiplier.saturating_mul(self.common_multiplier).saturating_mul(risk)
    }

    fn uncalibrated_justo(&self) -> Decimal {
        self.base.saturating_mul(self.scale())
    }

    fn band(&self, justo: Decimal, spread: weights::TierSpread) -> PriceBand {
        let waived = self.risk.as_ref().is_some_and(|risk| risk.strategic_waiver);
        let estrategico =
            if waived { Decimal::ZERO } else { justo.saturating_mul(spread.estrategico) };

        PriceBand {
            estrategico: round_money(estrategico),
            justo: round_money(justo),
            premium: round_money(justo.saturating_mul(spread.premium)),
        }
    }
}

fn common_multiplier(
    authority: Authority,
    seasonality: Seasonality,
    trace: &mut Vec<PricingTraceStep>,
) -> Decimal {
    let authority_factor = authority_multiplier(authority);
    push_if_active(trace, "authority", "autoridade do criador", authority_factor);
    let seasonality_factor = seasonality_multiplier(seasonality);
    push_if_active(trace, "seasonality", "sazonalidade", seasonality_factor);
    authority_factor * seasonality_factor
}

fn step(stage: &str, detail: &str, factor: Decimal) -> PricingTraceStep {
    PricingTraceStep { stage: stage.to_string(), detail: detail.to_string(), factor }
}

fn push_if_active(trace: &mut Vec<PricingTraceStep>, stage: &str, detail: &str, factor: Decimal) {
    if factor != Decimal::ONE {
        trace.push(step(stage, detail, factor));
    }
}

fn render_step(step: &PricingTraceStep) -> String {
    format!("- {}: ×{}", step.detail, step.factor.normalize())
}

struct ExplanationInput<'a> {
    band: &'a PriceBand,
    metrics: &'a PricingMetrics,
    calibration: &'a CalibrationOutcome,
    risk: Option<&'a RiskAssessment>,
    risk_ignored: bool,
    trace: &'a [PricingTraceStep],
}

fn explain(input: &ExplanationInput<'_>) -> String {
    let mut lines = vec![format!(
        "Valor base: {} por unidade de conteúdo (alcance médio {} × CPM {} / 1000).",
        format_brl(input.metrics.unit_value),
        input.metrics.avg_reach.normalize(),
        format_brl(input.metrics.cpm)
    )];
    lines.extend(input.trace.iter().skip(1).map(render_step));

    if input.metrics.cpm_source == CpmSource::Seed {
        lines.push(format!(
            "{CPM_SEED_MARKER} CPM de referência conservador (seed), ainda não calibrado com dados de mercado ao vivo."
        ));
    }
    if input.metrics.engagement_clamped {
        lines.push(format!(
            "{ENGAGEMENT_CLAMP_MARKER} taxa de engajamento fora da faixa 0-25% foi ajustada para {}%.",
            input.metrics.engagement.normalize()
        ));
    }
    if let Some(risk) = input.risk {
        if risk.floor_applied {
            lines.push(format!(
                "{RISK_FLOOR_MARKER} risco de imagem alto: o desconto estratégico foi substituído pelo piso de risco ×{}.",
                risk.risk_multiplier.normalize()
            ));
        }
        if risk.strategic_waiver {
            lines.push(format!(
                "{STRATEGIC_WAIVER_MARKER} faixa estratégica zerada (permuta/exposição); justo e premium seguem como referência de negociação."
            ));
        }
    }
    if input.risk_ignored {
        lines.push("Dados de risco de marca recebidos, mas o módulo de risco está desativado.".to_string());
    }
    if input.calibration.guardrail_applied {
        lines.push(format!(
            "{CALIBRATION_GUARDRAIL_MARKER} fator histórico {} limitado a {}.",
            input.calibration.factor_raw.normalize(),
            input.calibration.factor_applied.normalize()
        ));
    }
    if input.calibration.low_confidence_range_expanded {
        lines.push(format!(
            "{LOW_CONFIDENCE_MARKER} poucos negócios históricos comparáveis: faixa de negociação ampliada."
        ));
    }
    lines.push(format!(
        "Faixa final: estratégico {}, justo {}, premium {}.",
        format_brl(input.band.estrategico),
        format_brl(input.band.justo),
        format_brl(input.band.premium)
    ));

    lines.join("\n")
}

impl PricingResult {
    pub fn format_label(&self) -> FormatLabel {
        self.params.format.unwrap_or(FormatLabel::Pacote)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::risk::RISK_FLOOR_MARKER;
    use super::{
        calculate_price, provisional_estimate, PricingInput, PricingOptions, PricingResult,
        CALIBRATION_GUARDRAIL_MARKER, CPM_SEED_MARKER,
    };
    use crate::domain::deal::{
        Authority, BrandSize, ContentModel, DealParameters, DealParametersDraft, Delivery,
        DeliveryType, EventDeal, EventDetails, EventDetailsDraft, Exclusivity, FormatLabel, FormatQuantities, RiskLevel, TravelTier,
        UsageRightsKind,
    };
    use crate::domain::metrics::{
        CalibrationSnapshot, ConfidenceBand, CpmQuote, CpmSource, CreatorMetricsSnapshot,
    };
    use crate::pricing::calibration::CalibrationPolicy;

    fn baseline_metrics() -> CreatorMetricsSnapshot {
        CreatorMetricsSnapshot {
            avg_reach: Decimal::from(10_000),
            avg_engagement_rate: Decimal::new(42, 1),
            profile_segment: "lifestyle".to_string(),
        }
    }

    fn dynamic_cpm() -> CpmQuote {
        CpmQuote { value: Decimal::from(10), source: CpmSource::Dynamic }
    }

    fn reel_draft() -> DealParametersDraft {
        DealParametersDraft {
            format: Some(FormatLabel::Reels),
            exclusivity: Some(Exclusivity::Nenhuma),
            usage_rights: Some(UsageRightsKind::Organico),
            ..DealParametersDraft::default()
        }
    }

    fn price(draft: DealParametersDraft, options: PricingOptions) -> PricingResult {
        price_with(draft, options, &baseline_metrics(), None)
    }

    fn price_with(
        draft: DealParametersDraft,
        options: PricingOptions,
        metrics: &CreatorMetricsSnapshot,
        calibration: Option<&CalibrationSnapshot>,
    ) -> PricingResult {
        let params: DealParameters = draft.into_params().expect("valid params");
        calculate_price(
            PricingInput { metrics, cpm: &dynamic_cpm(), calibration, params: &params },
            &options,
        )
    }

    fn risk_enabled() -> PricingOptions {
        PricingOptions { risk_module_enabled: true, ..PricingOptions::default() }
    }

    fn assert_ordered(result: &PricingResult) {
        assert!(result.result.estrategico <= result.result.justo);
        assert!(result.result.justo <= result.result.premium);
    }

    #[test]
    fn single_reel_baseline_is_one_hundred_forty() {
        let result = price(reel_draft(), PricingOptions::default());
        assert_eq!(result.result.justo, Decimal::from(140));
        assert_eq!(result.result.estrategico, Decimal::from(112));
        assert_eq!(result.result.premium, Decimal::from(182));
        assert!(result.breakdown.content_units.is_none());
        assert!(!result.breakdown.logistics_included_in_cache);
        assert_ordered(&result);
    }

    #[test]
    fn one_year_exclusivity_scales_justo() {
        let result = price(
            DealParametersDraft { exclusivity: Some(Exclusivity::Dias365), ..reel_draft() },
            PricingOptions::default(),
        );
        assert_eq!(result.result.justo, Decimal::from(252));
    }

    #[test]
    fn paid_media_defaults_to_thirty_days() {
        let result = price(
            DealParametersDraft { usage_rights: Some(UsageRightsKind::MidiaPaga), ..reel_draft() },
            PricingOptions::default(),
        );
        assert_eq!(result.result.justo, Decimal::from(168));
        assert_eq!(result.params.paid_media_duration.map(|d| d.days()), Some(30));
    }

    #[test]
    fn tiktok_repost_adds_ten_percent_and_collab_adds_nothing() {
        let paid = DealParametersDraft { usage_rights: Some(UsageRightsKind::MidiaPaga), ..reel_draft() };
        let reposted = price(
            DealParametersDraft { repost_tiktok: Some(true), ..paid },
            PricingOptions::default(),
        );
        assert_eq!(reposted.result.justo, Decimal::new(1848, 1));

        let collab = price(
            DealParametersDraft { instagram_collab: Some(true), ..paid },
            PricingOptions::default(),
        );
        assert_eq!(collab.result.justo, Decimal::from(168));
        assert_eq!(collab.params.instagram_collab, Some(true));
    }

    #[test]
    fn multi_delivery_content_is_priced_as_a_package() {
        let result = price(
            DealParametersDraft {
                format: None,
                format_quantities: Some(FormatQuantities { reels: 1, post: 0, stories: 3 }),
                ..reel_draft()
            },
            PricingOptions::default(),
        );
        assert_eq!(result.params.format, Some(FormatLabel::Pacote));
        assert_eq!(result.breakdown.content_units, Some(Decimal::new(38, 1)));
        assert_eq!(result.result.justo, Decimal::from(380));
    }

    #[test]
    fn local_event_presence_is_the_whole_price() {
        let result = price(
            DealParametersDraft {
                delivery_type: Some(DeliveryType::Evento),
                event_details: Some(EventDetailsDraft {
                    duration_hours: Some(Decimal::from(8)),
                    travel_tier: Some(TravelTier::Local),
                    hotel_nights: Some(0),
                }),
                ..DealParametersDraft::default()
            },
            PricingOptions::default(),
        );
        assert_eq!(result.params.format, Some(FormatLabel::Evento));
        assert_eq!(result.breakdown.event_presence_justo, Some(Decimal::from(320)));
        assert_eq!(result.result.justo, Decimal::from(320));
        assert!(result.breakdown.logistics_suggested.is_none());
    }

    #[test]
    fn national_event_with_coverage_reports_logistics_separately() {
        let result = price(
            DealParametersDraft {
                delivery_type: Some(DeliveryType::Evento),
                event_details: Some(EventDetailsDraft {
                    duration_hours: Some(Decimal::from(4)),
                    travel_tier: Some(TravelTier::Nacional),
                    hotel_nights: Some(2),
                }),
                event_coverage_quantities: Some(FormatQuantities { reels: 1, post: 0, stories: 0 }),
                ..DealParametersDraft::default()
            },
            PricingOptions::default(),
        );
        assert_eq!(result.breakdown.event_presence_justo, Some(Decimal::from(240)));
        assert_eq!(result.breakdown.coverage_justo, Some(Decimal::from(126)));
        assert_eq!(result.result.justo, Decimal::from(366));
        assert_eq!(result.breakdown.logistics_suggested, Some(Decimal::from(2_100)));
        assert!(!result.breakdown.logistics_included_in_cache);
    }

    #[test]
    fn negative_reach_prices_as_zero_and_keeps_the_band_ordered() {
        let metrics = CreatorMetricsSnapshot { avg_reach: Decimal::from(-10_000), ..baseline_metrics() };
        let result = price_with(reel_draft(), risk_enabled(), &metrics, None);

        assert_eq!(result.result.estrategico, Decimal::ZERO);
        assert_eq!(result.result.justo, Decimal::ZERO);
        assert_eq!(result.result.premium, Decimal::ZERO);
        assert_ordered(&result);
    }

    #[test]
    fn oversized_event_inputs_saturate_instead_of_overflowing() {
        let mut params: DealParameters = DealParametersDraft {
            delivery_type: Some(DeliveryType::Evento),
            event_details: Some(EventDetailsDraft {
                duration_hours: Some(Decimal::from(8)),
                travel_tier: Some(TravelTier::Internacional),
                hotel_nights: Some(3),
            }),
            ..DealParametersDraft::default()
        }
        .into_params()
        .expect("valid params");
        params.delivery = Delivery::Evento(EventDeal {
            details: EventDetails {
                duration_hours: Decimal::MAX,
                travel_tier: TravelTier::Internacional,
                hotel_nights: u32::MAX,
            },
            coverage: Some(FormatQuantities { reels: u32::MAX, post: 0, stories: 0 }),
        });
        let metrics = CreatorMetricsSnapshot { avg_reach: Decimal::MAX, ..baseline_metrics() };

        let result = calculate_price(
            PricingInput {
                metrics: &metrics,
                cpm: &CpmQuote { value: Decimal::MAX, source: CpmSource::Dynamic },
                calibration: None,
                params: &params,
            },
            &risk_enabled(),
        );

        assert!(result.result.justo > Decimal::ZERO);
        assert_ordered(&result);
    }

    #[test]
    fn engagement_is_clamped_into_range() {
        for (raw, expected) in [(Decimal::new(-4, 1), Decimal::ZERO), (Decimal::from(300), Decimal::from(25))] {
            let metrics = CreatorMetricsSnapshot { avg_engagement_rate: raw, ..baseline_metrics() };
            let result = price_with(reel_draft(), PricingOptions::default(), &metrics, None);
            assert_eq!(result.metrics.engagement, expected);
            assert!(result.metrics.engagement_clamped);
        }
    }

    #[test]
    fn ugc_whitelabel_is_sixty_five_percent_of_profile_publicity() {
        let profile = price(
            DealParametersDraft { content_model: Some(ContentModel::PublicidadePerfil), ..reel_draft() },
            risk_enabled(),
        );
        let ugc = price(
            DealParametersDraft { content_model: Some(ContentModel::UgcWhitelabel), ..reel_draft() },
            risk_enabled(),
        );
        assert_eq!(ugc.result.justo, profile.result.justo * Decimal::new(65, 2));
    }

    #[test]
    fn high_image_risk_floor_beats_strategic_discount() {
        let strategic = DealParametersDraft {
            brand_size: Some(BrandSize::Grande),
            strategic_gain: Some(RiskLevel::Alto),
            ..reel_draft()
        };
        let risky = price(
            DealParametersDraft { image_risk: Some(RiskLevel::Alto), ..strategic },
            risk_enabled(),
        );
        let safe = price(
            DealParametersDraft { image_risk: Some(RiskLevel::Baixo), ..strategic },
            risk_enabled(),
        );
        assert!(risky.result.justo > safe.result.justo);
        assert!(risky.explanation.contains(RISK_FLOOR_MARKER));
        assert!(!safe.explanation.contains(RISK_FLOOR_MARKER));
    }

    #[test]
    fn risk_inputs_are_ignored_when_module_is_disabled() {
        let result = price(
            DealParametersDraft { content_model: Some(ContentModel::UgcWhitelabel), ..reel_draft() },
            PricingOptions::default(),
        );
        assert_eq!(result.result.justo, Decimal::from(140));
        assert!(result.risk.is_none());
    }

    fn waiver_draft(allow: bool) -> DealParametersDraft {
        DealParametersDraft {
            brand_size: Some(BrandSize::Grande),
            image_risk: Some(RiskLevel::Baixo),
            strategic_gain: Some(RiskLevel::Alto),
            authority: Some(Authority::Ascensao),
            allow_strategic_waiver: Some(allow),
            ..reel_draft()
        }
    }

    #[test]
    fn strategic_waiver_zeroes_only_the_strategic_tier() {
        let waived = price(waiver_draft(true), risk_enabled());
        assert_eq!(waived.result.estrategico, Decimal::ZERO);
        assert!(waived.result.justo > Decimal::ZERO);
        assert!(waived.result.premium > waived.result.justo);

        let kept = price(waiver_draft(false), risk_enabled());
        assert!(kept.result.estrategico > Decimal::ZERO);
        assert_ordered(&kept);
    }

    #[test]
    fn waiver_is_refused_outside_the_guarded_combination() {
        let result = price(
            DealParametersDraft { authority: Some(Authority::Celebridade), ..waiver_draft(true) },
            risk_enabled(),
        );
        assert!(result.result.estrategico > Decimal::ZERO);
    }

    fn calibration(factor_raw: Decimal, band: ConfidenceBand, samples: u32) -> CalibrationSnapshot {
        CalibrationSnapshot {
            factor_raw,
            confidence: if band == ConfidenceBand::Alta { 0.9 } else { 0.2 },
            confidence_band: band,
            segment_sample_size: samples,
            creator_sample_size: samples,
            manual_link_rate: 0.1,
            link_quality: 0.8,
            mad: 0.15,
            window_days_segment: 180,
            window_days_creator: 365,
        }
    }

    fn calibration_enabled() -> PricingOptions {
        PricingOptions {
            calibration_enabled: true,
            calibration_policy: CalibrationPolicy::default(),
            ..PricingOptions::default()
        }
    }

    #[test]
    fn low_confidence_calibration_widens_the_band() {
        let snapshot = calibration(Decimal::new(15, 1), ConfidenceBand::Baixa, 2);
        let result =
            price_with(reel_draft(), calibration_enabled(), &baseline_metrics(), Some(&snapshot));

        assert_eq!(result.calibration.factor_applied, Decimal::ONE);
        assert!(result.calibration.low_confidence_range_expanded);
        assert_eq!(result.result.justo, Decimal::from(140));
        assert_eq!(result.result.estrategico, Decimal::from(91));
        assert_eq!(result.result.premium, Decimal::from(224));
    }

    #[test]
    fn extreme_calibration_factor_is_capped_at_twenty_five_percent() {
        let snapshot = calibration(Decimal::new(182, 2), ConfidenceBand::Alta, 50);
        let result =
            price_with(reel_draft(), calibration_enabled(), &baseline_metrics(), Some(&snapshot));

        assert_eq!(result.calibration.factor_raw, Decimal::new(182, 2));
        assert_eq!(result.calibration.factor_applied, Decimal::new(125, 2));
        assert!(result.calibration.guardrail_applied);
        assert_eq!(result.result.justo, Decimal::from(175));
        assert!(result.explanation.contains(CALIBRATION_GUARDRAIL_MARKER));
        assert_ordered(&result);
    }

    #[test]
    fn calibration_never_undoes_the_strategic_waiver() {
        let snapshot = calibration(Decimal::new(11, 1), ConfidenceBand::Alta, 50);
        let options = PricingOptions { risk_module_enabled: true, ..calibration_enabled() };
        let result = price_with(waiver_draft(true), options, &baseline_metrics(), Some(&snapshot));

        assert_eq!(result.calibration.factor_applied, Decimal::new(11, 1));
        assert_eq!(result.result.estrategico, Decimal::ZERO);
        assert!(result.result.justo > Decimal::ZERO);
    }

    #[test]
    fn seed_cpm_is_flagged_in_the_explanation() {
        let params = reel_draft().into_params().expect("valid params");
        let result = calculate_price(
            PricingInput {
                metrics: &baseline_metrics(),
                cpm: &CpmQuote::seed(Decimal::from(10)),
                calibration: None,
                params: &params,
            },
            &PricingOptions::default(),
        );
        assert!(result.explanation.contains(CPM_SEED_MARKER));
    }

    #[test]
    fn same_inputs_always_produce_the_same_result() {
        let first = price(waiver_draft(false), risk_enabled());
        let second = price(waiver_draft(false), risk_enabled());
        assert_eq!(first, second);
    }

    #[test]
    fn provisional_estimate_prices_one_thousand_reach() {
        let params = reel_draft().into_params().expect("valid params");
        let estimate =
            provisional_estimate(&CpmQuote::seed(Decimal::from(10)), &params, &PricingOptions::default());
        assert_eq!(estimate.per_thousand_reach.justo, Decimal::from(14));
        assert!(estimate.explanation.contains(CPM_SEED_MARKER));
    }
}
