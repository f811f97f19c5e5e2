//! Plain-text chat replies for pricing outcomes.
//!
//! Every reply has the same four sections, in order, followed by at most
//! [`MAX_BUTTONS`] quick-reply tokens that the chat renderer turns into UI.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::deal::{
    ContentFormat, DealParametersDraft, Exclusivity, FormatLabel, FormatQuantities,
    UsageRightsKind,
};
use crate::domain::intent::{Assumption, ClarificationRequest};
use crate::domain::metrics::CpmSource;
use crate::pricing::weights::format_weight;
use crate::pricing::{PricingOutcome, PricingResult, ProvisionalEstimate};

pub const DIAGNOSIS_HEADER: &str = "### Diagnostico";
pub const PLAN_HEADER: &str = "### Plano Estrategico";
pub const LOGIC_HEADER: &str = "### Logica Estrategica";
pub const NEXT_STEP_HEADER: &str = "### Proximo Passo";
pub const MAX_BUTTONS: usize = 4;

pub const SEED_CPM_DISCLAIMER: &str = "Atenção: esta estimativa usa um CPM de referência conservador (seed), não dados de mercado ao vivo. Trate os valores como ponto de partida.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    pub buttons: Vec<String>,
}

/// Incremental price of one more unit of a format at the quoted `justo`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginalUnit {
    pub format: ContentFormat,
    pub additional_justo: Decimal,
}

pub fn render_outcome(outcome: &PricingOutcome) -> ChatReply {
    render_outcome_with_assumptions(outcome, &[])
}

/// Same as [`render_outcome`], disclosing parser defaults in the logic section.
pub fn render_outcome_with_assumptions(
    outcome: &PricingOutcome,
    assumptions: &[Assumption],
) -> ChatReply {
    match outcome {
        PricingOutcome::Priced(result) => pricing_reply(result, assumptions),
        PricingOutcome::InsufficientData(estimate) => render_provisional(estimate),
        PricingOutcome::NeedsClarification(request) => render_clarification(request),
    }
}

pub fn render_pricing(result: &PricingResult) -> ChatReply {
    pricing_reply(result, &[])
}

fn pricing_reply(result: &PricingResult, assumptions: &[Assumption]) -> ChatReply {
    let band = &result.result;
    let waived = band.estrategico.is_zero() && band.justo > Decimal::ZERO;

    let mut diagnosis = vec![format!(
        "{} para um perfil com alcance médio de {} e engajamento de {}%.",
        capitalize(&describe_deal(&result.params)),
        format_number(result.metrics.avg_reach),
        format_number(result.metrics.engagement)
    )];
    if waived {
        diagnosis.push("- Estratégico: R$ 0,00 (parceria por exposição)".to_string());
    } else {
        diagnosis.push(format!("- Estratégico: {}", format_brl(band.estrategico)));
    }
    diagnosis.push(format!("- Justo: {}", format_brl(band.justo)));
    diagnosis.push(format!("- Premium: {}", format_brl(band.premium)));
    if result.metrics.cpm_source == CpmSource::Seed {
        diagnosis.push(SEED_CPM_DISCLAIMER.to_string());
    }

    let mut plan = Vec::new();
    if let Some(presence) = result.breakdown.event_presence_justo {
        plan.push(format!("- Presença no evento: {}", format_brl(presence)));
    }
    if let Some(coverage) = result.breakdown.coverage_justo {
        plan.push(format!("- Cobertura de conteúdo: {}", format_brl(coverage)));
    }
    if let Some(logistics) = result.breakdown.logistics_suggested {
        plan.push(format!(
            "- Logística sugerida: {} (cobrar à parte, fora do cachê)",
            format_brl(logistics)
        ));
    }
    let marginal = marginal_unit_table(result);
    if !marginal.is_empty() {
        plan.push("Quer ampliar a entrega? Cada unidade extra no valor justo:".to_string());
        plan.extend(marginal.iter().map(|unit| {
            format!("- +1 {}: + {}", unit.format.label(), format_brl(unit.additional_justo))
        }));
    }
    if plan.is_empty() {
        plan.push("Abra a negociação pelo premium e use o justo como meta de fechamento.".to_string());
    } else {
        plan.insert(0, "Abra pelo premium e use o justo como meta de fechamento.".to_string());
    }

    let mut logic = result.explanation.lines().map(str::to_string).collect::<Vec<_>>();
    if !assumptions.is_empty() {
        logic.push("Premissas assumidas (me corrija se não for o caso):".to_string());
        logic.extend(assumptions.iter().map(render_assumption));
    }

    let next_step =
        vec!["Posso transformar essa faixa em uma proposta ou simular outras condições.".to_string()];

    assemble(diagnosis, plan, logic, next_step, pricing_buttons(&result.params))
}

pub fn render_provisional(estimate: &ProvisionalEstimate) -> ChatReply {
    let band = &estimate.per_thousand_reach;
    let mut diagnosis = vec![
        "Ainda não tenho métricas suficientes do seu perfil (alcance e engajamento) para fechar um preço."
            .to_string(),
        format!(
            "Estimativa provisória para {}, a cada 1.000 pessoas alcançadas:",
            describe_deal(&estimate.params)
        ),
        format!("- Estratégico: {}", format_brl(band.estrategico)),
        format!("- Justo: {}", format_brl(band.justo)),
        format!("- Premium: {}", format_brl(band.premium)),
    ];
    if estimate.cpm.source == CpmSource::Seed {
        diagnosis.push(SEED_CPM_DISCLAIMER.to_string());
    }

    let plan = vec![
        "Multiplique o valor pelo alcance médio esperado (em milhares) para ter uma ordem de grandeza."
            .to_string(),
    ];
    let logic = estimate.explanation.lines().map(str::to_string).collect();
    let next_step = vec![
        "Conecte o Instagram ou atualize suas métricas para eu calcular a faixa completa.".to_string(),
    ];

    assemble(
        diagnosis,
        plan,
        logic,
        next_step,
        vec!["Conectar Instagram".to_string(), "Atualizar métricas".to_string()],
    )
}

pub fn render_clarification(request: &ClarificationRequest) -> ChatReply {
    let diagnosis = vec![if request.deliverables_summary.is_empty() {
        "Entendi que você quer precificar uma publi, mas ainda faltam detalhes.".to_string()
    } else {
        format!(
            "Entendi: {}. Faltam alguns detalhes para precificar com segurança.",
            request.deliverables_summary
        )
    }];

    let mut plan = request
        .missing
        .iter()
        .map(|field| format!("- {}", field.question()))
        .collect::<Vec<_>>();
    if !request.assumptions.is_empty() {
        plan.push("Enquanto isso, considerei:".to_string());
        plan.extend(request.assumptions.iter().map(render_assumption));
    }

    let logic = vec![
        "Formato, exclusividade e direitos de uso mudam o preço de forma relevante, por isso não assumo esses valores."
            .to_string(),
    ];

    let (next_step, buttons) = match request.missing.first() {
        Some(field) => (
            vec![field.question().to_string()],
            field.quick_replies().iter().map(|label| label.to_string()).collect(),
        ),
        None => (vec!["Me conte mais sobre a proposta da marca.".to_string()], Vec::new()),
    };

    assemble(diagnosis, plan, logic, next_step, buttons)
}

/// `justo` spread back over weighted units. Works from the already rounded
/// `justo`, so the table always agrees with the quoted price.
pub fn marginal_unit_table(result: &PricingResult) -> Vec<MarginalUnit> {
    let units = match result.params.format {
        Some(FormatLabel::Pacote) => result.breakdown.content_units,
        Some(label) => label.as_content_format().map(format_weight),
        None => None,
    };
    let Some(units) = units.filter(|units| *units > Decimal::ZERO) else {
        return Vec::new();
    };

    let per_unit = result.result.justo / units;
    ContentFormat::ALL
        .iter()
        .map(|format| MarginalUnit {
            format: *format,
            additional_justo: round_brl(per_unit * format_weight(*format)),
        })
        .collect()
}

/// `R$ 1.234,56`.
pub fn format_brl(value: Decimal) -> String {
    let rounded = round_brl(value);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let fixed = format!("{:.2}", rounded.abs());
    let (integer, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}R$ {},{cents}", group_thousands(integer))
}

fn round_brl(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn format_number(value: Decimal) -> String {
    let normalized = value.normalize().to_string();
    match normalized.split_once('.') {
        Some((integer, fraction)) => format!("{},{fraction}", group_thousands(integer)),
        None => group_thousands(&normalized),
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Short Portuguese description of the deliverables in a draft.
pub fn describe_deal(params: &DealParametersDraft) -> String {
    if params.is_event() {
        let hours = params
            .event_details
            .and_then(|details| details.duration_hours)
            .map(|hours| format!("{}h", hours.normalize()))
            .unwrap_or_else(|| "duração a definir".to_string());
        return match params.event_coverage_quantities {
            Some(coverage) if !coverage.is_empty() => {
                format!("evento de {hours} com cobertura de {}", describe_quantities(&coverage))
            }
            _ => format!("evento de {hours}"),
        };
    }

    match (params.format_quantities, params.format.and_then(|f| f.as_content_format())) {
        (Some(quantities), _) if !quantities.is_empty() => describe_quantities(&quantities),
        (_, Some(format)) => format!("1 {}", format.label()),
        _ => "entregas a definir".to_string(),
    }
}

pub fn describe_quantities(quantities: &FormatQuantities) -> String {
    let parts = ContentFormat::ALL
        .iter()
        .filter_map(|format| {
            let quantity = quantities.quantity(*format);
            (quantity > 0).then(|| match quantity {
                1 => format!("1 {}", format.label()),
                _ => format!("{quantity} {}", format.plural_label()),
            })
        })
        .collect::<Vec<_>>();

    match parts.as_slice() {
        [] => "nenhuma entrega".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} e {last}", init.join(", ")),
    }
}

fn render_assumption(assumption: &Assumption) -> String {
    let field = match assumption.field.as_str() {
        "complexity" => "complexidade",
        "authority" => "nível de autoridade",
        "seasonality" => "sazonalidade",
        "paidMediaDuration" => "duração da mídia paga",
        "travelTier" => "deslocamento",
        other => other,
    };
    format!("- {field}: {}", assumption.defaulted_value)
}

fn pricing_buttons(params: &DealParametersDraft) -> Vec<String> {
    let mut buttons = vec!["Gerar proposta".to_string()];
    if !params.is_event() {
        if params.exclusivity == Some(Exclusivity::Nenhuma) {
            buttons.push("Simular exclusividade 30 dias".to_string());
        }
        if params.usage_rights == Some(UsageRightsKind::Organico) {
            buttons.push("Simular mídia paga 30 dias".to_string());
        }
        buttons.push("Adicionar 1 Reel".to_string());
    }
    buttons.push("Ver argumentos de negociação".to_string());
    buttons
}

fn assemble(
    diagnosis: Vec<String>,
    plan: Vec<String>,
    logic: Vec<String>,
    next_step: Vec<String>,
    mut buttons: Vec<String>,
) -> ChatReply {
    buttons.truncate(MAX_BUTTONS);

    let mut text = String::new();
    for (header, body) in [
        (DIAGNOSIS_HEADER, diagnosis),
        (PLAN_HEADER, plan),
        (LOGIC_HEADER, logic),
        (NEXT_STEP_HEADER, next_step),
    ] {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(header);
        text.push('\n');
        for line in body {
            text.push_str(&line);
            text.push('\n');
        }
    }
    for button in &buttons {
        text.push_str(&format!("[BUTTON: {button}]\n"));
    }

    ChatReply { text: text.trim_end().to_string(), buttons }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        describe_quantities, format_brl, marginal_unit_table, render_clarification,
        render_outcome_with_assumptions, render_pricing, render_provisional, DIAGNOSIS_HEADER, LOGIC_HEADER, MAX_BUTTONS,
        NEXT_STEP_HEADER, PLAN_HEADER, SEED_CPM_DISCLAIMER,
    };
    use crate::domain::deal::{
        ContentFormat, DealParametersDraft, Exclusivity, FormatLabel, FormatQuantities,
        UsageRightsKind,
    };
    use crate::domain::intent::{Assumption, ClarificationRequest, MissingField};
    use crate::domain::metrics::{CpmQuote, CpmSource, CreatorMetricsSnapshot};
    use crate::pricing::{
        calculate_price, provisional_estimate, PricingInput, PricingOptions, PricingOutcome,
        PricingResult,
    };

    fn price(draft: DealParametersDraft, source: CpmSource) -> PricingResult {
        let params = draft.into_params().expect("valid params");
        calculate_price(
            PricingInput {
                metrics: &CreatorMetricsSnapshot {
                    avg_reach: Decimal::from(10_000),
                    avg_engagement_rate: Decimal::new(42, 1),
                    profile_segment: "beleza".to_string(),
                },
                cpm: &CpmQuote { value: Decimal::from(10), source },
                calibration: None,
                params: &params,
            },
            &PricingOptions::default(),
        )
    }

    fn reel() -> DealParametersDraft {
        DealParametersDraft {
            format: Some(FormatLabel::Reels),
            exclusivity: Some(Exclusivity::Nenhuma),
            usage_rights: Some(UsageRightsKind::Organico),
            ..DealParametersDraft::default()
        }
    }

    fn assert_sections_in_order(text: &str) {
        let positions = [DIAGNOSIS_HEADER, PLAN_HEADER, LOGIC_HEADER, NEXT_STEP_HEADER]
            .map(|header| text.find(header).unwrap_or_else(|| panic!("missing {header}")));
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn brl_formatting_groups_thousands_and_uses_comma_cents() {
        assert_eq!(format_brl(Decimal::new(1848, 1)), "R$ 184,80");
        assert_eq!(format_brl(Decimal::from(1_234_567)), "R$ 1.234.567,00");
        assert_eq!(format_brl(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn priced_reply_has_four_sections_and_bounded_buttons() {
        let reply = render_pricing(&price(reel(), CpmSource::Dynamic));

        assert_sections_in_order(&reply.text);
        assert!(reply.text.contains("R$ 140,00"));
        assert!(reply.buttons.len() <= MAX_BUTTONS);
        for button in &reply.buttons {
            assert!(reply.text.contains(&format!("[BUTTON: {button}]")));
        }
        assert!(!reply.text.contains(SEED_CPM_DISCLAIMER));
    }

    #[test]
    fn seed_cpm_reply_carries_the_disclaimer() {
        let reply = render_pricing(&price(reel(), CpmSource::Seed));
        assert!(reply.text.contains(SEED_CPM_DISCLAIMER));
    }

    #[test]
    fn marginal_units_follow_format_weights_without_drift() {
        let result = price(reel(), CpmSource::Dynamic);
        let table = marginal_unit_table(&result);

        let reel = table.iter().find(|unit| unit.format == ContentFormat::Reels).expect("reel row");
        let story =
            table.iter().find(|unit| unit.format == ContentFormat::Stories).expect("story row");
        assert_eq!(reel.additional_justo, result.result.justo);
        assert_eq!(story.additional_justo, Decimal::from(80));
    }

    #[test]
    fn package_marginal_units_divide_by_content_units() {
        let result = price(
            DealParametersDraft {
                format: None,
                format_quantities: Some(FormatQuantities { reels: 1, post: 0, stories: 3 }),
                ..reel()
            },
            CpmSource::Dynamic,
        );
        let table = marginal_unit_table(&result);
        let post = table.iter().find(|unit| unit.format == ContentFormat::Post).expect("post row");
        assert_eq!(post.additional_justo, Decimal::from(100));
    }

    #[test]
    fn clarification_reply_asks_first_missing_field_with_its_quick_replies() {
        let reply = render_clarification(&ClarificationRequest {
            missing: vec![MissingField::Exclusivity, MissingField::UsageRights],
            deliverables_summary: "3 Reels".to_string(),
            assumptions: vec![Assumption::new("complexity", "simples")],
        });

        assert_sections_in_order(&reply.text);
        assert!(reply.text.contains("3 Reels"));
        assert!(reply.text.contains("complexidade: simples"));
        assert_eq!(reply.buttons.first().map(String::as_str), Some("Sem exclusividade"));
        assert!(reply.buttons.len() <= MAX_BUTTONS);
    }

    #[test]
    fn provisional_reply_points_to_metrics_refresh() {
        let params = reel().into_params().expect("valid params");
        let estimate = provisional_estimate(
            &CpmQuote::seed(Decimal::from(10)),
            &params,
            &PricingOptions::default(),
        );
        let reply = render_provisional(&estimate);

        assert_sections_in_order(&reply.text);
        assert!(reply.text.contains("R$ 14,00"));
        assert!(reply.text.contains(SEED_CPM_DISCLAIMER));
        assert!(reply.buttons.contains(&"Conectar Instagram".to_string()));
    }

    #[test]
    fn parser_defaults_are_disclosed_after_the_explanation() {
        let outcome = PricingOutcome::Priced(price(reel(), CpmSource::Dynamic));
        let reply = render_outcome_with_assumptions(
            &outcome,
            &[Assumption::new("seasonality", "normal")],
        );

        let logic = reply.text.find(LOGIC_HEADER).expect("logic section");
        let disclosed = reply.text.find("sazonalidade: normal").expect("assumption line");
        assert!(disclosed > logic);
        assert_sections_in_order(&reply.text);
    }

    #[test]
    fn quantities_are_described_in_portuguese() {
        assert_eq!(
            describe_quantities(&FormatQuantities { reels: 2, post: 1, stories: 3 }),
            "2 Reels, 1 Post e 3 Stories"
        );
    }
}
