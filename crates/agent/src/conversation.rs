use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dealband_core::domain::deal::{
    Authority, BrandSize, Complexity, ContentFormat, ContentModel, DealParametersDraft,
    DeliveryType, EventDetailsDraft, Exclusivity, FormatLabel, FormatQuantities,
    PaidMediaDuration, RiskLevel, Seasonality, TravelTier, UsageRightsKind,
};
use dealband_core::domain::intent::{
    Assumption, ClarificationRequest, DeliverableCounts, IntentSignals, MissingField,
};
use dealband_core::reply::describe_deal;

/// Structured view of a free-form deal message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDealIntent {
    pub params: DealParametersDraft,
    pub missing: Vec<MissingField>,
    pub deliverables_summary: String,
    pub deliverables: DeliverableCounts,
    pub assumptions: Vec<Assumption>,
    pub signals: IntentSignals,
}

impl ParsedDealIntent {
    pub fn clarification(&self) -> Option<ClarificationRequest> {
        (!self.missing.is_empty()).then(|| ClarificationRequest {
            missing: self.missing.clone(),
            deliverables_summary: self.deliverables_summary.clone(),
            assumptions: self.assumptions.clone(),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct DealIntentParser;

impl DealIntentParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, text: &str) -> ParsedDealIntent {
        let normalized_text = normalize_text(text);
        let tokens = tokenize(&normalized_text);
        let phrases = PhraseIndex::new(&tokens);

        let quantities = extract_format_quantities(&tokens);
        let deliverables = DeliverableCounts {
            reels: quantities.reels,
            stories: quantities.stories,
            posts: quantities.post,
            total: quantities.total(),
        };

        let mut assumptions = Vec::new();
        let event_hours = phrases
            .any(EVENT_WORDS)
            .then(|| extract_event_hours(&tokens))
            .flatten();

        let mut params = match event_hours {
            Some(duration_hours) => {
                event_draft(&tokens, &phrases, duration_hours, quantities, &mut assumptions)
            }
            None => content_draft(&tokens, &phrases, quantities, &mut assumptions),
        };

        params.authority = Some(extract_authority(&phrases).unwrap_or_else(|| {
            assumptions.push(Assumption::new("authority", "padrao"));
            Authority::Padrao
        }));
        params.seasonality = Some(extract_seasonality(&phrases).unwrap_or_else(|| {
            assumptions.push(Assumption::new("seasonality", "normal"));
            Seasonality::Normal
        }));
        apply_brand_risk(&phrases, &mut params);

        let signals = IntentSignals {
            has_deliverables: deliverables.total > 0 || params.is_event(),
            has_commercial_terms: has_commercial_terms(&phrases),
            has_price_intent: phrases.any(PRICE_INTENT_PHRASES),
        };

        let deliverables_summary =
            if signals.has_deliverables { describe_deal(&params) } else { String::new() };

        ParsedDealIntent {
            missing: params.missing_fields(),
            params,
            deliverables_summary,
            deliverables,
            assumptions,
            signals,
        }
    }
}

/// True when the text carries commercial-deal vocabulary.
pub fn mentions_commercial_terms(text: &str) -> bool {
    let tokens = tokenize(&normalize_text(text));
    has_commercial_terms(&PhraseIndex::new(&tokens))
}

fn content_draft(
    tokens: &[String],
    phrases: &PhraseIndex,
    quantities: FormatQuantities,
    assumptions: &mut Vec<Assumption>,
) -> DealParametersDraft {
    let mut draft = DealParametersDraft {
        delivery_type: Some(DeliveryType::Conteudo),
        ..DealParametersDraft::default()
    };

    if !quantities.is_empty() {
        draft.format = Some(classify_format(&quantities));
        draft.format_quantities = Some(quantities);
    }

    let day_mentions = extract_day_mentions(tokens);
    let exclusivity = extract_exclusivity(tokens, phrases, &day_mentions);
    draft.exclusivity = exclusivity.map(|(exclusivity, _)| exclusivity);

    draft.usage_rights = extract_usage_rights(phrases);
    if matches!(draft.usage_rights, Some(UsageRightsKind::MidiaPaga | UsageRightsKind::Global)) {
        let claimed = exclusivity.and_then(|(_, index)| index);
        let duration = extract_paid_media_duration(tokens, &day_mentions, claimed);
        draft.paid_media_duration = Some(duration.unwrap_or_else(|| {
            assumptions.push(Assumption::new("paidMediaDuration", "30d"));
            PaidMediaDuration::LEGACY_DEFAULT
        }));
    }

    if phrases.any(&["tiktok", "tik tok"]) {
        draft.repost_tiktok = Some(true);
    }
    if phrases.any(&["collab", "colab", "collabs", "colabs"]) {
        draft.instagram_collab = Some(true);
    }

    draft.complexity = Some(extract_complexity(phrases).unwrap_or_else(|| {
        assumptions.push(Assumption::new("complexity", "simples"));
        Complexity::Simples
    }));

    draft
}

fn event_draft(
    tokens: &[String],
    phrases: &PhraseIndex,
    duration_hours: Decimal,
    coverage: FormatQuantities,
    assumptions: &mut Vec<Assumption>,
) -> DealParametersDraft {
    let travel_tier = extract_travel_tier(phrases).unwrap_or_else(|| {
        assumptions.push(Assumption::new("travelTier", "local"));
        TravelTier::Local
    });

    DealParametersDraft {
        delivery_type: Some(DeliveryType::Evento),
        format: Some(FormatLabel::Evento),
        event_details: Some(EventDetailsDraft {
            duration_hours: Some(duration_hours),
            travel_tier: Some(travel_tier),
            hotel_nights: Some(extract_hotel_nights(tokens).unwrap_or(0)),
        }),
        event_coverage_quantities: (!coverage.is_empty()).then_some(coverage),
        ..DealParametersDraft::default()
    }
}

fn classify_format(quantities: &FormatQuantities) -> FormatLabel {
    match quantities.single_unit() {
        Some(format) => format.into(),
        None => FormatLabel::Pacote,
    }
}

/// Lowercases and strips Portuguese diacritics.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase().chars().map(fold_diacritic).collect()
}

fn fold_diacritic(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let mut sanitized = String::with_capacity(text.len());
    for character in text.chars() {
        if character.is_ascii_alphanumeric() {
            sanitized.push(character);
        } else {
            sanitized.push(' ');
        }
    }
    sanitized.split_whitespace().map(|token| token.to_string()).collect()
}

/// Whole-word phrase lookup over the token stream.
struct PhraseIndex {
    haystack: String,
}

impl PhraseIndex {
    fn new(tokens: &[String]) -> Self {
        Self { haystack: format!(" {} ", tokens.join(" ")) }
    }

    fn has(&self, phrase: &str) -> bool {
        self.haystack.contains(&format!(" {phrase} "))
    }

    fn any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|phrase| self.has(phrase))
    }
}

fn parse_quantity(token: &str) -> Option<u32> {
    let digits = token.strip_suffix('x').unwrap_or(token);
    if let Ok(value) = digits.parse::<u32>() {
        return Some(value);
    }

    match token {
        "um" | "uma" => Some(1),
        "dois" | "duas" => Some(2),
        "tres" => Some(3),
        "quatro" => Some(4),
        "cinco" => Some(5),
        "seis" => Some(6),
        "sete" => Some(7),
        "oito" => Some(8),
        "nove" => Some(9),
        "dez" => Some(10),
        _ => None,
    }
}

fn format_unit(token: &str) -> Option<ContentFormat> {
    match token {
        "reel" | "reels" | "reelzinho" => Some(ContentFormat::Reels),
        "post" | "posts" | "carrossel" | "carrosseis" => Some(ContentFormat::Post),
        "story" | "stories" | "storie" | "storys" | "stores" => Some(ContentFormat::Stories),
        _ => None,
    }
}

/// Quantified mentions add up; a bare mention counts once per format.
fn extract_format_quantities(tokens: &[String]) -> FormatQuantities {
    let mut counted = FormatQuantities::default();
    let mut bare = [false; 3];

    for (index, token) in tokens.iter().enumerate() {
        let Some(format) = format_unit(token) else {
            continue;
        };
        let previous = index.checked_sub(1).map(|previous| tokens[previous].as_str());
        if previous == Some("sem") {
            continue;
        }

        match previous.and_then(parse_quantity) {
            Some(quantity) => add_quantity(&mut counted, format, quantity),
            None => bare[format_slot(format)] = true,
        }
    }

    for format in ContentFormat::ALL {
        if bare[format_slot(format)] && counted.quantity(format) == 0 {
            add_quantity(&mut counted, format, 1);
        }
    }
    counted
}

fn format_slot(format: ContentFormat) -> usize {
    match format {
        ContentFormat::Reels => 0,
        ContentFormat::Post => 1,
        ContentFormat::Stories => 2,
    }
}

fn add_quantity(quantities: &mut FormatQuantities, format: ContentFormat, quantity: u32) {
    let slot = match format {
        ContentFormat::Reels => &mut quantities.reels,
        ContentFormat::Post => &mut quantities.post,
        ContentFormat::Stories => &mut quantities.stories,
    };
    *slot = slot.saturating_add(quantity);
}

/// `(token index, days)` for "15 dias", "15d", "3 meses", "1 ano".
fn extract_day_mentions(tokens: &[String]) -> Vec<(usize, u32)> {
    let mut mentions = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        if let Some(days) = token.strip_suffix('d').and_then(|value| value.parse::<u32>().ok()) {
            mentions.push((index, days));
            continue;
        }

        let Some(amount) = parse_quantity(token) else {
            continue;
        };
        let days_per_unit = match tokens.get(index + 1).map(String::as_str) {
            Some("dia" | "dias") => 1,
            Some("semana" | "semanas") => 7,
            Some("mes" | "meses") => 30,
            Some("ano" | "anos") => 365,
            _ => continue,
        };
        mentions.push((index, amount.saturating_mul(days_per_unit)));
    }
    mentions
}

const PROXIMITY_WINDOW: usize = 5;

fn nearest_mention(
    mentions: &[(usize, u32)],
    anchors: &[usize],
    skip: Option<usize>,
) -> Option<(usize, u32)> {
    mentions
        .iter()
        .filter(|(index, _)| Some(*index) != skip)
        .filter_map(|(index, days)| {
            let distance = anchors.iter().map(|anchor| anchor.abs_diff(*index)).min()?;
            (distance <= PROXIMITY_WINDOW).then_some((distance, *index, *days))
        })
        .min()
        .map(|(_, index, days)| (index, days))
}

fn anchor_indexes(tokens: &[String], words: &[&str]) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| words.contains(&token.as_str()))
        .map(|(index, _)| index)
        .collect()
}

const NO_EXCLUSIVITY_PHRASES: &[&str] = &[
    "sem exclusividade",
    "sem exclusivo",
    "nao exclusivo",
    "nao exclusiva",
    "nao tem exclusividade",
    "nao ha exclusividade",
    "exclusividade nenhuma",
    "nenhuma exclusividade",
];

const EXCLUSIVITY_WORDS: &[&str] = &["exclusividade", "exclusivo", "exclusiva", "exclusivos"];

/// Only exact 7/15/30-day windows are recognized. The matched mention index
/// is returned so paid-media parsing does not reuse it.
fn extract_exclusivity(
    tokens: &[String],
    phrases: &PhraseIndex,
    day_mentions: &[(usize, u32)],
) -> Option<(Exclusivity, Option<usize>)> {
    if phrases.any(NO_EXCLUSIVITY_PHRASES) {
        return Some((Exclusivity::Nenhuma, None));
    }

    let anchors = anchor_indexes(tokens, EXCLUSIVITY_WORDS);
    let (index, days) = nearest_mention(day_mentions, &anchors, None)?;
    let exclusivity = match days {
        7 => Exclusivity::Dias7,
        15 => Exclusivity::Dias15,
        30 => Exclusivity::Dias30,
        _ => return None,
    };
    Some((exclusivity, Some(index)))
}

const ORGANIC_PHRASES: &[&str] = &[
    "sem midia paga",
    "sem impulsionamento",
    "sem ads",
    "sem anuncio",
    "sem anuncios",
    "so organico",
    "somente organico",
    "apenas organico",
    "so no perfil",
    "uso organico",
];

const GLOBAL_PHRASES: &[&str] = &[
    "global",
    "uso global",
    "perpetuo",
    "perpetua",
    "tv",
    "televisao",
    "uso ilimitado",
    "todas as midias",
    "offline",
];

const PAID_MEDIA_PHRASES: &[&str] = &[
    "midia paga",
    "ads",
    "anuncio",
    "anuncios",
    "impulsionamento",
    "impulsionar",
    "impulsionado",
    "trafego pago",
    "patrocinado",
    "whitelisting",
    "dark post",
];

fn extract_usage_rights(phrases: &PhraseIndex) -> Option<UsageRightsKind> {
    if phrases.any(ORGANIC_PHRASES) {
        Some(UsageRightsKind::Organico)
    } else if phrases.any(GLOBAL_PHRASES) {
        Some(UsageRightsKind::Global)
    } else if phrases.any(PAID_MEDIA_PHRASES) {
        Some(UsageRightsKind::MidiaPaga)
    } else if phrases.any(&["organico", "organica"]) {
        Some(UsageRightsKind::Organico)
    } else {
        None
    }
}

const PAID_MEDIA_WORDS: &[&str] = &[
    "midia",
    "paga",
    "ads",
    "anuncio",
    "anuncios",
    "impulsionamento",
    "impulsionar",
    "impulsionado",
    "trafego",
    "patrocinado",
    "global",
    "tv",
    "veiculacao",
    "uso",
];

fn extract_paid_media_duration(
    tokens: &[String],
    day_mentions: &[(usize, u32)],
    claimed: Option<usize>,
) -> Option<PaidMediaDuration> {
    let anchors = anchor_indexes(tokens, PAID_MEDIA_WORDS);
    nearest_mention(day_mentions, &anchors, claimed)
        .map(|(_, days)| PaidMediaDuration::covering(days))
}

const EVENT_WORDS: &[&str] = &[
    "evento",
    "eventos",
    "presenca",
    "ativacao",
    "palestra",
    "meet and greet",
    "lancamento presencial",
];

fn extract_event_hours(tokens: &[String]) -> Option<Decimal> {
    for (index, token) in tokens.iter().enumerate() {
        if let Some(hours) = token.strip_suffix('h').and_then(|value| value.parse::<u32>().ok()) {
            return (hours > 0).then(|| Decimal::from(hours));
        }

        let Some(amount) = parse_quantity(token) else {
            continue;
        };
        if matches!(tokens.get(index + 1).map(String::as_str), Some("h" | "hr" | "hrs" | "hora" | "horas"))
            && amount > 0
        {
            return Some(Decimal::from(amount));
        }
    }
    None
}

fn extract_hotel_nights(tokens: &[String]) -> Option<u32> {
    tokens.windows(2).find_map(|window| match window {
        [value, unit]
            if matches!(
                unit.as_str(),
                "noite" | "noites" | "diaria" | "diarias" | "pernoite" | "pernoites"
            ) =>
        {
            parse_quantity(value)
        }
        _ => None,
    })
}

fn extract_travel_tier(phrases: &PhraseIndex) -> Option<TravelTier> {
    if phrases.any(&["internacional", "exterior", "fora do pais"]) {
        Some(TravelTier::Internacional)
    } else if phrases.any(&["nacional", "viagem", "viajar", "outro estado", "outra cidade", "passagem"])
    {
        Some(TravelTier::Nacional)
    } else if phrases.any(&["local", "na cidade", "mesma cidade"]) {
        Some(TravelTier::Local)
    } else {
        None
    }
}

fn extract_complexity(phrases: &PhraseIndex) -> Option<Complexity> {
    if phrases.any(&["producao profissional", "profissional", "estudio", "equipe de producao"]) {
        Some(Complexity::Profissional)
    } else if phrases.any(&["roteiro", "roteirizado", "roteirizada"]) {
        Some(Complexity::Roteiro)
    } else if phrases.any(&["simples", "caseiro", "espontaneo"]) {
        Some(Complexity::Simples)
    } else {
        None
    }
}

fn extract_authority(phrases: &PhraseIndex) -> Option<Authority> {
    if phrases.any(&["celebridade", "famoso", "famosa"]) {
        Some(Authority::Celebridade)
    } else if phrases.any(&["autoridade", "referencia no nicho", "especialista"]) {
        Some(Authority::Autoridade)
    } else if phrases.any(&["ascensao", "em crescimento", "crescendo"]) {
        Some(Authority::Ascensao)
    } else {
        None
    }
}

fn extract_seasonality(phrases: &PhraseIndex) -> Option<Seasonality> {
    if phrases.any(&[
        "black friday",
        "natal",
        "dia das maes",
        "dia dos pais",
        "dia dos namorados",
        "alta temporada",
    ]) {
        Some(Seasonality::Alta)
    } else if phrases.any(&["baixa temporada", "periodo fraco"]) {
        Some(Seasonality::Baixa)
    } else {
        None
    }
}

/// Risk inputs are only set when the text mentions them.
fn apply_brand_risk(phrases: &PhraseIndex, draft: &mut DealParametersDraft) {
    if phrases.any(&["marca grande", "grande marca", "multinacional", "big brand"]) {
        draft.brand_size = Some(BrandSize::Grande);
    } else if phrases.any(&["marca pequena", "pequena marca", "startup", "loja local"]) {
        draft.brand_size = Some(BrandSize::Pequena);
    } else if phrases.any(&["marca media", "media empresa"]) {
        draft.brand_size = Some(BrandSize::Media);
    }

    if phrases.any(&["polemica", "polemico", "risco de imagem", "bet", "bets", "aposta", "apostas", "cassino"]) {
        draft.image_risk = Some(RiskLevel::Alto);
    }
    if phrases.any(&["marca dos sonhos", "sonho", "portfolio", "vitrine", "ganho estrategico"]) {
        draft.strategic_gain = Some(RiskLevel::Alto);
    }
    if draft.delivery_type != Some(DeliveryType::Evento)
        && phrases.any(&["ugc", "whitelabel", "white label"])
    {
        draft.content_model = Some(ContentModel::UgcWhitelabel);
    }
    if phrases.any(&["permuta", "so pela exposicao", "de graca", "sem cache"]) {
        draft.allow_strategic_waiver = Some(true);
    }
}

const PRICE_INTENT_PHRASES: &[&str] = &[
    "preco",
    "precos",
    "precificar",
    "precificacao",
    "quanto cobrar",
    "quanto cobro",
    "quanto eu cobro",
    "quanto devo cobrar",
    "quanto pedir",
    "quanto vale",
    "cobrar",
    "valor",
    "cache",
    "orcamento",
    "faixa de preco",
    "tabela de precos",
];

const COMMERCIAL_TERMS: &[&str] = &[
    "exclusividade",
    "exclusivo",
    "exclusiva",
    "midia paga",
    "impulsionamento",
    "ads",
    "anuncio",
    "direito de uso",
    "direitos de uso",
    "uso de imagem",
    "publi",
    "publis",
    "publipost",
    "campanha",
    "parceria",
    "marca",
    "proposta",
    "contrato",
    "briefing",
    "permuta",
    "collab",
    "ugc",
    "whitelabel",
    "organico",
];

fn has_commercial_terms(phrases: &PhraseIndex) -> bool {
    phrases.any(COMMERCIAL_TERMS)
}
