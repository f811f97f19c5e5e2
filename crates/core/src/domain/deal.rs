use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::intent::MissingField;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreatorId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Conteudo,
    Evento,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Reels,
    Post,
    Stories,
}

impl ContentFormat {
    pub const ALL: [ContentFormat; 3] = [ContentFormat::Reels, ContentFormat::Post, ContentFormat::Stories];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Reels => "Reel",
            Self::Post => "Post",
            Self::Stories => "Story",
        }
    }

    pub fn plural_label(&self) -> &'static str {
        match self {
            Self::Reels => "Reels",
            Self::Post => "Posts",
            Self::Stories => "Stories",
        }
    }
}

/// Format reported back to callers. `Pacote` and `Evento` only appear after
/// normalization; a request may still send a legacy single format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatLabel {
    Reels,
    Post,
    Stories,
    Pacote,
    Evento,
}

impl From<ContentFormat> for FormatLabel {
    fn from(value: ContentFormat) -> Self {
        match value {
            ContentFormat::Reels => Self::Reels,
            ContentFormat::Post => Self::Post,
            ContentFormat::Stories => Self::Stories,
        }
    }
}

impl FormatLabel {
    pub fn as_content_format(&self) -> Option<ContentFormat> {
        match self {
            Self::Reels => Some(ContentFormat::Reels),
            Self::Post => Some(ContentFormat::Post),
            Self::Stories => Some(ContentFormat::Stories),
            Self::Pacote | Self::Evento => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reels => "reels",
            Self::Post => "post",
            Self::Stories => "stories",
            Self::Pacote => "pacote",
            Self::Evento => "evento",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatQuantities {
    #[serde(default)]
    pub reels: u32,
    #[serde(default)]
    pub post: u32,
    #[serde(default)]
    pub stories: u32,
}

impl FormatQuantities {
    pub fn quantity(&self, format: ContentFormat) -> u32 {
        match format {
            ContentFormat::Reels => self.reels,
            ContentFormat::Post => self.post,
            ContentFormat::Stories => self.stories,
        }
    }

    pub fn total(&self) -> u32 {
        self.reels.saturating_add(self.post).saturating_add(self.stories)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn distinct_formats(&self) -> usize {
        ContentFormat::ALL.iter().filter(|format| self.quantity(**format) > 0).count()
    }

    /// The only requested format when exactly one unit of one format is asked for.
    pub fn single_unit(&self) -> Option<ContentFormat> {
        if self.total() != 1 {
            return None;
        }
        ContentFormat::ALL.into_iter().find(|format| self.quantity(*format) == 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exclusivity {
    #[serde(rename = "nenhuma")]
    Nenhuma,
    #[serde(rename = "7d")]
    Dias7,
    #[serde(rename = "15d")]
    Dias15,
    #[serde(rename = "30d")]
    Dias30,
    #[serde(rename = "365d")]
    Dias365,
}

impl Exclusivity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Nenhuma => "sem exclusividade",
            Self::Dias7 => "exclusividade de 7 dias",
            Self::Dias15 => "exclusividade de 15 dias",
            Self::Dias30 => "exclusividade de 30 dias",
            Self::Dias365 => "exclusividade de 365 dias",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageRightsKind {
    Organico,
    MidiaPaga,
    Global,
}

impl UsageRightsKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Organico => "uso orgânico",
            Self::MidiaPaga => "mídia paga",
            Self::Global => "uso global",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaidMediaDuration {
    #[serde(rename = "7d")]
    Dias7,
    #[serde(rename = "15d")]
    Dias15,
    #[serde(rename = "30d")]
    Dias30,
    #[serde(rename = "90d")]
    Dias90,
    #[serde(rename = "180d")]
    Dias180,
    #[serde(rename = "365d")]
    Dias365,
}

impl PaidMediaDuration {
    /// Duration assumed for legacy single-format calls that omit it.
    pub const LEGACY_DEFAULT: PaidMediaDuration = PaidMediaDuration::Dias30;

    pub fn from_days(days: u32) -> Option<Self> {
        match days {
            7 => Some(Self::Dias7),
            15 => Some(Self::Dias15),
            30 => Some(Self::Dias30),
            90 => Some(Self::Dias90),
            180 => Some(Self::Dias180),
            365 => Some(Self::Dias365),
            _ => None,
        }
    }

    /// Smallest window that covers `days`, capped at one year.
    pub fn covering(days: u32) -> Self {
        match days {
            0..=7 => Self::Dias7,
            8..=15 => Self::Dias15,
            16..=30 => Self::Dias30,
            31..=90 => Self::Dias90,
            91..=180 => Self::Dias180,
            _ => Self::Dias365,
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            Self::Dias7 => 7,
            Self::Dias15 => 15,
            Self::Dias30 => 30,
            Self::Dias90 => 90,
            Self::Dias180 => 180,
            Self::Dias365 => 365,
        }
    }
}

/// Usage rights with the paid-media window only where it matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UsageRights {
    Organico,
    MidiaPaga { duration: PaidMediaDuration },
    Global { duration: PaidMediaDuration },
}

impl UsageRights {
    pub fn kind(&self) -> UsageRightsKind {
        match self {
            Self::Organico => UsageRightsKind::Organico,
            Self::MidiaPaga { .. } => UsageRightsKind::MidiaPaga,
            Self::Global { .. } => UsageRightsKind::Global,
        }
    }

    pub fn paid_media_duration(&self) -> Option<PaidMediaDuration> {
        match self {
            Self::Organico => None,
            Self::MidiaPaga { duration } | Self::Global { duration } => Some(*duration),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Simples,
    Roteiro,
    Profissional,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Authority {
    #[default]
    Padrao,
    Ascensao,
    Autoridade,
    Celebridade,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seasonality {
    #[default]
    Normal,
    Alta,
    Baixa,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelTier {
    #[default]
    Local,
    Nacional,
    Internacional,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrandSize {
    Pequena,
    #[default]
    Media,
    Grande,
}

/// Shared scale for `imageRisk` and `strategicGain`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Baixo,
    Alto,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentModel {
    #[default]
    PublicidadePerfil,
    UgcWhitelabel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentDeliverables {
    Single(ContentFormat),
    Package(FormatQuantities),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentDeal {
    pub deliverables: ContentDeliverables,
    pub exclusivity: Exclusivity,
    pub usage_rights: UsageRights,
    pub repost_tiktok: bool,
    /// Recorded for the proposal only; never priced.
    pub instagram_collab: bool,
    pub complexity: Complexity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub duration_hours: Decimal,
    pub travel_tier: TravelTier,
    pub hotel_nights: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventDeal {
    pub details: EventDetails,
    pub coverage: Option<FormatQuantities>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Delivery {
    Conteudo(ContentDeal),
    Evento(EventDeal),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BrandRisk {
    pub brand_size: BrandSize,
    pub image_risk: RiskLevel,
    pub strategic_gain: RiskLevel,
    pub content_model: ContentModel,
    pub allow_strategic_waiver: bool,
}

/// Fully-specified deal parameters. Only [`DealParametersDraft::into_params`]
/// builds these from loose input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DealParameters {
    pub delivery: Delivery,
    pub authority: Authority,
    pub seasonality: Seasonality,
    pub brand_risk: Option<BrandRisk>,
}

impl DealParameters {
    pub fn format_label(&self) -> FormatLabel {
        match &self.delivery {
            Delivery::Conteudo(deal) => match deal.deliverables {
                ContentDeliverables::Single(format) => format.into(),
                ContentDeliverables::Package(_) => FormatLabel::Pacote,
            },
            Delivery::Evento(_) => FormatLabel::Evento,
        }
    }

    /// Normalized echo in the same wire shape accepted as input.
    pub fn to_draft(&self) -> DealParametersDraft {
        let mut draft = DealParametersDraft {
            format: Some(self.format_label()),
            authority: Some(self.authority),
            seasonality: Some(self.seasonality),
            ..DealParametersDraft::default()
        };

        match &self.delivery {
            Delivery::Conteudo(deal) => {
                draft.delivery_type = Some(DeliveryType::Conteudo);
                if let ContentDeliverables::Package(quantities) = deal.deliverables {
                    draft.format_quantities = Some(quantities);
                }
                draft.exclusivity = Some(deal.exclusivity);
                draft.usage_rights = Some(deal.usage_rights.kind());
                draft.paid_media_duration = deal.usage_rights.paid_media_duration();
                draft.repost_tiktok = Some(deal.repost_tiktok);
                draft.instagram_collab = Some(deal.instagram_collab);
                draft.complexity = Some(deal.complexity);
            }
            Delivery::Evento(deal) => {
                draft.delivery_type = Some(DeliveryType::Evento);
                draft.event_details = Some(EventDetailsDraft {
                    duration_hours: Some(deal.details.duration_hours),
                    travel_tier: Some(deal.details.travel_tier),
                    hotel_nights: Some(deal.details.hotel_nights),
                });
                draft.event_coverage_quantities = deal.coverage;
            }
        }

        if let Some(risk) = &self.brand_risk {
            draft.brand_size = Some(risk.brand_size);
            draft.image_risk = Some(risk.image_risk);
            draft.strategic_gain = Some(risk.strategic_gain);
            draft.content_model = Some(risk.content_model);
            draft.allow_strategic_waiver = Some(risk.allow_strategic_waiver);
        }

        draft
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailsDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_tier: Option<TravelTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_nights: Option<u32>,
}

/// Loose wire shape shared by structured requests and the chat parser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealParametersDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<DeliveryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_quantities: Option<FormatQuantities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusivity: Option<Exclusivity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_rights: Option<UsageRightsKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_media_duration: Option<PaidMediaDuration>,
    #[serde(default, rename = "repostTikTok", skip_serializing_if = "Option::is_none")]
    pub repost_tiktok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_collab: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<Authority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonality: Option<Seasonality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_details: Option<EventDetailsDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_coverage_quantities: Option<FormatQuantities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_size: Option<BrandSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_risk: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategic_gain: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_model: Option<ContentModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_strategic_waiver: Option<bool>,
}

impl DealParametersDraft {
    pub fn is_event(&self) -> bool {
        match self.delivery_type {
            Some(DeliveryType::Evento) => true,
            Some(DeliveryType::Conteudo) => false,
            None => self.event_details.is_some() || self.format == Some(FormatLabel::Evento),
        }
    }

    /// Required content fields that are still absent. Events never report any.
    pub fn missing_fields(&self) -> Vec<MissingField> {
        if self.is_event() {
            return Vec::new();
        }

        let mut missing = Vec::new();
        let has_quantities = self.format_quantities.is_some_and(|quantities| !quantities.is_empty());
        let has_single = self.format.and_then(|format| format.as_content_format()).is_some();
        if !has_quantities && !has_single {
            missing.push(MissingField::Format);
        }
        if self.exclusivity.is_none() {
            missing.push(MissingField::Exclusivity);
        }
        if self.usage_rights.is_none() {
            missing.push(MissingField::UsageRights);
        }
        missing
    }

    pub fn into_params(self) -> Result<DealParameters, DomainError> {
        let delivery =
            if self.is_event() { self.event_delivery()? } else { self.content_delivery()? };

        let has_risk_inputs = self.brand_size.is_some()
            || self.image_risk.is_some()
            || self.strategic_gain.is_some()
            || self.content_model.is_some()
            || self.allow_strategic_waiver.is_some();
        let brand_risk = has_risk_inputs.then(|| BrandRisk {
            brand_size: self.brand_size.unwrap_or_default(),
            image_risk: self.image_risk.unwrap_or_default(),
            strategic_gain: self.strategic_gain.unwrap_or_default(),
            content_model: self.content_model.unwrap_or_default(),
            allow_strategic_waiver: self.allow_strategic_waiver.unwrap_or(false),
        });

        Ok(DealParameters {
            delivery,
            authority: self.authority.unwrap_or_default(),
            seasonality: self.seasonality.unwrap_or_default(),
            brand_risk,
        })
    }

    fn content_delivery(&self) -> Result<Delivery, DomainError> {
        if self.event_details.is_some() {
            return Err(content_only_violation("eventDetails"));
        }
        if self.event_coverage_quantities.is_some() {
            return Err(content_only_violation("eventCoverageQuantities"));
        }

        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(DomainError::MissingFields(missing));
        }

        let deliverables = match self.format_quantities.filter(|quantities| !quantities.is_empty()) {
            Some(quantities) => match quantities.single_unit() {
                Some(format) => ContentDeliverables::Single(format),
                None => ContentDeliverables::Package(quantities),
            },
            None => {
                let format = self.format.and_then(|format| format.as_content_format()).ok_or_else(
                    || DomainError::MissingFields(vec![MissingField::Format]),
                )?;
                ContentDeliverables::Single(format)
            }
        };

        let duration = self.paid_media_duration.unwrap_or(PaidMediaDuration::LEGACY_DEFAULT);
        let usage_rights = match self.usage_rights {
            Some(UsageRightsKind::Organico) => UsageRights::Organico,
            Some(UsageRightsKind::MidiaPaga) => UsageRights::MidiaPaga { duration },
            Some(UsageRightsKind::Global) => UsageRights::Global { duration },
            None => return Err(DomainError::MissingFields(vec![MissingField::UsageRights])),
        };
        let exclusivity = self
            .exclusivity
            .ok_or_else(|| DomainError::MissingFields(vec![MissingField::Exclusivity]))?;

        Ok(Delivery::Conteudo(ContentDeal {
            deliverables,
            exclusivity,
            usage_rights,
            repost_tiktok: self.repost_tiktok.unwrap_or(false),
            instagram_collab: self.instagram_collab.unwrap_or(false),
            complexity: self.complexity.unwrap_or_default(),
        }))
    }

    fn event_delivery(&self) -> Result<Delivery, DomainError> {
        let content_only = [
            ("formatQuantities", self.format_quantities.is_some()),
            ("exclusivity", self.exclusivity.is_some()),
            ("usageRights", self.usage_rights.is_some()),
            ("paidMediaDuration", self.paid_media_duration.is_some()),
            ("repostTikTok", self.repost_tiktok.is_some()),
            ("instagramCollab", self.instagram_collab.is_some()),
            ("complexity", self.complexity.is_some()),
        ];
        if let Some((field, _)) = content_only.iter().find(|(_, present)| *present) {
            return Err(DomainError::InvalidParameters(format!(
                "`{field}` is a content-only field and cannot be sent on an event deal"
            )));
        }
        if matches!(self.format, Some(format) if format != FormatLabel::Evento) {
            return Err(DomainError::InvalidParameters(
                "event deals only accept `format = evento`".to_string(),
            ));
        }

        let details = self.event_details.unwrap_or_default();
        let duration_hours = details.duration_hours.ok_or_else(|| {
            DomainError::InvalidParameters("eventDetails.durationHours is required".to_string())
        })?;
        if duration_hours <= Decimal::ZERO {
            return Err(DomainError::InvalidParameters(
                "eventDetails.durationHours must be greater than zero".to_string(),
            ));
        }
        if duration_hours > Decimal::from(MAX_EVENT_HOURS) {
            return Err(DomainError::InvalidParameters(format!(
                "eventDetails.durationHours must be at most {MAX_EVENT_HOURS}"
            )));
        }

        Ok(Delivery::Evento(EventDeal {
            details: EventDetails {
                duration_hours,
                travel_tier: details.travel_tier.unwrap_or_default(),
                hotel_nights: details.hotel_nights.unwrap_or(0),
            },
            coverage: self.event_coverage_quantities.filter(|quantities| !quantities.is_empty()),
        }))
    }
}

/// Longest presence a single event deal can book (ten full days).
pub const MAX_EVENT_HOURS: u32 = 240;

fn content_only_violation(field: &str) -> DomainError {
    DomainError::InvalidParameters(format!(
        "`{field}` is an event-only field and cannot be sent on a content deal"
    ))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        ContentDeliverables, ContentFormat, DealParametersDraft, Delivery, DeliveryType,
        EventDetailsDraft, Exclusivity, FormatLabel, FormatQuantities, PaidMediaDuration,
        TravelTier, UsageRights, UsageRightsKind, MAX_EVENT_HOURS,
    };
    use crate::domain::intent::MissingField;
    use crate::errors::DomainError;

    #[test]
    fn legacy_single_format_defaults_paid_media_duration() {
        let params = DealParametersDraft {
            format: Some(FormatLabel::Reels),
            exclusivity: Some(Exclusivity::Nenhuma),
            usage_rights: Some(UsageRightsKind::MidiaPaga),
            ..DealParametersDraft::default()
        }
        .into_params()
        .expect("valid legacy params");

        let Delivery::Conteudo(deal) = params.delivery else {
            panic!("expected content delivery");
        };
        assert_eq!(deal.deliverables, ContentDeliverables::Single(ContentFormat::Reels));
        assert_eq!(deal.usage_rights, UsageRights::MidiaPaga { duration: PaidMediaDuration::Dias30 });
        assert!(params.brand_risk.is_none());
    }

    #[test]
    fn multiple_quantities_normalize_to_package() {
        let params = DealParametersDraft {
            format_quantities: Some(FormatQuantities { reels: 1, post: 0, stories: 3 }),
            exclusivity: Some(Exclusivity::Nenhuma),
            usage_rights: Some(UsageRightsKind::Organico),
            ..DealParametersDraft::default()
        }
        .into_params()
        .expect("valid package params");

        assert_eq!(params.format_label(), FormatLabel::Pacote);
    }

    #[test]
    fn single_unit_quantities_normalize_to_single_format() {
        let params = DealParametersDraft {
            format_quantities: Some(FormatQuantities { reels: 0, post: 1, stories: 0 }),
            exclusivity: Some(Exclusivity::Dias7),
            usage_rights: Some(UsageRightsKind::Organico),
            ..DealParametersDraft::default()
        }
        .into_params()
        .expect("valid params");

        assert_eq!(params.format_label(), FormatLabel::Post);
    }

    #[test]
    fn missing_required_content_fields_are_reported_together() {
        let error = DealParametersDraft::default().into_params().expect_err("draft is empty");
        assert_eq!(
            error,
            DomainError::MissingFields(vec![
                MissingField::Format,
                MissingField::Exclusivity,
                MissingField::UsageRights,
            ])
        );
    }

    #[test]
    fn event_deal_rejects_content_only_fields() {
        let error = DealParametersDraft {
            delivery_type: Some(DeliveryType::Evento),
            exclusivity: Some(Exclusivity::Dias30),
            event_details: Some(EventDetailsDraft {
                duration_hours: Some(Decimal::from(4)),
                travel_tier: Some(TravelTier::Local),
                hotel_nights: None,
            }),
            ..DealParametersDraft::default()
        }
        .into_params()
        .expect_err("exclusivity is content-only");

        assert!(matches!(error, DomainError::InvalidParameters(message) if message.contains("exclusivity")));
    }

    #[test]
    fn content_deal_rejects_event_details() {
        let error = DealParametersDraft {
            format: Some(FormatLabel::Reels),
            exclusivity: Some(Exclusivity::Nenhuma),
            usage_rights: Some(UsageRightsKind::Organico),
            event_coverage_quantities: Some(FormatQuantities { reels: 1, post: 0, stories: 0 }),
            delivery_type: Some(DeliveryType::Conteudo),
            ..DealParametersDraft::default()
        }
        .into_params()
        .expect_err("coverage is event-only");

        assert!(matches!(error, DomainError::InvalidParameters(_)));
    }

    #[test]
    fn event_requires_positive_duration() {
        let error = DealParametersDraft {
            event_details: Some(EventDetailsDraft {
                duration_hours: Some(Decimal::ZERO),
                ..EventDetailsDraft::default()
            }),
            ..DealParametersDraft::default()
        }
        .into_params()
        .expect_err("zero-hour event");

        assert!(matches!(error, DomainError::InvalidParameters(_)));
    }

    #[test]
    fn event_hours_beyond_ten_days_are_rejected() {
        let draft: DealParametersDraft = serde_json::from_value(serde_json::json!({
            "format": "evento",
            "eventDetails": {
                "durationHours": "79228162514264337593543950335",
                "travelTier": "internacional"
            }
        }))
        .expect("draft parses");

        let error = draft.into_params().expect_err("oversized event");
        assert!(matches!(error, DomainError::InvalidParameters(message) if message.contains("at most 240")));

        let longest = DealParametersDraft {
            event_details: Some(EventDetailsDraft {
                duration_hours: Some(Decimal::from(MAX_EVENT_HOURS)),
                ..EventDetailsDraft::default()
            }),
            ..DealParametersDraft::default()
        };
        assert!(longest.into_params().is_ok());
    }

    #[test]
    fn normalized_echo_round_trips_through_the_wire_shape() {
        let draft: DealParametersDraft = serde_json::from_value(serde_json::json!({
            "formatQuantities": {"reels": 2, "stories": 1},
            "exclusivity": "15d",
            "usageRights": "global",
            "paidMediaDuration": "90d",
            "repostTikTok": true,
            "brandSize": "grande"
        }))
        .expect("draft parses");

        let params = draft.into_params().expect("valid params");
        let echo = params.to_draft();
        assert_eq!(echo.format, Some(FormatLabel::Pacote));
        assert_eq!(echo.paid_media_duration, Some(PaidMediaDuration::Dias90));
        assert_eq!(echo.into_params().expect("echo is valid"), params);
    }
}
