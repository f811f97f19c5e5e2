//! Multiplier tables for the deal pricing calculator.
//!
//! Every price is `unit value × delivery weight × commercial multipliers`,
//! where the unit value is `(avg reach / 1000) × CPM`.

use rust_decimal::Decimal;

use crate::domain::deal::{
    Authority, BrandSize, Complexity, ContentFormat, ContentModel, Exclusivity, FormatQuantities,
    PaidMediaDuration, RiskLevel, Seasonality, TravelTier, UsageRights,
};

/// Reel > Post > Story.
pub fn format_weight(format: ContentFormat) -> Decimal {
    match format {
        ContentFormat::Reels => Decimal::new(14, 1),
        ContentFormat::Post => Decimal::ONE,
        ContentFormat::Stories => Decimal::new(8, 1),
    }
}

/// Weighted sum of per-format quantities.
pub fn content_units(quantities: &FormatQuantities) -> Decimal {
    ContentFormat::ALL
        .iter()
        .map(|format| Decimal::from(quantities.quantity(*format)) * format_weight(*format))
        .sum()
}

pub fn exclusivity_multiplier(exclusivity: Exclusivity) -> Decimal {
    match exclusivity {
        Exclusivity::Nenhuma => Decimal::ONE,
        Exclusivity::Dias7 => Decimal::new(11, 1),
        Exclusivity::Dias15 => Decimal::new(12, 1),
        Exclusivity::Dias30 => Decimal::new(135, 2),
        Exclusivity::Dias365 => Decimal::new(18, 1),
    }
}

pub fn paid_media_duration_factor(duration: PaidMediaDuration) -> Decimal {
    match duration {
        PaidMediaDuration::Dias7 => Decimal::new(9, 1),
        PaidMediaDuration::Dias15 => Decimal::new(95, 2),
        PaidMediaDuration::Dias30 => Decimal::ONE,
        PaidMediaDuration::Dias90 => Decimal::new(115, 2),
        PaidMediaDuration::Dias180 => Decimal::new(13, 1),
        PaidMediaDuration::Dias365 => Decimal::new(15, 1),
    }
}

/// Organic is the 1.0 baseline; paid windows scale the paid-media premium.
pub fn usage_rights_multiplier(usage_rights: UsageRights) -> Decimal {
    match usage_rights {
        UsageRights::Organico => Decimal::ONE,
        UsageRights::MidiaPaga { duration } => {
            Decimal::new(12, 1) * paid_media_duration_factor(duration)
        }
        UsageRights::Global { duration } => {
            Decimal::new(15, 1) * paid_media_duration_factor(duration)
        }
    }
}

pub fn repost_multiplier(repost_tiktok: bool) -> Decimal {
    if repost_tiktok {
        Decimal::new(11, 1)
    } else {
        Decimal::ONE
    }
}

pub fn complexity_multiplier(complexity: Complexity) -> Decimal {
    match complexity {
        Complexity::Simples => Decimal::ONE,
        Complexity::Roteiro => Decimal::new(115, 2),
        Complexity::Profissional => Decimal::new(135, 2),
    }
}

pub fn authority_multiplier(authority: Authority) -> Decimal {
    match authority {
        Authority::Padrao => Decimal::ONE,
        Authority::Ascensao => Decimal::new(11, 1),
        Authority::Autoridade => Decimal::new(13, 1),
        Authority::Celebridade => Decimal::new(16, 1),
    }
}

pub fn seasonality_multiplier(seasonality: Seasonality) -> Decimal {
    match seasonality {
        Seasonality::Normal => Decimal::ONE,
        Seasonality::Alta => Decimal::new(12, 1),
        Seasonality::Baixa => Decimal::new(9, 1),
    }
}

/// Content units charged per hour of event presence.
pub fn event_hourly_units() -> Decimal {
    Decimal::new(4, 1)
}

pub fn travel_tier_multiplier(tier: TravelTier) -> Decimal {
    match tier {
        TravelTier::Local => Decimal::ONE,
        TravelTier::Nacional => Decimal::new(15, 1),
        TravelTier::Internacional => Decimal::new(2, 0),
    }
}

/// Coverage content sold together with an event presence.
pub fn coverage_bundle_factor() -> Decimal {
    Decimal::new(9, 1)
}

pub fn travel_cost(tier: TravelTier) -> Decimal {
    match tier {
        TravelTier::Local => Decimal::ZERO,
        TravelTier::Nacional => Decimal::from(1_500),
        TravelTier::Internacional => Decimal::from(4_500),
    }
}

pub fn hotel_night_cost() -> Decimal {
    Decimal::from(300)
}

pub fn brand_size_adjustment(size: BrandSize) -> Decimal {
    match size {
        BrandSize::Pequena => Decimal::new(10, 2),
        BrandSize::Media => Decimal::ZERO,
        BrandSize::Grande => Decimal::new(-5, 2),
    }
}

pub fn image_risk_adjustment(risk: RiskLevel) -> Decimal {
    match risk {
        RiskLevel::Baixo => Decimal::ZERO,
        RiskLevel::Alto => Decimal::new(20, 2),
    }
}

pub fn strategic_gain_adjustment(gain: RiskLevel) -> Decimal {
    match gain {
        RiskLevel::Baixo => Decimal::ZERO,
        RiskLevel::Alto => Decimal::new(-15, 2),
    }
}

/// Lowest risk multiplier allowed once image risk is high.
pub fn image_risk_floor() -> Decimal {
    Decimal::new(115, 2)
}

pub fn content_model_multiplier(model: ContentModel) -> Decimal {
    match model {
        ContentModel::PublicidadePerfil => Decimal::ONE,
        ContentModel::UgcWhitelabel => Decimal::new(65, 2),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierSpread {
    pub estrategico: Decimal,
    pub premium: Decimal,
}

pub const DEFAULT_SPREAD: TierSpread =
    TierSpread { estrategico: Decimal::from_parts(8, 0, 0, false, 1), premium: Decimal::from_parts(13, 0, 0, false, 1) };

pub const LOW_CONFIDENCE_SPREAD: TierSpread =
    TierSpread { estrategico: Decimal::from_parts(65, 0, 0, false, 2), premium: Decimal::from_parts(16, 0, 0, false, 1) };
