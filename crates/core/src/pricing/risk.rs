use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::weights::{
    brand_size_adjustment, content_model_multiplier, image_risk_adjustment, image_risk_floor,
    strategic_gain_adjustment,
};
use crate::domain::deal::{Authority, BrandRisk, BrandSize, ContentModel, RiskLevel};

/// Marker written into the explanation whenever the image-risk floor wins.
pub const RISK_FLOOR_MARKER: &str = "[piso_de_risco_aplicado]";

/// Marker written into the explanation when the strategic tier is waived.
pub const STRATEGIC_WAIVER_MARKER: &str = "[waiver_estrategico]";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Brand/risk/strategy multiplier after the floor.
    pub risk_multiplier: Decimal,
    pub content_model_multiplier: Decimal,
    pub floor_applied: bool,
    pub strategic_waiver: bool,
}

impl RiskAssessment {
    pub fn neutral() -> Self {
        Self {
            risk_multiplier: Decimal::ONE,
            content_model_multiplier: Decimal::ONE,
            floor_applied: false,
            strategic_waiver: false,
        }
    }

    pub fn combined_multiplier(&self) -> Decimal {
        self.risk_multiplier * self.content_model_multiplier
    }
}

pub fn assess(risk: &BrandRisk, authority: Authority) -> RiskAssessment {
    let scored = Decimal::ONE
        + brand_size_adjustment(risk.brand_size)
        + image_risk_adjustment(risk.image_risk)
        + strategic_gain_adjustment(risk.strategic_gain);

    let (risk_multiplier, floor_applied) =
        if risk.image_risk == RiskLevel::Alto && scored < image_risk_floor() {
            (image_risk_floor(), true)
        } else {
            (scored, false)
        };

    RiskAssessment {
        risk_multiplier,
        content_model_multiplier: content_model_multiplier(risk.content_model),
        floor_applied,
        strategic_waiver: waiver_allowed(risk, authority),
    }
}

/// The strategic tier may only be zeroed for a large, low-risk brand with high
/// strategic gain courting a rising creator.
fn waiver_allowed(risk: &BrandRisk, authority: Authority) -> bool {
    risk.allow_strategic_waiver
        && risk.brand_size == BrandSize::Grande
        && risk.image_risk == RiskLevel::Baixo
        && risk.strategic_gain == RiskLevel::Alto
        && authority == Authority::Ascensao
}

pub fn content_model_label(model: ContentModel) -> &'static str {
    match model {
        ContentModel::PublicidadePerfil => "publicidade no perfil",
        ContentModel::UgcWhitelabel => "UGC white label (sem publicação no perfil)",
    }
}
