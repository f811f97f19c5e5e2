use serde::{Deserialize, Serialize};

/// Fields the calculator cannot safely default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingField {
    Format,
    Exclusivity,
    UsageRights,
}

impl MissingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Exclusivity => "exclusivity",
            Self::UsageRights => "usageRights",
        }
    }

    pub fn question(&self) -> &'static str {
        match self {
            Self::Format => "Quais entregas a marca pediu (Reels, Posts, Stories e quantidades)?",
            Self::Exclusivity => "Existe exclusividade? Se sim, por quantos dias (7, 15 ou 30)?",
            Self::UsageRights => {
                "A marca vai usar o conteúdo só no orgânico ou também em mídia paga/uso global?"
            }
        }
    }

    /// Quick replies that answer this field directly.
    pub fn quick_replies(&self) -> &'static [&'static str] {
        match self {
            Self::Format => &["1 Reel", "3 Stories", "1 Reel + 3 Stories", "1 Post no feed"],
            Self::Exclusivity => {
                &["Sem exclusividade", "Exclusividade 7 dias", "Exclusividade 15 dias", "Exclusividade 30 dias"]
            }
            Self::UsageRights => &["Somente orgânico", "Mídia paga 30 dias", "Uso global"],
        }
    }
}

/// A field the parser filled with its baseline value instead of user input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assumption {
    pub field: String,
    pub defaulted_value: String,
}

impl Assumption {
    pub fn new(field: impl Into<String>, defaulted_value: impl Into<String>) -> Self {
        Self { field: field.into(), defaulted_value: defaulted_value.into() }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverableCounts {
    pub reels: u32,
    pub stories: u32,
    pub posts: u32,
    pub total: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentSignals {
    pub has_deliverables: bool,
    pub has_commercial_terms: bool,
    pub has_price_intent: bool,
}

/// Everything the formatter needs to ask for the missing pieces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationRequest {
    pub missing: Vec<MissingField>,
    pub deliverables_summary: String,
    pub assumptions: Vec<Assumption>,
}
