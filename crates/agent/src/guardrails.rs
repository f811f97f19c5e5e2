use crate::conversation::{mentions_commercial_terms, ParsedDealIntent};

/// Chat-side decision on whether the pricing pipeline should answer a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow,
    Deny { reason_code: &'static str, user_message: String, fallback_path: &'static str },
    Degrade { reason_code: &'static str, user_message: String, fallback_path: &'static str },
}

impl GuardrailDecision {
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Deny { .. })
    }
}

/// Routing gate for chat pricing: explicit price intent, or deliverables
/// together with commercial vocabulary in the message or the prior topic.
pub fn should_handle_chat_pricing(intent: &ParsedDealIntent, previous_topic: Option<&str>) -> bool {
    let signals = intent.signals;
    if signals.has_price_intent {
        return true;
    }
    signals.has_deliverables
        && (signals.has_commercial_terms || previous_topic.is_some_and(mentions_commercial_terms))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardrailPolicy {
    pub chat_pricing_enabled: bool,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self { chat_pricing_enabled: true }
    }
}

impl GuardrailPolicy {
    pub fn evaluate(&self, intent: &ParsedDealIntent, previous_topic: Option<&str>) -> GuardrailDecision {
        if !should_handle_chat_pricing(intent, previous_topic) {
            return GuardrailDecision::Deny {
                reason_code: "not_a_pricing_request",
                user_message: "Message does not look like a deal-pricing request.".to_string(),
                fallback_path: "general_assistant",
            };
        }

        if !self.chat_pricing_enabled {
            return GuardrailDecision::Deny {
                reason_code: "chat_pricing_disabled",
                user_message:
                    "A precificação pelo chat está indisponível no momento. Use a calculadora estruturada."
                        .to_string(),
                fallback_path: "structured_pricing",
            };
        }

        if !intent.missing.is_empty() {
            return GuardrailDecision::Degrade {
                reason_code: "clarification_required",
                user_message: "Preciso de mais alguns detalhes antes de calcular a faixa.".to_string(),
                fallback_path: "clarification",
            };
        }

        GuardrailDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::{should_handle_chat_pricing, GuardrailDecision, GuardrailPolicy};
    use crate::conversation::DealIntentParser;

    struct Case {
        message: &'static str,
        previous_topic: Option<&'static str>,
        handled: bool,
    }

    #[test]
    fn routing_gate_table() {
        let cases = [
            Case { message: "quanto cobrar por 1 reel?", previous_topic: None, handled: true },
            Case {
                message: "3 reels, exclusividade de 15 dias",
                previous_topic: None,
                handled: true,
            },
            Case {
                message: "e se forem 2 reels?",
                previous_topic: Some("proposta da marca de cosméticos"),
                handled: true,
            },
            Case { message: "postei 3 stories hoje", previous_topic: None, handled: false },
            Case {
                message: "postei 3 stories hoje",
                previous_topic: Some("dicas de engajamento"),
                handled: false,
            },
            Case { message: "bom dia!", previous_topic: None, handled: false },
        ];

        let parser = DealIntentParser::new();
        for case in cases {
            let intent = parser.parse(case.message);
            assert_eq!(
                should_handle_chat_pricing(&intent, case.previous_topic),
                case.handled,
                "message: {}",
                case.message
            );
        }
    }

    #[test]
    fn incomplete_request_degrades_to_clarification() {
        let intent = DealIntentParser::new().parse("quanto cobro por um post?");
        let decision = GuardrailPolicy::default().evaluate(&intent, None);

        let (reason_code, fallback_path) = match decision {
            GuardrailDecision::Degrade { reason_code, fallback_path, .. } => {
                (reason_code, fallback_path)
            }
            _ => ("", ""),
        };
        assert_eq!(reason_code, "clarification_required");
        assert_eq!(fallback_path, "clarification");
    }

    #[test]
    fn disabled_chat_pricing_denies_priced_requests() {
        let intent = DealIntentParser::new()
            .parse("quanto cobrar por 1 reel sem exclusividade, orgânico?");
        let decision = GuardrailPolicy { chat_pricing_enabled: false }.evaluate(&intent, None);

        assert!(!decision.is_handled());
        assert!(matches!(
            decision,
            GuardrailDecision::Deny { reason_code: "chat_pricing_disabled", .. }
        ));
    }

    #[test]
    fn complete_request_is_allowed() {
        let intent = DealIntentParser::new()
            .parse("quanto cobrar por 1 reel sem exclusividade, orgânico?");
        assert_eq!(GuardrailPolicy::default().evaluate(&intent, None), GuardrailDecision::Allow);
    }
}
