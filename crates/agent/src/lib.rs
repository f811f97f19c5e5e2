//! Chat pricing agent.
//!
//! Turns creator messages into structured deal parameters, decides whether a
//! message should be priced at all, and runs the pricing pipeline:
//! 1. **Intent parsing** (`conversation`) - free text → `DealParametersDraft`
//! 2. **Routing gate** (`guardrails`) - price intent or deliverables with
//!    commercial vocabulary
//! 3. **Pipeline** (`runtime`) - concurrent resolver reads, deterministic
//!    calculator, reply rendering
//!
//! The parser only translates. Prices always come from the deterministic
//! calculator in `dealband-core`.

pub mod conversation;
pub mod guardrails;
pub mod runtime;

pub use conversation::{DealIntentParser, ParsedDealIntent};
pub use guardrails::{should_handle_chat_pricing, GuardrailDecision, GuardrailPolicy};
pub use runtime::{AgentRuntime, ChatMessage, ChatResponse, PriceDealRequest, PricingResolvers};
