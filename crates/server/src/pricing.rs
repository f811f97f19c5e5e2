//! HTTP surface over the pricing runtime.
//!
//! `POST /v1/pricing/calculate` prices a structured request and
//! `POST /v1/pricing/chat` routes a free-text creator message. Both accept an
//! optional `x-correlation-id` header and mint one when it is absent.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use dealband_agent::{AgentRuntime, ChatMessage, ChatResponse, PriceDealRequest};
use dealband_core::errors::{DomainError, InterfaceError};
use dealband_core::pricing::PricingOutcome;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct PricingState {
    runtime: Arc<AgentRuntime>,
}

pub fn router(runtime: Arc<AgentRuntime>) -> Router {
    Router::new()
        .route("/v1/pricing/calculate", post(calculate))
        .route("/v1/pricing/chat", post(chat))
        .with_state(PricingState { runtime })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub user_message: &'static str,
    pub correlation_id: String,
}

pub struct ApiError(InterfaceError);

impl From<InterfaceError> for ApiError {
    fn from(value: InterfaceError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self.0 {
            InterfaceError::BadRequest { message, .. } => {
                (StatusCode::BAD_REQUEST, "bad_request", message.clone())
            }
            InterfaceError::ServiceUnavailable { message, .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", message.clone())
            }
            InterfaceError::Internal { message, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", message.clone())
            }
        };

        warn!(
            event_name = "http.pricing.error",
            correlation_id = self.0.correlation_id(),
            status = status.as_u16(),
            error = %message,
            "pricing request failed"
        );

        let body = ErrorBody {
            error: code,
            message,
            user_message: self.0.user_message(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn calculate(
    State(state): State<PricingState>,
    headers: HeaderMap,
    Json(request): Json<PriceDealRequest>,
) -> Result<Json<PricingOutcome>, ApiError> {
    let correlation_id = correlation_id(&headers);
    if request.creator_id.0.trim().is_empty() {
        return Err(InterfaceError::BadRequest {
            message: DomainError::InvalidParameters("creatorId must not be empty".to_string())
                .to_string(),
            correlation_id,
        }
        .into());
    }

    info!(
        event_name = "http.pricing.calculate",
        correlation_id = %correlation_id,
        creator_id = %request.creator_id.0,
        "structured pricing request received"
    );

    state
        .runtime
        .price_deal(&request, &correlation_id)
        .await
        .map(Json)
        .map_err(|error| error.into_interface(correlation_id).into())
}

pub async fn chat(
    State(state): State<PricingState>,
    headers: HeaderMap,
    Json(message): Json<ChatMessage>,
) -> Result<Json<ChatResponse>, ApiError> {
    let correlation_id = correlation_id(&headers);

    info!(
        event_name = "http.pricing.chat",
        correlation_id = %correlation_id,
        user_id = %message.user_id.0,
        "chat message received"
    );

    state
        .runtime
        .handle_chat_message(&message, &correlation_id)
        .await
        .map(Json)
        .map_err(|error| error.into_interface(correlation_id).into())
}

fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| format!("req-{}", Uuid::new_v4()), str::to_string)
}
