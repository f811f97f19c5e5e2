use dealband_agent::PriceDealRequest;
use dealband_core::domain::deal::{CreatorId, DealParametersDraft};
use dealband_core::pricing::PricingOutcome;
use dealband_core::reply::render_outcome;
use serde_json::json;

use crate::commands::{
    block_on, correlation_id, finish, load_config, open_database, pricing_runtime, to_value,
    CommandFailure, CommandResult,
};

pub fn run(creator: &str, params_json: &str, segment: Option<&str>) -> CommandResult {
    finish("price", price(creator, params_json, segment))
}

fn price(
    creator: &str,
    params_json: &str,
    segment: Option<&str>,
) -> Result<CommandResult, CommandFailure> {
    let params: DealParametersDraft = serde_json::from_str(params_json)
        .map_err(|error| ("invalid_params", format!("--params is not a valid deal: {error}"), 2))?;
    let request = PriceDealRequest {
        creator_id: CreatorId(creator.to_string()),
        params,
        segment: segment.map(str::to_string),
    };
    let config = load_config()?;

    block_on(async {
        let pool = open_database(&config).await?;
        let runtime = pricing_runtime(&config, &pool);
        let outcome = runtime
            .price_deal(&request, &correlation_id("price"))
            .await
            .map_err(|error| ("pricing", error.to_string(), 7));
        pool.close().await;
        let outcome = outcome?;

        let reply = render_outcome(&outcome);
        Ok::<_, CommandFailure>(CommandResult::success_with_data(
            "price",
            summary(&outcome),
            Some(json!({ "outcome": to_value(&outcome)?, "reply": reply.text })),
        ))
    })
}

fn summary(outcome: &PricingOutcome) -> &'static str {
    match outcome {
        PricingOutcome::Priced(_) => "deal priced",
        PricingOutcome::InsufficientData(_) => "provisional estimate from segment CPM",
        PricingOutcome::NeedsClarification(_) => "deal is missing required fields",
    }
}
