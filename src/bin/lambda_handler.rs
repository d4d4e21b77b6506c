//! AWS Lambda handler for running valuations
//!
//! Accepts a settings document (the saved-analysis JSON format) and returns
//! the projection table with the valuation. Invalid assumptions are reported
//! in the `error` field instead of failing the invocation.

use dcf_valuation::{
    projection::{ProjectionConfig, ProjectionEngine, ReinvestmentPolicy, YearlyRecord},
    valuation::ValuationResult,
    SettingsDocument,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::info;
use serde::{Deserialize, Serialize};

/// Input for one valuation
#[derive(Debug, Deserialize)]
pub struct ValuationRequest {
    /// Saved analysis; missing keys use the reference case
    #[serde(default)]
    pub settings: SettingsDocument,

    /// Overrides the settings' reinvestment policy
    #[serde(default)]
    pub reinvestment_policy: Option<ReinvestmentPolicy>,

    /// Overrides the settings' current price
    #[serde(default)]
    pub current_price: Option<f64>,
}

/// Output from the valuation
#[derive(Debug, Serialize)]
pub struct ValuationResponse {
    pub company: String,
    pub ticker: String,
    pub reinvestment_policy: ReinvestmentPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ValuationResult>,
    pub projection: Vec<YearlyRecord>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn value_request(request: ValuationRequest) -> ValuationResponse {
    let start = std::time::Instant::now();

    let settings = request.settings;
    let policy = request
        .reinvestment_policy
        .or(settings.reinvestment_policy)
        .unwrap_or_default();
    let profile = settings.profile();
    let current_price = request
        .current_price
        .filter(|p| *p > 0.0)
        .or(profile.current_price);

    let engine = ProjectionEngine::new(ProjectionConfig::with_policy(policy));
    let outcome = engine.value(&settings.to_assumptions(), current_price);

    let (result, projection, error) = match outcome {
        Ok(valuation) => (Some(valuation.result), valuation.projection.records, None),
        Err(e) => (None, Vec::new(), Some(e.to_string())),
    };

    info!(
        "Valued {} ({}) in {:?}",
        profile.name,
        profile.ticker,
        start.elapsed()
    );

    ValuationResponse {
        company: profile.name,
        ticker: profile.ticker,
        reinvestment_policy: policy,
        result,
        projection,
        execution_time_ms: start.elapsed().as_millis() as u64,
        error,
    }
}

/// Lambda handler function
async fn handler(event: LambdaEvent<ValuationRequest>) -> Result<ValuationResponse, Error> {
    Ok(value_request(event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
