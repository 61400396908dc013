use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info;

use shared::config::Config;
use shared::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt().init();
    run(service_fn(recalc_handler)).await
}

/// Replays the full game ledger and rewrites every player's ratings from the
/// zero state. Run after administrative result edits to repair drift.
async fn recalc_handler(_event: LambdaEvent<Value>) -> Result<(), Error> {
    let config = Config::from_env().map_err(|e| Error::from(format!("Bad configuration: {}", e)))?;

    let aws_config = aws_config::load_from_env().await;
    let client = aws_sdk_dynamodb::Client::new(&aws_config);
    let state = AppState::new(client, config)
        .map_err(|e| Error::from(format!("Failed to build services: {}", e)))?;

    state
        .load()
        .await
        .map_err(|e| Error::from(format!("Startup replay failed: {}", e)))?;
    info!(
        "Loaded {} players and {} games",
        state.players.count().await,
        state.ledger.count().await
    );

    let replayed = state
        .ledger
        .recalculate_all_ratings(&state.players, state.strategy.as_ref())
        .await
        .map_err(|e| Error::from(format!("Recalculation failed: {}", e)))?;

    info!("Recalculated all ratings from {} games", replayed);
    Ok(())
}
