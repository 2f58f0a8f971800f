use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use symcheck_core::config::{path_from_env_value, seed_from_env_value};
use symcheck_core::constants::{DEFAULT_DATASET_PATH, DEFAULT_MODEL_DIR};
use symcheck_core::{CoreConfig, PredictionPipeline, StartupOutcome, TrainingParams, load_or_train};

/// Main entry point for the SymCheck server
///
/// Resolves configuration, loads the model (training one from the dataset if needed) and serves
/// the REST API with Swagger UI.
///
/// # Environment Variables
/// - `SYMCHECK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `SYMCHECK_MODEL_DIR`: Directory holding the model artifact (default: "model")
/// - `SYMCHECK_DATASET`: Training CSV used when no artifact is usable (default: "dataset_improved.csv")
/// - `SYMCHECK_SEED`: Training seed (default: 42)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - configuration values are invalid,
/// - no model can be loaded or trained, or
/// - the server address cannot be bound or the server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("symcheck_run=info".parse()?)
                .add_directive("symcheck_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("SYMCHECK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        path_from_env_value(std::env::var("SYMCHECK_MODEL_DIR").ok(), DEFAULT_MODEL_DIR),
        path_from_env_value(std::env::var("SYMCHECK_DATASET").ok(), DEFAULT_DATASET_PATH),
        TrainingParams::default().with_seed(seed_from_env_value(
            std::env::var("SYMCHECK_SEED").ok(),
        )?),
    )?;

    let (engine, outcome) = tokio::task::spawn_blocking(move || load_or_train(&cfg)).await??;
    match outcome {
        StartupOutcome::Loaded => tracing::info!("++ Loaded saved model"),
        StartupOutcome::Trained { reason } => {
            tracing::info!("++ Trained a new model ({})", reason)
        }
    }

    let app = router(AppState::new(PredictionPipeline::new(engine)));

    tracing::info!("++ Starting SymCheck REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
