use std::env;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docscan::config::Config;
use docscan::handlers::create_router;
use docscan::services::{DocumentAnalyzer, FixtureAnalyzer, TextractAnalyzer};
use docscan::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    init_tracing(log_json);

    let config = Config::from_env()?;

    tracing::info!("Starting Docscan Document Extraction Service");
    tracing::info!("Max file size: {}MB", config.max_file_size_mb);
    tracing::info!("Upload directory: {}", config.upload_dir.display());

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let analyzer: Arc<dyn DocumentAnalyzer> = match &config.textract_fixture {
        Some(path) => {
            tracing::warn!("Serving analysis results from fixture {}", path.display());
            Arc::new(FixtureAnalyzer::from_json_file(path)?)
        }
        None => Arc::new(TextractAnalyzer::from_config(&config).await),
    };

    // Determine port from environment (Railway compatibility)
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(config.server_port);

    let addr = format!("{}:{}", config.server_host, port);

    let app = create_router(AppState::new(config, analyzer));

    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "docscan=debug,tower_http=debug,axum::rejection=trace".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}
