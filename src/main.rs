use std::sync::Arc;

use trail_profile_api::auth::VerifierClient;
use trail_profile_api::config::AppConfig;
use trail_profile_api::database::procedures::ProcedureStore;
use trail_profile_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and AUTH_API_URL
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;

    let store = ProcedureStore::connect(&config.database)?;
    let auth = VerifierClient::new(&config.auth)?;

    let state = AppState {
        store: Arc::new(store),
        auth: Arc::new(auth),
    };

    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Trail profile API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
