use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::EnvFilter;

use partnerdesk::{
    build_draft_generator, config::AppConfig, routes, seed::SeedData, state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let drafts = build_draft_generator(&config)?;
    tracing::info!(
        component = "server",
        gemini_api_key = %config.redacted_gemini_api_key(),
        gemini_model = %config.gemini_model,
        draft_backend = drafts.backend_name(),
        platform = %config.platform_name,
        "loaded partnerdesk configuration"
    );
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; drafts use the offline template");
    }

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let state = AppState::new(config, SeedData::demo(), drafts);
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("server received shutdown signal");
        })
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
