use std::sync::Arc;

use pomo_api::{build_router, listeners, state::AppState};
use pomo_config::Settings;
use pomo_db::{connect, indexes::ensure_indexes};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "pomo_api=debug,pomo_services=debug,pomo_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    info!("Starting pomo-sync on {}:{}", settings.app.host, settings.app.port);
    info!(
        admin_policy = ?settings.reconciler.admin_policy,
        transactional = settings.reconciler.transactional,
        teardown_batch_size = settings.reconciler.teardown_batch_size,
        "Reconciler config"
    );

    let db = connect(&settings).await?;
    ensure_indexes(&db).await?;

    let app_state = AppState::connect(&db, settings.clone()).await?;

    if settings.reconciler.listen_presence {
        let url = settings.redis.url.clone();
        let channel = settings.redis.presence_channel.clone();
        let mirror = Arc::clone(&app_state.mirror);
        tokio::spawn(async move {
            if let Err(e) = listeners::listen_presence(url, channel, mirror).await {
                error!(error = %e, "Presence listener stopped");
            }
        });
    }

    if settings.reconciler.watch_status_changes {
        let db = db.clone();
        let reconciler = Arc::clone(&app_state.reconciler);
        tokio::spawn(async move {
            if let Err(e) = listeners::watch_status(db, reconciler).await {
                error!(error = %e, "Status change stream stopped");
            }
        });
    }

    let app = build_router(app_state);

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
