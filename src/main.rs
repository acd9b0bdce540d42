use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use taskboard::{
    app_state::AppState,
    data_access::{memory_store::MemoryStore, postgres_store::PostgresStore},
    map_routes,
    settings::{Settings, StorageKind},
    with_static_fallback, TaskStore,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
#[cfg(not(feature = "profile-console"))]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Settings & logging ─────────────────────────────────────
    let settings = Settings::load().context("failed to load settings")?;
    init_tracing(&settings);

    // ── Store ──────────────────────────────────────────────────
    let store: Arc<dyn TaskStore> = match settings.storage {
        StorageKind::Postgres => Arc::new(
            PostgresStore::connect_lazy(&settings).context("invalid database configuration")?,
        ),
        StorageKind::Memory => {
            tracing::warn!("using in-memory storage, tasks will not survive a restart");
            Arc::new(MemoryStore::new(settings.key_type))
        }
    };

    // A broken database should not keep the server down; data calls will
    // report the problem with a hint.
    match store.ensure_schema().await {
        Ok(()) => tracing::info!(storage = ?settings.storage, key_type = ?settings.key_type, "schema ready"),
        Err(e) => tracing::error!(error = %e, hint = e.hint(), "schema initialization failed"),
    }

    // ── Router ─────────────────────────────────────────────────
    let app_state = AppState::shared(store, settings.key_type);
    let mut app = map_routes(app_state);
    if let Some(dir) = &settings.static_dir {
        app = with_static_fallback(app, dir);
    }
    let app = app.layer(cors_layer(&settings)?).layer(TraceLayer::new_for_http());

    // ── Start ──────────────────────────────────────────────────
    let address = settings.socket_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("cannot bind {address}"))?;
    tracing::info!("Server running on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

#[cfg(not(feature = "profile-console"))]
fn init_tracing(settings: &Settings) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(feature = "profile-console")]
fn init_tracing(_settings: &Settings) {
    console_subscriber::init();
}

fn cors_layer(settings: &Settings) -> anyhow::Result<CorsLayer> {
    let origin = if settings.allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins = settings
            .allowed_origins
            .iter()
            .map(|origin| HeaderValue::from_str(origin).with_context(|| format!("invalid origin {origin}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };
    Ok(CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
