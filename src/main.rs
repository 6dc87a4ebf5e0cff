use std::net::SocketAddr;

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;

use spacesocial::config::AppConfig;
use spacesocial::{bootstrap, build_router, db, docs, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();
    init_tracing();

    let config = AppConfig::from_env()?;
    let pool = db::init(&config.database_url).await?;

    // admin and default catalog must exist before the first request is served
    bootstrap::run_startup(&pool, &config.admin).await;

    let openapi = docs::build_openapi(config.port)?;
    let app = build_router(AppState::new(pool, config.jwt.clone())).merge(docs::swagger_routes(openapi)?);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    match &config.tls {
        Some(tls) => {
            let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .with_context(|| format!("failed to load TLS material from {}", tls.cert.display()))?;
            tracing::info!("listening on https://{}", addr);
            axum_server::bind_rustls(addr, rustls)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!("listening on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app.into_make_service()).await?;
        }
    }

    Ok(())
}

fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
