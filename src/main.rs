use study_log::{router, AppState, Config, KvStore, SupabaseAuth};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let store = KvStore::open(&config.data_path).await?;
    info!(path = %config.data_path.display(), "data file ready");

    let auth = SupabaseAuth::new(
        config.supabase_url.clone(),
        config.service_role_key.clone(),
        config.anon_key.clone(),
    );
    let app = router(AppState::new(store, auth));

    info!("listening on http://{}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
