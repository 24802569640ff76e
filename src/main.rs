use medidesk::api::router::hospital_router;
use medidesk::api::types::ApiContext;
use medidesk::{config, db};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    medidesk::init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // Migrations and the first-run admin seed happen here, once. Request
    // handlers open their own short-lived connections.
    let db_path = config::database_path();
    let conn = db::open_database(&db_path)?;
    drop(conn);
    tracing::info!(path = %db_path.display(), "database ready");

    let ctx = ApiContext::new(db_path);
    let app = hospital_router(ctx);

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
