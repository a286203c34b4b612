use armature_api::app;
use armature_api::config::AppConfig;

#[tokio::main]
async fn main() {
    let guard = armature_observability::init();

    let config = AppConfig::from_env();

    let (router, registry) = match app::build_app(&config) {
        Ok(built) => built,
        Err(e) => {
            tracing::error!("startup failed: {e}");
            drop(guard);
            std::process::exit(1);
        }
    };

    if let Err(e) = app::seed_storage(&registry) {
        tracing::error!("seeding failed: {e}");
        drop(guard);
        std::process::exit(1);
    }

    tracing::info!("Starting Up");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind listener");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    tracing::info!("Shutting Down");

    // Dropping the guard flushes and closes the non-blocking log writer.
    drop(guard);
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
