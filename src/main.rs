use recipe_api_rust::{config, database::manager::DatabaseManager, routes};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, MEDIA_ROOT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Recipe API in {:?} mode", config.environment);

    // Run pending migrations when the database is reachable. A missing
    // database is not fatal at startup; requests that need it will fail
    // with 503 until it comes back.
    match DatabaseManager::pool().await {
        Ok(pool) => {
            if let Err(e) = sqlx::migrate!().run(&pool).await {
                tracing::error!("Migration failed: {}", e);
            }
        }
        Err(e) => tracing::warn!("Database unavailable at startup: {}", e),
    }

    let app = routes::app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("RECIPE_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Recipe API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
