use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use huddle_server::config::Config;
use huddle_server::routes::create_routes;
use huddle_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env().expect("Invalid configuration");

    let state = AppState::from_config(&config)
        .await
        .expect("Failed to open event store");

    let app: Router = create_routes(state);

    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
