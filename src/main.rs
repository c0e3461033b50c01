mod config;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env();
    let state = state::AppState::new(&config);

    if config.mock.enabled {
        let _mock = services::mock::spawn_mock_task(state.clone(), config.mock);
    }

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "dmap listening");
    axum::serve(listener, app).await
}
