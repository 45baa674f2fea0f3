use todo_service::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging: INFO by default, sqlx capped at WARN, RUST_LOG overrides
    use env_logger::{Builder, Env};
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_env(Env::default())
        .init();

    // Load configuration
    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    todo_service::run_server(config).await
}
