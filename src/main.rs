use std::sync::Arc;
use sweeper_core::{AppConfig, ClientConfig, CoreError, ErrorReporter};
use tracing_subscriber::EnvFilter;
use web::AppState;
use youtube_client::{AuthClient, TokenStore, YouTubeClient};

const DEFAULT_LOG_FILTER: &str = "comment_sweeper=info,youtube_client=info,moderator=info,web=info";

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Comment Sweeper");

    let reporter = ErrorReporter::new();
    run().await.map_err(|e| {
        reporter.report_error(&e);
        e
    })
}

async fn run() -> Result<(), CoreError> {
    let config = AppConfig::load()?;
    let client_config = ClientConfig::from_credentials_file(&config.credentials_path)?;

    let auth = AuthClient::new(client_config, TokenStore::new(&config.token_path))?;
    if !auth.load_persisted().await? {
        tracing::info!("Open http://localhost:{}/auth to sign in", config.port);
    }

    let youtube = YouTubeClient::new(Arc::new(auth))?;
    let port = config.port;
    web::serve(AppState::new(youtube, config), port).await
}
