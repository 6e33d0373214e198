pub mod api;
pub mod error;
pub mod pages;


use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use sweeper_core::{AppConfig, CoreError};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use youtube_client::{AuthClient, YouTubeClient};

pub use error::ApiError;

/// Shared by every handler. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    pub auth: Arc<AuthClient>,
    pub youtube: YouTubeClient,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(youtube: YouTubeClient, config: AppConfig) -> Self {
        Self {
            auth: youtube.auth().clone(),
            youtube,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/auth", get(pages::auth))
        .route("/auth/callback", get(pages::auth_callback))
        .route("/auth/logout", post(api::logout))
        .route("/manage", get(pages::manage))
        .route("/api/videos", get(api::list_videos))
        .route("/api/comments", get(api::list_comments))
        .route("/api/comments/delete", post(api::delete_comment))
        .route("/api/comments/report", post(api::report_comment))
        .route("/api/comments/moderate", post(api::moderate_comments))
        .route("/api/status", get(api::status))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, port: u16) -> Result<(), CoreError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server running at http://localhost:{}/", port);
    info!("Open http://localhost:{}/auth to start authentication", port);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
