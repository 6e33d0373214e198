pub mod api;
pub mod auth;
pub mod gateway;
pub mod metrics;
pub mod token_store;


pub use api::YouTubeApiClient;
pub use auth::{AuthClient, AuthState};
pub use gateway::CommentsGateway;
pub use metrics::ApiMetrics;
pub use token_store::TokenStore;

use async_trait::async_trait;
use std::sync::Arc;
use sweeper_core::{Comment, CoreError, ModerationStatus, Video};

/// Authenticated access to the channel's videos and comments.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    auth: Arc<AuthClient>,
    api: Arc<YouTubeApiClient>,
}

impl YouTubeClient {
    pub fn new(auth: Arc<AuthClient>) -> Result<Self, CoreError> {
        Ok(Self::with_api(auth, YouTubeApiClient::new()?))
    }

    pub fn with_api(auth: Arc<AuthClient>, api: YouTubeApiClient) -> Self {
        Self {
            auth,
            api: Arc::new(api),
        }
    }

    pub fn auth(&self) -> &Arc<AuthClient> {
        &self.auth
    }

    pub async fn get_api_metrics(&self) -> ApiMetrics {
        self.api.get_metrics().await
    }
}

fn require_id(value: &str, what: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::invalid_input(format!("{} is required", what)))
    } else {
        Ok(())
    }
}

#[async_trait]
impl CommentsGateway for YouTubeClient {
    async fn list_videos(&self) -> Result<Vec<Video>, CoreError> {
        let token = self.auth.access_token().await?;
        self.api.list_my_videos(&token).await
    }

    async fn list_comments(&self, video_id: &str) -> Result<Vec<Comment>, CoreError> {
        require_id(video_id, "Video ID")?;
        let token = self.auth.access_token().await?;
        self.api.list_comments(&token, video_id).await
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<(), CoreError> {
        require_id(comment_id, "Comment ID")?;
        let token = self.auth.access_token().await?;
        self.api.delete_comment(&token, comment_id).await
    }

    async fn mark_as_spam(&self, comment_id: &str) -> Result<(), CoreError> {
        require_id(comment_id, "Comment ID")?;
        let token = self.auth.access_token().await?;
        self.api.mark_comment_as_spam(&token, comment_id).await
    }

    async fn set_moderation_status(
        &self,
        comment_id: &str,
        status: ModerationStatus,
        ban_author: bool,
    ) -> Result<(), CoreError> {
        require_id(comment_id, "Comment ID")?;
        let token = self.auth.access_token().await?;
        self.api
            .set_moderation_status(&token, comment_id, status, ban_author)
            .await
    }
}
