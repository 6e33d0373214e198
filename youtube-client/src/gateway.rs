use async_trait::async_trait;
use sweeper_core::{Comment, CoreError, ModerationAction, ModerationStatus, Video};

/// Operations the moderation logic needs from the video platform.
#[async_trait]
pub trait CommentsGateway: Send + Sync {
    async fn list_videos(&self) -> Result<Vec<Video>, CoreError>;

    /// Top-level comments and their replies, flattened in thread order.
    async fn list_comments(&self, video_id: &str) -> Result<Vec<Comment>, CoreError>;

    async fn delete_comment(&self, comment_id: &str) -> Result<(), CoreError>;

    async fn mark_as_spam(&self, comment_id: &str) -> Result<(), CoreError>;

    async fn set_moderation_status(
        &self,
        comment_id: &str,
        status: ModerationStatus,
        ban_author: bool,
    ) -> Result<(), CoreError>;

    async fn apply(&self, comment_id: &str, action: ModerationAction) -> Result<(), CoreError> {
        match action {
            ModerationAction::Reject { ban_author } => {
                self.set_moderation_status(comment_id, ModerationStatus::Rejected, ban_author)
                    .await
            }
            ModerationAction::Delete => self.delete_comment(comment_id).await,
            ModerationAction::MarkAsSpam => self.mark_as_spam(comment_id).await,
        }
    }
}
