use std::time::Duration;
use sweeper_core::{BlockedWordList, CoreError, ModerationAction, ModerationReport};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use youtube_client::CommentsGateway;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Applies a moderation action to every comment on a video that contains a
/// blocked word, pausing between calls.
pub struct ModerationRunner<'a, G: CommentsGateway + ?Sized> {
    gateway: &'a G,
    delay: Duration,
    action: ModerationAction,
}

impl<'a, G: CommentsGateway + ?Sized> ModerationRunner<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self {
            gateway,
            delay: DEFAULT_DELAY,
            action: ModerationAction::default(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_action(mut self, action: ModerationAction) -> Self {
        self.action = action;
        self
    }

    /// A failure to list comments aborts the run. Failures on single
    /// comments are counted and skipped.
    pub async fn run(
        &self,
        video_id: &str,
        blocked_words: &BlockedWordList,
    ) -> Result<ModerationReport, CoreError> {
        if video_id.trim().is_empty() {
            return Err(CoreError::invalid_input("Video ID is required"));
        }

        let comments = self.gateway.list_comments(video_id).await?;
        let mut report = ModerationReport::default();

        if blocked_words.is_empty() {
            debug!("No blocked words for video {}, nothing to do", video_id);
        }

        for comment in &comments {
            report.processed += 1;

            let Some(word) = blocked_words.first_match(&comment.text) else {
                continue;
            };

            info!(
                "Hiding comment {} on {} (matched \"{}\")",
                comment.id, video_id, word
            );
            match self.gateway.apply(&comment.id, self.action).await {
                Ok(()) => report.hidden += 1,
                Err(e) => {
                    warn!("Skipping comment {} ({}): {}", comment.id, e.detailed_code(), e);
                    report.failed += 1;
                }
            }

            sleep(self.delay).await;
        }

        info!(
            "Moderation of {} finished: {} processed, {} hidden, {} failed",
            video_id, report.processed, report.hidden, report.failed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use sweeper_core::{Comment, ModerationStatus, Video, YouTubeApiError};

    #[derive(Default)]
    struct FakeGateway {
        comments: Vec<Comment>,
        fail_listing: bool,
        failing_ids: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    fn comment(id: &str, text: &str) -> Comment {
        Comment {
            id: id.to_string(),
            author_display_name: "viewer".to_string(),
            text: text.to_string(),
            published_at: None,
            parent_id: None,
        }
    }

    impl FakeGateway {
        fn with_comments(comments: Vec<Comment>) -> Self {
            Self {
                comments,
                ..Default::default()
            }
        }

        fn record(&self, call: String) -> Result<(), CoreError> {
            let failing = self.failing_ids.iter().any(|id| call.ends_with(id.as_str()));
            self.calls.lock().unwrap().push(call);
            if failing {
                Err(YouTubeApiError::ServerError { status_code: 500 }.into())
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommentsGateway for FakeGateway {
        async fn list_videos(&self) -> Result<Vec<Video>, CoreError> {
            Ok(Vec::new())
        }

        async fn list_comments(&self, _video_id: &str) -> Result<Vec<Comment>, CoreError> {
            self.calls.lock().unwrap().push("list".to_string());
            if self.fail_listing {
                Err(YouTubeApiError::QuotaExceeded.into())
            } else {
                Ok(self.comments.clone())
            }
        }

        async fn delete_comment(&self, comment_id: &str) -> Result<(), CoreError> {
            self.record(format!("delete:{}", comment_id))
        }

        async fn mark_as_spam(&self, comment_id: &str) -> Result<(), CoreError> {
            self.record(format!("spam:{}", comment_id))
        }

        async fn set_moderation_status(
            &self,
            comment_id: &str,
            status: ModerationStatus,
            ban_author: bool,
        ) -> Result<(), CoreError> {
            self.record(format!(
                "{}:{}:{}",
                status.as_str(),
                ban_author,
                comment_id
            ))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_only_matching_comments() {
        let gateway = FakeGateway::with_comments(vec![
            comment("c1", "buy cheap followers now"),
            comment("c2", "great video!"),
        ]);
        let words = BlockedWordList::new(["cheap"]);

        let report = ModerationRunner::new(&gateway)
            .run("vid1", &words)
            .await
            .unwrap();

        assert_eq!(gateway.calls(), vec!["list", "rejected:false:c1"]);
        assert_eq!(
            report,
            ModerationReport {
                processed: 2,
                hidden: 1,
                failed: 0
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_match_is_case_insensitive() {
        let gateway = FakeGateway::with_comments(vec![comment("c1", "FREE Money inside")]);
        let words = BlockedWordList::new(["  free money "]);

        let report = ModerationRunner::new(&gateway)
            .with_action(ModerationAction::Delete)
            .run("vid1", &words)
            .await
            .unwrap();

        assert_eq!(report.hidden, 1);
        assert_eq!(gateway.calls(), vec!["list", "delete:c1"]);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_run() {
        let gateway = FakeGateway {
            fail_listing: true,
            ..Default::default()
        };
        let words = BlockedWordList::new(["cheap"]);

        let result = ModerationRunner::new(&gateway).run("vid1", &words).await;
        assert!(matches!(
            result,
            Err(CoreError::YouTubeApi(YouTubeApiError::QuotaExceeded))
        ));
        assert_eq!(gateway.calls(), vec!["list"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_comment_is_skipped() {
        let mut gateway = FakeGateway::with_comments(vec![
            comment("c1", "cheap"),
            comment("c2", "cheap again"),
            comment("c3", "fine"),
        ]);
        gateway.failing_ids.insert("c1".to_string());
        let words = BlockedWordList::new(["cheap"]);

        let report = ModerationRunner::new(&gateway)
            .run("vid1", &words)
            .await
            .unwrap();

        assert_eq!(
            gateway.calls(),
            vec!["list", "rejected:false:c1", "rejected:false:c2"]
        );
        assert_eq!(report.processed, 3);
        assert_eq!(report.hidden, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.matched(), 2);
    }

    #[tokio::test]
    async fn test_empty_video_id_makes_no_calls() {
        let gateway = FakeGateway::default();
        let words = BlockedWordList::new(["cheap"]);

        let result = ModerationRunner::new(&gateway).run(" ", &words).await;
        assert!(matches!(result, Err(CoreError::InvalidInput { .. })));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_after_each_moderation_call() {
        let gateway = FakeGateway::with_comments(vec![
            comment("c1", "cheap"),
            comment("c2", "nice"),
            comment("c3", "cheap"),
        ]);
        let words = BlockedWordList::new(["cheap"]);

        let start = tokio::time::Instant::now();
        ModerationRunner::new(&gateway)
            .with_delay(Duration::from_millis(250))
            .run("vid1", &words)
            .await
            .unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_millis(750));
    }
}
