use crate::metrics::{ApiMetrics, MetricsCollector, RequestMetrics};
use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sweeper_core::{AuthError, Comment, CoreError, ModerationStatus, Video, YouTubeApiError};
use tracing::{debug, error, info, warn};

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

const USER_AGENT: &str = concat!("comment-sweeper/", env!("CARGO_PKG_VERSION"));
const SEARCH_PAGE_SIZE: &str = "50";
const THREAD_PAGE_SIZE: &str = "100";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelData {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResultData {
    pub id: SearchResultId,
    pub snippet: Option<VideoSnippet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub medium: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentThreadData {
    pub id: String,
    pub snippet: Option<CommentThreadSnippet>,
    pub replies: Option<CommentThreadReplies>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadSnippet {
    pub top_level_comment: Option<CommentData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentThreadReplies {
    #[serde(default = "Vec::new")]
    pub comments: Vec<CommentData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentData {
    pub id: Option<String>,
    pub snippet: Option<CommentSnippet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnippet {
    pub author_display_name: Option<String>,
    pub text_display: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<GoogleErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    reason: Option<String>,
}

impl SearchResultData {
    /// Search hits that are not videos yield `None`.
    pub fn into_video(self) -> Option<Video> {
        let id = self.id.video_id?;
        let snippet = self.snippet.unwrap_or_default();
        Some(Video {
            id,
            title: snippet
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled Video".to_string()),
            description: snippet.description.unwrap_or_default(),
            thumbnail: snippet
                .thumbnails
                .and_then(|t| t.medium)
                .map(|m| m.url)
                .unwrap_or_default(),
            published_at: snippet.published_at,
        })
    }
}

fn comment_from_wire(id: String, snippet: CommentSnippet, parent_id: Option<String>) -> Comment {
    Comment {
        id,
        author_display_name: snippet
            .author_display_name
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Anonymous".to_string()),
        text: snippet.text_display.unwrap_or_default(),
        published_at: snippet.published_at,
        parent_id,
    }
}

/// Flattens threads into one list: each top-level comment followed by its
/// replies, in response order. Entries without a snippet are skipped.
pub fn flatten_comment_threads(threads: Vec<CommentThreadData>) -> Vec<Comment> {
    let mut comments = Vec::new();

    for thread in threads {
        let top = thread.snippet.and_then(|s| s.top_level_comment);
        let top_id = top
            .as_ref()
            .and_then(|c| c.id.clone())
            .unwrap_or_else(|| thread.id.clone());

        if let Some(snippet) = top.and_then(|c| c.snippet) {
            comments.push(comment_from_wire(top_id.clone(), snippet, None));
        }

        if let Some(replies) = thread.replies {
            for reply in replies.comments {
                let (Some(id), Some(snippet)) = (reply.id, reply.snippet) else {
                    continue;
                };
                let parent = snippet.parent_id.clone().unwrap_or_else(|| top_id.clone());
                comments.push(comment_from_wire(id, snippet, Some(parent)));
            }
        }
    }

    comments
}

/// Thin typed wrapper over the YouTube Data API v3.
#[derive(Debug)]
pub struct YouTubeApiClient {
    http_client: Client,
    base_url: String,
    metrics: Arc<MetricsCollector>,
}

impl YouTubeApiClient {
    pub fn new() -> Result<Self, CoreError> {
        Self::with_base_url(YOUTUBE_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            metrics: Arc::new(MetricsCollector::new()),
        })
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let start_time = Instant::now();

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .query(query_params);

        if method == Method::POST {
            request_builder = request_builder.header(CONTENT_LENGTH, 0);
        }

        debug!("YouTube API request: {} {}", method, endpoint);
        let (outcome, status_code) = match request_builder.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    debug!("Request successful: {} {}", status, endpoint);
                    (Ok(response), Some(status.as_u16()))
                } else {
                    error!("Request failed with status: {} for {}", status, endpoint);
                    let err = error_from_response(response, endpoint).await;
                    (Err(err), Some(status.as_u16()))
                }
            }
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    (Err(YouTubeApiError::RequestTimeout.into()), None)
                } else {
                    (Err(CoreError::Network(e)), None)
                }
            }
        };

        self.metrics
            .record_request(RequestMetrics {
                endpoint: endpoint.to_string(),
                method: method.to_string(),
                status_code,
                response_time: start_time.elapsed(),
                success: outcome.is_ok(),
                error_type: outcome.as_ref().err().map(CoreError::detailed_code),
            })
            .await;

        outcome
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, &str)],
    ) -> Result<T, CoreError> {
        let response = self
            .make_request(Method::GET, endpoint, access_token, query_params)
            .await?;

        response.json().await.map_err(|e| {
            error!("Failed to parse {} response: {}", endpoint, e);
            YouTubeApiError::InvalidResponse {
                details: format!("Failed to parse {} response", endpoint),
            }
            .into()
        })
    }

    pub async fn get_my_channel_id(&self, access_token: &str) -> Result<String, CoreError> {
        let channels: ListResponse<ChannelData> = self
            .get_json("/channels", access_token, &[("part", "id"), ("mine", "true")])
            .await?;

        let channel = channels.items.into_iter().next().ok_or_else(|| {
            warn!("No channel found for authenticated user");
            CoreError::NotFound {
                resource: "channel for the authenticated user".to_string(),
            }
        })?;

        debug!("Authenticated channel: {}", channel.id);
        Ok(channel.id)
    }

    /// Latest videos of a channel, newest first.
    pub async fn list_channel_videos(
        &self,
        access_token: &str,
        channel_id: &str,
    ) -> Result<Vec<Video>, CoreError> {
        let results: ListResponse<SearchResultData> = self
            .get_json(
                "/search",
                access_token,
                &[
                    ("part", "snippet"),
                    ("channelId", channel_id),
                    ("maxResults", SEARCH_PAGE_SIZE),
                    ("order", "date"),
                    ("type", "video"),
                ],
            )
            .await?;

        let videos: Vec<Video> = results
            .items
            .into_iter()
            .filter_map(SearchResultData::into_video)
            .collect();

        info!("Retrieved {} videos for channel {}", videos.len(), channel_id);
        Ok(videos)
    }

    pub async fn list_my_videos(&self, access_token: &str) -> Result<Vec<Video>, CoreError> {
        let channel_id = self.get_my_channel_id(access_token).await?;
        self.list_channel_videos(access_token, &channel_id).await
    }

    /// All comment threads of a video, following page tokens to the end.
    pub async fn list_comment_threads(
        &self,
        access_token: &str,
        video_id: &str,
    ) -> Result<Vec<CommentThreadData>, CoreError> {
        let mut threads = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let mut params = vec![
                ("part", "snippet,replies"),
                ("videoId", video_id),
                ("maxResults", THREAD_PAGE_SIZE),
            ];
            if let Some(ref token) = page_token {
                params.push(("pageToken", token.as_str()));
            }

            let page: ListResponse<CommentThreadData> = self
                .get_json("/commentThreads", access_token, &params)
                .await?;
            threads.extend(page.items);

            match page.next_page_token {
                Some(next) if !next.is_empty() => {
                    if !seen_tokens.insert(next.clone()) {
                        warn!("Page token {} repeated for video {}, stopping", next, video_id);
                        break;
                    }
                    page_token = Some(next);
                }
                _ => break,
            }
        }

        info!("Retrieved {} comment threads for video {}", threads.len(), video_id);
        Ok(threads)
    }

    pub async fn list_comments(
        &self,
        access_token: &str,
        video_id: &str,
    ) -> Result<Vec<Comment>, CoreError> {
        let threads = self.list_comment_threads(access_token, video_id).await?;
        Ok(flatten_comment_threads(threads))
    }

    pub async fn delete_comment(
        &self,
        access_token: &str,
        comment_id: &str,
    ) -> Result<(), CoreError> {
        self.make_request(
            Method::DELETE,
            "/comments",
            access_token,
            &[("id", comment_id)],
        )
        .await?;
        info!("Deleted comment {}", comment_id);
        Ok(())
    }

    pub async fn mark_comment_as_spam(
        &self,
        access_token: &str,
        comment_id: &str,
    ) -> Result<(), CoreError> {
        self.make_request(
            Method::POST,
            "/comments/markAsSpam",
            access_token,
            &[("id", comment_id)],
        )
        .await?;
        info!("Marked comment {} as spam", comment_id);
        Ok(())
    }

    /// `ban_author` is only sent with [`ModerationStatus::Rejected`].
    pub async fn set_moderation_status(
        &self,
        access_token: &str,
        comment_id: &str,
        status: ModerationStatus,
        ban_author: bool,
    ) -> Result<(), CoreError> {
        let mut params = vec![("id", comment_id), ("moderationStatus", status.as_str())];
        if status == ModerationStatus::Rejected {
            params.push(("banAuthor", if ban_author { "true" } else { "false" }));
        }

        self.make_request(
            Method::POST,
            "/comments/setModerationStatus",
            access_token,
            &params,
        )
        .await?;
        info!("Set moderation status of {} to {}", comment_id, status.as_str());
        Ok(())
    }

    pub async fn get_metrics(&self) -> ApiMetrics {
        self.metrics.get_metrics().await
    }

    pub async fn reset_metrics(&self) {
        self.metrics.reset_metrics().await;
    }
}

async fn error_from_response(response: Response, endpoint: &str) -> CoreError {
    let status = response.status();
    let body = response
        .json::<GoogleErrorBody>()
        .await
        .ok()
        .map(|b| b.error);
    let reasons: Vec<String> = body
        .as_ref()
        .map(|e| e.errors.iter().filter_map(|d| d.reason.clone()).collect())
        .unwrap_or_default();
    let message = body
        .and_then(|e| e.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    match status {
        StatusCode::UNAUTHORIZED => AuthError::InvalidToken.into(),
        StatusCode::FORBIDDEN
            if reasons
                .iter()
                .any(|r| r == "quotaExceeded" || r == "dailyLimitExceeded") =>
        {
            YouTubeApiError::QuotaExceeded.into()
        }
        StatusCode::FORBIDDEN => YouTubeApiError::Forbidden {
            resource: endpoint.to_string(),
        }
        .into(),
        StatusCode::NOT_FOUND => YouTubeApiError::NotFound {
            resource: endpoint.to_string(),
        }
        .into(),
        s if s.is_server_error() => YouTubeApiError::ServerError {
            status_code: s.as_u16(),
        }
        .into(),
        s => YouTubeApiError::RequestFailed {
            status_code: s.as_u16(),
            message,
        }
        .into(),
    }
}

