use crate::error::ApiError;
use crate::pages::escape_html;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use moderator::ModerationRunner;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use sweeper_core::{
    analyze, highlight, BlockedWordList, Comment, CommentFilter, ModerationAction, Video,
};
use tracing::info;
use youtube_client::CommentsGateway;

type ApiResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Serialize)]
pub struct VideoView {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub description: String,
    pub date: String,
}

impl From<Video> for VideoView {
    fn from(video: Video) -> Self {
        Self {
            date: format_date(video.published_at, "%Y-%m-%d"),
            id: video.id,
            title: video.title,
            thumbnail: video.thumbnail,
            description: video.description,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentFlags {
    pub non_ascii: bool,
    pub emoji: bool,
    pub non_latin: bool,
    pub special: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub author: String,
    pub text: String,
    pub highlighted_text: String,
    pub date: String,
    pub parent_id: Option<String>,
    pub flags: CommentFlags,
}

fn format_date(date: Option<DateTime<Utc>>, format: &str) -> String {
    date.map(|d| d.format(format).to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Keeps the comments `filter` selects, with their classification attached.
/// `highlightedText` is built from escaped text so it is safe to render as markup.
pub fn comment_views(comments: Vec<Comment>, filter: CommentFilter) -> Vec<CommentView> {
    comments
        .into_iter()
        .filter_map(|comment| {
            let result = analyze(&comment.text);
            if !result.matches(filter) {
                return None;
            }
            Some(CommentView {
                date: format_date(comment.published_at, "%Y-%m-%d %H:%M"),
                id: comment.id,
                author: comment.author_display_name,
                text: comment.text.clone(),
                highlighted_text: highlight(&escape_html(&comment.text)),
                parent_id: comment.parent_id,
                flags: CommentFlags {
                    non_ascii: result.non_ascii,
                    emoji: result.emoji,
                    non_latin: result.non_latin,
                    special: result.special,
                },
            })
        })
        .collect()
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::invalid_input(message))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid_input(rejection.body_text()))
}

pub async fn list_videos(State(state): State<AppState>) -> ApiResult {
    let videos = state
        .youtube
        .list_videos()
        .await
        .map_err(|e| ApiError::new(e).context("Failed to fetch videos"))?;

    let videos: Vec<VideoView> = videos.into_iter().map(VideoView::from).collect();
    Ok(Json(json!({ "success": true, "videos": videos })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsQuery {
    pub video_id: Option<String>,
    pub filter: Option<String>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<CommentsQuery>,
) -> ApiResult {
    let video_id = required(query.video_id, "Video ID is required")?;
    let filter = match query.filter.as_deref() {
        None | Some("") => CommentFilter::default(),
        Some(raw) => raw.parse()?,
    };

    let comments = state
        .youtube
        .list_comments(&video_id)
        .await
        .map_err(|e| ApiError::new(e).context("Failed to fetch comments"))?;

    let comments = comment_views(comments, filter);
    Ok(Json(json!({ "success": true, "comments": comments })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub comment_id: Option<String>,
}

pub async fn delete_comment(
    State(state): State<AppState>,
    body: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult {
    let comment_id = required(json_body(body)?.comment_id, "Comment ID is required")?;

    state
        .youtube
        .delete_comment(&comment_id)
        .await
        .map_err(|e| ApiError::new(e).context("Failed to delete comment"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Comment deleted successfully"
    })))
}

pub async fn report_comment(
    State(state): State<AppState>,
    body: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult {
    let comment_id = required(json_body(body)?.comment_id, "Comment ID is required")?;

    state
        .youtube
        .mark_as_spam(&comment_id)
        .await
        .map_err(|e| ApiError::new(e).context("Failed to report comment"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Comment reported successfully"
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateRequest {
    pub video_id: Option<String>,
    #[serde(default)]
    pub blocked_words: Vec<String>,
    pub delay_ms: Option<u64>,
    pub action: Option<ModerationAction>,
}

pub async fn moderate_comments(
    State(state): State<AppState>,
    body: Result<Json<ModerateRequest>, JsonRejection>,
) -> ApiResult {
    let request = json_body(body)?;
    let video_id = required(request.video_id, "Video ID is required")?;

    let mut words = BlockedWordList::new(&request.blocked_words);
    if words.is_empty() {
        words = BlockedWordList::new(&state.config.default_blocked_words);
    }
    if words.is_empty() {
        return Err(ApiError::invalid_input(
            "At least one blocked word is required",
        ));
    }

    let delay = Duration::from_millis(
        request
            .delay_ms
            .unwrap_or(state.config.moderation_delay_ms),
    );
    info!(
        "Moderating {} with {} blocked words, {:?} between calls",
        video_id,
        words.len(),
        delay
    );

    let report = ModerationRunner::new(&state.youtube)
        .with_delay(delay)
        .with_action(request.action.unwrap_or_default())
        .run(&video_id, &words)
        .await
        .map_err(|e| ApiError::new(e).context("Failed to moderate comments"))?;

    Ok(Json(json!({
        "success": true,
        "message": format!("{} comments hidden", report.hidden),
        "report": report,
    })))
}

pub async fn status(State(state): State<AppState>) -> ApiResult {
    let auth = state.auth.state().await;
    let metrics = state.youtube.get_api_metrics().await;

    Ok(Json(json!({
        "success": true,
        "authenticated": state.auth.is_authenticated().await,
        "auth": auth,
        "metrics": {
            "totalRequests": metrics.total_requests,
            "successfulRequests": metrics.successful_requests,
            "failedRequests": metrics.failed_requests,
            "quotaExceededRequests": metrics.quota_exceeded_requests,
            "averageResponseTimeMs": metrics.average_response_time().as_millis() as u64,
            "lastRequestTime": metrics.last_request_time,
            "errorsByKind": metrics.errors_by_kind,
            "responsesByStatus": metrics.responses_by_status,
        },
    })))
}

pub async fn logout(State(state): State<AppState>) -> ApiResult {
    state.auth.logout().await?;
    Ok(Json(json!({ "success": true, "message": "Logged out" })))
}
