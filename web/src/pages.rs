use crate::error::status_for;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use sweeper_core::ErrorExt;
use tracing::{info, warn};
use youtube_client::{AuthState, CommentsGateway};

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem}\
.unicode-highlight{background:#ffe08a}.video{margin:.5rem 0}.comment{border-bottom:1px solid #ddd;padding:.5rem 0}";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>{}</style></head><body>{}</body></html>",
        escape_html(title),
        STYLE,
        body
    ))
}

/// `message` is trusted markup.
fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        "<h1>Something went wrong</h1><p>{}</p><p><a href=\"/\">Back to start</a></p>",
        message
    );
    (status, layout("Error", &body)).into_response()
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let status = match state.auth.state().await {
        AuthState::Authenticated { .. } => {
            "<p>Signed in. <a href=\"/manage\">Manage comments</a></p>\
             <form method=\"post\" action=\"/auth/logout\"><button>Sign out</button></form>"
        }
        AuthState::Exchanging => "<p>Sign-in in progress…</p>",
        AuthState::Unauthenticated => "<p>Not signed in.</p>",
    };

    let body = format!(
        "<h1>Comment Sweeper</h1>\
         <p>Find and moderate YouTube comments that contain emoji, non-Latin scripts, \
         special symbols or blocked words.</p>{}\
         <p><a class=\"button\" href=\"/auth\">Sign in with Google</a></p>",
        status
    );
    layout("Comment Sweeper", &body)
}

pub async fn auth(State(state): State<AppState>) -> Redirect {
    let url = state
        .auth
        .build_authorization_url(&state.config.scopes);
    info!("Redirecting to authorization URL: {}", url);
    Redirect::temporary(url.as_str())
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

pub async fn auth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error {
        warn!("Authorization denied by provider: {}", error);
        return error_page(
            StatusCode::BAD_REQUEST,
            &format!("Authorization was not granted: {}", escape_html(&error)),
        );
    }

    let Some(code) = query.code.filter(|c| !c.trim().is_empty()) else {
        return error_page(
            StatusCode::BAD_REQUEST,
            "Invalid or missing authorization code.",
        );
    };

    match state.auth.exchange_code(&code).await {
        Ok(_) => layout(
            "Signed in",
            "<h1>Authentication successful</h1>\
             <p>Your token has been saved. <a href=\"/manage\">Manage comments</a></p>",
        )
        .into_response(),
        Err(e) => {
            e.log_error();
            error_page(status_for(&e), "Failed to authenticate.")
        }
    }
}

pub async fn manage(State(state): State<AppState>) -> Response {
    if !state.auth.is_authenticated().await {
        return error_page(
            StatusCode::UNAUTHORIZED,
            "Authentication required. Please <a href=\"/auth\">login</a> first.",
        );
    }

    let videos = match state.youtube.list_videos().await {
        Ok(videos) => videos,
        Err(e) => {
            e.log_error();
            return error_page(status_for(&e), "Error loading videos. Please try again.");
        }
    };

    let mut list = String::new();
    for video in &videos {
        list.push_str(&format!(
            "<div class=\"video\"><label><input type=\"radio\" name=\"video\" value=\"{}\"{}> \
             <img src=\"{}\" width=\"120\" alt=\"\"> {}</label></div>",
            escape_html(&video.id),
            if list.is_empty() { " checked" } else { "" },
            escape_html(&video.thumbnail),
            escape_html(&video.title)
        ));
    }
    if videos.is_empty() {
        list.push_str("<p>No videos found on this channel.</p>");
    }

    let body = format!(
        "<h1>Manage comments</h1>{}\
         <p><select id=\"filter\"><option value=\"all\">Any non-ASCII</option>\
         <option value=\"emoji\">Emoji</option><option value=\"nonLatin\">Non-Latin script</option>\
         <option value=\"special\">Special symbols</option></select> \
         <button onclick=\"loadComments()\">Load comments</button></p>\
         <div id=\"comments\"></div>\
         <script>{}</script>",
        list, MANAGE_SCRIPT
    );
    layout("Manage comments", &body).into_response()
}

const MANAGE_SCRIPT: &str = r#"
function selectedVideo() {
  const checked = document.querySelector('input[name=video]:checked');
  return checked ? checked.value : '';
}
async function loadComments() {
  const filter = document.getElementById('filter').value;
  const res = await fetch('/api/comments?videoId=' + encodeURIComponent(selectedVideo()) + '&filter=' + filter);
  const data = await res.json();
  const box = document.getElementById('comments');
  if (!data.success) { box.textContent = data.message; return; }
  box.innerHTML = '';
  for (const c of data.comments) {
    const row = document.createElement('div');
    row.className = 'comment';
    row.innerHTML = '<b></b> <small></small><p>' + c.highlightedText + '</p>';
    row.querySelector('b').textContent = c.author;
    row.querySelector('small').textContent = c.date;
    for (const [label, path] of [['Delete', 'delete'], ['Report spam', 'report']]) {
      const btn = document.createElement('button');
      btn.textContent = label;
      btn.onclick = async () => {
        const r = await fetch('/api/comments/' + path, {
          method: 'POST', headers: {'Content-Type': 'application/json'},
          body: JSON.stringify({commentId: c.id})
        });
        const out = await r.json();
        if (out.success) row.remove(); else alert(out.message);
      };
      row.appendChild(btn);
    }
    box.appendChild(row);
  }
}
"#;
