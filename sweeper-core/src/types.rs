use crate::error::CoreError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OAuth2 credential as persisted in the token file.
///
/// Field names follow the provider's token JSON so a file written by other
/// Google client libraries loads unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(
        rename = "expiry_date",
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub expiry: Option<DateTime<Utc>>,
    /// Space separated, as returned by the token endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Credential {
    pub fn is_expired(&self) -> bool {
        self.expires_within(Duration::zero())
    }

    /// True when the access token expires within `window` from now.
    /// A credential without an expiry never counts as expiring.
    pub fn expires_within(&self, window: Duration) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= Utc::now() + window,
            None => false,
        }
    }

    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_display_name: String,
    pub text: String,
    pub published_at: Option<DateTime<Utc>>,
    pub parent_id: Option<String>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentFilter {
    #[default]
    All,
    Emoji,
    NonLatin,
    Special,
}

impl CommentFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentFilter::All => "all",
            CommentFilter::Emoji => "emoji",
            CommentFilter::NonLatin => "nonLatin",
            CommentFilter::Special => "special",
        }
    }
}

impl FromStr for CommentFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(CommentFilter::All),
            "emoji" => Ok(CommentFilter::Emoji),
            "nonLatin" => Ok(CommentFilter::NonLatin),
            "special" => Ok(CommentFilter::Special),
            other => Err(CoreError::invalid_input(format!(
                "Unknown comment filter '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for CommentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation states accepted by `comments.setModerationStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModerationStatus {
    Published,
    HeldForReview,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Published => "published",
            ModerationStatus::HeldForReview => "heldForReview",
            ModerationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ModerationAction {
    Reject {
        #[serde(default, rename = "banAuthor")]
        ban_author: bool,
    },
    Delete,
    MarkAsSpam,
}

impl Default for ModerationAction {
    fn default() -> Self {
        ModerationAction::Reject { ban_author: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModerationReport {
    /// Comments examined.
    pub processed: usize,
    /// Moderation calls that succeeded.
    pub hidden: usize,
    /// Moderation calls that failed and were skipped.
    pub failed: usize,
}

impl ModerationReport {
    pub fn matched(&self) -> usize {
        self.hidden + self.failed
    }
}

/// Case-insensitive substrings that trigger automatic moderation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockedWordList {
    words: Vec<String>,
}

impl BlockedWordList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// First blocked word contained in `text`, in list order.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.words
            .iter()
            .find(|word| lowered.contains(word.as_str()))
            .map(String::as_str)
    }

    pub fn matches(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_round_trips_provider_format() {
        let json = r#"{
            "access_token": "ya29.token",
            "refresh_token": "1//refresh",
            "scope": "https://www.googleapis.com/auth/youtube.force-ssl",
            "token_type": "Bearer",
            "id_token": "ignored",
            "expiry_date": 1700000000000
        }"#;

        let credential: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(credential.access_token, "ya29.token");
        assert_eq!(credential.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(credential.expiry.unwrap().timestamp_millis(), 1_700_000_000_000);
        assert_eq!(
            credential.scopes(),
            vec!["https://www.googleapis.com/auth/youtube.force-ssl"]
        );

        let written = serde_json::to_value(&credential).unwrap();
        assert_eq!(written["expiry_date"], 1_700_000_000_000i64);
        assert!(written.get("id_token").is_none());
    }

    #[test]
    fn test_credential_minimal_fields() {
        let credential: Credential =
            serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(credential.token_type, "Bearer");
        assert!(credential.refresh_token.is_none());
        assert!(!credential.is_expired());
        assert!(credential.scopes().is_empty());
    }

    #[test]
    fn test_credential_expiry_window() {
        let credential = Credential {
            access_token: "abc".to_string(),
            refresh_token: None,
            expiry: Some(Utc::now() + Duration::seconds(30)),
            scope: None,
            token_type: "Bearer".to_string(),
        };
        assert!(!credential.is_expired());
        assert!(credential.expires_within(Duration::seconds(60)));
    }

    #[test]
    fn test_comment_filter_parsing() {
        assert_eq!("all".parse::<CommentFilter>().unwrap(), CommentFilter::All);
        assert_eq!(
            "nonLatin".parse::<CommentFilter>().unwrap(),
            CommentFilter::NonLatin
        );
        assert!(matches!(
            "cyrillic".parse::<CommentFilter>(),
            Err(CoreError::InvalidInput { .. })
        ));
        assert_eq!(CommentFilter::Special.to_string(), "special");
    }

    #[test]
    fn test_blocked_word_list_normalizes_input() {
        let list = BlockedWordList::new(["  Cheap ", "", "FOLLOWERS"]);
        assert_eq!(list.words(), &["cheap".to_string(), "followers".to_string()]);
        assert_eq!(list.first_match("Buy CHEAP followers now"), Some("cheap"));
        assert!(!list.matches("great video!"));
    }

    #[test]
    fn test_moderation_action_wire_format() {
        let action: ModerationAction =
            serde_json::from_str(r#"{"type": "reject", "banAuthor": true}"#).unwrap();
        assert_eq!(action, ModerationAction::Reject { ban_author: true });
        assert_eq!(
            ModerationAction::default(),
            ModerationAction::Reject { ban_author: false }
        );
        assert_eq!(ModerationStatus::HeldForReview.as_str(), "heldForReview");
    }
}
