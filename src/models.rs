//! Data models for profiles, posts, comments, and aggregated fetch results.

use serde::{Deserialize, Serialize};

/// A user's profile as returned by the profile leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier, echoed from the request
    pub id: u32,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Handle shown next to comments
    pub username: String,
}

/// A single post authored by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: u32,
    pub user_id: u32,
    pub title: String,
    pub content: String,
}

/// A comment left on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_id: u32,
    pub post_id: u32,
    pub username: String,
    pub comment: String,
}

/// A post together with the outcome of fetching its comments.
///
/// A failed comment fetch leaves `comments` empty and records the message in
/// `comment_error`; the post itself is always kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPost {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
    pub comment_error: Option<String>,
}

impl EnrichedPost {
    /// Post whose comments arrived.
    pub fn with_comments(post: Post, comments: Vec<Comment>) -> Self {
        Self {
            post,
            comments,
            comment_error: None,
        }
    }

    /// Post whose comment fetch failed with `message`.
    pub fn with_error(post: Post, message: String) -> Self {
        Self {
            post,
            comments: Vec::new(),
            comment_error: Some(message),
        }
    }
}

/// Which aggregation strategy produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    Sequential,
    #[default]
    Parallel,
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::Sequential => write!(f, "sequential"),
            FetchMode::Parallel => write!(f, "parallel"),
        }
    }
}

/// Everything one strategy run gathered.
///
/// `errors` is purely diagnostic: it lists handled failures and is never
/// consulted for control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchReport {
    pub mode: FetchMode,
    pub time_ms: u64,
    pub user: Option<UserProfile>,
    pub posts: Vec<EnrichedPost>,
    pub errors: Vec<String>,
}

impl FetchReport {
    /// Empty report for the given mode.
    pub fn new(mode: FetchMode) -> Self {
        Self {
            mode,
            time_ms: 0,
            user: None,
            posts: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record a failed comment fetch for `post`.
    pub fn push_comment_failure(&mut self, post: Post, message: String) {
        self.errors.push(format!("Post {}: {}", post.post_id, message));
        self.posts.push(EnrichedPost::with_error(post, message));
    }
}

/// Output of the combined fetch: a user and their posts with comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContent {
    pub user: UserProfile,
    pub posts: Vec<EnrichedPost>,
}
