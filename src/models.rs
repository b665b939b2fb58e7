use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The user's canonical identity record stored in the `profiles` table.
/// The `id` equals the id issued by the hosted identity provider, so ownership
/// checks can compare it directly against JWT subjects.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    // Primary Key, equal to the identity provider's user id.
    pub id: Uuid,
    // Display name shown as the author on posts and comments.
    pub username: String,
    pub email: String,
}

/// Post
///
/// A blog post record from the `posts` table. This is the primary data
/// structure for the core business logic.
///
/// Timestamps are optional on purpose: the original data source allowed
/// records without a creation time, and the sort rules below treat a missing
/// timestamp as the epoch.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    // Owner identifier. Stamped server-side from the authenticated session,
    // never taken from a request payload.
    pub author_id: Uuid,
    // Author display name, denormalized at creation time.
    pub author: String,
    pub title: String,
    pub content: String,

    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Comment
///
/// A reply attached to exactly one Post. `post_id` is a soft reference:
/// deleting the parent post leaves its comments in place.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author: String,
    pub content: String,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

// --- List Presentation ---

/// Maximum number of characters of post content shown in the list view.
pub const EXCERPT_LEN: usize = 200;

/// excerpt
///
/// Truncates post content for the list view: at most `EXCERPT_LEN` characters,
/// with an ellipsis appended when the content was cut. Operates on characters,
/// not bytes, so multibyte content is never split mid-codepoint.
pub fn excerpt(content: &str) -> String {
    if content.chars().count() <= EXCERPT_LEN {
        content.to_string()
    } else {
        let mut cut: String = content.chars().take(EXCERPT_LEN).collect();
        cut.push_str("...");
        cut
    }
}

/// PostSummary
///
/// The list-view projection of a Post: full metadata, truncated body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostSummary {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author: String,
    pub title: String,
    pub excerpt: String,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        PostSummary {
            id: post.id,
            author_id: post.author_id,
            author: post.author.clone(),
            title: post.title.clone(),
            excerpt: excerpt(&post.content),
            created_at: post.created_at,
        }
    }
}

// --- Sort Rules ---

// A missing creation timestamp sorts as the epoch: last in the newest-first
// post list, first in the oldest-first comment list.
fn sort_key(created_at: &Option<DateTime<Utc>>) -> i64 {
    created_at.map(|t| t.timestamp_millis()).unwrap_or(0)
}

/// Orders posts newest-first for the list view.
pub fn sort_posts_newest_first(posts: &mut [Post]) {
    posts.sort_by_key(|p| std::cmp::Reverse(sort_key(&p.created_at)));
}

/// Orders comments oldest-first for the detail view.
pub fn sort_comments_oldest_first(comments: &mut [Comment]) {
    comments.sort_by_key(|c| sort_key(&c.created_at));
}

/// --- Request Payloads (Input Schemas) ---

/// CreatePostRequest
///
/// Input payload for publishing a new post (POST /posts). Author fields are
/// deliberately absent; they come from the authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// UpdatePostRequest
///
/// Partial update payload for modifying an existing post (PUT /posts/{id}).
/// Uses `Option<T>` with `skip_serializing_if` so only provided fields are
/// included in the JSON payload; the repository applies COALESCE semantics.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// CreateCommentRequest
///
/// Input payload for posting a new comment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// UpdateCommentRequest
///
/// Input payload for editing a comment (PUT /comments/{id}). Available in the
/// data API even though the standard page flows never call it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// SignUpRequest
///
/// Input payload for the public registration endpoint (POST /auth/register).
/// Note: The password is only passed through to the external identity provider
/// and never persisted or logged internally by this application.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// SignInRequest
///
/// Input payload for the password sign-in endpoint (POST /auth/login).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// --- Session Schemas (Output) ---

/// SessionTokens
///
/// The provider-issued token pair returned from a successful sign-in. The
/// access token is the bearer credential for all authenticated routes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// SessionProfile
///
/// Output schema for the resolved session (GET /session). This is what the
/// navigation shell reads to decide whether to show the signed-in state.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// ErrorMessage
///
/// Inline error body for validation and mutation failures, rendered as-is by
/// the client next to the offending form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ErrorMessage {
    pub error: String,
}

impl ErrorMessage {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}
