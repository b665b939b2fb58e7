use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Authenticated Router Module
///
/// Defines the routes accessible only with a resolved session. Every handler
/// in this module relies on the `AuthUser` extractor middleware layered above
/// it, which guarantees a validated user id and display name for author
/// stamping and Owner-Only checks.
///
/// Any authenticated principal may create; update and delete are additionally
/// ownership-checked in the repository queries, which is the authoritative
/// enforcement point.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /session
        // Resolves the current session into a profile. 401 means "no session"
        // and is treated by clients as anonymous, not as an error.
        .route("/session", get(handlers::get_session))
        // POST /auth/logout
        // Best-effort provider-side revocation of the current session.
        .route("/auth/logout", post(handlers::logout))
        // --- Posts ---
        // POST /posts
        // Publishes a new post; author fields come from the session.
        .route("/posts", post(handlers::create_post))
        // PUT/DELETE /posts/{id}
        // Modify or remove the caller's own post. Owner-Only, enforced in the
        // repository. Deleting a post does not remove its comments.
        .route(
            "/posts/{id}",
            put(handlers::update_post).delete(handlers::delete_post),
        )
        // --- Comments ---
        // POST /posts/{id}/comments
        // Posts a comment; the parent post must exist at creation time.
        .route("/posts/{id}/comments", post(handlers::add_comment))
        // PUT/DELETE /comments/{id}
        // Edit or remove the caller's own comment. Owner-Only.
        .route(
            "/comments/{id}",
            put(handlers::update_comment).delete(handlers::delete_comment),
        )
}
