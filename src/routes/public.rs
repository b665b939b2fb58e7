use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in): all read operations over posts and comments, and
/// the identity gateway endpoints that precede having a session.
///
/// Every record is publicly readable by policy, so no visibility filtering
/// applies here; writes of any kind stay on the authenticated router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/register
        // New user creation. Credentials go to the hosted identity provider;
        // the local profile mirror is created on success.
        .route("/auth/register", post(handlers::register))
        // POST /auth/login
        // Password grant against the identity provider; returns the token pair.
        .route("/auth/login", post(handlers::login))
        // GET /posts
        // The home listing: all posts, newest first, bodies truncated.
        .route("/posts", get(handlers::list_posts))
        // GET /posts/{id}
        // Full detail view of a single post.
        .route("/posts/{id}", get(handlers::get_post))
        // GET /posts/{id}/comments
        // Comment thread for a post, oldest first.
        .route("/posts/{id}/comments", get(handlers::get_comments))
}
