use crate::{
    AppState,
    auth::AuthUser,
    models::{
        self, Comment, CreateCommentRequest, CreatePostRequest, ErrorMessage, Post, PostSummary,
        SessionProfile, SessionTokens, SignInRequest, SignUpRequest, UpdateCommentRequest,
        UpdatePostRequest, User,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
};
use uuid::Uuid;

type ErrorResponse = (StatusCode, Json<ErrorMessage>);

fn error(status: StatusCode, msg: &str) -> ErrorResponse {
    (status, Json(ErrorMessage::new(msg)))
}

// --- Handlers ---

/// list_posts
///
/// [Public Route] The home-page listing: every post, newest first, with the
/// body truncated to an excerpt. A post without a creation timestamp sorts
/// as the epoch and therefore lands at the end of the list.
#[utoipa::path(
    get,
    path = "/posts",
    responses((status = 200, description = "All posts, newest first", body = [PostSummary]))
)]
pub async fn list_posts(State(state): State<AppState>) -> Json<Vec<PostSummary>> {
    let mut posts = state.repo.list_posts().await;
    models::sort_posts_newest_first(&mut posts);
    Json(posts.iter().map(PostSummary::from).collect())
}

/// get_post
///
/// [Public Route] Retrieves a single post's full detail by id.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::Post>, StatusCode> {
    match state.repo.get_post(id).await {
        Some(post) => Ok(Json(post)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// get_comments
///
/// [Public Route] Retrieves all comments for a given post, oldest first so the
/// thread reads top-down. Returns an empty list for an unknown post id; the
/// detail view treats the post fetch and the comment fetch as independent.
#[utoipa::path(
    get,
    path = "/posts/{id}/comments",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses((status = 200, description = "Comments, oldest first", body = [Comment]))
)]
pub async fn get_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Json<Vec<models::Comment>> {
    let mut comments = state.repo.list_comments(post_id).await;
    models::sort_comments_oldest_first(&mut comments);
    Json(comments)
}

/// create_post
///
/// [Authenticated Route] Publishes a new post. Title and content are trimmed
/// and must be non-empty; a validation failure is rejected before any
/// database write is issued. Author name and owner id come from the session,
/// never from the payload.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 422, description = "Empty title or content", body = ErrorMessage)
    )
)]
pub async fn create_post(
    AuthUser { id, username }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<models::Post>), ErrorResponse> {
    let title = payload.title.trim();
    let content = payload.content.trim();

    if title.is_empty() || content.is_empty() {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Title and content cannot be empty",
        ));
    }

    match state.repo.create_post(id, &username, title, content).await {
        Some(post) => Ok((StatusCode::CREATED, Json(post))),
        None => Err(error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create post, please try again",
        )),
    }
}

/// update_post
///
/// [Authenticated Route] Partial update of a post. Provided fields are
/// trimmed and must be non-empty; omitted fields are left untouched.
///
/// *Authorization*: the repository enforces the Owner-Only check; a non-owner
/// affects zero rows and receives 404, indistinguishable from a missing post.
#[utoipa::path(
    put,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 404, description = "Not Found or Not Owner"),
        (status = 422, description = "Empty title or content", body = ErrorMessage)
    )
)]
pub async fn update_post(
    AuthUser { id: author_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<models::Post>, ErrorResponse> {
    let title = payload.title.map(|t| t.trim().to_string());
    let content = payload.content.map(|c| c.trim().to_string());

    if title.as_deref() == Some("") || content.as_deref() == Some("") {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Title and content cannot be empty",
        ));
    }

    let req = UpdatePostRequest { title, content };
    match state.repo.update_post(id, author_id, req).await {
        Some(post) => Ok(Json(post)),
        None => Err(error(StatusCode::NOT_FOUND, "Post not found")),
    }
}

/// delete_post
///
/// [Authenticated Route] Deletes the caller's own post.
///
/// *Authorization*: Owner-Only, enforced in the repository query. Comments on
/// the deleted post are intentionally left in place.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found or Not Owner")
    )
)]
pub async fn delete_post(
    AuthUser { id: author_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    // A false return means the post didn't exist or the caller wasn't the
    // owner; 404 covers both without leaking which.
    if state.repo.delete_post(id, author_id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// add_comment
///
/// [Authenticated Route] Posts a new comment on a post. A whitespace-only
/// body is rejected with no write issued; a missing parent post yields 404.
#[utoipa::path(
    post,
    path = "/posts/{id}/comments",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment Added", body = Comment),
        (status = 404, description = "Post Not Found"),
        (status = 422, description = "Empty comment", body = ErrorMessage)
    )
)]
pub async fn add_comment(
    AuthUser { id, username }: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<models::Comment>), ErrorResponse> {
    let content = payload.content.trim();

    if content.is_empty() {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Comment cannot be empty",
        ));
    }

    match state
        .repo
        .add_comment(post_id, id, &username, content)
        .await
    {
        Some(comment) => Ok((StatusCode::CREATED, Json(comment))),
        None => Err(error(StatusCode::NOT_FOUND, "Post not found")),
    }
}

/// update_comment
///
/// [Authenticated Route] Edits the caller's own comment. Present in the data
/// API even though the standard page flows never call it.
#[utoipa::path(
    put,
    path = "/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Updated", body = Comment),
        (status = 404, description = "Not Found or Not Owner"),
        (status = 422, description = "Empty comment", body = ErrorMessage)
    )
)]
pub async fn update_comment(
    AuthUser { id: author_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<models::Comment>, ErrorResponse> {
    let content = payload.content.trim();

    if content.is_empty() {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Comment cannot be empty",
        ));
    }

    match state.repo.update_comment(id, author_id, content).await {
        Some(comment) => Ok(Json(comment)),
        None => Err(error(StatusCode::NOT_FOUND, "Comment not found")),
    }
}

/// delete_comment
///
/// [Authenticated Route] Deletes the caller's own comment.
///
/// *Authorization*: Owner-Only, enforced against `author_id` in the
/// repository query.
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found or Not Owner")
    )
)]
pub async fn delete_comment(
    AuthUser { id: author_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if state.repo.delete_comment(id, author_id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// get_session
///
/// [Authenticated Route] Resolves the current session into a profile. An
/// unauthenticated call is rejected with 401 by the extractor; the navigation
/// shell treats that as "anonymous" rather than an error.
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current session profile", body = SessionProfile),
        (status = 401, description = "No session")
    )
)]
pub async fn get_session(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SessionProfile>, StatusCode> {
    // The extractor has already verified the profile exists; re-fetch for the
    // email field the AuthUser does not carry.
    let user = state
        .repo
        .get_user(id)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    Ok(Json(SessionProfile {
        id: user.id,
        username: user.username,
        email: user.email,
    }))
}

/// register
///
/// [Public Route] Handles initial user registration via the external identity
/// provider.
///
/// *Flow*: Calls the provider's signup endpoint, retrieves the issued user id,
/// and creates the corresponding record in the local `profiles` table. This
/// keeps primary keys synchronized between the provider and the local schema.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Registered", body = User),
        (status = 400, description = "Rejected by identity provider", body = ErrorMessage),
        (status = 422, description = "Missing fields", body = ErrorMessage)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<Json<User>, ErrorResponse> {
    let email = payload.email.trim();
    let username = payload.username.trim();

    if email.is_empty() || username.is_empty() || payload.password.is_empty() {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Email, username and password are required",
        ));
    }

    // Step 1: Delegate credential creation to the identity provider.
    let user_id = state
        .identity
        .sign_up(email, &payload.password)
        .await
        .map_err(|e| {
            tracing::warn!("signup rejected: {}", e);
            error(StatusCode::BAD_REQUEST, "Registration failed")
        })?;

    // Step 2: Mirror the profile locally under the provider-issued id.
    let new_user = User {
        id: user_id,
        username: username.to_string(),
        email: email.to_string(),
    };

    match state.repo.create_user(new_user).await {
        Some(user) => Ok(Json(user)),
        None => Err(error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create profile",
        )),
    }
}

/// login
///
/// [Public Route] Exchanges credentials for a provider-issued token pair. The
/// access token is the bearer credential for all authenticated routes.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionTokens),
        (status = 401, description = "Invalid credentials", body = ErrorMessage)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SessionTokens>, ErrorResponse> {
    match state.identity.sign_in(&payload.email, &payload.password).await {
        Ok(tokens) => Ok(Json(tokens)),
        Err(e) => {
            tracing::warn!("sign-in rejected: {}", e);
            Err(error(StatusCode::UNAUTHORIZED, "Invalid credentials"))
        }
    }
}

/// logout
///
/// [Authenticated Route] Best-effort revocation of the current session at the
/// identity provider. The client discards its token either way, so a
/// provider-side failure is logged but still answered with 204.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Signed out"))
)]
pub async fn logout(
    AuthUser { .. }: AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> StatusCode {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if let Some(token) = token {
        if let Err(e) = state.identity.sign_out(token).await {
            tracing::warn!("sign-out failed: {}", e);
        }
    }

    StatusCode::NO_CONTENT
}
