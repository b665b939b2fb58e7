//! Full-router tests: requests travel through the real middleware stack, so
//! these verify the authorization-mode split itself — anonymous reads pass,
//! anonymous writes are rejected before any handler runs.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use blog_platform::{
    AppState, create_router,
    config::AppConfig,
    identity::MockIdentityService,
    models::{Comment, Post, PostSummary, UpdatePostRequest, User},
    repository::Repository,
};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_USER_ID: Uuid = Uuid::from_u128(42);

// Slim mock: canned reads, permissive writes, one known user for the local
// auth bypass.
#[derive(Default)]
struct MockApiRepo {
    posts: Vec<Post>,
}

#[async_trait]
impl Repository for MockApiRepo {
    async fn list_posts(&self) -> Vec<Post> {
        self.posts.clone()
    }
    async fn get_post(&self, id: Uuid) -> Option<Post> {
        self.posts.iter().find(|p| p.id == id).cloned()
    }
    async fn create_post(
        &self,
        author_id: Uuid,
        author: &str,
        title: &str,
        content: &str,
    ) -> Option<Post> {
        Some(Post {
            id: Uuid::new_v4(),
            author_id,
            author: author.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: None,
            updated_at: None,
        })
    }
    async fn update_post(
        &self,
        _id: Uuid,
        _author_id: Uuid,
        _req: UpdatePostRequest,
    ) -> Option<Post> {
        None
    }
    async fn delete_post(&self, _id: Uuid, _author_id: Uuid) -> bool {
        false
    }
    async fn list_comments(&self, _post_id: Uuid) -> Vec<Comment> {
        vec![]
    }
    async fn add_comment(
        &self,
        _post_id: Uuid,
        _author_id: Uuid,
        _author: &str,
        _content: &str,
    ) -> Option<Comment> {
        None
    }
    async fn update_comment(
        &self,
        _id: Uuid,
        _author_id: Uuid,
        _content: &str,
    ) -> Option<Comment> {
        None
    }
    async fn delete_comment(&self, _id: Uuid, _author_id: Uuid) -> bool {
        false
    }
    async fn get_user(&self, id: Uuid) -> Option<User> {
        (id == TEST_USER_ID).then(|| User {
            id,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        })
    }
    async fn create_user(&self, user: User) -> Option<User> {
        Some(user)
    }
}

fn test_app(posts: Vec<Post>) -> axum::Router {
    // AppConfig::default() is Env::Local, which enables the x-user-id bypass
    // used below to simulate an authenticated session.
    let state = AppState {
        repo: Arc::new(MockApiRepo { posts }),
        identity: Arc::new(MockIdentityService::new()),
        config: AppConfig::default(),
    };
    create_router(state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app(vec![]);
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_anonymous_visitor_sees_post_list() {
    let post = Post {
        id: Uuid::new_v4(),
        author_id: TEST_USER_ID,
        author: "alice".to_string(),
        title: "Public reading".to_string(),
        content: "everyone can see this".to_string(),
        created_at: None,
        updated_at: None,
    };
    let app = test_app(vec![post.clone()]);

    let response = app
        .oneshot(Request::builder().uri("/posts").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let summaries: Vec<PostSummary> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, post.id);
}

#[tokio::test]
async fn test_anonymous_write_rejected_by_middleware() {
    let app = test_app(vec![]);

    let response = app
        .oneshot(json_request(
            "POST",
            "/posts",
            serde_json::json!({ "title": "Sneaky", "content": "no session" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_delete_rejected_by_middleware() {
    let app = test_app(vec![]);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/posts/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_session_resolution_is_unauthorized() {
    let app = test_app(vec![]);

    let response = app
        .oneshot(Request::builder().uri("/session").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // The NoSession case: clients treat this as anonymous, not as an error.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authenticated_create_through_local_bypass() {
    let app = test_app(vec![]);

    let mut request = json_request(
        "POST",
        "/posts",
        serde_json::json!({ "title": "Hello", "content": "first post" }),
    );
    request.headers_mut().insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&TEST_USER_ID.to_string()).unwrap(),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let post: Post = serde_json::from_slice(&bytes).unwrap();
    // Author fields come from the resolved session, not the payload.
    assert_eq!(post.author_id, TEST_USER_ID);
    assert_eq!(post.author, "alice");
}

#[tokio::test]
async fn test_unknown_post_detail_is_not_found() {
    let app = test_app(vec![]);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/posts/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
