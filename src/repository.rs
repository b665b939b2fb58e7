use crate::models::{Comment, Post, UpdatePostRequest, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, letting the
/// handlers interact with the data layer without knowing the concrete
/// implementation (Postgres, Mock, etc.).
///
/// The authorization policy is enforced here, not in the handlers: reads are
/// unrestricted, creates stamp the caller's identity, and every update/delete
/// carries the caller's `author_id` in the WHERE clause so a non-owner
/// affects zero rows. Client-side ownership gating is display convenience
/// only; these queries are the authoritative boundary.
///
/// **Send + Sync + async_trait** make the trait object (`Arc<dyn Repository>`)
/// safely shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Post Retrieval (public reads) ---
    async fn list_posts(&self) -> Vec<Post>;
    async fn get_post(&self, id: Uuid) -> Option<Post>;

    // --- Post Mutations (owner-stamped / owner-checked) ---
    async fn create_post(
        &self,
        author_id: Uuid,
        author: &str,
        title: &str,
        content: &str,
    ) -> Option<Post>;
    // Owner-Only: updates only if `author_id` matches. COALESCE for partial updates.
    async fn update_post(
        &self,
        id: Uuid,
        author_id: Uuid,
        req: UpdatePostRequest,
    ) -> Option<Post>;
    // Owner-Only: deletes only if `author_id` matches. Does NOT cascade to
    // comments; orphans are the documented behavior.
    async fn delete_post(&self, id: Uuid, author_id: Uuid) -> bool;

    // --- Comments ---
    async fn list_comments(&self, post_id: Uuid) -> Vec<Comment>;
    // Inserts only when the parent post exists; returns None otherwise.
    async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        author: &str,
        content: &str,
    ) -> Option<Comment>;
    // Owner-Only.
    async fn update_comment(&self, id: Uuid, author_id: Uuid, content: &str) -> Option<Comment>;
    // Owner-Only.
    async fn delete_comment(&self, id: Uuid, author_id: Uuid) -> bool;

    // --- User/Auth ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn create_user(&self, user: User) -> Option<User>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL database. Uses the runtime query API with explicit binds so the
/// crate builds without a live database at compile time.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// list_posts
    ///
    /// Retrieves every post. Ordering is applied in the presentation layer
    /// (newest-first with missing timestamps last), mirroring the original
    /// list-page behavior, so no ORDER BY here.
    async fn list_posts(&self) -> Vec<Post> {
        sqlx::query_as::<_, Post>(
            "SELECT id, author_id, author, title, content, created_at, updated_at FROM posts",
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_posts error: {:?}", e);
            vec![]
        })
    }

    /// get_post
    ///
    /// Retrieval of any post by id. Posts have no visibility flag; every
    /// record is publicly readable.
    async fn get_post(&self, id: Uuid) -> Option<Post> {
        sqlx::query_as::<_, Post>(
            "SELECT id, author_id, author, title, content, created_at, updated_at \
             FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_post error: {:?}", e);
            None
        })
    }

    /// create_post
    ///
    /// Inserts a new post with the owner identity stamped from the session.
    async fn create_post(
        &self,
        author_id: Uuid,
        author: &str,
        title: &str,
        content: &str,
    ) -> Option<Post> {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, Post>(
            "INSERT INTO posts (id, author_id, author, title, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING id, author_id, author, title, content, created_at, updated_at",
        )
        .bind(new_id)
        .bind(author_id)
        .bind(author)
        .bind(title)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_post error: {:?}", e);
            None
        })
    }

    /// update_post
    ///
    /// Updates a post only if the provided `author_id` matches the owner.
    /// COALESCE keeps columns untouched when the corresponding field is None.
    async fn update_post(
        &self,
        id: Uuid,
        author_id: Uuid,
        req: UpdatePostRequest,
    ) -> Option<Post> {
        sqlx::query_as::<_, Post>(
            "UPDATE posts \
             SET title = COALESCE($3, title), \
                 content = COALESCE($4, content), \
                 updated_at = NOW() \
             WHERE id = $1 AND author_id = $2 \
             RETURNING id, author_id, author, title, content, created_at, updated_at",
        )
        .bind(id)
        .bind(author_id)
        .bind(req.title)
        .bind(req.content)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_post error: {:?}", e);
            None
        })
    }

    /// delete_post
    ///
    /// Deletes a post only if the provided `author_id` matches the owner.
    /// Comments referencing the post are left in place.
    async fn delete_post(&self, id: Uuid, author_id: Uuid) -> bool {
        match sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_post error: {:?}", e);
                false
            }
        }
    }

    /// list_comments
    ///
    /// Retrieves all comments for a post. Ordering (oldest-first) is applied
    /// in the presentation layer alongside the post sort.
    async fn list_comments(&self, post_id: Uuid) -> Vec<Comment> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, author_id, author, content, created_at \
             FROM comments WHERE post_id = $1",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_comments error: {:?}", e);
            vec![]
        })
    }

    /// add_comment
    ///
    /// Inserts a comment gated on the parent post existing at creation time.
    /// The INSERT..SELECT affects zero rows when the post is gone, which
    /// surfaces as None to the handler.
    async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        author: &str,
        content: &str,
    ) -> Option<Comment> {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (id, post_id, author_id, author, content, created_at) \
             SELECT $1, $2, $3, $4, $5, NOW() \
             WHERE EXISTS (SELECT 1 FROM posts WHERE id = $2) \
             RETURNING id, post_id, author_id, author, content, created_at",
        )
        .bind(new_id)
        .bind(post_id)
        .bind(author_id)
        .bind(author)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("add_comment error: {:?}", e);
            None
        })
    }

    /// update_comment
    ///
    /// Owner-Only comment edit.
    async fn update_comment(&self, id: Uuid, author_id: Uuid, content: &str) -> Option<Comment> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $3 \
             WHERE id = $1 AND author_id = $2 \
             RETURNING id, post_id, author_id, author, content, created_at",
        )
        .bind(id)
        .bind(author_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_comment error: {:?}", e);
            None
        })
    }

    /// delete_comment
    ///
    /// Deletes a comment only if the provided `author_id` matches the author.
    async fn delete_comment(&self, id: Uuid, author_id: Uuid) -> bool {
        match sqlx::query("DELETE FROM comments WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_comment error: {:?}", e);
                false
            }
        }
    }

    /// get_user
    ///
    /// Retrieves the profile mirror (id, username, email) needed for
    /// authentication and record attribution.
    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>("SELECT id, username, email FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or(None)
    }

    /// create_user
    ///
    /// Creates the mirroring profile record after the identity provider has
    /// accepted the signup.
    async fn create_user(&self, user: User) -> Option<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO profiles (id, username, email) VALUES ($1, $2, $3) \
             RETURNING id, username, email",
        )
        .bind(user.id)
        .bind(user.username)
        .bind(user.email)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_user error: {:?}", e);
            None
        })
    }
}
