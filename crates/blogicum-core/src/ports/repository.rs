use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentEntry, Location, Post, PostSummary, User};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};
use crate::visibility::PostFilter;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with lookups by the unique login fields.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Find a category by slug, only if it is published.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}

#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Load one post with its author, category, location and comment count.
    async fn find_summary(&self, id: Uuid) -> Result<Option<PostSummary>, RepoError>;

    /// List the posts selected by `filter`, annotated with comment counts,
    /// newest first, and cut to the requested page.
    async fn list_summaries(
        &self,
        filter: &PostFilter,
        page: PageRequest,
        per_page: u64,
    ) -> Result<Page<PostSummary>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on a post with their authors, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError>;
}
