//! In-memory blog store - used when no database is configured, and in tests.
//!
//! Every table lives behind one async `RwLock`, so each repository call sees
//! and produces a consistent snapshot. Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{
    Category, Comment, CommentEntry, Location, Post, PostSummary, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::{Page, PageRequest};
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};
use blogicum_core::visibility::PostFilter;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn username(&self, id: Uuid) -> String {
        self.users
            .get(&id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn category_of(&self, post: &Post) -> Option<&Category> {
        post.category_id.and_then(|id| self.categories.get(&id))
    }

    fn summarize(&self, post: &Post) -> PostSummary {
        PostSummary {
            post: post.clone(),
            author_username: self.username(post.author_id),
            category: self.category_of(post).cloned(),
            location: post.location_id.and_then(|id| self.locations.get(&id)).cloned(),
            comment_count: self
                .comments
                .values()
                .filter(|c| c.post_id == post.id)
                .count() as u64,
        }
    }

    fn check_post_references(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("Unknown author".to_string()));
        }
        if post.category_id.is_some_and(|id| !self.categories.contains_key(&id)) {
            return Err(RepoError::Constraint("Unknown category".to_string()));
        }
        if post.location_id.is_some_and(|id| !self.locations.contains_key(&id)) {
            return Err(RepoError::Constraint("Unknown location".to_string()));
        }
        Ok(())
    }

    fn delete_post(&mut self, id: Uuid) -> bool {
        if self.posts.remove(&id).is_none() {
            return false;
        }
        self.comments.retain(|_, c| c.post_id != id);
        true
    }
}

/// In-memory implementation of every repository port.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        let authored: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            tables.delete_post(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn save(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .categories
            .values()
            .any(|c| c.id != category.id && c.slug == category.slug)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.categories.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.slug == slug && c.is_published)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Location, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        Ok(self.tables.read().await.locations.get(&id).cloned())
    }

    async fn save(&self, location: Location) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        tables.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.locations.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_post_references(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.delete_post(id) {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_summary(&self, id: Uuid) -> Result<Option<PostSummary>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|post| tables.summarize(post)))
    }

    async fn list_summaries(
        &self,
        filter: &PostFilter,
        page: PageRequest,
        per_page: u64,
    ) -> Result<Page<PostSummary>, RepoError> {
        let tables = self.tables.read().await;

        let mut posts: Vec<&Post> = tables
            .posts
            .values()
            .filter(|post| filter.matches(post, tables.category_of(post)))
            .collect();
        posts.sort_by(|a, b| Post::newest_first(a, b));

        let page = Page::from_vec(posts, per_page, page);
        Ok(page.map(|post| tables.summarize(post)))
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("Unknown post".to_string()));
        }
        if !tables.users.contains_key(&comment.author_id) {
            return Err(RepoError::Constraint("Unknown author".to_string()));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.comments.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let tables = self.tables.read().await;

        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| c.created_at);

        Ok(comments
            .into_iter()
            .map(|c| CommentEntry {
                comment: c.clone(),
                author_username: tables.username(c.author_id),
            })
            .collect())
    }
}
