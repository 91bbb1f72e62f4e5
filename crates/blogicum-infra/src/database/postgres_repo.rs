//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use blogicum_core::domain::{Category, CommentEntry, Location, PostSummary, User};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::{Page, PageRequest, PageWindow};
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use blogicum_core::visibility::{PostFilter, PostScope};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let masked_local = match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{}***", first),
            _ => "***".to_string(),
        };
        format!("{}{}", masked_local, domain)
    } else {
        "***".to_string()
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .filter(category::Column::IsPublished.eq(true))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {}

/// The public predicate as a SQL condition. Requires the category join.
fn published_condition(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(post::Column::IsPublished.eq(true))
        .add(post::Column::PubDate.lte(now))
        .add(category::Column::IsPublished.eq(true))
}

/// Posts selected by `filter`, unordered.
fn filtered_posts(filter: &PostFilter) -> Select<PostEntity> {
    let select = match filter.scope {
        PostScope::All => PostEntity::find(),
        PostScope::Category(id) => PostEntity::find().filter(post::Column::CategoryId.eq(id)),
        PostScope::Author(id) => PostEntity::find().filter(post::Column::AuthorId.eq(id)),
    };

    if filter.published_only {
        // Inner join: posts without a category drop out, as they must.
        select
            .join(JoinType::InnerJoin, post::Relation::Category.def())
            .filter(published_condition(filter.now))
    } else {
        select
    }
}

/// Newest first, sliced to `window`.
fn newest_page(select: Select<PostEntity>, window: &PageWindow) -> Select<PostEntity> {
    select
        .order_by_desc(post::Column::PubDate)
        .order_by_desc(post::Column::CreatedAt)
        .offset(window.offset())
        .limit(window.limit())
}

#[derive(Debug, FromQueryResult)]
struct CommentCount {
    post_id: Uuid,
    comment_count: i64,
}

/// Attach authors, categories, locations and comment counts to `models`,
/// keeping their order.
async fn annotate(db: &DbConn, models: Vec<post::Model>) -> Result<Vec<PostSummary>, RepoError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let author_ids: Vec<Uuid> = models.iter().map(|m| m.author_id).collect();
    let category_ids: Vec<Uuid> = models.iter().filter_map(|m| m.category_id).collect();
    let location_ids: Vec<Uuid> = models.iter().filter_map(|m| m.location_id).collect();

    let authors: HashMap<Uuid, String> = UserEntity::find()
        .filter(user::Column::Id.is_in(author_ids))
        .all(db)
        .await
        .map_err(query_error)?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let categories: HashMap<Uuid, Category> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        CategoryEntity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(db)
            .await
            .map_err(query_error)?
            .into_iter()
            .map(|c| (c.id, Category::from(c)))
            .collect()
    };

    let locations: HashMap<Uuid, Location> = if location_ids.is_empty() {
        HashMap::new()
    } else {
        LocationEntity::find()
            .filter(location::Column::Id.is_in(location_ids))
            .all(db)
            .await
            .map_err(query_error)?
            .into_iter()
            .map(|l| (l.id, Location::from(l)))
            .collect()
    };

    let counts: HashMap<Uuid, u64> = CommentEntity::find()
        .select_only()
        .column(comment::Column::PostId)
        .column_as(comment::Column::Id.count(), "comment_count")
        .filter(comment::Column::PostId.is_in(post_ids))
        .group_by(comment::Column::PostId)
        .into_model::<CommentCount>()
        .all(db)
        .await
        .map_err(query_error)?
        .into_iter()
        .map(|row| (row.post_id, row.comment_count.max(0) as u64))
        .collect();

    Ok(models
        .into_iter()
        .map(|model| PostSummary {
            author_username: authors.get(&model.author_id).cloned().unwrap_or_default(),
            category: model.category_id.and_then(|id| categories.get(&id).cloned()),
            location: model.location_id.and_then(|id| locations.get(&id).cloned()),
            comment_count: counts.get(&model.id).copied().unwrap_or(0),
            post: model.into(),
        })
        .collect())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_summary(&self, id: Uuid) -> Result<Option<PostSummary>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        Ok(annotate(&self.db, vec![model]).await?.pop())
    }

    async fn list_summaries(
        &self,
        filter: &PostFilter,
        page: PageRequest,
        per_page: u64,
    ) -> Result<Page<PostSummary>, RepoError> {
        let select = filtered_posts(filter);

        let total = select.clone().count(&self.db).await.map_err(query_error)?;
        let window = PageWindow::resolve(total, per_page, page);

        let models = newest_page(select, &window)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        tracing::debug!(
            scope = ?filter.scope,
            published_only = filter.published_only,
            total,
            page = window.number,
            "Listed posts"
        );

        Ok(Page::new(annotate(&self.db, models).await?, window))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .find_also_related(UserEntity)
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentEntry {
                comment: comment.into(),
                author_username: author.map(|u| u.username).unwrap_or_default(),
            })
            .collect())
    }
}
