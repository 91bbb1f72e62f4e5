//! Category page.

use actix_web::{HttpResponse, web};

use blogicum_core::error::DomainError;
use blogicum_core::visibility::{PostFilter, PostScope};
use blogicum_shared::ApiResponse;
use blogicum_shared::dto::CategoryPageResponse;

use super::views::{PageQuery, category_view, paginated_posts};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/category/{category_slug}
///
/// Hidden categories answer 404, the same as unknown slugs.
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let category = state
        .categories
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::not_found("Category", &slug))?;

    let page = state
        .posts
        .list_summaries(
            &PostFilter::published(PostScope::Category(category.id)),
            query.request(),
            state.settings.posts_per_page,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CategoryPageResponse {
        category: category_view(&category),
        posts: paginated_posts(page),
    })))
}
