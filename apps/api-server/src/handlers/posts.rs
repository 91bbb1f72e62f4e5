//! Post pages: index, detail and the author's create/edit/delete actions.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blogicum_core::access::authorize_owner;
use blogicum_core::domain::{Post, PostSummary};
use blogicum_core::error::DomainError;
use blogicum_core::forms::{CommentForm, FormErrors, INVALID_CHOICE, PostForm};
use blogicum_core::visibility::{PostFilter, PostScope, can_view_post};
use blogicum_shared::ApiResponse;
use blogicum_shared::dto::{PostDetailResponse, PostView};

use super::redirect::{denied, found, post_detail_url, profile_url, to_login};
use super::views::{PageQuery, comment_view, paginated_posts, post_view};
use super::{FormBody, current_user, form_body};
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .list_summaries(
            &PostFilter::published(PostScope::All),
            query.request(),
            state.settings.posts_per_page,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(paginated_posts(page))))
}

/// GET /api/posts/{post_id}
///
/// The author sees the post in any state; everyone else gets 404 unless it
/// is public.
pub async fn post_detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let summary = load_summary(&state, post_id).await?;

    if !can_view_post(
        &summary.post,
        summary.category.as_ref(),
        identity.user_id(),
        Utc::now(),
    ) {
        return Err(DomainError::not_found("Post", post_id).into());
    }

    let comments = state.comments.list_for_post(post_id).await?;
    let comment_form = serde_json::to_value(CommentForm::default())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostDetailResponse {
        post: post_view(summary),
        comments: comments.into_iter().map(comment_view).collect(),
        comment_form,
    })))
}

/// GET /api/posts/create
pub async fn create_post_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    if current_user(&state, &identity).await?.is_none() {
        return Ok(to_login(&req, &state.settings));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostForm::default())))
}

/// POST /api/posts/create
pub async fn create_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    body: FormBody<PostForm>,
) -> AppResult<HttpResponse> {
    let Some(author) = current_user(&state, &identity).await? else {
        return Ok(to_login(&req, &state.settings));
    };

    let form = validate_post_form(&state, form_body(body)?).await?;
    let post = state.posts.save(form.into_post(author.id)).await?;
    tracing::info!(post_id = %post.id, author = %author.username, "Post created");

    let view = load_view(&state, post.id).await?;
    Ok(found(
        profile_url(&author.username),
        ApiResponse::ok_with_message(view, "Post created"),
    ))
}

/// GET /api/posts/{post_id}/edit
pub async fn edit_post_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    if let Err(reason) = authorize_owner(&post, identity.user_id()) {
        return Ok(denied(reason, &req, &state.settings, post.id));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostForm::from(&post))))
}

/// POST /api/posts/{post_id}/edit
pub async fn edit_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: FormBody<PostForm>,
) -> AppResult<HttpResponse> {
    let mut post = load_post(&state, path.into_inner()).await?;
    if let Err(reason) = authorize_owner(&post, identity.user_id()) {
        return Ok(denied(reason, &req, &state.settings, post.id));
    }

    let form = validate_post_form(&state, form_body(body)?).await?;
    form.apply_to(&mut post);
    let post = state.posts.save(post).await?;
    tracing::info!(post_id = %post.id, "Post updated");

    let view = load_view(&state, post.id).await?;
    Ok(found(
        post_detail_url(post.id),
        ApiResponse::ok_with_message(view, "Post updated"),
    ))
}

/// GET /api/posts/{post_id}/delete
///
/// Shows the post's current values for confirmation.
pub async fn delete_post_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    if let Err(reason) = authorize_owner(&post, identity.user_id()) {
        return Ok(denied(reason, &req, &state.settings, post.id));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostForm::from(&post))))
}

/// POST /api/posts/{post_id}/delete
pub async fn delete_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let summary = load_summary(&state, path.into_inner()).await?;
    if let Err(reason) = authorize_owner(&summary.post, identity.user_id()) {
        return Ok(denied(reason, &req, &state.settings, summary.post.id));
    }

    state.posts.delete(summary.post.id).await?;
    tracing::info!(post_id = %summary.post.id, "Post deleted");

    Ok(found(
        profile_url(&summary.author_username),
        ApiResponse::message("Post deleted"),
    ))
}

async fn load_post(state: &AppState, post_id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id).into())
}

async fn load_summary(state: &AppState, post_id: Uuid) -> AppResult<PostSummary> {
    state
        .posts
        .find_summary(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id).into())
}

async fn load_view(state: &AppState, post_id: Uuid) -> AppResult<PostView> {
    load_summary(state, post_id).await.map(post_view)
}

/// Field validation plus the checks that need the store: the chosen
/// category and location must exist (published or not).
async fn validate_post_form(state: &AppState, form: PostForm) -> AppResult<PostForm> {
    let mut errors = FormErrors::new();

    if let Some(category_id) = form.category {
        if state.categories.find_by_id(category_id).await?.is_none() {
            errors.add("category", INVALID_CHOICE);
        }
    }
    if let Some(location_id) = form.location {
        if state.locations.find_by_id(location_id).await?.is_none() {
            errors.add("location", INVALID_CHOICE);
        }
    }

    match form.clean() {
        Ok(form) => {
            errors.into_result()?;
            Ok(form)
        }
        Err(mut field_errors) => {
            field_errors.merge(errors);
            Err(AppError::Validation(field_errors))
        }
    }
}
