//! Comment actions. Every outcome lands back on the post's detail page.

use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use blogicum_core::access::authorize_owner;
use blogicum_core::domain::{Comment, CommentEntry};
use blogicum_core::error::DomainError;
use blogicum_core::forms::CommentForm;
use blogicum_shared::ApiResponse;

use super::{FormBody, current_user, form_body};
use super::redirect::{denied, found, post_detail_url, to_login};
use super::views::comment_view;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{post_id}/comment
///
/// Any existing post accepts comments; visibility is not checked.
pub async fn add_comment(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: FormBody<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    let Some(author) = current_user(&state, &identity).await? else {
        return Ok(to_login(&req, &state.settings));
    };

    let form = form_body(body)?.clean()?;
    let comment = state
        .comments
        .save(Comment::new(post.id, author.id, form.text))
        .await?;
    tracing::info!(comment_id = %comment.id, post_id = %post.id, "Comment added");

    let view = comment_view(CommentEntry {
        comment,
        author_username: author.username,
    });
    Ok(found(
        post_detail_url(post.id),
        ApiResponse::ok_with_message(view, "Comment added"),
    ))
}

/// GET /api/posts/{post_id}/edit_comment/{comment_id}
pub async fn edit_comment_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = load_comment(&state, comment_id).await?;
    if let Err(reason) = authorize_owner(&comment, identity.user_id()) {
        return Ok(denied(reason, &req, &state.settings, post_id));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CommentForm::from(&comment))))
}

/// POST /api/posts/{post_id}/edit_comment/{comment_id}
pub async fn edit_comment(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
    body: FormBody<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let mut comment = load_comment(&state, comment_id).await?;
    if let Err(reason) = authorize_owner(&comment, identity.user_id()) {
        return Ok(denied(reason, &req, &state.settings, post_id));
    }

    comment.text = form_body(body)?.clean()?.text;
    let comment = state.comments.save(comment).await?;
    tracing::info!(comment_id = %comment.id, "Comment updated");

    let author_username = current_user(&state, &identity)
        .await?
        .map(|user| user.username)
        .unwrap_or_default();
    let view = comment_view(CommentEntry {
        comment,
        author_username,
    });
    Ok(found(
        post_detail_url(post_id),
        ApiResponse::ok_with_message(view, "Comment updated"),
    ))
}

/// GET /api/posts/{post_id}/delete_comment/{comment_id}
pub async fn delete_comment_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = load_comment(&state, comment_id).await?;
    if let Err(reason) = authorize_owner(&comment, identity.user_id()) {
        return Ok(denied(reason, &req, &state.settings, post_id));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CommentForm::from(&comment))))
}

/// POST /api/posts/{post_id}/delete_comment/{comment_id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = load_comment(&state, comment_id).await?;
    if let Err(reason) = authorize_owner(&comment, identity.user_id()) {
        return Ok(denied(reason, &req, &state.settings, post_id));
    }

    state.comments.delete(comment.id).await?;
    tracing::info!(comment_id = %comment.id, "Comment deleted");

    Ok(found(
        post_detail_url(post_id),
        ApiResponse::message("Comment deleted"),
    ))
}

// Looked up by id alone; the post id in the path only picks the redirect.
async fn load_comment(state: &AppState, comment_id: Uuid) -> AppResult<Comment> {
    state
        .comments
        .find_by_id(comment_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Comment", comment_id).into())
}
