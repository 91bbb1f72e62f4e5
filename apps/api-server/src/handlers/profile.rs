//! Profile page and profile editing.

use actix_web::{HttpRequest, HttpResponse, web};

use blogicum_core::domain::User;
use blogicum_core::error::DomainError;
use blogicum_core::forms::{FormErrors, ProfileForm, USERNAME_TAKEN};
use blogicum_core::visibility::PostFilter;
use blogicum_shared::ApiResponse;
use blogicum_shared::dto::ProfilePageResponse;

use super::{FormBody, current_user, form_body};
use super::redirect::{found, profile_url, to_login};
use super::views::{PageQuery, paginated_posts, user_response};
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/profile/{username}
///
/// The owner sees every one of their posts; other visitors, anonymous
/// included, only the public ones.
pub async fn profile(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| DomainError::not_found("User", &username))?;

    let page = state
        .posts
        .list_summaries(
            &PostFilter::for_profile(user.id, identity.user_id()),
            query.request(),
            state.settings.posts_per_page,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ProfilePageResponse {
        profile: user_response(&user),
        posts: paginated_posts(page),
    })))
}

/// GET /api/edit_profile
pub async fn edit_profile_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let Some(user) = current_user(&state, &identity).await? else {
        return Ok(to_login(&req, &state.settings));
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ProfileForm::from(&user))))
}

/// POST /api/edit_profile
pub async fn edit_profile(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    body: FormBody<ProfileForm>,
) -> AppResult<HttpResponse> {
    let Some(mut user) = current_user(&state, &identity).await? else {
        return Ok(to_login(&req, &state.settings));
    };

    let form = validate_profile_form(&state, &user, form_body(body)?).await?;
    form.apply_to(&mut user);
    let user = state.users.save(user).await?;
    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(found(
        profile_url(&user.username),
        ApiResponse::ok_with_message(user_response(&user), "Profile updated"),
    ))
}

async fn validate_profile_form(
    state: &AppState,
    user: &User,
    form: ProfileForm,
) -> AppResult<ProfileForm> {
    let form = form.clean()?;

    let mut errors = FormErrors::new();
    if let Some(other) = state.users.find_by_username(&form.username).await? {
        if other.id != user.id {
            errors.add("username", USERNAME_TAKEN);
        }
    }
    errors.into_result().map_err(AppError::Validation)?;

    Ok(form)
}
