//! Account handlers: registration, login and the current user.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use blogicum_core::domain::User;
use blogicum_core::forms::{FormErrors, RegistrationForm, USERNAME_TAKEN};
use blogicum_core::ports::{AuthError, PasswordService, TokenService};
use blogicum_shared::ApiResponse;
use blogicum_shared::dto::{AuthResponse, LoginRequest};

use super::views::user_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/registration
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegistrationForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner().clean()?;

    if state.users.find_by_username(&form.username).await?.is_some() {
        let mut errors = FormErrors::new();
        errors.add("username", USERNAME_TAKEN);
        return Err(AppError::Validation(errors));
    }

    let password_hash = password_service.hash(&form.password)?;

    let user = state.users.save(form.into_user(password_hash)).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        issue_token(&token_service, &user)?,
        "Account created",
    )))
}

/// POST /api/auth/login
///
/// The `username` field also accepts the account's email address.
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Usernames may contain '@', so the username lookup goes first.
    let user = match state.users.find_by_username(&req.username).await? {
        Some(user) => Some(user),
        None if req.username.contains('@') => state.users.find_by_email(&req.username).await?,
        None => None,
    }
    .ok_or(AuthError::InvalidCredentials)?;

    if !password_service.verify(&req.password, &user.password_hash)? {
        tracing::debug!(username = %req.username, "Login rejected");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(issue_token(&token_service, &user)?)))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(&user))))
}

fn issue_token(token_service: &Arc<dyn TokenService>, user: &User) -> AppResult<AuthResponse> {
    let token = token_service.generate_token(user.id, &user.username)?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds().max(0) as u64,
    })
}
