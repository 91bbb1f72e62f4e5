//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod comments;
mod health;
mod posts;
mod profile;
mod redirect;
mod views;

#[cfg(test)]
mod tests;

use actix_web::web;

use blogicum_core::domain::User;

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/", web::get().to(posts::index))
            .route(
                "/category/{category_slug}",
                web::get().to(categories::category_posts),
            )
            .route("/profile/{username}", web::get().to(profile::profile))
            .service(
                web::resource("/edit_profile")
                    .route(web::get().to(profile::edit_profile_form))
                    .route(web::post().to(profile::edit_profile)),
            )
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/registration", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Post routes; `create` must precede `{post_id}`
            .service(
                web::scope("/posts")
                    .service(
                        web::resource("/create")
                            .route(web::get().to(posts::create_post_form))
                            .route(web::post().to(posts::create_post)),
                    )
                    .route("/{post_id}", web::get().to(posts::post_detail))
                    .service(
                        web::resource("/{post_id}/edit")
                            .route(web::get().to(posts::edit_post_form))
                            .route(web::post().to(posts::edit_post)),
                    )
                    .service(
                        web::resource("/{post_id}/delete")
                            .route(web::get().to(posts::delete_post_form))
                            .route(web::post().to(posts::delete_post)),
                    )
                    .route("/{post_id}/comment", web::post().to(comments::add_comment))
                    .service(
                        web::resource("/{post_id}/edit_comment/{comment_id}")
                            .route(web::get().to(comments::edit_comment_form))
                            .route(web::post().to(comments::edit_comment)),
                    )
                    .service(
                        web::resource("/{post_id}/delete_comment/{comment_id}")
                            .route(web::get().to(comments::delete_comment_form))
                            .route(web::post().to(comments::delete_comment)),
                    ),
            ),
    );
}

/// Malformed JSON bodies become RFC 7807 400s.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// A JSON form body whose parse error is held until the handler has run
/// its lookup and ownership checks.
pub(crate) type FormBody<T> = Result<web::Json<T>, actix_web::Error>;

pub(crate) fn form_body<T>(body: FormBody<T>) -> AppResult<T> {
    body.map(web::Json::into_inner)
        .map_err(|e| match e.as_error::<AppError>() {
            Some(AppError::BadRequest(detail)) => AppError::BadRequest(detail.clone()),
            _ => AppError::BadRequest(e.to_string()),
        })
}

/// The requester's user record. A token for a user that no longer exists
/// reads as anonymous.
pub(crate) async fn current_user(
    state: &AppState,
    identity: &OptionalIdentity,
) -> AppResult<Option<User>> {
    match identity.user_id() {
        Some(user_id) => Ok(state.users.find_by_id(user_id).await?),
        None => Ok(None),
    }
}
