//! Page URLs and the redirects that point at them.

use actix_web::{HttpRequest, HttpResponse, http::header};
use serde::Serialize;
use uuid::Uuid;

use blogicum_core::access::AccessDenied;
use blogicum_shared::dto::RedirectNotice;

use crate::config::BlogSettings;

pub fn post_detail_url(post_id: Uuid) -> String {
    format!("/api/posts/{}", post_id)
}

pub fn profile_url(username: &str) -> String {
    format!("/api/profile/{}", urlencoding::encode(username))
}

/// Login page with the original path as `next`.
pub fn login_url(settings: &BlogSettings, next: &str) -> String {
    format!("{}?next={}", settings.login_url, urlencoding::encode(next))
}

/// 302 to `location` with a JSON body.
pub fn found<T: Serialize>(location: String, body: T) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .json(body)
}

/// Anonymous request to a protected action.
pub fn to_login(req: &HttpRequest, settings: &BlogSettings) -> HttpResponse {
    let location = login_url(settings, req.path());
    tracing::debug!(path = %req.path(), "Anonymous request redirected to login");
    found(
        location.clone(),
        RedirectNotice {
            location,
            detail: "Authentication required".to_string(),
        },
    )
}

/// Turn a refused ownership check into the matching redirect.
pub fn denied(
    reason: AccessDenied,
    req: &HttpRequest,
    settings: &BlogSettings,
    post_id: Uuid,
) -> HttpResponse {
    match reason {
        AccessDenied::Unauthenticated => to_login(req, settings),
        AccessDenied::NotOwner => {
            let location = post_detail_url(post_id);
            tracing::debug!(path = %req.path(), "Non-author redirected to post detail");
            found(
                location.clone(),
                RedirectNotice {
                    location,
                    detail: "Only the author can change this".to_string(),
                },
            )
        }
    }
}
