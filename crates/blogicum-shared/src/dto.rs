//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Body sent with a redirect issued instead of performing an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectNotice {
    pub location: String,
    pub detail: String,
}

/// A user's public profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationView {
    pub id: Uuid,
    pub name: String,
}

/// A post as shown in listings and on its detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub is_published: bool,
    pub author: AuthorView,
    pub category: Option<CategoryView>,
    /// Present only when the location itself is published.
    pub location: Option<LocationView>,
    pub comment_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub text: String,
    pub author: AuthorView,
    pub created_at: DateTime<Utc>,
}

/// Navigation metadata for one page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: PageMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    /// Blank comment form for the reader.
    pub comment_form: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPageResponse {
    pub category: CategoryView,
    pub posts: Paginated<PostView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePageResponse {
    pub profile: UserResponse,
    pub posts: Paginated<PostView>,
}
