use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Location};

/// Post entity - a blog article with scheduling and visibility flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    /// Reference to an uploaded image, if any.
    pub image: Option<String>,
    /// Publication time. May lie in the future for scheduled posts.
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new published post for `author_id`.
    pub fn new(author_id: Uuid, title: String, text: String, pub_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            text,
            image: None,
            pub_date,
            is_published: true,
            category_id: None,
            location_id: None,
            created_at: Utc::now(),
        }
    }

    /// Default ordering: newest publication date first.
    pub fn newest_first(a: &Post, b: &Post) -> Ordering {
        b.pub_date
            .cmp(&a.pub_date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    }
}

/// A post annotated with its comment count and the records it references.
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub post: Post,
    pub author_username: String,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comment_count: u64,
}
