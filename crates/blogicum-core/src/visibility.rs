//! Which posts a requester may see.
//!
//! A post is public when it is published, its publication date has passed and
//! its category is published. Authors always see their own posts.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Post};

/// The public predicate: published flag, past `pub_date`, published category.
///
/// A post without a category is never public.
pub fn is_published(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published && post.pub_date <= now && category.is_some_and(|c| c.is_published)
}

/// Detail-page rule: the author sees the post unconditionally, everyone else
/// only when it is public.
pub fn can_view_post(
    post: &Post,
    category: Option<&Category>,
    requester: Option<Uuid>,
    now: DateTime<Utc>,
) -> bool {
    requester == Some(post.author_id) || is_published(post, category, now)
}

/// The collection a post listing draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    Category(Uuid),
    Author(Uuid),
}

/// A post listing query: scope plus the optional public filter.
#[derive(Debug, Clone, Copy)]
pub struct PostFilter {
    pub scope: PostScope,
    pub published_only: bool,
    pub now: DateTime<Utc>,
}

impl PostFilter {
    /// Public posts within `scope`.
    pub fn published(scope: PostScope) -> Self {
        Self {
            scope,
            published_only: true,
            now: Utc::now(),
        }
    }

    /// Every post within `scope`, regardless of publication state.
    pub fn unrestricted(scope: PostScope) -> Self {
        Self {
            scope,
            published_only: false,
            now: Utc::now(),
        }
    }

    /// Profile page listing. The owner sees all of their posts; anyone else,
    /// anonymous visitors included, sees only the public ones.
    pub fn for_profile(author_id: Uuid, requester: Option<Uuid>) -> Self {
        if requester == Some(author_id) {
            Self::unrestricted(PostScope::Author(author_id))
        } else {
            Self::published(PostScope::Author(author_id))
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Whether `post` (with its resolved category) belongs to this listing.
    pub fn matches(&self, post: &Post, category: Option<&Category>) -> bool {
        let in_scope = match self.scope {
            PostScope::All => true,
            PostScope::Category(id) => post.category_id == Some(id),
            PostScope::Author(id) => post.author_id == id,
        };

        in_scope && (!self.published_only || is_published(post, category, self.now))
    }
}
