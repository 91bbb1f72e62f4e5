//! Domain records to response documents.

use serde::Deserialize;

use blogicum_core::domain::{Category, CommentEntry, PostSummary, User};
use blogicum_core::pagination::{Page, PageRequest, PageWindow};
use blogicum_shared::dto::{
    AuthorView, CategoryView, CommentView, LocationView, PageMeta, Paginated, PostView,
    UserResponse,
};

/// `?page=` on listing pages. Kept as text so junk falls back to page one.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }
}

pub fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        full_name: user.display_name(),
        created_at: user.created_at,
    }
}

pub fn category_view(category: &Category) -> CategoryView {
    CategoryView {
        id: category.id,
        title: category.title.clone(),
        description: category.description.clone(),
        slug: category.slug.clone(),
    }
}

pub fn post_view(summary: PostSummary) -> PostView {
    let PostSummary {
        post,
        author_username,
        category,
        location,
        comment_count,
    } = summary;

    PostView {
        id: post.id,
        title: post.title,
        text: post.text,
        image: post.image,
        pub_date: post.pub_date,
        created_at: post.created_at,
        is_published: post.is_published,
        author: AuthorView {
            id: post.author_id,
            username: author_username,
        },
        category: category.as_ref().map(category_view),
        // Hidden locations are left off the page.
        location: location
            .filter(|l| l.is_published)
            .map(|l| LocationView {
                id: l.id,
                name: l.name,
            }),
        comment_count,
    }
}

pub fn comment_view(entry: CommentEntry) -> CommentView {
    CommentView {
        id: entry.comment.id,
        post_id: entry.comment.post_id,
        text: entry.comment.text,
        author: AuthorView {
            id: entry.comment.author_id,
            username: entry.author_username,
        },
        created_at: entry.comment.created_at,
    }
}

pub fn page_meta(window: &PageWindow) -> PageMeta {
    PageMeta {
        number: window.number,
        num_pages: window.num_pages,
        per_page: window.per_page,
        total: window.total,
        has_next: window.has_next(),
        has_previous: window.has_previous(),
        next_page_number: window.next_page_number(),
        previous_page_number: window.previous_page_number(),
    }
}

pub fn paginated_posts(page: Page<PostSummary>) -> Paginated<PostView> {
    let meta = page_meta(&page.window);
    Paginated {
        items: page.map(post_view).items,
        page: meta,
    }
}
