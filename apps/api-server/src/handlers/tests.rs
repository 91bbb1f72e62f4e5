use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};

use blogicum_core::domain::{Category, Comment, Post, User};
use blogicum_core::ports::{PasswordService, TokenService};
use blogicum_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::config::BlogSettings;
use crate::state::AppState;

struct Blog {
    state: AppState,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
    author: User,
    reader: User,
    news: Category,
}

impl Blog {
    async fn new() -> Self {
        let state = AppState::in_memory(BlogSettings::default());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "handler-tests".to_string(),
            expiration_hours: 1,
            issuer: "blogicum".to_string(),
        }));
        let passwords: Arc<dyn PasswordService> =
            Arc::new(Argon2PasswordService::with_cost(8 * 1024, 1, 1).unwrap());

        let author = state
            .users
            .save(User::new("author".into(), "author@example.com".into(), "x".into()))
            .await
            .unwrap();
        let reader = state
            .users
            .save(User::new("reader".into(), "reader@example.com".into(), "x".into()))
            .await
            .unwrap();
        let news = state
            .categories
            .save(Category::new("News".into(), "Daily news".into(), "news".into()))
            .await
            .unwrap();

        Self {
            state,
            tokens,
            passwords,
            author,
            reader,
            news,
        }
    }

    fn bearer(&self, user: &User) -> (header::HeaderName, String) {
        let token = self.tokens.generate_token(user.id, &user.username).unwrap();
        (header::AUTHORIZATION, format!("Bearer {}", token))
    }

    async fn post(&self, title: &str, is_published: bool, hours_ago: i64) -> Post {
        let mut post = Post::new(
            self.author.id,
            title.into(),
            "text".into(),
            Utc::now() - TimeDelta::hours(hours_ago),
        );
        post.is_published = is_published;
        post.category_id = Some(self.news.id);
        self.state.posts.save(post).await.unwrap()
    }
}

macro_rules! app {
    ($blog:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($blog.state.clone()))
                .app_data(web::Data::new($blog.tokens.clone()))
                .app_data(web::Data::new($blog.passwords.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn location<B>(res: &actix_web::dev::ServiceResponse<B>) -> String {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn test_unpublished_post_is_visible_only_to_author() {
    let blog = Blog::new().await;
    let draft = blog.post("Draft", false, 1).await;
    let app = app!(blog);
    let uri = format!("/api/posts/{}", draft.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["post"]["title"], "Draft");
    assert_eq!(body["data"]["post"]["comment_count"], 0);
    assert_eq!(body["data"]["comment_form"]["text"], "");
}

#[actix_web::test]
async fn test_detail_lists_comments_oldest_first() {
    let blog = Blog::new().await;
    let post = blog.post("Hello", true, 1).await;
    for text in ["first", "second"] {
        blog.state
            .comments
            .save(Comment::new(post.id, blog.reader.id, text.into()))
            .await
            .unwrap();
    }
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", post.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["post"]["comment_count"], 2);
    assert_eq!(body["data"]["comments"][0]["text"], "first");
    assert_eq!(body["data"]["comments"][1]["author"]["username"], "reader");
}

#[actix_web::test]
async fn test_non_author_cannot_delete_comment() {
    let blog = Blog::new().await;
    let post = blog.post("Hello", true, 1).await;
    let comment = blog
        .state
        .comments
        .save(Comment::new(post.id, blog.author.id, "mine".into()))
        .await
        .unwrap();
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/delete_comment/{}", post.id, comment.id))
        .insert_header(blog.bearer(&blog.reader))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/api/posts/{}", post.id));
    assert!(blog.state.comments.find_by_id(comment.id).await.unwrap().is_some());
}

#[actix_web::test]
async fn test_author_deletes_comment() {
    let blog = Blog::new().await;
    let post = blog.post("Hello", true, 1).await;
    let comment = blog
        .state
        .comments
        .save(Comment::new(post.id, blog.author.id, "mine".into()))
        .await
        .unwrap();
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/delete_comment/{}", post.id, comment.id))
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert!(blog.state.comments.find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_unpublished_category_hides_its_posts() {
    let blog = Blog::new().await;
    blog.post("Breaking", true, 1).await;
    let mut news = blog.news.clone();
    news.is_published = false;
    blog.state.categories.save(news).await.unwrap();
    let app = app!(blog);

    let req = test::TestRequest::get().uri("/api/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["page"]["total"], 0);
    assert_eq!(body["data"]["items"], json!([]));

    let req = test::TestRequest::get().uri("/api/category/news").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_index_pagination_clamps_and_tolerates_junk() {
    let blog = Blog::new().await;
    for hours in 1..=12 {
        blog.post(&format!("post {}", hours), true, hours).await;
    }
    blog.post("future", true, -24).await;
    let app = app!(blog);

    let req = test::TestRequest::get().uri("/api/?page=9").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["page"]["number"], 2);
    assert_eq!(body["data"]["page"]["num_pages"], 2);
    assert_eq!(body["data"]["page"]["total"], 12);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(2));

    let req = test::TestRequest::get().uri("/api/?page=abc").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["page"]["number"], 1);
    assert_eq!(body["data"]["items"][0]["title"], "post 1");
    assert_eq!(body["data"]["page"]["has_next"], true);
}

#[actix_web::test]
async fn test_category_page_lists_published_posts() {
    let blog = Blog::new().await;
    blog.post("Visible", true, 1).await;
    blog.post("Hidden", false, 1).await;
    let app = app!(blog);

    let req = test::TestRequest::get().uri("/api/category/news").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["category"]["slug"], "news");
    assert_eq!(body["data"]["posts"]["page"]["total"], 1);
    assert_eq!(body["data"]["posts"]["items"][0]["title"], "Visible");
}

#[actix_web::test]
async fn test_profile_shows_drafts_only_to_owner() {
    let blog = Blog::new().await;
    blog.post("Public", true, 2).await;
    blog.post("Draft", false, 1).await;
    let app = app!(blog);

    let req = test::TestRequest::get().uri("/api/profile/author").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["profile"]["username"], "author");
    assert_eq!(body["data"]["posts"]["page"]["total"], 1);

    let req = test::TestRequest::get()
        .uri("/api/profile/author")
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["posts"]["page"]["total"], 2);
    assert_eq!(body["data"]["posts"]["items"][0]["title"], "Draft");

    let req = test::TestRequest::get().uri("/api/profile/nobody").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_anonymous_create_redirects_to_login() {
    let blog = Blog::new().await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri("/api/posts/create")
        .set_json(json!({"title": "Hi", "text": "There"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/api/auth/login?next=%2Fapi%2Fposts%2Fcreate");
}

#[actix_web::test]
async fn test_create_post_validates_then_redirects_to_profile() {
    let blog = Blog::new().await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri("/api/posts/create")
        .insert_header(blog.bearer(&blog.author))
        .set_json(json!({
            "title": "  ",
            "text": "body",
            "pub_date": "2020-01-01T00:00:00Z",
            "category": uuid::Uuid::new_v4(),
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"]["category"].is_array());

    let req = test::TestRequest::post()
        .uri("/api/posts/create")
        .insert_header(blog.bearer(&blog.author))
        .set_json(json!({
            "title": "Hello",
            "text": "World",
            "pub_date": "2020-01-01T00:00:00Z",
            "category": blog.news.id,
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/api/profile/author");

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["title"], "Hello");
    assert_eq!(body["data"]["author"]["username"], "author");
}

#[actix_web::test]
async fn test_edit_post_is_reserved_for_author() {
    let blog = Blog::new().await;
    let post = blog.post("Before", true, 1).await;
    let app = app!(blog);
    let uri = format!("/api/posts/{}/edit", post.id);
    let form = json!({
        "title": "After",
        "text": "text",
        "pub_date": "2020-01-01T00:00:00Z",
        "category": blog.news.id,
    });

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .set_json(&form)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/api/posts/{}", post.id));
    let stored = blog.state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Before");

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["title"], "Before");

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .set_json(&form)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    let stored = blog.state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "After");
}

#[actix_web::test]
async fn test_missing_post_is_404_before_login_check() {
    let blog = Blog::new().await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/delete", uuid::Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_post_redirects_to_profile() {
    let blog = Blog::new().await;
    let post = blog.post("Bye", true, 1).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/delete", post.id))
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/api/profile/author");
    assert!(blog.state.posts.find_by_id(post.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_comment_on_unpublished_post_is_accepted() {
    let blog = Blog::new().await;
    let draft = blog.post("Draft", false, 1).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comment", draft.id))
        .insert_header(blog.bearer(&blog.reader))
        .set_json(json!({"text": "Early!"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/api/posts/{}", draft.id));
    let comments = blog.state.comments.list_for_post(draft.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author_username, "reader");
}

#[actix_web::test]
async fn test_blank_comment_is_rejected() {
    let blog = Blog::new().await;
    let post = blog.post("Hello", true, 1).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comment", post.id))
        .insert_header(blog.bearer(&blog.reader))
        .set_json(json!({"text": "   "}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(blog.state.comments.list_for_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let blog = Blog::new().await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri("/api/posts/create")
        .insert_header(blog.bearer(&blog.author))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_edit_profile_rejects_taken_username() {
    let blog = Blog::new().await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri("/api/edit_profile")
        .insert_header(blog.bearer(&blog.reader))
        .set_json(json!({"username": "author"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/edit_profile")
        .insert_header(blog.bearer(&blog.reader))
        .set_json(json!({"username": "critic", "first_name": "Vissarion"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/api/profile/critic");

    let user = blog.state.users.find_by_id(blog.reader.id).await.unwrap().unwrap();
    assert_eq!(user.username, "critic");
    assert_eq!(user.first_name, "Vissarion");
}

#[actix_web::test]
async fn test_registration_login_and_me() {
    let blog = Blog::new().await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri("/api/auth/registration")
        .set_json(json!({"username": "newbie", "password": "long-enough"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/registration")
        .set_json(json!({"username": "newbie", "password": "long-enough"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"username": "newbie", "password": "wrong-password"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"username": "newbie", "password": "long-enough"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["token_type"], "Bearer");
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["username"], "newbie");

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_bodiless_posts_run_lookup_and_ownership_checks_first() {
    let blog = Blog::new().await;
    let post = blog.post("Hello", true, 1).await;
    let comment = blog
        .state
        .comments
        .save(Comment::new(post.id, blog.author.id, "mine".into()))
        .await
        .unwrap();
    let app = app!(blog);
    let missing = uuid::Uuid::new_v4();

    // Anonymous: login redirect on every form action.
    for uri in [
        "/api/posts/create".to_string(),
        format!("/api/posts/{}/edit", post.id),
        format!("/api/posts/{}/comment", post.id),
        format!("/api/posts/{}/edit_comment/{}", post.id, comment.id),
        "/api/edit_profile".to_string(),
    ] {
        let req = test::TestRequest::post().uri(&uri).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FOUND, "{}", uri);
        assert!(location(&res).starts_with("/api/auth/login?next="), "{}", uri);
    }

    // Non-owner: back to the post.
    for uri in [
        format!("/api/posts/{}/edit", post.id),
        format!("/api/posts/{}/edit_comment/{}", post.id, comment.id),
    ] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(blog.bearer(&blog.reader))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FOUND, "{}", uri);
        assert_eq!(location(&res), format!("/api/posts/{}", post.id));
    }

    // Missing record: 404 for anyone.
    for uri in [
        format!("/api/posts/{}/edit", missing),
        format!("/api/posts/{}/comment", missing),
        format!("/api/posts/{}/edit_comment/{}", post.id, missing),
    ] {
        let req = test::TestRequest::post().uri(&uri).to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND,
            "{}",
            uri
        );
    }

    // Only the owner reaches the body check.
    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/edit", post.id))
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn test_anonymous_comment_redirects_to_login() {
    let blog = Blog::new().await;
    let post = blog.post("Hello", true, 1).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comment", post.id))
        .set_json(json!({"text": "hi"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        location(&res),
        format!("/api/auth/login?next=%2Fapi%2Fposts%2F{}%2Fcomment", post.id)
    );
    assert!(blog.state.comments.list_for_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_author_edits_comment() {
    let blog = Blog::new().await;
    let post = blog.post("Hello", true, 1).await;
    let comment = blog
        .state
        .comments
        .save(Comment::new(post.id, blog.reader.id, "frist".into()))
        .await
        .unwrap();
    let app = app!(blog);
    let uri = format!("/api/posts/{}/edit_comment/{}", post.id, comment.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["text"], "frist");

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/api/posts/{}", post.id));

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .set_json(json!({"text": "hijacked"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    let stored = blog.state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "frist");

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .set_json(json!({"text": "first"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/api/posts/{}", post.id));

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["text"], "first");
    assert_eq!(body["data"]["author"]["username"], "reader");
    let stored = blog.state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "first");
}

#[actix_web::test]
async fn test_author_sees_own_scheduled_post() {
    let blog = Blog::new().await;
    let scheduled = blog.post("Tomorrow", true, -24).await;
    let app = app!(blog);
    let uri = format!("/api/posts/{}", scheduled.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["post"]["title"], "Tomorrow");

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["page"]["total"], 0);
}
