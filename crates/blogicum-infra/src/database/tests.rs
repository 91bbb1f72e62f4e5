#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::database::entity::{category, post, user};
    use crate::database::postgres_repo::{
        PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository,
    };
    use blogicum_core::domain::Post;
    use blogicum_core::pagination::PageRequest;
    use blogicum_core::ports::{BaseRepository, CategoryRepository, PostRepository, UserRepository};
    use blogicum_core::visibility::{PostFilter, PostScope};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn post_model(id: uuid::Uuid, author_id: uuid::Uuid, category_id: Option<uuid::Uuid>) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id,
            author_id,
            title: "Test Post".to_owned(),
            text: "Content".to_owned(),
            image: None,
            pub_date: now.into(),
            is_published: true,
            category_id,
            location_id: None,
            created_at: now.into(),
        }
    }

    fn user_model(id: uuid::Uuid, username: &str) -> user::Model {
        let now = chrono::Utc::now();
        user::Model {
            id,
            username: username.to_owned(),
            email: format!("{}@example.com", username),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "hash".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post_id, author_id, None)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.id, post_id);
        assert_eq!(post.author_id, author_id);
    }

    #[tokio::test]
    async fn test_find_user_by_username() {
        let user_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user_model(user_id, "reader")]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);
        let user = repo.find_by_username("reader").await.unwrap().unwrap();

        assert_eq!(user.id, user_id);
        assert_eq!(user.username, "reader");
    }

    #[tokio::test]
    async fn test_unknown_slug_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<category::Model>::new()])
            .into_connection();

        let repo = PostgresCategoryRepository::new(db);
        assert!(repo.find_published_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_summary_attaches_author_category_and_count() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();
        let category_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();

        let count_row: BTreeMap<&str, Value> = BTreeMap::from([
            ("post_id", post_id.into()),
            ("comment_count", 3i64.into()),
        ]);

        // Query order: post, authors, categories, comment counts.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post_id, author_id, Some(category_id))]])
            .append_query_results(vec![vec![user_model(author_id, "author")]])
            .append_query_results(vec![vec![category::Model {
                id: category_id,
                title: "Travel".to_owned(),
                description: String::new(),
                slug: "travel".to_owned(),
                is_published: true,
                created_at: now.into(),
            }]])
            .append_query_results(vec![vec![count_row]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let summary = repo.find_summary(post_id).await.unwrap().unwrap();

        assert_eq!(summary.post.id, post_id);
        assert_eq!(summary.author_username, "author");
        assert_eq!(summary.category.map(|c| c.slug), Some("travel".to_owned()));
        assert!(summary.location.is_none());
        assert_eq!(summary.comment_count, 3);
    }

    #[tokio::test]
    async fn test_find_summary_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        assert!(repo.find_summary(uuid::Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_summaries_clamps_page_and_queries_in_order() {
        let author_id = uuid::Uuid::new_v4();
        let first = uuid::Uuid::new_v4();
        let second = uuid::Uuid::new_v4();

        let total: BTreeMap<&str, Value> = BTreeMap::from([("num_items", 12i64.into())]);

        // Query order: count, page of posts, authors, comment counts.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![total]])
            .append_query_results(vec![vec![
                post_model(first, author_id, None),
                post_model(second, author_id, None),
            ]])
            .append_query_results(vec![vec![user_model(author_id, "author")]])
            .append_query_results(vec![Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let page = repo
            .list_summaries(&PostFilter::published(PostScope::All), PageRequest::number(7), 10)
            .await
            .unwrap();

        assert_eq!(page.window.number, 2);
        assert_eq!(page.window.num_pages, 2);
        assert_eq!(page.window.total, 12);
        let ids: Vec<_> = page.items.iter().map(|s| s.post.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert!(page.items.iter().all(|s| s.comment_count == 0));
        assert!(page.items.iter().all(|s| s.author_username == "author"));

        let log = format!("{:?}", repo.db.into_transaction_log());
        assert_eq!(log.matches("INNER JOIN").count(), 2);
        assert!(log.contains("LIMIT"));
        assert!(log.contains("OFFSET"));
        assert!(log.contains("GROUP BY"));
    }
}
