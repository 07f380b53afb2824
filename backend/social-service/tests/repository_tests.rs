//! In-memory repository behavior
//!
//! The PostgreSQL repository shares the trait contract; these tests pin the
//! contract down without a database.

use social_service::repository::seed::SeedData;
use social_service::{ContentRepository, MemoryRepository, ServiceError};
use std::io::Write;
use visibility_core::{Account, AccountId, Post, PostContent, PostId, VisibilityError};

async fn repo_with(accounts: &[&Account]) -> MemoryRepository {
    let repo = MemoryRepository::new();
    for account in accounts {
        repo.insert_account((*account).clone()).await.unwrap();
    }
    repo
}

#[tokio::test]
async fn test_follow_updates_both_sides() {
    let jimi = Account::new("jimi", "Jimi");
    let wolfie = Account::new("wolfie", "Wolfie");
    let repo = repo_with(&[&jimi, &wolfie]).await;

    assert!(repo.create_follow(wolfie.id, jimi.id).await.unwrap());
    // idempotent
    assert!(!repo.create_follow(wolfie.id, jimi.id).await.unwrap());

    let jimi_now = repo.find_account(jimi.id).await.unwrap().unwrap();
    let wolfie_now = repo.find_account(wolfie.id).await.unwrap().unwrap();
    assert!(jimi_now.has_follower(wolfie.id));
    assert!(wolfie_now.follows(jimi.id));
    assert!(!jimi_now.follows(wolfie.id));

    assert!(repo.delete_follow(wolfie.id, jimi.id).await.unwrap());
    assert!(!repo.delete_follow(wolfie.id, jimi.id).await.unwrap());

    let jimi_now = repo.find_account(jimi.id).await.unwrap().unwrap();
    let wolfie_now = repo.find_account(wolfie.id).await.unwrap().unwrap();
    assert!(jimi_now.followers.is_empty());
    assert!(wolfie_now.following.is_empty());
}

#[tokio::test]
async fn test_self_follow_is_rejected() {
    let jimi = Account::new("jimi", "Jimi");
    let repo = repo_with(&[&jimi]).await;

    let result = repo.create_follow(jimi.id, jimi.id).await;
    assert!(matches!(
        result,
        Err(ServiceError::Visibility(VisibilityError::SelfFollow(_)))
    ));

    let jimi_now = repo.find_account(jimi.id).await.unwrap().unwrap();
    assert!(jimi_now.followers.is_empty());
}

#[tokio::test]
async fn test_follow_unknown_account_is_not_found() {
    let jimi = Account::new("jimi", "Jimi");
    let repo = repo_with(&[&jimi]).await;

    let result = repo.create_follow(AccountId::new(), jimi.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    // nothing was half-written
    let jimi_now = repo.find_account(jimi.id).await.unwrap().unwrap();
    assert!(jimi_now.followers.is_empty());
}

#[tokio::test]
async fn test_duplicate_handle_conflicts() {
    let jimi = Account::new("jimi", "Jimi");
    let repo = repo_with(&[&jimi]).await;

    let result = repo.insert_account(Account::new("jimi", "Impostor")).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_posts_keep_insertion_order_and_filter_by_owner() {
    let jimi = Account::new("jimi", "Jimi");
    let wolfie = Account::new("wolfie", "Wolfie");
    let repo = repo_with(&[&jimi, &wolfie]).await;

    for (owner, body) in [(&jimi, "one"), (&wolfie, "two"), (&jimi, "three")] {
        repo.insert_post(Post::new(owner.id, PostContent::text(body), false))
            .await
            .unwrap();
    }

    let all = repo.list_authored_posts(None).await.unwrap();
    let bodies: Vec<_> = all.iter().map(|p| p.post().content.body.as_str()).collect();
    assert_eq!(bodies, vec!["one", "two", "three"]);

    let jimi_posts = repo.list_authored_posts(Some(jimi.id)).await.unwrap();
    assert_eq!(jimi_posts.len(), 2);
    assert!(jimi_posts.iter().all(|p| p.author().id == jimi.id));
}

#[tokio::test]
async fn test_insert_post_requires_owner() {
    let repo = MemoryRepository::new();
    let result = repo
        .insert_post(Post::new(AccountId::new(), PostContent::text("orphan"), false))
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_seeded_post_with_missing_owner_is_excluded() {
    let jimi = Account::new("jimi", "Jimi");
    let orphan = Post::new(AccountId::new(), PostContent::text("nobody home"), false);
    let orphan_id = orphan.id;
    let seed = SeedData {
        accounts: vec![jimi.clone()],
        posts: vec![
            Post::new(jimi.id, PostContent::text("hello"), false),
            orphan,
        ],
    };
    let repo = MemoryRepository::from_seed(seed).unwrap();

    let all = repo.list_authored_posts(None).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].author().id, jimi.id);
    assert!(repo.find_authored_post(orphan_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_increment_likes() {
    let jimi = Account::new("jimi", "Jimi");
    let repo = repo_with(&[&jimi]).await;
    let post = repo
        .insert_post(Post::new(jimi.id, PostContent::text("like me"), false))
        .await
        .unwrap();

    repo.increment_likes(post.id).await.unwrap();
    let liked = repo.increment_likes(post.id).await.unwrap();
    assert_eq!(liked.likes, 2);

    let result = repo.increment_likes(PostId::new()).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_seed_file_fails_closed_on_missing_flags() {
    let jimi_id = AccountId::new();
    let json = format!(
        r#"{{
            "accounts": [
                {{"id": "{jimi_id}", "handle": "jimi", "display_name": "Jimi"}}
            ],
            "posts": [
                {{"id": "{}", "owner_id": "{jimi_id}", "kind": "text", "body": "hi",
                  "created_at": "2025-06-01T10:00:00Z", "is_private": null}}
            ]
        }}"#,
        PostId::new()
    );
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let repo = MemoryRepository::load_seed_file(file.path()).await.unwrap();
    let jimi = repo.find_account_by_handle("jimi").await.unwrap().unwrap();
    assert!(jimi.is_private);

    let posts = repo.list_authored_posts(Some(jimi_id)).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].post().is_private);
}

#[tokio::test]
async fn test_seed_file_must_exist() {
    let result = MemoryRepository::load_seed_file(std::path::Path::new("/nonexistent/seed.json")).await;
    assert!(matches!(result, Err(ServiceError::Seed(_))));
}
