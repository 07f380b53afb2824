use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;
use visibility_core::{
    Account, AccountId, AuthoredPost, Post, PostContent, PostId, PostKind, VisibilityError,
};

use super::ContentRepository;
use crate::domain::ProfileUpdate;
use crate::error::{ServiceError, ServiceResult};

const ACCOUNT_COLUMNS: &str = "id, handle, display_name, bio, avatar_url, is_private";
const POST_COLUMNS: &str = "id, owner_id, kind, body, media_url, is_private, likes, created_at";

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    handle: String,
    display_name: String,
    bio: Option<String>,
    avatar_url: Option<String>,
    is_private: Option<bool>,
}

impl AccountRow {
    fn into_account(self) -> Account {
        Account {
            id: AccountId(self.id),
            handle: self.handle,
            display_name: self.display_name,
            bio: self.bio.unwrap_or_default(),
            avatar_url: self.avatar_url,
            // NULL reads as private
            is_private: self.is_private.unwrap_or(true),
            followers: Default::default(),
            following: Default::default(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    owner_id: Uuid,
    kind: String,
    body: String,
    media_url: Option<String>,
    is_private: Option<bool>,
    likes: i64,
    created_at: DateTime<Utc>,
}

impl PostRow {
    /// `None` for rows whose kind is unknown
    fn into_post(self) -> Option<Post> {
        let Some(kind) = PostKind::parse(&self.kind) else {
            warn!(post = %self.id, kind = %self.kind, "Unknown post kind; excluding post");
            return None;
        };

        Some(Post {
            id: PostId(self.id),
            owner_id: AccountId(self.owner_id),
            // NULL reads as private
            is_private: self.is_private.unwrap_or(true),
            created_at: self.created_at,
            content: PostContent {
                kind,
                body: self.body,
                media_url: self.media_url,
            },
            likes: u64::try_from(self.likes).unwrap_or(0),
        })
    }
}

/// PostgreSQL repository (source of truth in deployed environments)
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> ServiceResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(format!("Migration failed: {e}")))
    }

    /// Load accounts with both sides of their follow edges
    async fn load_accounts(&self, ids: &[Uuid]) -> ServiceResult<HashMap<AccountId, Account>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut accounts: HashMap<AccountId, Account> = rows
            .into_iter()
            .map(|row| {
                let account = row.into_account();
                (account.id, account)
            })
            .collect();

        let edges = sqlx::query_as::<_, (Uuid, Uuid)>(
            r#"
            SELECT follower_id, followee_id
            FROM follows
            WHERE (follower_id = ANY($1) OR followee_id = ANY($1))
              AND follower_id <> followee_id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        for (follower, followee) in edges {
            let (follower, followee) = (AccountId(follower), AccountId(followee));
            if let Some(account) = accounts.get_mut(&followee) {
                account.followers.insert(follower);
            }
            if let Some(account) = accounts.get_mut(&follower) {
                account.following.insert(followee);
            }
        }

        Ok(accounts)
    }

    async fn load_account(&self, id: AccountId) -> ServiceResult<Option<Account>> {
        Ok(self.load_accounts(&[id.0]).await?.remove(&id))
    }

    /// Join posts to their authors, dropping posts whose author is missing
    async fn join_posts(&self, rows: Vec<PostRow>) -> ServiceResult<Vec<AuthoredPost>> {
        let posts: Vec<Post> = rows.into_iter().filter_map(PostRow::into_post).collect();
        let owner_ids: Vec<Uuid> = posts
            .iter()
            .map(|p| p.owner_id.0)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let accounts = self.load_accounts(&owner_ids).await?;

        Ok(posts
            .into_iter()
            .filter_map(|post| match accounts.get(&post.owner_id) {
                Some(author) => AuthoredPost::join(post, author.clone()).ok(),
                None => {
                    warn!(post = %post.id, owner = %post.owner_id, "Post owner not found; excluding post");
                    None
                }
            })
            .collect())
    }

    async fn account_exists(&self, id: AccountId) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn ensure_account(&self, id: AccountId) -> ServiceResult<()> {
        if self.account_exists(id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("Account {id} not found")))
        }
    }
}

#[async_trait]
impl ContentRepository for PostgresRepository {
    async fn find_account(&self, id: AccountId) -> ServiceResult<Option<Account>> {
        self.load_account(id).await
    }

    async fn find_account_by_handle(&self, handle: &str) -> ServiceResult<Option<Account>> {
        let id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM accounts WHERE handle = $1")
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?;

        match id {
            Some(id) => self.load_account(AccountId(id)).await,
            None => Ok(None),
        }
    }

    async fn insert_account(&self, account: Account) -> ServiceResult<Account> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (id, handle, display_name, bio, avatar_url, is_private)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id.0)
        .bind(&account.handle)
        .bind(&account.display_name)
        .bind(&account.bio)
        .bind(&account.avatar_url)
        .bind(account.is_private)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(ServiceError::Conflict(format!(
                    "Handle {:?} is already taken",
                    account.handle
                )));
            }
            Err(e) => return Err(e.into()),
        }

        debug!(account = %account.id, handle = %account.handle, "Inserted account");
        self.load_account(account.id)
            .await?
            .ok_or_else(|| ServiceError::Internal(format!("Account {} vanished", account.id)))
    }

    async fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> ServiceResult<Account> {
        let updated = sqlx::query(
            r#"
            UPDATE accounts SET
                display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio),
                avatar_url = CASE WHEN $4::text IS NULL THEN avatar_url
                                  ELSE NULLIF(TRIM($4::text), '') END,
                is_private = COALESCE($5, is_private),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(update.display_name.as_deref().map(str::trim))
        .bind(update.bio.as_deref())
        .bind(update.avatar_url.as_deref())
        .bind(update.is_private)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(ServiceError::NotFound(format!("Account {id} not found")));
        }

        self.load_account(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Account {id} not found")))
    }

    async fn list_authored_posts(
        &self,
        owner: Option<AccountId>,
    ) -> ServiceResult<Vec<AuthoredPost>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE ($1::uuid IS NULL OR owner_id = $1)
            ORDER BY seq
            "#
        ))
        .bind(owner.map(|o| o.0))
        .fetch_all(&self.pool)
        .await?;

        self.join_posts(rows).await
    }

    async fn find_authored_post(&self, id: PostId) -> ServiceResult<Option<AuthoredPost>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.join_posts(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_post(&self, post: Post) -> ServiceResult<Post> {
        self.ensure_account(post.owner_id).await?;

        sqlx::query(
            r#"
            INSERT INTO posts (id, owner_id, kind, body, media_url, is_private, likes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(post.id.0)
        .bind(post.owner_id.0)
        .bind(post.content.kind.as_str())
        .bind(&post.content.body)
        .bind(&post.content.media_url)
        .bind(post.is_private)
        .bind(i64::try_from(post.likes).unwrap_or(i64::MAX))
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        debug!(post = %post.id, owner = %post.owner_id, "Inserted post");
        Ok(post)
    }

    async fn increment_likes(&self, id: PostId) -> ServiceResult<Post> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE posts SET likes = likes + 1 WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.and_then(PostRow::into_post)
            .ok_or_else(|| ServiceError::NotFound(format!("Post {id} not found")))
    }

    async fn create_follow(&self, follower: AccountId, followee: AccountId) -> ServiceResult<bool> {
        if follower == followee {
            return Err(VisibilityError::SelfFollow(follower).into());
        }
        self.ensure_account(follower).await?;
        self.ensure_account(followee).await?;

        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO follows (follower_id, followee_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            RETURNING follower_id
            "#,
        )
        .bind(follower.0)
        .bind(followee.0)
        .fetch_optional(&self.pool)
        .await?;

        debug!(%follower, %followee, created = inserted.is_some(), "Create follow");
        Ok(inserted.is_some())
    }

    async fn delete_follow(&self, follower: AccountId, followee: AccountId) -> ServiceResult<bool> {
        self.ensure_account(followee).await?;

        let affected = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE follower_id = $1 AND followee_id = $2
            "#,
        )
        .bind(follower.0)
        .bind(followee.0)
        .execute(&self.pool)
        .await?
        .rows_affected();

        debug!(%follower, %followee, deleted = affected > 0, "Delete follow");
        Ok(affected > 0)
    }

    async fn health_check(&self) -> ServiceResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_row(kind: &str, is_private: Option<bool>) -> PostRow {
        PostRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            kind: kind.to_string(),
            body: "body".to_string(),
            media_url: None,
            is_private,
            likes: 3,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_null_private_flags_read_as_private() {
        let post = post_row("text", None).into_post().unwrap();
        assert!(post.is_private);
        assert_eq!(post.likes, 3);

        let account = AccountRow {
            id: Uuid::new_v4(),
            handle: "h".into(),
            display_name: "H".into(),
            bio: None,
            avatar_url: None,
            is_private: None,
        }
        .into_account();
        assert!(account.is_private);
        assert_eq!(account.bio, "");
    }

    #[test]
    fn test_explicit_flags_are_kept() {
        assert!(!post_row("video", Some(false)).into_post().unwrap().is_private);
    }

    #[test]
    fn test_unknown_kind_is_excluded() {
        assert!(post_row("poll", Some(false)).into_post().is_none());
    }
}
