use async_trait::async_trait;
use visibility_core::{Account, AccountId, AuthoredPost, Post, PostId};

use crate::domain::ProfileUpdate;
use crate::error::ServiceResult;

/// Account and post storage consumed by the visibility core.
/// Both MemoryRepository and PostgresRepository implement this.
///
/// Reads hand back posts already joined with their author. A post whose
/// author can't be found is dropped from the join, never returned without one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn find_account(&self, id: AccountId) -> ServiceResult<Option<Account>>;

    async fn find_account_by_handle(&self, handle: &str) -> ServiceResult<Option<Account>>;

    /// Register an account. Handles are unique.
    async fn insert_account(&self, account: Account) -> ServiceResult<Account>;

    /// Apply a profile edit made by the account's owner
    async fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> ServiceResult<Account>;

    /// Posts joined with their authors, in insertion order.
    /// `owner` restricts the result to one author.
    async fn list_authored_posts(&self, owner: Option<AccountId>)
        -> ServiceResult<Vec<AuthoredPost>>;

    async fn find_authored_post(&self, id: PostId) -> ServiceResult<Option<AuthoredPost>>;

    /// Store a new post. The owner must exist.
    async fn insert_post(&self, post: Post) -> ServiceResult<Post>;

    /// Add one like; returns the updated post
    async fn increment_likes(&self, id: PostId) -> ServiceResult<Post>;

    /// Create the edge follower -> followee, updating both sides.
    /// Returns false if it already existed. Self-follow is an error.
    async fn create_follow(&self, follower: AccountId, followee: AccountId) -> ServiceResult<bool>;

    /// Remove the edge follower -> followee. Returns false if it did not exist.
    async fn delete_follow(&self, follower: AccountId, followee: AccountId) -> ServiceResult<bool>;

    async fn health_check(&self) -> ServiceResult<()> {
        Ok(())
    }
}
