//! In-memory repository
//!
//! Used for local development and tests. State lives inside the repository
//! value; each instance is independent.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use visibility_core::{Account, AccountId, AuthoredPost, Post, PostId, VisibilityError};

use super::seed::SeedData;
use super::ContentRepository;
use crate::domain::ProfileUpdate;
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Default)]
struct Store {
    accounts: HashMap<AccountId, Account>,
    handles: HashMap<String, AccountId>,
    /// Insertion order
    posts: Vec<Post>,
}

impl Store {
    fn join(&self, post: &Post) -> Option<AuthoredPost> {
        let Some(author) = self.accounts.get(&post.owner_id) else {
            warn!(post = %post.id, owner = %post.owner_id, "Post owner not found; excluding post");
            return None;
        };
        AuthoredPost::join(post.clone(), author.clone()).ok()
    }

    fn account_mut(&mut self, id: AccountId) -> ServiceResult<&mut Account> {
        self.accounts
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("Account {id} not found")))
    }
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from fixture data. Posts are kept even when their
    /// owner is missing; reads exclude them.
    pub fn from_seed(seed: SeedData) -> ServiceResult<Self> {
        let seed = seed.normalize()?;
        let mut store = Store::default();

        for account in seed.accounts {
            store.handles.insert(account.handle.clone(), account.id);
            store.accounts.insert(account.id, account);
        }
        store.posts = seed.posts;

        Ok(Self {
            store: RwLock::new(store),
        })
    }

    pub async fn load_seed_file(path: &Path) -> ServiceResult<Self> {
        Self::from_seed(SeedData::from_file(path).await?)
    }
}

#[async_trait]
impl ContentRepository for MemoryRepository {
    async fn find_account(&self, id: AccountId) -> ServiceResult<Option<Account>> {
        Ok(self.store.read().await.accounts.get(&id).cloned())
    }

    async fn find_account_by_handle(&self, handle: &str) -> ServiceResult<Option<Account>> {
        let store = self.store.read().await;
        Ok(store
            .handles
            .get(handle)
            .and_then(|id| store.accounts.get(id))
            .cloned())
    }

    async fn insert_account(&self, mut account: Account) -> ServiceResult<Account> {
        let mut store = self.store.write().await;
        if store.handles.contains_key(&account.handle) {
            return Err(ServiceError::Conflict(format!(
                "Handle {:?} is already taken",
                account.handle
            )));
        }
        if store.accounts.contains_key(&account.id) {
            return Err(ServiceError::Conflict(format!(
                "Account {} already exists",
                account.id
            )));
        }

        // Edges are created through create_follow only
        account.followers.clear();
        account.following.clear();

        store.handles.insert(account.handle.clone(), account.id);
        store.accounts.insert(account.id, account.clone());
        debug!(account = %account.id, handle = %account.handle, "Inserted account");
        Ok(account)
    }

    async fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> ServiceResult<Account> {
        let mut store = self.store.write().await;
        let account = store.account_mut(id)?;
        update.apply(account);
        Ok(account.clone())
    }

    async fn list_authored_posts(
        &self,
        owner: Option<AccountId>,
    ) -> ServiceResult<Vec<AuthoredPost>> {
        let store = self.store.read().await;
        Ok(store
            .posts
            .iter()
            .filter(|post| owner.map_or(true, |o| post.owner_id == o))
            .filter_map(|post| store.join(post))
            .collect())
    }

    async fn find_authored_post(&self, id: PostId) -> ServiceResult<Option<AuthoredPost>> {
        let store = self.store.read().await;
        Ok(store
            .posts
            .iter()
            .find(|post| post.id == id)
            .and_then(|post| store.join(post)))
    }

    async fn insert_post(&self, post: Post) -> ServiceResult<Post> {
        let mut store = self.store.write().await;
        if !store.accounts.contains_key(&post.owner_id) {
            return Err(ServiceError::NotFound(format!(
                "Account {} not found",
                post.owner_id
            )));
        }
        if store.posts.iter().any(|p| p.id == post.id) {
            return Err(ServiceError::Conflict(format!("Post {} already exists", post.id)));
        }

        store.posts.push(post.clone());
        debug!(post = %post.id, owner = %post.owner_id, "Inserted post");
        Ok(post)
    }

    async fn increment_likes(&self, id: PostId) -> ServiceResult<Post> {
        let mut store = self.store.write().await;
        let post = store
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Post {id} not found")))?;
        post.likes = post.likes.saturating_add(1);
        Ok(post.clone())
    }

    async fn create_follow(&self, follower: AccountId, followee: AccountId) -> ServiceResult<bool> {
        if follower == followee {
            return Err(VisibilityError::SelfFollow(follower).into());
        }

        let mut store = self.store.write().await;
        if !store.accounts.contains_key(&followee) {
            return Err(ServiceError::NotFound(format!("Account {followee} not found")));
        }

        let added_following = store.account_mut(follower)?.following.insert(followee);
        let added_follower = store.account_mut(followee)?.followers.insert(follower);
        Ok(added_following || added_follower)
    }

    async fn delete_follow(&self, follower: AccountId, followee: AccountId) -> ServiceResult<bool> {
        let mut store = self.store.write().await;
        if !store.accounts.contains_key(&followee) {
            return Err(ServiceError::NotFound(format!("Account {followee} not found")));
        }

        let removed_following = store.account_mut(follower)?.following.remove(&followee);
        let removed_follower = store.account_mut(followee)?.followers.remove(&follower);
        Ok(removed_following || removed_follower)
    }
}
