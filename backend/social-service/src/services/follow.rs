use std::sync::Arc;
use tracing::info;
use visibility_core::{Account, AccountId};

use crate::error::{ServiceError, ServiceResult};
use crate::repository::ContentRepository;

#[derive(Clone)]
pub struct FollowService {
    repo: Arc<dyn ContentRepository>,
}

impl FollowService {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }

    /// Idempotent follow; returns true if a new edge was created.
    pub async fn follow(&self, follower: AccountId, handle: &str) -> ServiceResult<bool> {
        let target = self.target(handle).await?;
        let created = self.repo.create_follow(follower, target.id).await?;

        if created {
            info!(%follower, followee = %target.id, "Follow created");
        }
        Ok(created)
    }

    /// Idempotent unfollow; returns true if an edge was removed.
    pub async fn unfollow(&self, follower: AccountId, handle: &str) -> ServiceResult<bool> {
        let target = self.target(handle).await?;
        let removed = self.repo.delete_follow(follower, target.id).await?;

        if removed {
            info!(%follower, followee = %target.id, "Follow removed");
        }
        Ok(removed)
    }

    async fn target(&self, handle: &str) -> ServiceResult<Account> {
        self.repo
            .find_account_by_handle(handle)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {handle:?} not found")))
    }
}
