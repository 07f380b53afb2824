use std::sync::Arc;
use tracing::info;
use visibility_core::{Account, AccountId};

use crate::domain::ProfileUpdate;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::ContentRepository;

#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn ContentRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }

    /// The caller's own account with every field, private ones included
    pub async fn current_account(&self, id: AccountId) -> ServiceResult<Account> {
        self.repo
            .find_account(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Account {id} not found")))
    }

    /// Edit the caller's own account. An empty update returns it unchanged.
    pub async fn update_profile(
        &self,
        id: AccountId,
        update: ProfileUpdate,
    ) -> ServiceResult<Account> {
        update.validate()?;

        if update.is_empty() {
            return self.current_account(id).await;
        }

        let account = self.repo.update_profile(id, update).await?;
        info!(account = %id, private = account.is_private, "Profile updated");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockContentRepository;

    #[tokio::test]
    async fn test_empty_update_does_not_write() {
        let me = Account::new("me", "Me");
        let my_id = me.id;

        let mut mock = MockContentRepository::new();
        mock.expect_find_account()
            .returning(move |_| Ok(Some(me.clone())));
        mock.expect_update_profile().never();

        let account = ProfileService::new(Arc::new(mock))
            .update_profile(my_id, ProfileUpdate::default())
            .await
            .unwrap();
        assert_eq!(account.handle, "me");
    }

    #[tokio::test]
    async fn test_current_account_for_deleted_account_is_not_found() {
        let mut mock = MockContentRepository::new();
        mock.expect_find_account().times(1).returning(|_| Ok(None));

        let result = ProfileService::new(Arc::new(mock))
            .current_account(AccountId::new())
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_update_is_rejected() {
        let mut mock = MockContentRepository::new();
        mock.expect_update_profile().never();

        let update = ProfileUpdate {
            bio: Some("x".repeat(1_000)),
            ..Default::default()
        };
        let result = ProfileService::new(Arc::new(mock))
            .update_profile(AccountId::new(), update)
            .await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }
}
