use std::sync::Arc;
use tracing::debug;
use visibility_core::{assemble_feed, can_view_profile, AccountId, CallerContext, FeedQuery};

use crate::config::FeedConfig;
use crate::domain::{FeedItem, ProfileView};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::ContentRepository;

/// Read side: home feed and profile pages
#[derive(Clone)]
pub struct FeedService {
    repo: Arc<dyn ContentRepository>,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(repo: Arc<dyn ContentRepository>, config: FeedConfig) -> Self {
        Self { repo, config }
    }

    /// Every post the caller may see, newest first.
    ///
    /// Each post is judged by the post rule against its own author. The
    /// author's account-level flag is not consulted here.
    pub async fn home_feed(
        &self,
        caller: &CallerContext,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<FeedItem>> {
        let items = self.repo.list_authored_posts(None).await?;
        let query = FeedQuery::default().with_limit(self.config.page_size(limit));

        let feed: Vec<FeedItem> = assemble_feed(&items, caller, &query)
            .into_iter()
            .map(FeedItem::from)
            .collect();
        debug!(candidates = items.len(), returned = feed.len(), "Assembled home feed");
        Ok(feed)
    }

    /// Profile page for `handle`; `None` when no account has it
    pub async fn profile(
        &self,
        handle: &str,
        caller: &CallerContext,
    ) -> ServiceResult<Option<ProfileView>> {
        let Some(account) = self.repo.find_account_by_handle(handle).await? else {
            return Ok(None);
        };

        if !can_view_profile(&account, caller) {
            debug!(account = %account.id, "Profile locked for caller");
            return Ok(Some(ProfileView::locked(&account)));
        }

        let posts = self.visible_posts_of(account.id, caller, None).await?;
        Ok(Some(ProfileView::open(&account, caller, posts)))
    }

    /// Posts shown on a profile page. Empty when the profile is locked.
    pub async fn user_posts(
        &self,
        handle: &str,
        caller: &CallerContext,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<FeedItem>> {
        let account = self
            .repo
            .find_account_by_handle(handle)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {handle:?} not found")))?;

        if !can_view_profile(&account, caller) {
            return Ok(Vec::new());
        }
        self.visible_posts_of(account.id, caller, limit).await
    }

    async fn visible_posts_of(
        &self,
        owner: AccountId,
        caller: &CallerContext,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<FeedItem>> {
        let items = self.repo.list_authored_posts(Some(owner)).await?;
        let query = FeedQuery::for_owner(owner).with_limit(self.config.page_size(limit));

        Ok(assemble_feed(&items, caller, &query)
            .into_iter()
            .map(FeedItem::from)
            .collect())
    }
}
