use tracing::debug;

use crate::caller::CallerContext;
use crate::evaluator::can_view_post;
use crate::models::{AccountId, AuthoredPost};

/// Per-call feed options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedQuery {
    /// Only posts owned by this account (profile pages)
    pub owner: Option<AccountId>,
    /// Truncate after ordering
    pub limit: Option<usize>,
}

impl FeedQuery {
    pub fn for_owner(owner: AccountId) -> Self {
        Self {
            owner: Some(owner),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Filter `items` down to what `caller` may see, newest first.
///
/// Each post is checked against its own author. Posts with equal timestamps
/// keep their order from `items`. The input is left untouched.
pub fn assemble_feed<'a>(
    items: &'a [AuthoredPost],
    caller: &CallerContext,
    query: &FeedQuery,
) -> Vec<&'a AuthoredPost> {
    let mut visible: Vec<&AuthoredPost> = items
        .iter()
        .filter(|entry| query.owner.map_or(true, |owner| entry.post().owner_id == owner))
        .filter(|entry| can_view_post(entry, caller))
        .collect();

    // stable: ties keep source order
    visible.sort_by(|a, b| b.post().created_at.cmp(&a.post().created_at));

    if let Some(limit) = query.limit {
        visible.truncate(limit);
    }

    debug!(
        candidates = items.len(),
        visible = visible.len(),
        owner = ?query.owner,
        "Assembled feed"
    );

    visible
}
