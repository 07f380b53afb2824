use thiserror::Error;

use crate::models::{AccountId, PostId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VisibilityError {
    #[error("Post {post} is owned by {owner}, not by account {account}")]
    OwnerMismatch {
        post: PostId,
        owner: AccountId,
        account: AccountId,
    },

    #[error("Account {0} cannot follow itself")]
    SelfFollow(AccountId),
}
