/// Visibility rule for posts and profiles
///
/// One rule covers both: a public item is visible to everyone; a private item
/// is visible to its owner and to the owner's followers, and to nobody else.
/// For a profile the account is its own owner, so a private account with no
/// followers is visible only to itself.
///
/// Self-follow edges are rejected when the edge is written, so the follower
/// check needs no special case for them here.
use crate::caller::CallerContext;
use crate::models::{Account, AccountId, AuthoredPost, Post};

/// Anything carrying an owner and a private flag
pub trait Restricted {
    fn owner_id(&self) -> AccountId;
    fn is_private(&self) -> bool;
}

impl Restricted for Post {
    fn owner_id(&self) -> AccountId {
        self.owner_id
    }

    fn is_private(&self) -> bool {
        self.is_private
    }
}

impl Restricted for Account {
    fn owner_id(&self) -> AccountId {
        self.id
    }

    fn is_private(&self) -> bool {
        self.is_private
    }
}

/// Which clause of the rule decided the outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Public,
    Owner,
    Follower,
    Denied,
}

impl Decision {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Decision::Denied)
    }
}

/// Evaluate the rule, in precedence order, for `item` owned by `owner`.
///
/// `owner` must be the account whose id is `item.owner_id()`. A mismatched
/// owner can't establish ownership or follower status, so a private item is
/// denied.
pub fn evaluate<T>(item: &T, owner: &Account, caller: &CallerContext) -> Decision
where
    T: Restricted + ?Sized,
{
    if !item.is_private() {
        return Decision::Public;
    }

    if owner.id != item.owner_id() {
        return Decision::Denied;
    }

    match caller {
        CallerContext::Anonymous => Decision::Denied,
        CallerContext::Authenticated(viewer) if *viewer == owner.id => Decision::Owner,
        CallerContext::Authenticated(viewer) if owner.has_follower(*viewer) => Decision::Follower,
        CallerContext::Authenticated(_) => Decision::Denied,
    }
}

pub fn is_visible<T>(item: &T, owner: &Account, caller: &CallerContext) -> bool
where
    T: Restricted + ?Sized,
{
    evaluate(item, owner, caller).is_visible()
}

pub fn can_view_post(entry: &AuthoredPost, caller: &CallerContext) -> bool {
    is_visible(entry.post(), entry.author(), caller)
}

/// Whether `caller` may see the profile's detail fields and post list
pub fn can_view_profile(account: &Account, caller: &CallerContext) -> bool {
    is_visible(account, account, caller)
}
