use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use crate::error::VisibilityError;

/// Opaque account identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for AccountId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Opaque post identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub Uuid);

impl PostId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for PostId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Stored `is_private` flags that are missing, null or not a boolean read as
/// private.
pub(crate) mod fail_closed {
    use serde::{de::IgnoredAny, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Other(IgnoredAny),
    }

    pub fn default() -> bool {
        true
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Flag>::deserialize(deserializer)? {
            Some(Flag::Bool(value)) => value,
            Some(Flag::Other(_)) | None => true,
        })
    }
}

/// Registered identity with a profile and follow relationships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Unique handle, shown as `@handle`
    pub handle: String,
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(
        default = "fail_closed::default",
        deserialize_with = "fail_closed::deserialize"
    )]
    pub is_private: bool,
    /// Accounts following this one. Never contains `id`.
    #[serde(default)]
    pub followers: BTreeSet<AccountId>,
    /// Accounts this one follows. Never contains `id`.
    #[serde(default)]
    pub following: BTreeSet<AccountId>,
}

impl Account {
    pub fn new(handle: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: AccountId::new(),
            handle: handle.into(),
            display_name: display_name.into(),
            bio: String::new(),
            avatar_url: None,
            is_private: false,
            followers: BTreeSet::new(),
            following: BTreeSet::new(),
        }
    }

    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    pub fn has_follower(&self, id: AccountId) -> bool {
        self.followers.contains(&id)
    }

    pub fn follows(&self, id: AccountId) -> bool {
        self.following.contains(&id)
    }
}

/// Post payload kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Text,
    Video,
    Game,
    Ad,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Text => "text",
            PostKind::Video => "video",
            PostKind::Game => "game",
            PostKind::Ad => "ad",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(PostKind::Text),
            "video" => Some(PostKind::Video),
            "game" => Some(PostKind::Game),
            "ad" => Some(PostKind::Ad),
            _ => None,
        }
    }
}

/// Text body, or a URL for video/game posts, plus an optional thumbnail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    pub kind: PostKind,
    pub body: String,
    #[serde(default)]
    pub media_url: Option<String>,
}

impl PostContent {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            kind: PostKind::Text,
            body: body.into(),
            media_url: None,
        }
    }
}

/// A unit of user-generated content with its own visibility flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub owner_id: AccountId,
    /// Fixed at creation; independent of the owner's `is_private`.
    #[serde(
        default = "fail_closed::default",
        deserialize_with = "fail_closed::deserialize"
    )]
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub content: PostContent,
    #[serde(default)]
    pub likes: u64,
}

impl Post {
    pub fn new(owner_id: AccountId, content: PostContent, is_private: bool) -> Self {
        Self {
            id: PostId::new(),
            owner_id,
            is_private,
            created_at: Utc::now(),
            content,
            likes: 0,
        }
    }
}

/// Author fields a post is rendered with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: AccountId,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<&Account> for AuthorSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            handle: account.handle.clone(),
            display_name: account.display_name.clone(),
            avatar_url: account.avatar_url.clone(),
        }
    }
}

/// A post joined with the account that owns it
///
/// Can only be built through [`AuthoredPost::join`], which guarantees that
/// `author.id == post.owner_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoredPost {
    post: Post,
    author: Account,
}

impl AuthoredPost {
    pub fn join(post: Post, author: Account) -> Result<Self, VisibilityError> {
        if post.owner_id != author.id {
            return Err(VisibilityError::OwnerMismatch {
                post: post.id,
                owner: post.owner_id,
                account: author.id,
            });
        }
        Ok(Self { post, author })
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn author(&self) -> &Account {
        &self.author
    }
}
