use serde::{Deserialize, Serialize};
use visibility_core::{
    Account, AccountId, AuthorSummary, AuthoredPost, CallerContext, Post, PostContent, PostKind,
};

use crate::error::{ServiceError, ServiceResult};

pub const MAX_POST_BODY_CHARS: usize = 2_000;
pub const MAX_DISPLAY_NAME_CHARS: usize = 64;
pub const MAX_BIO_CHARS: usize = 280;

/// A visible post with the author card it is rendered with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub post: Post,
    pub author: AuthorSummary,
}

impl From<&AuthoredPost> for FeedItem {
    fn from(entry: &AuthoredPost) -> Self {
        Self {
            post: entry.post().clone(),
            author: AuthorSummary::from(entry.author()),
        }
    }
}

/// Profile page payload
///
/// The card fields are always present so a locked profile can still be
/// rendered. `details` and `posts` are only filled when the caller may view
/// the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    pub id: AccountId,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub is_private: bool,
    pub can_view: bool,
    pub details: Option<ProfileDetails>,
    pub posts: Vec<FeedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub bio: String,
    pub followers_count: usize,
    pub following_count: usize,
    /// The caller follows this account
    pub followed_by_caller: bool,
    pub is_own_profile: bool,
}

impl ProfileView {
    pub fn locked(account: &Account) -> Self {
        Self {
            id: account.id,
            handle: account.handle.clone(),
            display_name: account.display_name.clone(),
            avatar_url: account.avatar_url.clone(),
            is_private: account.is_private,
            can_view: false,
            details: None,
            posts: Vec::new(),
        }
    }

    pub fn open(account: &Account, caller: &CallerContext, posts: Vec<FeedItem>) -> Self {
        let details = ProfileDetails {
            bio: account.bio.clone(),
            followers_count: account.followers.len(),
            following_count: account.following.len(),
            followed_by_caller: caller.account_id().is_some_and(|v| account.has_follower(v)),
            is_own_profile: caller.is(account.id),
        };

        Self {
            can_view: true,
            details: Some(details),
            posts,
            ..Self::locked(account)
        }
    }
}

/// Body of `POST /api/v1/posts`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreatePostRequest {
    #[serde(default = "default_kind")]
    pub kind: PostKind,
    pub body: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

fn default_kind() -> PostKind {
    PostKind::Text
}

impl CreatePostRequest {
    pub fn validate(&self) -> ServiceResult<()> {
        let body = self.body.trim();
        if body.is_empty() {
            return Err(ServiceError::InvalidInput("Post body must not be empty".into()));
        }
        if body.chars().count() > MAX_POST_BODY_CHARS {
            return Err(ServiceError::InvalidInput(format!(
                "Post body exceeds {MAX_POST_BODY_CHARS} characters"
            )));
        }
        Ok(())
    }

    pub fn into_post(self, owner: AccountId) -> Post {
        let content = PostContent {
            kind: self.kind,
            body: self.body.trim().to_string(),
            media_url: self.media_url.filter(|url| !url.trim().is_empty()),
        };
        Post::new(owner, content, self.is_private)
    }
}

/// Partial update of the caller's own profile. Absent fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_private: Option<bool>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> ServiceResult<()> {
        if let Some(name) = &self.display_name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::InvalidInput("Display name must not be empty".into()));
            }
            if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
                return Err(ServiceError::InvalidInput(format!(
                    "Display name exceeds {MAX_DISPLAY_NAME_CHARS} characters"
                )));
            }
        }
        if let Some(bio) = &self.bio {
            if bio.chars().count() > MAX_BIO_CHARS {
                return Err(ServiceError::InvalidInput(format!(
                    "Bio exceeds {MAX_BIO_CHARS} characters"
                )));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(&self, account: &mut Account) {
        if let Some(name) = &self.display_name {
            account.display_name = name.trim().to_string();
        }
        if let Some(bio) = &self.bio {
            account.bio = bio.clone();
        }
        if let Some(url) = &self.avatar_url {
            let url = url.trim();
            account.avatar_url = (!url.is_empty()).then(|| url.to_string());
        }
        if let Some(is_private) = self.is_private {
            account.is_private = is_private;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowResponse {
    /// False when the edge was already in the requested state
    pub changed: bool,
}

/// Body of `POST /api/v1/query`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum QueryRequest {
    Feed {
        #[serde(default)]
        limit: Option<usize>,
    },
    User {
        handle: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryData {
    Feed(Vec<FeedItem>),
    /// `None` when no account has the handle
    User(Option<ProfileView>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub data: QueryData,
}
