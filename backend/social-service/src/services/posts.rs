use std::sync::Arc;
use tracing::{debug, info};
use visibility_core::{can_view_post, AccountId, CallerContext, Post, PostId};

use crate::domain::CreatePostRequest;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::ContentRepository;

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn ContentRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }

    /// Publish a post owned by `owner`
    pub async fn create_post(
        &self,
        owner: AccountId,
        request: CreatePostRequest,
    ) -> ServiceResult<Post> {
        request.validate()?;
        let post = self.repo.insert_post(request.into_post(owner)).await?;

        info!(post = %post.id, %owner, kind = post.content.kind.as_str(), private = post.is_private, "Post created");
        Ok(post)
    }

    /// Like a post. A post the caller cannot see is reported as not found.
    pub async fn like_post(&self, caller: AccountId, id: PostId) -> ServiceResult<Post> {
        let visible = self
            .repo
            .find_authored_post(id)
            .await?
            .is_some_and(|entry| can_view_post(&entry, &CallerContext::Authenticated(caller)));

        if !visible {
            debug!(post = %id, %caller, "Like rejected: post not visible");
            return Err(ServiceError::NotFound(format!("Post {id} not found")));
        }
        self.repo.increment_likes(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockContentRepository;
    use visibility_core::{Account, AuthoredPost, PostContent, PostKind};

    #[tokio::test]
    async fn test_like_invisible_post_is_not_found() {
        let secret = Account::new("secret", "Secret");
        let post = Post::new(secret.id, PostContent::text("hidden"), true);
        let post_id = post.id;
        let entry = AuthoredPost::join(post, secret).unwrap();

        let mut mock = MockContentRepository::new();
        mock.expect_find_authored_post()
            .returning(move |_| Ok(Some(entry.clone())));
        mock.expect_increment_likes().never();

        let result = PostService::new(Arc::new(mock))
            .like_post(AccountId::new(), post_id)
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_owner_can_like_own_private_post() {
        let me = Account::new("me", "Me");
        let my_id = me.id;
        let post = Post::new(my_id, PostContent::text("diary"), true);
        let post_id = post.id;
        let entry = AuthoredPost::join(post.clone(), me).unwrap();

        let mut mock = MockContentRepository::new();
        mock.expect_find_authored_post()
            .returning(move |_| Ok(Some(entry.clone())));
        mock.expect_increment_likes().times(1).returning(move |_| {
            let mut liked = post.clone();
            liked.likes += 1;
            Ok(liked)
        });

        let liked = PostService::new(Arc::new(mock))
            .like_post(my_id, post_id)
            .await
            .unwrap();
        assert_eq!(liked.likes, 1);
    }

    #[tokio::test]
    async fn test_create_post_validates_before_insert() {
        let mut mock = MockContentRepository::new();
        mock.expect_insert_post().never();

        let request = CreatePostRequest {
            kind: PostKind::Text,
            body: "".into(),
            media_url: None,
            is_private: false,
        };
        let result = PostService::new(Arc::new(mock))
            .create_post(AccountId::new(), request)
            .await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }
}
