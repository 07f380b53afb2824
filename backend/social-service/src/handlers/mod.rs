/// HTTP handlers for social-service
///
/// Every handler reads the caller from the `CallerIdentity` middleware.
/// Read endpoints accept anonymous callers; mutations require an account.
use actix_web::web;
use std::sync::Arc;

use crate::config::FeedConfig;
use crate::repository::ContentRepository;
use crate::services::{FeedService, FollowService, PostService, ProfileService};

pub mod feed;
pub mod health;
pub mod posts;
pub mod query;
pub mod users;

/// Shared state handed to every worker
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedService,
    pub posts: PostService,
    pub follows: FollowService,
    pub profiles: ProfileService,
    pub repo: Arc<dyn ContentRepository>,
}

impl AppState {
    pub fn new(repo: Arc<dyn ContentRepository>, feed_config: FeedConfig) -> Self {
        Self {
            feed: FeedService::new(repo.clone(), feed_config),
            posts: PostService::new(repo.clone()),
            follows: FollowService::new(repo.clone()),
            profiles: ProfileService::new(repo.clone()),
            repo,
        }
    }
}

/// Register all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health)).service(
        web::scope("/api/v1")
            .route("/feed", web::get().to(feed::get_feed))
            .route("/query", web::post().to(query::run_query))
            .route("/posts", web::post().to(posts::create_post))
            .route("/posts/{id}/like", web::post().to(posts::like_post))
            .route("/me", web::get().to(users::get_me))
            .route("/me/profile", web::put().to(users::update_my_profile))
            .route("/users/{handle}", web::get().to(users::get_profile))
            .route("/users/{handle}/posts", web::get().to(users::get_user_posts))
            .route("/users/{handle}/follow", web::post().to(users::follow))
            .route("/users/{handle}/follow", web::delete().to(users::unfollow)),
    );
}
