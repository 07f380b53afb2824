pub mod feed;
pub mod follow;
pub mod posts;
pub mod profile;

pub use feed::FeedService;
pub use follow::FollowService;
pub use posts::PostService;
pub use profile::ProfileService;
