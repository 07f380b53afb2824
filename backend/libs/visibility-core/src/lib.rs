/// Visibility core for Metronome
///
/// Decides who may see which posts and profiles. Everything in this crate is
/// pure: no I/O, no shared state, safe to call from any request handler.
///
/// # Modules
///
/// - `models`: Accounts, posts and the typed post/author join
/// - `caller`: Resolved caller context (anonymous or authenticated)
/// - `evaluator`: The public / owner / follower visibility rule
/// - `feed`: Filters and orders a collection of posts for one caller
/// - `error`: Error types
pub mod caller;
pub mod error;
pub mod evaluator;
pub mod feed;
pub mod models;

pub use caller::CallerContext;
pub use error::VisibilityError;
pub use evaluator::{can_view_post, can_view_profile, evaluate, is_visible, Decision, Restricted};
pub use feed::{assemble_feed, FeedQuery};
pub use models::{Account, AccountId, AuthoredPost, AuthorSummary, Post, PostContent, PostId, PostKind};
