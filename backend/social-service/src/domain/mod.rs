pub mod models;

pub use models::{
    CreatePostRequest, FeedItem, FollowResponse, ProfileDetails, ProfileUpdate, ProfileView,
    QueryData, QueryRequest, QueryResponse,
};
