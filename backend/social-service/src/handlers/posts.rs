use actix_web::{web, HttpResponse};
use actix_middleware::RequireAccount;
use uuid::Uuid;
use visibility_core::PostId;

use super::AppState;
use crate::domain::CreatePostRequest;
use crate::error::ServiceResult;

/// POST /api/v1/posts
pub async fn create_post(
    RequireAccount(me): RequireAccount,
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> ServiceResult<HttpResponse> {
    let post = state.posts.create_post(me, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

/// POST /api/v1/posts/{id}/like
pub async fn like_post(
    RequireAccount(me): RequireAccount,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    let post = state.posts.like_post(me, PostId(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(post))
}
