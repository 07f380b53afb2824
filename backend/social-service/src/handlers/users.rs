use actix_web::{web, HttpResponse};
use actix_middleware::{Caller, RequireAccount};

use super::feed::PageParams;
use super::AppState;
use crate::domain::{FollowResponse, ProfileUpdate};
use crate::error::{ServiceError, ServiceResult};

/// GET /api/v1/users/{handle}
pub async fn get_profile(
    state: web::Data<AppState>,
    Caller(caller): Caller,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let handle = path.into_inner();
    let view = state
        .feed
        .profile(&handle, &caller)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {handle:?} not found")))?;
    Ok(HttpResponse::Ok().json(view))
}

/// GET /api/v1/users/{handle}/posts
pub async fn get_user_posts(
    state: web::Data<AppState>,
    Caller(caller): Caller,
    path: web::Path<String>,
    params: web::Query<PageParams>,
) -> ServiceResult<HttpResponse> {
    let posts = state
        .feed
        .user_posts(&path, &caller, params.limit)
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /api/v1/users/{handle}/follow
pub async fn follow(
    RequireAccount(me): RequireAccount,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let changed = state.follows.follow(me, &path).await?;
    Ok(HttpResponse::Ok().json(FollowResponse { changed }))
}

/// DELETE /api/v1/users/{handle}/follow
pub async fn unfollow(
    RequireAccount(me): RequireAccount,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let changed = state.follows.unfollow(me, &path).await?;
    Ok(HttpResponse::Ok().json(FollowResponse { changed }))
}

/// GET /api/v1/me
pub async fn get_me(
    RequireAccount(me): RequireAccount,
    state: web::Data<AppState>,
) -> ServiceResult<HttpResponse> {
    let account = state.profiles.current_account(me).await?;
    Ok(HttpResponse::Ok().json(account))
}

/// PUT /api/v1/me/profile
pub async fn update_my_profile(
    RequireAccount(me): RequireAccount,
    state: web::Data<AppState>,
    body: web::Json<ProfileUpdate>,
) -> ServiceResult<HttpResponse> {
    let account = state.profiles.update_profile(me, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(account))
}
