use actix_web::{web, HttpResponse};
use actix_middleware::Caller;
use serde::Deserialize;

use super::AppState;
use crate::error::ServiceResult;

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
}

/// Home feed
///
/// GET /api/v1/feed?limit=
pub async fn get_feed(
    state: web::Data<AppState>,
    Caller(caller): Caller,
    params: web::Query<PageParams>,
) -> ServiceResult<HttpResponse> {
    let feed = state.feed.home_feed(&caller, params.limit).await?;
    Ok(HttpResponse::Ok().json(feed))
}
