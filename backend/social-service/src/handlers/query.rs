use actix_web::{web, HttpResponse};
use actix_middleware::Caller;

use super::AppState;
use crate::domain::{QueryData, QueryRequest, QueryResponse};
use crate::error::ServiceResult;

/// Single-endpoint read API for clients that batch their page data
///
/// POST /api/v1/query
pub async fn run_query(
    state: web::Data<AppState>,
    Caller(caller): Caller,
    body: web::Json<QueryRequest>,
) -> ServiceResult<HttpResponse> {
    let data = match body.into_inner() {
        QueryRequest::Feed { limit } => QueryData::Feed(state.feed.home_feed(&caller, limit).await?),
        QueryRequest::User { handle } => QueryData::User(state.feed.profile(&handle, &caller).await?),
    };
    Ok(HttpResponse::Ok().json(QueryResponse { data }))
}
