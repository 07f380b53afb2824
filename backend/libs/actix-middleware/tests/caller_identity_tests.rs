//! Identity resolution tests
//!
//! Invalid credentials must never fail a request; they resolve to an
//! anonymous caller.

use actix_middleware::{Caller, CallerIdentity, IdentityResolver, RequireAccount};
use actix_web::{http::StatusCode, test as actix_test, web, App, HttpResponse};
use chrono::Duration;
use crypto_core::test_keys::{TEST_PRIVATE_KEY_PEM, TEST_PUBLIC_KEY_PEM};
use crypto_core::{JwtKeys, TokenType};
use uuid::Uuid;
use visibility_core::{AccountId, CallerContext};

fn signer() -> JwtKeys {
    JwtKeys::from_pem(TEST_PRIVATE_KEY_PEM, TEST_PUBLIC_KEY_PEM).expect("test keys")
}

fn resolver() -> IdentityResolver {
    IdentityResolver::new(JwtKeys::validation_only(TEST_PUBLIC_KEY_PEM).expect("test key"))
}

async fn whoami(caller: Caller) -> HttpResponse {
    match caller.0 {
        CallerContext::Anonymous => HttpResponse::Ok().body("anonymous"),
        CallerContext::Authenticated(id) => HttpResponse::Ok().body(id.to_string()),
    }
}

async fn private_area(account: RequireAccount) -> HttpResponse {
    HttpResponse::Ok().body(account.0.to_string())
}

// =============================================================================
// Resolver
// =============================================================================

#[test]
fn test_valid_access_token_resolves_to_account() {
    let account_id = Uuid::new_v4();
    let token = signer().generate_access_token(account_id, "jimi").unwrap();

    let caller = resolver().resolve(Some(&format!("Bearer {token}")));
    assert_eq!(caller, CallerContext::Authenticated(AccountId(account_id)));
}

#[test]
fn test_bad_credentials_resolve_to_anonymous() {
    let signer = signer();
    let account_id = Uuid::new_v4();
    let expired = signer
        .generate(account_id, "late", TokenType::Access, Duration::hours(-2))
        .unwrap();
    let refresh = signer.generate_refresh_token(account_id, "jimi").unwrap();
    let valid = signer.generate_access_token(account_id, "jimi").unwrap();

    let headers = [
        format!("Bearer {expired}"),
        format!("Bearer {refresh}"),
        "Bearer not-a-jwt".to_string(),
        format!("Basic {valid}"),
        valid.clone(),
        String::new(),
    ];

    let resolver = resolver();
    assert_eq!(resolver.resolve(None), CallerContext::Anonymous);
    for header in &headers {
        assert_eq!(
            resolver.resolve(Some(header)),
            CallerContext::Anonymous,
            "{header:?}"
        );
    }
}

#[test]
fn test_resolver_without_keys_is_always_anonymous() {
    let token = signer().generate_access_token(Uuid::new_v4(), "jimi").unwrap();
    let resolver = IdentityResolver::anonymous_only();
    assert_eq!(
        resolver.resolve(Some(&format!("Bearer {token}"))),
        CallerContext::Anonymous
    );
}

// =============================================================================
// Middleware + extractors
// =============================================================================

#[actix_web::test]
async fn test_middleware_passes_invalid_token_through_as_anonymous() {
    let app = actix_test::init_service(
        App::new()
            .wrap(CallerIdentity::new(resolver()))
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = actix_test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", "Bearer garbage.token.value"))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = actix_test::read_body(resp).await;
    assert_eq!(body, "anonymous");
}

#[actix_web::test]
async fn test_middleware_resolves_valid_token() {
    let account_id = Uuid::new_v4();
    let token = signer().generate_access_token(account_id, "jimi").unwrap();

    let app = actix_test::init_service(
        App::new()
            .wrap(CallerIdentity::new(resolver()))
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = actix_test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let body = actix_test::call_and_read_body(&app, req).await;
    assert_eq!(body, account_id.to_string());
}

#[actix_web::test]
async fn test_caller_extractor_defaults_to_anonymous_without_middleware() {
    let app = actix_test::init_service(App::new().route("/whoami", web::get().to(whoami))).await;

    let req = actix_test::TestRequest::get().uri("/whoami").to_request();
    let body = actix_test::call_and_read_body(&app, req).await;
    assert_eq!(body, "anonymous");
}

#[actix_web::test]
async fn test_require_account_rejects_anonymous() {
    let app = actix_test::init_service(
        App::new()
            .wrap(CallerIdentity::new(resolver()))
            .route("/me", web::get().to(private_area)),
    )
    .await;

    let req = actix_test::TestRequest::get().uri("/me").to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let account_id = Uuid::new_v4();
    let token = signer().generate_access_token(account_id, "jimi").unwrap();
    let req = actix_test::TestRequest::get()
        .uri("/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
