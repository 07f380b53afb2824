//! Caller identity middleware
//!
//! Resolves `Authorization: Bearer <jwt>` into a [`CallerContext`] and stores
//! it in request extensions. It never rejects a request: a missing, malformed,
//! expired or otherwise invalid credential resolves to `Anonymous`, so public
//! content stays reachable. Routes that need an account use the
//! [`RequireAccount`] extractor instead.
//!
//! ## Example
//! ```rust,ignore
//! use actix_middleware::{CallerIdentity, IdentityResolver};
//! use actix_web::App;
//!
//! let resolver = IdentityResolver::new(keys);
//! let app = App::new().wrap(CallerIdentity::new(resolver));
//! ```

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use crypto_core::JwtKeys;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use visibility_core::{AccountId, CallerContext};

/// Maps a request credential to a caller context
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    keys: Option<Arc<JwtKeys>>,
}

impl IdentityResolver {
    pub fn new(keys: JwtKeys) -> Self {
        Self {
            keys: Some(Arc::new(keys)),
        }
    }

    /// Resolver with no verification key; every caller is anonymous
    pub fn anonymous_only() -> Self {
        Self { keys: None }
    }

    /// Resolve a raw `Authorization` header value
    pub fn resolve(&self, authorization: Option<&str>) -> CallerContext {
        let Some(header) = authorization else {
            return CallerContext::Anonymous;
        };

        let Some(token) = header.strip_prefix("Bearer ") else {
            tracing::debug!("Authorization header is not a bearer token; treating caller as anonymous");
            return CallerContext::Anonymous;
        };

        let Some(keys) = &self.keys else {
            return CallerContext::Anonymous;
        };

        match keys.access_subject(token.trim()) {
            Ok(account_id) => CallerContext::Authenticated(AccountId(account_id)),
            Err(e) => {
                tracing::warn!(error = %e, "Credential rejected; treating caller as anonymous");
                CallerContext::Anonymous
            }
        }
    }

    pub fn resolve_headers(&self, headers: &HeaderMap) -> CallerContext {
        self.resolve(headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()))
    }
}

/// Middleware storing the resolved [`CallerContext`] in request extensions
#[derive(Clone)]
pub struct CallerIdentity {
    resolver: IdentityResolver,
}

impl CallerIdentity {
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CallerIdentity
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = CallerIdentityService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CallerIdentityService {
            service: Rc::new(service),
            resolver: self.resolver.clone(),
        }))
    }
}

pub struct CallerIdentityService<S> {
    service: Rc<S>,
    resolver: IdentityResolver,
}

impl<S, B> Service<ServiceRequest> for CallerIdentityService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let caller = self.resolver.resolve_headers(req.headers());
        tracing::debug!(caller = ?caller, path = %req.path(), "Resolved caller");
        req.extensions_mut().insert(caller);

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

/// Extractor for the resolved caller; `Anonymous` when the middleware did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub CallerContext);

impl FromRequest for Caller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let caller = req
            .extensions()
            .get::<CallerContext>()
            .copied()
            .unwrap_or_default();
        ready(Ok(Caller(caller)))
    }
}

/// Extractor for routes that need an authenticated account; 401 otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequireAccount(pub AccountId);

impl FromRequest for RequireAccount {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CallerContext>() {
            Some(CallerContext::Authenticated(id)) => ready(Ok(RequireAccount(*id))),
            _ => ready(Err(actix_web::error::ErrorUnauthorized(
                "Authentication required",
            ))),
        }
    }
}
