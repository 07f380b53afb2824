//! # Actix Middleware Library
//!
//! Middleware components shared by Metronome Actix services
//!
//! ## Modules
//! - `caller_identity`: resolves the request credential into a caller context

pub mod caller_identity;

pub use caller_identity::{Caller, CallerIdentity, IdentityResolver, RequireAccount};
