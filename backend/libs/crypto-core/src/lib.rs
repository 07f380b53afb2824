//! Credential handling shared by Metronome services
//!
//! - `jwt`: RS256 access/refresh token signing and validation
pub mod jwt;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_keys;

pub use jwt::{Claims, JwtError, JwtKeys, TokenType};
