/// JWT signing and validation for Metronome services
///
/// All tokens are RS256. Keys are loaded from PEM strings into a [`JwtKeys`]
/// value owned by the caller; there is no process-wide key storage.
///
/// ## Usage
///
/// ```rust,ignore
/// use crypto_core::jwt::JwtKeys;
///
/// let public_key = std::env::var("JWT_PUBLIC_KEY_PEM")?;
/// let keys = JwtKeys::validation_only(&public_key)?;
/// let account_id = keys.access_subject(token)?;
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 1;
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// JWT algorithm - MUST be RS256
const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Failed to parse RSA {0} key: {1}")]
    InvalidKey(&'static str, String),

    #[error("No signing key configured")]
    SigningKeyMissing,

    #[error("Token validation failed: {0}")]
    Validation(#[from] jsonwebtoken::errors::Error),

    #[error("Expected {expected} token, got {actual}")]
    WrongTokenType {
        expected: TokenType,
        actual: TokenType,
    },

    #[error("Invalid account id in token subject: {0}")]
    InvalidSubject(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT Claims structure - standard claims plus the account handle
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub token_type: TokenType,
    pub handle: String,
}

// ============================================================================
// Keys
// ============================================================================

/// Parsed key material. Services that only validate tokens hold no
/// encoding key.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Option<EncodingKey>,
    decoding: DecodingKey,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("can_sign", &self.encoding.is_some())
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    /// Load a signing + validation key pair from PEM strings
    pub fn from_pem(private_key_pem: &str, public_key_pem: &str) -> Result<Self, JwtError> {
        let encoding = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey("private", e.to_string()))?;
        let mut keys = Self::validation_only(public_key_pem)?;
        keys.encoding = Some(encoding);
        Ok(keys)
    }

    /// Load only the public key, for services that never issue tokens
    pub fn validation_only(public_key_pem: &str) -> Result<Self, JwtError> {
        let decoding = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey("public", e.to_string()))?;
        Ok(Self {
            encoding: None,
            decoding,
        })
    }

    // ========================================================================
    // Token Generation
    // ========================================================================

    pub fn generate_access_token(&self, account_id: Uuid, handle: &str) -> Result<String, JwtError> {
        self.generate(
            account_id,
            handle,
            TokenType::Access,
            Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS),
        )
    }

    pub fn generate_refresh_token(&self, account_id: Uuid, handle: &str) -> Result<String, JwtError> {
        self.generate(
            account_id,
            handle,
            TokenType::Refresh,
            Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
        )
    }

    /// Sign a token with an explicit lifetime (negative lifetimes produce an
    /// already-expired token)
    pub fn generate(
        &self,
        account_id: Uuid,
        handle: &str,
        token_type: TokenType,
        lifetime: Duration,
    ) -> Result<String, JwtError> {
        let encoding_key = self.encoding.as_ref().ok_or(JwtError::SigningKeyMissing)?;
        let now = Utc::now();

        let claims = Claims {
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            token_type,
            handle: handle.to_string(),
        };

        Ok(encode(&Header::new(JWT_ALGORITHM), &claims, encoding_key)?)
    }

    // ========================================================================
    // Token Validation
    // ========================================================================

    /// Verify signature and expiry, and decode the claims
    pub fn validate_token(&self, token: &str) -> Result<TokenData<Claims>, JwtError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(decode::<Claims>(token, &self.decoding, &validation)?)
    }

    /// Account id from a valid, unexpired access token
    pub fn access_subject(&self, token: &str) -> Result<Uuid, JwtError> {
        let claims = self.validate_token(token)?.claims;
        if claims.token_type != TokenType::Access {
            return Err(JwtError::WrongTokenType {
                expected: TokenType::Access,
                actual: claims.token_type,
            });
        }

        Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidSubject(claims.sub))
    }
}
