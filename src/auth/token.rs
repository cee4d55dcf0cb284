//! Bearer credential extraction and claim validation.
//!
//! Tokens are issued elsewhere and signed with a shared secret (HS256). The
//! gateway never calls back to the issuer: signature, expiry and role are all
//! checked locally.

use axum::http::{HeaderMap, header};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque bearer token as received from the client.
///
/// Only ever forwarded to backends; never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep raw tokens out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Claims carried by a gateway token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject identity
    pub sub: String,
    /// "user" or "organizer"
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiration time (UTC timestamp)
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

impl Claims {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Organizer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Organizer => "organizer",
        }
    }

    /// Both spellings of organizer show up in issued tokens.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "organizer" | "organiser" => Some(Self::Organizer),
            _ => None,
        }
    }
}

/// Endpoints shared between end-users and organizers.
pub const ANY_ROLE: &[Role] = &[Role::User, Role::Organizer];
pub const ORGANIZER_ONLY: &[Role] = &[Role::Organizer];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Missing or invalid Authorization header")]
    MissingHeader,

    #[error("Invalid token format")]
    Malformed,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Role '{0}' is not permitted for this operation")]
    Forbidden(String),
}

impl TokenError {
    /// 403 only for a valid token carrying the wrong role; everything else is 401.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}

/// Extract the bearer credential from the standard Authorization header.
pub fn authenticate(headers: &HeaderMap) -> Result<Credential, TokenError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(TokenError::MissingHeader)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(TokenError::MissingHeader)?
        .trim();

    // header.payload.signature
    if token.is_empty() || token.split('.').count() != 3 {
        return Err(TokenError::Malformed);
    }

    Ok(Credential::new(token))
}

pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        // No grace period: any past `exp` is expired.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature and expiry.
    pub fn decode(&self, credential: &Credential) -> Result<Claims, TokenError> {
        decode::<Claims>(credential.as_str(), &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    /// Validate once, then check the role claim against the allowed set.
    pub fn authorize(
        &self,
        credential: &Credential,
        allowed: &[Role],
    ) -> Result<Claims, TokenError> {
        let claims = self.decode(credential)?;
        match claims.role() {
            Some(role) if allowed.contains(&role) => Ok(claims),
            _ => {
                tracing::warn!(
                    "[AUTH] role '{}' of subject {} rejected",
                    claims.role,
                    claims.sub
                );
                Err(TokenError::Forbidden(claims.role))
            }
        }
    }
}
