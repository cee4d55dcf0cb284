//! Token Context
//!
//! - [`token`]: credential extraction, claim decoding, role authorization
//! - [`middleware`]: axum layer injecting the [`Credential`] into requests

pub mod middleware;
pub mod token;

pub use middleware::bearer_auth_middleware;
pub use token::{
    ANY_ROLE, Claims, Credential, ORGANIZER_ONLY, Role, TokenError, TokenVerifier, authenticate,
};
