use axum::{body::Body, http::Request, middleware::Next, response::Response};

use super::token::authenticate;
use crate::gateway::error::GatewayError;

/// Extract the bearer credential and make it available to handlers.
///
/// Role checks happen in the handlers since the allowed set differs per route.
pub async fn bearer_auth_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, GatewayError> {
    let credential = authenticate(request.headers())?;
    request.extensions_mut().insert(credential);
    Ok(next.run(request).await)
}
