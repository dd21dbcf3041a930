//! Bearer token authentication middleware.

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use super::error::ApiError;

/// Shared auth state injected via axum middleware state.
#[derive(Clone)]
pub struct AuthState {
    pub token: Arc<SecretString>,
}

impl AuthState {
    fn accepts(&self, candidate: &str) -> bool {
        candidate
            .as_bytes()
            .ct_eq(self.token.expose_secret().as_bytes())
            .into()
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Validate the bearer token from the header or the `token` query param.
///
/// Download links are opened directly by the browser, which can't attach
/// headers, so `?token=xxx` is accepted as well.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if let Some(token) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        && auth.accepts(token)
    {
        return next.run(request).await;
    }

    if let Ok(Query(TokenQuery { token: Some(token) })) =
        Query::<TokenQuery>::try_from_uri(request.uri())
        && auth.accepts(&token)
    {
        return next.run(request).await;
    }

    ApiError::Unauthorized.into_response()
}
