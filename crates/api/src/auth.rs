//! API-key authentication middleware.
//!
//! The allow-list is loaded once at startup into an immutable set and
//! injected as middleware state; there is no runtime mutation or
//! re-reading.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;

/// Immutable set of allow-listed credential tokens.
#[derive(Debug, Clone, Default)]
pub struct ApiKeySet {
    keys: Arc<HashSet<String>>,
}

impl ApiKeySet {
    /// Builds the set from a comma-separated list, trimming whitespace and
    /// dropping empty entries.
    pub fn from_list(raw: &str) -> Self {
        Self {
            keys: Arc::new(
                raw.split(',')
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(String::from)
                    .collect(),
            ),
        }
    }

    /// Returns true if the token is allow-listed.
    pub fn contains(&self, token: &str) -> bool {
        self.keys.contains(token)
    }

    /// Returns true if no keys are configured.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Rejects requests whose credential header is missing or not allow-listed.
///
/// Accepts both `Bearer <token>` and `ApiKey <token>` forms.
pub async fn require_api_key(
    State(keys): State<ApiKeySet>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(token_from_header)
        .ok_or_else(|| ApiError::Unauthorized("API key is required".to_string()))?;

    if !keys.contains(token) {
        return Err(ApiError::Unauthorized("Invalid API key".to_string()));
    }

    Ok(next.run(request).await)
}

fn token_from_header(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    (scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("apikey"))
        .then_some(token)
}
