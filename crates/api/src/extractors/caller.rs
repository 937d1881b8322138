//! Caller identity extractor.
//!
//! Requests arrive through a gateway that authenticates the user and forwards
//! their identifier in the `X-User-Id` header.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::UserId;

use crate::error::ApiError;

/// Header carrying the authenticated user's identifier.
pub const CALLER_ID_HEADER: &str = "X-User-Id";

/// The user on whose behalf a request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub UserId);

impl CallerId {
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CALLER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", CALLER_ID_HEADER)))?;

        Ok(CallerId(UserId::new(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<CallerId, ApiError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(CALLER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CallerId::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_caller_from_header() {
        let caller = extract(Some("agent-7")).await.unwrap();
        assert_eq!(caller.user_id().as_str(), "agent-7");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        assert!(matches!(extract(None).await, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_blank_header_is_unauthorized() {
        assert!(matches!(extract(Some("  ")).await, Err(ApiError::Unauthorized(_))));
    }
}
