//! `x-user-email` extraction. Runs before the body is read, so a missing
//! identity is rejected ahead of any gate check or model call.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;

pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// The acting user's email, taken verbatim from the `x-user-email` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEmail(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for UserEmail
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(|value| UserEmail(value.to_string()))
            .ok_or_else(|| AppError::Unauthorized("Missing user email in headers".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<UserEmail, AppError> {
        let (mut parts, _) = request.into_parts();
        UserEmail::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_header_present() {
        let request = Request::builder()
            .header(USER_EMAIL_HEADER, "a@x.com")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.unwrap(), UserEmail("a@x.com".to_string()));
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let request = Request::builder().body(()).unwrap();
        assert!(matches!(extract(request).await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_empty_header_is_unauthorized() {
        let request = Request::builder()
            .header(USER_EMAIL_HEADER, "")
            .body(())
            .unwrap();
        assert!(matches!(extract(request).await, Err(AppError::Unauthorized(_))));
    }
}
