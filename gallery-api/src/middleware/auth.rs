//! Admin session middleware.
//!
//! Verifies the `Authorization: Bearer <token>` header on admin routes and
//! injects an [`AdminSession`] into request extensions. Requests without a
//! valid session get 401 before any handler runs.

use crate::auth::{bearer_token, validate_session_token, AdminSession, AuthConfig};
use crate::error::ApiError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

#[derive(Debug, Clone)]
pub struct AuthMiddlewareState {
    pub auth_config: Arc<AuthConfig>,
}

impl AuthMiddlewareState {
    pub fn new(auth_config: Arc<AuthConfig>) -> Self {
        Self { auth_config }
    }
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Authenticate an admin request.
///
/// # Usage
///
/// ```ignore
/// let admin = Router::new()
///     .route("/paintings", get(list_paintings))
///     .layer(middleware::from_fn_with_state(auth_state, admin_auth_middleware));
/// ```
pub async fn admin_auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthMiddlewareError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            AuthMiddlewareError(ApiError::unauthorized(
                "Authentication required: provide an Authorization header",
            ))
        })?;

    let token = bearer_token(header).map_err(AuthMiddlewareError)?;
    let session =
        validate_session_token(&state.auth_config, token).map_err(AuthMiddlewareError)?;

    tracing::debug!(admin_id = %session.admin_id, "Admin session verified");
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Error wrapper returned by the middleware.
#[derive(Debug)]
pub struct AuthMiddlewareError(pub ApiError);

impl IntoResponse for AuthMiddlewareError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

// ============================================================================
// TYPED EXTRACTOR
// ============================================================================

/// Handler argument giving access to the verified [`AdminSession`].
///
/// Requires `admin_auth_middleware` on the route; without it the extractor
/// fails with 500.
#[derive(Debug, Clone)]
pub struct AdminExtractor(pub AdminSession);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminExtractor
where
    S: Send + Sync,
{
    type Rejection = AuthMiddlewareError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminSession>()
            .cloned()
            .map(AdminExtractor)
            .ok_or_else(|| {
                AuthMiddlewareError(ApiError::internal_error(
                    "AdminSession not found in request extensions. \
                     Ensure admin_auth_middleware is applied to this route.",
                ))
            })
    }
}

impl std::ops::Deref for AdminExtractor {
    type Target = AdminSession;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{issue_session_token, test_clocks};
    use crate::error::ErrorCode;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use gallery_core::AdminAccount;
    use tower::ServiceExt;

    fn test_config() -> AuthConfig {
        let mut config = AuthConfig::with_secret("middleware_test_secret_0123456789abcdef")
            .expect("test secret should be valid");
        config.clock = Arc::new(test_clocks::valid());
        config
    }

    fn test_app(config: AuthConfig) -> Router {
        let state = AuthMiddlewareState::new(Arc::new(config));
        Router::new()
            .route(
                "/protected",
                get(|AdminExtractor(session): AdminExtractor| async move { session.email }),
            )
            .layer(middleware::from_fn_with_state(state, admin_auth_middleware))
    }

    async fn error_code(response: Response) -> Result<ErrorCode, String> {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| e.to_string())?;
        let error: ApiError = serde_json::from_slice(&bytes).map_err(|e| e.to_string())?;
        Ok(error.code)
    }

    #[tokio::test]
    async fn test_valid_session_reaches_handler() -> Result<(), String> {
        let config = test_config();
        let account = AdminAccount::new("curator@gallery.test", "unused");
        let token = issue_session_token(&config, &account).map_err(|e| e.message)?;

        let request = Request::builder()
            .uri("/protected")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = test_app(config)
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(&body[..], b"curator@gallery.test");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() -> Result<(), String> {
        let request = Request::builder()
            .uri("/protected")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = test_app(test_config())
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await?, ErrorCode::Unauthorized);
        Ok(())
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_rejected() -> Result<(), String> {
        let request = Request::builder()
            .uri("/protected")
            .header("authorization", "Basic Y3VyYXRvcjpwYXNz")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = test_app(test_config())
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await?, ErrorCode::InvalidToken);
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() -> Result<(), String> {
        let config = test_config();
        let account = AdminAccount::new("curator@gallery.test", "unused");
        let token = issue_session_token(&config, &account).map_err(|e| e.message)?;

        let mut later = config.clone();
        later.clock = Arc::new(test_clocks::future());

        let request = Request::builder()
            .uri("/protected")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = test_app(later)
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await?, ErrorCode::TokenExpired);
        Ok(())
    }
}
