//! Bearer-token gate for protected routes.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use shelf_authz::{Claims, TokenService};

use crate::error::AppError;

/// Claims of the validated token, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

/// Axum middleware: validates the `Authorization` header and rejects the
/// request with 401 before any handler runs if the token is missing,
/// malformed, signed with another secret, or expired.
///
/// The header may carry the bare token or `Bearer <token>`.
pub async fn require_token(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;
    if header.is_empty() {
        return Err(AppError::unauthorized("Missing Authorization header"));
    }

    let header = header
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid token"))?;

    let claims = tokens.validate(bearer_token(header)).map_err(|err| {
        tracing::debug!(error = %err, "token rejected");
        AppError::unauthorized("Invalid token")
    })?;

    tracing::trace!(username = %claims.username, "token accepted");
    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}

/// Strip an optional `Bearer ` scheme (case-insensitive) from a header value.
pub fn bearer_token(header: &str) -> &str {
    let header = header.trim();
    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => header,
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Extension, Router};
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use super::*;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(b"test-secret", Duration::hours(72)))
    }

    fn app(tokens: Arc<TokenService>) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|Extension(user): Extension<AuthenticatedUser>| async move { user.0.username }),
            )
            .layer(middleware::from_fn_with_state(tokens, require_token))
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut request = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn bearer_prefix_is_optional() {
        assert_eq!(bearer_token("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(bearer_token("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(bearer_token("bearer  abc.def.ghi "), "abc.def.ghi");
    }

    #[tokio::test]
    async fn raw_token_passes_and_exposes_claims() {
        let tokens = tokens();
        let token = tokens.issue("admin").unwrap();
        let (status, body) = call(app(tokens), Some(token.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin");
    }

    #[tokio::test]
    async fn bearer_token_passes() {
        let tokens = tokens();
        let token = tokens.issue("admin").unwrap();
        let (status, _) = call(app(tokens), Some(format!("Bearer {token}").as_str())).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (status, body) = call(app(tokens()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Missing Authorization header"));

        let (status, _) = call(app(tokens()), Some("")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn foreign_or_expired_tokens_are_unauthorized() {
        let foreign = TokenService::new(b"other-secret", Duration::hours(72))
            .issue("admin")
            .unwrap();
        let (status, body) = call(app(tokens()), Some(foreign.as_str())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid token"));

        let service = tokens();
        let expired = service
            .issue_at("admin", Utc::now() - Duration::hours(80))
            .unwrap();
        let (status, _) = call(app(service), Some(expired.as_str())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(app(tokens()), Some("garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
