//! JWT Authentication Middleware
//!
//! Resolves the caller's [`Principal`] for protected endpoints. The session
//! token comes from the `session_token` cookie or an
//! `Authorization: Bearer <token>` header. After validation the principal is
//! mirrored into the `users` table and handed to handlers through Axum's
//! request extensions.

use std::sync::Arc;

use arena_auth::JwtValidator;
use arena_core::{sync_principal, Principal};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use sea_orm::DatabaseConnection;
use tracing::{debug, error};

use crate::models::ErrorResponse;

type Rejection = (StatusCode, Json<ErrorResponse>);

const SESSION_COOKIE: &str = "session_token=";

/// Token validation and principal mirroring shared across middleware instances
#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<JwtValidator>,
    pub db: DatabaseConnection,
}

impl AuthState {
    pub fn new(secret: &[u8], db: DatabaseConnection) -> Self {
        Self {
            validator: Arc::new(JwtValidator::new(secret)),
            db,
        }
    }
}

fn unauthorized(error: impl Into<String>, code: &str) -> Rejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(error, code)),
    )
}

fn session_cookie(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find_map(|c| c.strip_prefix(SESSION_COOKIE))
                .map(str::to_string)
        })
}

fn bearer_token(request: &Request) -> Result<String, Rejection> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            unauthorized(
                "Missing authentication token (cookie or Authorization header)",
                "MISSING_AUTH",
            )
        })?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| {
            unauthorized(
                "Invalid Authorization header format. Expected 'Bearer <token>'",
                "INVALID_AUTH_FORMAT",
            )
        })
}

/// Authentication middleware that validates JWT session tokens
///
/// # Errors
/// Returns 401 Unauthorized if:
/// - Both cookie and Authorization header are missing
/// - Token is malformed, signed with another secret or expired
/// - Token type is not "session"
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Rejection> {
    let token = match session_cookie(&request) {
        Some(token) => token,
        None => bearer_token(&request)?,
    };

    let claims = state
        .validator
        .validate(&token)
        .map_err(|e| unauthorized(format!("Invalid or expired token: {}", e), "INVALID_TOKEN"))?;

    match claims.token_type.as_deref() {
        Some(_) if claims.is_session() => {}
        Some(other) => {
            return Err(unauthorized(
                format!(
                    "Invalid token type '{}'. Expected 'session' token for API access",
                    other
                ),
                "INVALID_TOKEN_TYPE",
            ));
        }
        None => {
            return Err(unauthorized(
                "Token missing 'token_type' claim",
                "MISSING_TOKEN_TYPE",
            ));
        }
    }

    let principal = Principal::new(claims.sub, claims.first_name, claims.last_name);

    // Workflow rows reference users by foreign key
    sync_principal(&state.db, &principal).await.map_err(|e| {
        error!("Failed to sync principal {}: {}", principal.id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(
                "Failed to load your account",
                "STORE_FAILURE",
            )),
        )
    })?;

    debug!("Authenticated principal {}", principal.id);
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_auth::SessionClaims;
    use axum::{body::Body, http::Request, middleware, routing::get, Extension, Router};
    use chrono::Duration;
    use tower::ServiceExt; // For oneshot()

    const SECRET: &[u8] = b"test-secret-key";

    async fn whoami(Extension(principal): Extension<Principal>) -> Json<Principal> {
        Json(principal)
    }

    async fn create_test_app() -> Router {
        let db = arena_db::connect("sqlite::memory:").await.unwrap();
        arena_db::migrate(&db).await.unwrap();
        let state = AuthState::new(SECRET, db);

        Router::new()
            .route("/protected", get(whoami))
            .layer(middleware::from_fn_with_state(state, require_auth))
    }

    fn session_token(secret: &[u8], validity: Duration) -> String {
        let claims = SessionClaims::new(
            "student-42".to_string(),
            "arena".to_string(),
            "arena-web".to_string(),
            validity,
        )
        .with_name("Ada", "Lovelace")
        .session();
        JwtValidator::encode(secret, &claims).unwrap()
    }

    async fn error_of(response: Response) -> ErrorResponse {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_valid_bearer_token_yields_principal() {
        let app = create_test_app().await;
        let token = session_token(SECRET, Duration::hours(1));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let principal: Principal = serde_json::from_slice(&body).unwrap();
        assert_eq!(principal, Principal::new("student-42", "Ada", "Lovelace"));
    }

    #[tokio::test]
    async fn test_session_cookie_is_accepted() {
        let app = create_test_app().await;
        let token = session_token(SECRET, Duration::hours(1));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Cookie", format!("theme=dark; session_token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error = error_of(response).await;
        assert_eq!(error.code.as_deref(), Some("MISSING_AUTH"));
    }

    #[tokio::test]
    async fn test_invalid_bearer_format() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", "Token abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error = error_of(response).await;
        assert!(error.error.contains("Invalid Authorization header format"));
    }

    #[tokio::test]
    async fn test_expired_and_foreign_tokens_are_rejected() {
        for token in [
            session_token(SECRET, Duration::seconds(-120)),
            session_token(b"another-secret", Duration::hours(1)),
        ] {
            let app = create_test_app().await;
            let response = app
                .oneshot(
                    Request::builder()
                        .uri("/protected")
                        .header("Authorization", format!("Bearer {}", token))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let error = error_of(response).await;
            assert_eq!(error.code.as_deref(), Some("INVALID_TOKEN"));
        }
    }

    #[tokio::test]
    async fn test_non_session_token_is_rejected() {
        let app = create_test_app().await;
        let mut claims = SessionClaims::new(
            "student-42".to_string(),
            "arena".to_string(),
            "arena-kiosk".to_string(),
            Duration::hours(1),
        );
        claims.token_type = Some("kiosk".to_string());
        let token = JwtValidator::encode(SECRET, &claims).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error = error_of(response).await;
        assert!(error.error.contains("Expected 'session' token"));
    }
}
