//! Authentication routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use common::models::{AuthResponse, DEFAULT_USER_NAME, LoginRequest, RegisterRequest};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    AuthState,
    error::{AuthError, AuthResult},
    middleware::{AuthUser, require_bearer},
    models::{NewUser, User},
    validation::{normalize_email, validate_email, validate_name, validate_password},
};

/// Create the router for the authentication endpoints
///
/// The router is meant to be nested, e.g. under `/api/auth`.
pub fn create_router(state: AuthState) -> Router {
    let protected_routes = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected_routes)
        .with_state(state)
}

/// User registration endpoint
pub async fn register(
    State(state): State<AuthState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, AuthError>,
) -> AuthResult<impl IntoResponse> {
    let email = normalize_email(&payload.email);
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_USER_NAME)
        .to_string();

    validate_name(&name).map_err(AuthError::Validation)?;
    validate_email(&email).map_err(AuthError::Validation)?;
    validate_password(&payload.password).map_err(AuthError::Validation)?;

    info!("Registration attempt for: {}", email);

    let new_user = NewUser {
        name,
        email,
        password: payload.password,
    };

    let user = state
        .user_repository
        .create(&new_user)
        .await
        .map_err(|e| {
            error!("Failed to create user: {}", e);
            AuthError::Internal(e.to_string())
        })?
        .ok_or_else(|| {
            warn!("Email already registered: {}", new_user.email);
            AuthError::Conflict
        })?;

    let response = issue_token(&state, &user)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AuthState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AuthError>,
) -> AuthResult<impl IntoResponse> {
    let email = normalize_email(&payload.email);
    info!("Login attempt for: {}", email);

    if !state.rate_limiter.try_acquire(&email).await {
        return Err(AuthError::RateLimited);
    }

    let user = state
        .user_repository
        .find_by_email(&email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::Internal(e.to_string())
        })?;

    let Some(user) = user else {
        warn!("Login failed, unknown email: {}", email);
        return Err(AuthError::InvalidCredentials);
    };

    let valid = state
        .user_repository
        .verify_password(&user, &payload.password)
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            AuthError::Internal(e.to_string())
        })?;

    if !valid {
        warn!("Login failed, wrong password for: {}", email);
        return Err(AuthError::InvalidCredentials);
    }

    state.rate_limiter.reset(&email).await;

    let response = issue_token(&state, &user)?;

    Ok((StatusCode::OK, Json(response)))
}

/// Profile of the user behind the bearer token
pub async fn me(
    State(state): State<AuthState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AuthResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(auth_user.id)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::Internal(e.to_string())
        })?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(json!({ "user": user.profile() })))
}

fn issue_token(state: &AuthState, user: &User) -> AuthResult<AuthResponse> {
    let token = state.jwt_service.generate_token(user).map_err(|e| {
        error!("Failed to generate token: {}", e);
        AuthError::Internal(e.to_string())
    })?;

    Ok(AuthResponse {
        token,
        user: user.profile(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        jwt::{JwtConfig, JwtService},
        rate_limiter::{RateLimiter, RateLimiterConfig},
        repositories::UserRepository,
    };
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use common::database::{DatabaseConfig, init_pool, sync_schema};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn create_test_app() -> Router {
        let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
        sync_schema(&pool).await.unwrap();

        create_router(AuthState {
            user_repository: UserRepository::new(pool),
            jwt_service: JwtService::new(JwtConfig {
                secret: "test-secret".to_string(),
                token_expiry: 3600,
            }),
            rate_limiter: RateLimiter::new(RateLimiterConfig {
                max_attempts: 3,
                ..RateLimiterConfig::default()
            }),
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn get_with_token(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn register_then_login_returns_token() {
        let app = create_test_app().await;

        let (status, registered) = send(
            &app,
            "POST",
            "/register",
            json!({"name": "Jo", "email": "jo@x.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(registered["user"]["name"], "Jo");
        assert_eq!(registered["user"]["email"], "jo@x.com");
        assert!(registered["user"].get("password").is_none());
        assert!(registered["user"].get("password_hash").is_none());

        let (status, logged_in) = send(
            &app,
            "POST",
            "/login",
            json!({"email": "jo@x.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!logged_in["token"].as_str().unwrap().is_empty());
        assert_eq!(logged_in["user"]["id"], registered["user"]["id"]);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = create_test_app().await;
        send(
            &app,
            "POST",
            "/register",
            json!({"name": "Jo", "email": "jo@x.com", "password": "pw"}),
        )
        .await;

        let (status, body) = send(
            &app,
            "POST",
            "/login",
            json!({"email": "jo@x.com", "password": "nope"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");

        let (status, _) = send(
            &app,
            "POST",
            "/login",
            json!({"email": "ghost@x.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let app = create_test_app().await;
        let payload = json!({"name": "Jo", "email": "jo@x.com", "password": "pw"});

        let (status, _) = send(&app, "POST", "/register", payload).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            "POST",
            "/register",
            json!({"email": "JO@x.com ", "password": "other"}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Email already registered");
    }

    #[tokio::test]
    async fn missing_name_defaults_to_user() {
        let app = create_test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/register",
            json!({"email": "anon@x.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["name"], "User");
    }

    #[tokio::test]
    async fn invalid_email_is_a_bad_request() {
        let app = create_test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/register",
            json!({"name": "Jo", "email": "jo", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid email format");
    }

    #[tokio::test]
    async fn repeated_failures_are_rate_limited() {
        let app = create_test_app().await;
        send(
            &app,
            "POST",
            "/register",
            json!({"email": "jo@x.com", "password": "pw"}),
        )
        .await;

        for _ in 0..3 {
            let (status, _) = send(
                &app,
                "POST",
                "/login",
                json!({"email": "jo@x.com", "password": "bad"}),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }

        let (status, _) = send(
            &app,
            "POST",
            "/login",
            json!({"email": "jo@x.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn me_requires_a_valid_token() {
        let app = create_test_app().await;
        let (_, registered) = send(
            &app,
            "POST",
            "/register",
            json!({"name": "Jo", "email": "jo@x.com", "password": "pw"}),
        )
        .await;
        let token = registered["token"].as_str().unwrap();

        let (status, body) = get_with_token(&app, "/me", Some(token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "jo@x.com");

        let (status, body) = get_with_token(&app, "/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized");

        let (status, _) = get_with_token(&app, "/me", Some("garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn incomplete_body_is_a_json_bad_request() {
        let app = create_test_app().await;

        let (status, body) = send(&app, "POST", "/register", json!({"email": "a@x.com"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("password"));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(!body["message"].as_str().unwrap().is_empty());
    }
}
