//! # rollcall: attendance platform with role-gated sessions
//!
//! `rollcall` is the server for a student-attendance platform. Its core is
//! the authentication and session subsystem: resolving a login credential
//! (an email address for staff, an institution-issued student identifier
//! for students) against a credential store, issuing a signed session token
//! carrying a role claim, and gating every subsequent request on that claim
//! at the edge of the request pipeline.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer. The credential store is an external collaborator behind
//! the [`store::CredentialStore`] trait; the bundled in-memory
//! implementation backs the binary and the test suite.
//!
//! ### Request Flow
//!
//! A login request hits `/authentication/login`, where the
//! [`auth::resolver::CredentialResolver`] looks up the account in the tier
//! matching the identifier kind and verifies the secret on a blocking
//! thread. On success [`auth::session`] issues a signed token that travels
//! back in an HttpOnly cookie.
//!
//! Every inbound request then passes the [`auth::gate`] middleware before
//! path matching: the path is classified into a route class, the session
//! cookie (if any) is verified without touching the store, and the request
//! is allowed through or redirected to the entry point matching the
//! caller's actual role. Invalid, expired and absent tokens are treated
//! identically, so a protected area is never reachable without a valid
//! claim.
//!
//! ### Startup
//!
//! Configuration is loaded once ([`config::Config`]), validated (a missing
//! signing key aborts startup), and the initial super admin is seeded into
//! the store so a fresh deployment is reachable.

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod store;
pub mod telemetry;
pub mod test_utils;
mod types;

use axum::{
    Router, ServiceExt,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, instrument, Level};

use crate::{
    auth::{password, resolver::CredentialResolver, session::SessionKeys},
    store::{Account, MemoryCredentialStore},
};

pub use types::{AccountId, abbrev_uuid};

/// Application state shared across all request handlers.
///
/// - `config`: immutable configuration loaded at startup
/// - `store`: the credential store backing this deployment
/// - `resolver`: credential resolution over the store
/// - `session_keys`: signing material for session tokens, built once
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<MemoryCredentialStore>,
    pub resolver: CredentialResolver,
    pub session_keys: Arc<SessionKeys>,
}

/// Seed the initial super admin if the configured email is unknown.
///
/// Idempotent: an existing account under `admin_email` is left untouched.
/// When no `admin_password` is configured the account is created without a
/// usable credential and cannot log in until one is set.
#[instrument(skip_all)]
pub async fn seed_initial_super_admin(config: &Config, store: &MemoryCredentialStore) -> anyhow::Result<()> {
    use crate::api::models::users::Role;
    use crate::store::CredentialStore;

    let existing = store
        .find_by_email(&config.admin_email, &[Role::Admin, Role::SuperAdmin])
        .await
        .map_err(|e| anyhow::anyhow!("failed to check existing admin: {e}"))?;
    if existing.is_some() {
        return Ok(());
    }

    let password_hash = match config.admin_password.as_deref() {
        Some(password) => Some(
            password::hash_password_with_params(password, (&config.auth.password).into())
                .map_err(|e| anyhow::anyhow!("failed to hash admin password: {e}"))?,
        ),
        None => None,
    };

    store
        .insert(Account {
            id: AccountId::new_v4(),
            email: Some(config.admin_email.clone()),
            student_id: None,
            display_name: Some("Super Admin".to_string()),
            password_hash,
            role: Role::SuperAdmin,
        })
        .map_err(|e| anyhow::anyhow!("failed to seed super admin: {e}"))?;

    info!(email = %config.admin_email, "Initial super admin created");
    Ok(())
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials))
}

/// Build the application router.
///
/// The authorization gate is NOT applied here: it must run before path
/// matching, so [`Application::serve`] (and the test harness) wrap the
/// router with the gate middleware.
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // Authentication endpoints (ungated; the gate classifies them as Other)
    let auth_routes = Router::new()
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/session", get(api::handlers::auth::session))
        .with_state(state.clone());

    // The gated page areas
    let page_routes = Router::new()
        .route("/", get(api::handlers::pages::index))
        .route("/login", get(api::handlers::pages::login))
        .route("/signup", get(api::handlers::pages::signup))
        .route("/home", get(api::handlers::pages::home))
        .route("/dashboard", get(api::handlers::pages::dashboard))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .merge(page_routes);

    let cors_layer = create_cors_layer(&state.config)?;

    Ok(router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    ))
}

/// The assembled application: state, router and configuration.
pub struct Application {
    router: Router,
    app_state: AppState,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(MemoryCredentialStore::new());
        seed_initial_super_admin(&config, &store).await?;

        let session_keys = Arc::new(SessionKeys::from_config(&config).map_err(|e| anyhow::anyhow!("{e}"))?);
        let resolver = CredentialResolver::new(store.clone(), &config.auth);

        let app_state = AppState::builder()
            .config(config.clone())
            .store(store)
            .resolver(resolver)
            .session_keys(session_keys)
            .build();

        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            app_state,
            config,
        })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Rollcall listening on http://{}", bind_addr);

        // Apply the gate before path matching
        let middleware = from_fn_with_state(self.app_state, auth::gate::route_gate);
        let service = middleware.layer(self.router);

        axum::serve(listener, service.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::models::users::Role;
    use crate::auth::resolver::{IdentifierKind, LoginRequest};
    use crate::auth::session;
    use crate::test_utils::{create_test_app_state, create_test_config, seed_admin, seed_student};
    use axum_test::TestServer;

    /// Router wrapped with the gate, the way `serve` wires it.
    fn gated_server(state: AppState) -> TestServer {
        let router = build_router(&state).unwrap();
        let middleware = from_fn_with_state(state, auth::gate::route_gate);
        let service = middleware.layer(router);
        TestServer::new(service.into_make_service()).unwrap()
    }

    fn session_cookie(state: &AppState, role: Role) -> String {
        let identity = crate::test_utils::create_test_identity(role);
        let token = session::issue(&identity, &state.session_keys).unwrap();
        format!("{}={}", state.config.auth.session.cookie_name, token)
    }

    #[tokio::test]
    async fn test_dashboard_requires_admin() {
        let state = create_test_app_state();
        let student_cookie = session_cookie(&state, Role::Student);
        let admin_cookie = session_cookie(&state, Role::Admin);
        let server = gated_server(state);

        // No token: to login
        let response = server.get("/dashboard").await;
        response.assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get("location").unwrap(), "/login");

        // Student token: to the student area
        let response = server.get("/dashboard").add_header("cookie", student_cookie).await;
        response.assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get("location").unwrap(), "/home");

        // Admin token: allowed
        let response = server.get("/dashboard").add_header("cookie", admin_cookie).await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_home_requires_student() {
        let state = create_test_app_state();
        let student_cookie = session_cookie(&state, Role::Student);
        let admin_cookie = session_cookie(&state, Role::SuperAdmin);
        let server = gated_server(state);

        let response = server.get("/home").await;
        response.assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get("location").unwrap(), "/login");

        let response = server.get("/home").add_header("cookie", admin_cookie).await;
        response.assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get("location").unwrap(), "/dashboard");

        let response = server.get("/home").add_header("cookie", student_cookie).await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_login_page_redirects_authenticated_callers() {
        let state = create_test_app_state();
        let student_cookie = session_cookie(&state, Role::Student);
        let super_admin_cookie = session_cookie(&state, Role::SuperAdmin);
        let server = gated_server(state);

        let response = server.get("/login").await;
        response.assert_status_ok();

        let response = server.get("/login").add_header("cookie", student_cookie).await;
        response.assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get("location").unwrap(), "/home");

        let response = server.get("/login").add_header("cookie", super_admin_cookie).await;
        response.assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get("location").unwrap(), "/dashboard");
    }

    #[tokio::test]
    async fn test_invalid_tokens_are_treated_as_no_session() {
        let state = create_test_app_state();
        let cookie_name = state.config.auth.session.cookie_name.clone();

        // Forged: issued under a different key
        let foreign_token = {
            let mut config = create_test_config();
            config.secret_key = Some("some-other-deployment".to_string());
            let identity = crate::test_utils::create_test_identity(Role::Admin);
            let keys = crate::auth::session::SessionKeys::from_config(&config).unwrap();
            session::issue(&identity, &keys).unwrap()
        };

        let server = gated_server(state);

        let response = server
            .get("/dashboard")
            .add_header("cookie", format!("{cookie_name}={foreign_token}"))
            .await;
        response.assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get("location").unwrap(), "/login");

        let response = server.get("/dashboard").add_header("cookie", format!("{cookie_name}=garbage")).await;
        response.assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get("location").unwrap(), "/login");
    }

    #[tokio::test]
    async fn test_ungated_routes_stay_open() {
        let state = create_test_app_state();
        let student_cookie = session_cookie(&state, Role::Student);
        let server = gated_server(state);

        let response = server.get("/healthz").await;
        response.assert_status_ok();

        let response = server.get("/healthz").add_header("cookie", student_cookie).await;
        response.assert_status_ok();

        let response = server.get("/").await;
        response.assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_full_login_to_dashboard_flow() {
        let state = create_test_app_state();
        seed_admin(&state, "head@school.example", "right", Role::Admin);
        let cookie_name = state.config.auth.session.cookie_name.clone();
        let server = gated_server(state);

        let login = server
            .post("/authentication/login")
            .json(&serde_json::json!({
                "identifier_kind": "EMAIL",
                "identifier": "head@school.example",
                "secret": "right"
            }))
            .await;
        login.assert_status_ok();

        let set_cookie = login.headers().get("set-cookie").unwrap().to_str().unwrap();
        let token = set_cookie.strip_prefix(&format!("{cookie_name}=")).unwrap().split(';').next().unwrap();

        let dashboard = server
            .get("/dashboard")
            .add_header("cookie", format!("{cookie_name}={token}"))
            .await;
        dashboard.assert_status_ok();

        // And the student area bounces the same session to the dashboard
        let home = server.get("/home").add_header("cookie", format!("{cookie_name}={token}")).await;
        home.assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(home.headers().get("location").unwrap(), "/dashboard");
    }

    #[test_log::test(tokio::test)]
    async fn test_student_login_lands_home() {
        let state = create_test_app_state();
        seed_student(&state, "22bc8010", "student-pass");
        let cookie_name = state.config.auth.session.cookie_name.clone();
        let server = gated_server(state);

        let login = server
            .post("/authentication/login")
            .json(&serde_json::json!({
                "identifier_kind": "STUDENT_ID",
                "identifier": "22bc8010",
                "secret": "student-pass"
            }))
            .await;
        login.assert_status_ok();

        let set_cookie = login.headers().get("set-cookie").unwrap().to_str().unwrap();
        let token = set_cookie.strip_prefix(&format!("{cookie_name}=")).unwrap().split(';').next().unwrap();

        let home = server.get("/home").add_header("cookie", format!("{cookie_name}={token}")).await;
        home.assert_status_ok();
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent_and_login_works() {
        let mut config = create_test_config();
        config.admin_email = "head@school.example".to_string();
        config.admin_password = Some("bootstrap-pass".to_string());

        let store = MemoryCredentialStore::new();
        seed_initial_super_admin(&config, &store).await.unwrap();
        seed_initial_super_admin(&config, &store).await.unwrap();

        let resolver = CredentialResolver::new(Arc::new(store), &config.auth);
        let identity = resolver
            .resolve(&LoginRequest {
                identifier_kind: IdentifierKind::Email,
                identifier: "head@school.example".to_string(),
                secret: "bootstrap-pass".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(identity.role, Role::SuperAdmin);
    }

    #[tokio::test]
    async fn test_seeding_without_password_fails_closed() {
        let mut config = create_test_config();
        config.admin_email = "head@school.example".to_string();
        config.admin_password = None;

        let store = MemoryCredentialStore::new();
        seed_initial_super_admin(&config, &store).await.unwrap();

        let resolver = CredentialResolver::new(Arc::new(store), &config.auth);
        let failure = resolver
            .resolve(&LoginRequest {
                identifier_kind: IdentifierKind::Email,
                identifier: "head@school.example".to_string(),
                secret: "anything".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(failure, crate::auth::resolver::AuthFailure::NoCredentialSet));
    }
}
