//! Route authorization gate.
//!
//! Classifies every inbound request path into one of four route classes and
//! decides allow / redirect from the verified session claims, before any
//! handler logic runs. The decision is pure routing policy: unknown or
//! invalid tokens never grant access to a protected area, and a role
//! mismatch redirects to the caller's own area rather than an error page.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::{
    AppState,
    api::models::users::Role,
    auth::{current_user::session_from_headers, session::SessionClaims},
    config::RoutesConfig,
};

/// Policy bucket for a URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Login and signup pages, reachable without a session
    PublicAuthPage,
    /// Pages reserved for the student role
    StudentArea,
    /// Pages reserved for the admin and super admin roles
    AdminArea,
    /// Everything else, ungated
    Other,
}

impl RouteClass {
    /// Classify a path by prefix against the configured table.
    pub fn classify(path: &str, routes: &RoutesConfig) -> Self {
        if routes.public_auth_prefixes.iter().any(|prefix| path.starts_with(prefix)) {
            Self::PublicAuthPage
        } else if routes.student_prefixes.iter().any(|prefix| path.starts_with(prefix)) {
            Self::StudentArea
        } else if routes.admin_prefixes.iter().any(|prefix| path.starts_with(prefix)) {
            Self::AdminArea
        } else {
            Self::Other
        }
    }
}

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(String),
}

/// The decision table over (route class, verified claims).
///
/// Total by construction: every combination is matched exactly once.
pub fn decide(class: RouteClass, claims: Option<&SessionClaims>, routes: &RoutesConfig) -> GateDecision {
    let role = claims.map(|claims| claims.role);

    match (class, role) {
        (RouteClass::Other, _) => GateDecision::Allow,

        (RouteClass::PublicAuthPage, None) => GateDecision::Allow,
        (RouteClass::PublicAuthPage, Some(Role::Student)) => GateDecision::Redirect(routes.student_entry.clone()),
        (RouteClass::PublicAuthPage, Some(Role::Admin | Role::SuperAdmin)) => GateDecision::Redirect(routes.admin_entry.clone()),

        (RouteClass::StudentArea, None) => GateDecision::Redirect(routes.login_entry.clone()),
        (RouteClass::StudentArea, Some(Role::Student)) => GateDecision::Allow,
        (RouteClass::StudentArea, Some(Role::Admin | Role::SuperAdmin)) => GateDecision::Redirect(routes.admin_entry.clone()),

        (RouteClass::AdminArea, None) => GateDecision::Redirect(routes.login_entry.clone()),
        (RouteClass::AdminArea, Some(Role::Student)) => GateDecision::Redirect(routes.student_entry.clone()),
        (RouteClass::AdminArea, Some(Role::Admin | Role::SuperAdmin)) => GateDecision::Allow,
    }
}

/// Middleware applying the gate to every request, before path matching.
pub async fn route_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let class = RouteClass::classify(request.uri().path(), &state.config.routes);
    if class == RouteClass::Other {
        return next.run(request).await;
    }

    // Verification is pure; no store access happens on this path
    let claims = session_from_headers(request.headers(), &state);

    match decide(class, claims.as_ref(), &state.config.routes) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(target) => {
            debug!(path = request.uri().path(), target, "gate redirect");
            Redirect::temporary(&target).into_response()
        }
    }
}
