//! Extracting the authenticated caller from the session cookie.

use axum::http::{HeaderMap, header, request::Parts};
use axum::extract::FromRequestParts;
use tracing::trace;

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session::{self, SessionClaims},
    errors::{Error, Result},
};

/// Extract verified session claims from the cookie header, if any.
///
/// Returns `None` when no session cookie is present or when verification
/// fails for any reason; the three failure kinds are deliberately not
/// distinguished to callers.
pub fn session_from_headers(headers: &HeaderMap, state: &AppState) -> Option<SessionClaims> {
    let cookie_header = headers.get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;
    let cookie_name = &state.config.auth.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                match session::verify(value, &state.session_keys) {
                    Ok(claims) => return Some(claims),
                    Err(failure) => {
                        // Expired or forged cookies are routine; keep scanning
                        // in case a valid cookie of the same name follows
                        trace!(%failure, "session cookie rejected");
                        continue;
                    }
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match session_from_headers(&parts.headers, state) {
            Some(claims) => Ok(CurrentUser::from(claims)),
            None => Err(Error::Unauthenticated { message: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::auth::session::issue;
    use crate::test_utils::{create_test_app_state, create_test_identity};
    use axum::extract::FromRequestParts as _;

    fn parts_with_cookie(cookie: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header("cookie", cookie)
            .body(())
            .unwrap();
        let (parts, _body) = request.into_parts();
        parts
    }

    #[tokio::test]
    async fn test_valid_cookie_extracts_user() {
        let state = create_test_app_state();
        let identity = create_test_identity(Role::Student);
        let token = issue(&identity, &state.session_keys).unwrap();

        let cookie_name = &state.config.auth.session.cookie_name;
        let mut parts = parts_with_cookie(&format!("theme=dark; {cookie_name}={token}"));

        let user = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.id, identity.id);
        assert_eq!(user.role, Role::Student);
    }

    #[tokio::test]
    async fn test_missing_cookie_is_unauthenticated() {
        let state = create_test_app_state();
        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        let error = result.unwrap_err();
        assert_eq!(error.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_cookie_is_unauthenticated() {
        let state = create_test_app_state();
        let cookie_name = state.config.auth.session.cookie_name.clone();
        let mut parts = parts_with_cookie(&format!("{cookie_name}=garbage-token"));

        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_other_cookies_are_ignored() {
        let state = create_test_app_state();
        let mut parts = parts_with_cookie("unrelated=value; another=thing");

        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        assert!(result.is_err());
    }
}
