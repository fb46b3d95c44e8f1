use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, AuthSuccessResponse, LoginResponse, LogoutResponse},
        users::CurrentUser,
    },
    auth::{resolver::LoginRequest, session},
    errors::Error,
};

/// Login with an email or student-id credential.
///
/// All credential failures surface as one generic message; the distinct
/// kind is logged for audit only.
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse, Error> {
    let identity = match state.resolver.resolve(&request).await {
        Ok(identity) => identity,
        Err(failure) => {
            tracing::info!(kind = %failure, "login rejected");
            return Err(failure.into());
        }
    };

    let token = session::issue(&identity, &state.session_keys)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(LoginResponse {
        auth_response: AuthResponse {
            user: CurrentUser::from(identity),
            message: "Login successful".to_string(),
        },
        cookie,
    })
}

/// Logout (clear session)
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse, Error> {
    // Sessions are client-held; logout just expires the cookie
    let cookie = create_clearing_cookie(&state.config);

    Ok(LogoutResponse {
        auth_response: AuthSuccessResponse {
            message: "Logout successful".to_string(),
        },
        cookie,
    })
}

/// Return the verified claims of the current session.
#[tracing::instrument(skip_all)]
pub async fn session(current_user: CurrentUser) -> Json<CurrentUser> {
    Json(current_user)
}

/// Helper function to create a session cookie
fn create_session_cookie(token: &str, config: &crate::config::Config) -> String {
    let session_config = &config.auth.session;
    let secure = if session_config.cookie_secure { "; Secure" } else { "" };

    format!(
        "{}={}; Path=/; HttpOnly{}; SameSite={}; Max-Age={}",
        session_config.cookie_name,
        token,
        secure,
        session_config.cookie_same_site,
        session_config.lifetime.as_secs()
    )
}

/// Expired cookie that clears the session on the client
fn create_clearing_cookie(config: &crate::config::Config) -> String {
    let session_config = &config.auth.session;
    let secure = if session_config.cookie_secure { "; Secure" } else { "" };

    format!(
        "{}=; Path=/; HttpOnly{}; SameSite={}; Max-Age=0",
        session_config.cookie_name, secure, session_config.cookie_same_site
    )
}
