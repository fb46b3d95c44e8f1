//! API models for login, logout and session introspection.

use axum::{
    http::header,
    response::{AppendHeaders, IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use super::users::CurrentUser;

/// Body returned by login and logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: CurrentUser,
    pub message: String,
}

/// Successful login: JSON body plus the session cookie.
#[derive(Debug)]
pub struct LoginResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        (AppendHeaders([(header::SET_COOKIE, self.cookie)]), Json(self.auth_response)).into_response()
    }
}

/// Logout acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSuccessResponse {
    pub message: String,
}

/// Logout: JSON body plus the expired cookie that clears the session.
#[derive(Debug)]
pub struct LogoutResponse {
    pub auth_response: AuthSuccessResponse,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        (AppendHeaders([(header::SET_COOKIE, self.cookie)]), Json(self.auth_response)).into_response()
    }
}
