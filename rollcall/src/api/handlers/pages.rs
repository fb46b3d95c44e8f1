//! Page handlers for the gated areas.
//!
//! The pages themselves are thin placeholders; the interesting behavior is
//! the gate in front of them. Each handler only proves which area the
//! caller landed in.

use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html("<h1>Rollcall</h1>")
}

pub async fn login() -> Html<&'static str> {
    Html("<h1>Sign in</h1>")
}

pub async fn signup() -> Html<&'static str> {
    Html("<h1>Create your account</h1>")
}

pub async fn home() -> Html<&'static str> {
    Html("<h1>My attendance</h1>")
}

pub async fn dashboard() -> Html<&'static str> {
    Html("<h1>Attendance dashboard</h1>")
}
