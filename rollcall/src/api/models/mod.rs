//! API request and response data models.
//!
//! Data structures used for HTTP request deserialization and response
//! serialization; distinct from the store records so the API contract and
//! the storage representation can evolve independently.
//!
//! - [`users`]: roles and the authenticated-caller view
//! - [`auth`]: login/logout payloads and cookie-bearing responses

pub mod auth;
pub mod users;
