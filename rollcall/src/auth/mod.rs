//! Authentication and authorization.
//!
//! The subsystem splits into four pieces, wired together in `lib.rs`:
//!
//! - [`resolver`]: turns a login request into an authenticated identity,
//!   with tier isolation between the email and student-id namespaces
//! - [`password`]: argon2id hashing and verification
//! - [`session`]: signed, time-bound session tokens and their verification
//! - [`gate`]: per-request route authorization over verified claims
//! - [`current_user`]: the session-cookie extractor for handlers
//!
//! Login issues a token from a resolved identity; every later request is
//! checked by the gate against the token alone. The credential store is
//! consulted at login only, so a role change takes effect on the next
//! login rather than on in-flight sessions.

pub mod current_user;
pub mod gate;
pub mod password;
pub mod resolver;
pub mod session;
