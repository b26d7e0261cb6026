//! Authentication and the request gate.
//!
//! Self-contained HS256 session tokens with Argon2id password hashing. There
//! is no server-side session table; a token is valid until it expires.
//!
//! ## Identity
//!
//! - [`Member`] — Household member record (the digest is stored separately)
//! - [`Claims`] — Token payload: user id, username, admin flag, expiry
//!
//! ## Security
//!
//! - [`Crypto`] — Token signing and verification
//! - [`password`] — Argon2id hashing and verification
//! - [`gate()`] — Allow / redirect / deny decision for one request
//!
//! ## HTTP (feature `server`)
//!
//! - [`SessionCookie`] — Cookie carrier for the token
//! - [`gatekeeper`] — Middleware applying the gate to every request
//! - [`Auth`], [`Admin`], [`MaybeAuth`] — Extractors that re-verify the cookie
mod claims;
mod crypto;
mod dto;
mod gate;
mod member;
pub mod password;

pub use claims::*;
pub use crypto::*;
pub use dto::*;
pub use gate::*;
pub use member::*;

#[cfg(feature = "database")]
mod repository;
#[cfg(feature = "database")]
pub use repository::*;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod middleware;
#[cfg(feature = "server")]
mod session;
#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use middleware::*;
#[cfg(feature = "server")]
pub use session::*;
