//! Household housing-search tracker.
//!
//! This facade crate re-exports all public crates for convenient access.
//!
//! ## Crate Organization
//!
//! - [`core`] — Identifiers, constants, the shared error taxonomy
//! - [`database`] — PostgreSQL connectivity and schema installation
//! - [`auth`] — Password hashing, session tokens, cookies, and the request gate
//! - [`listings`] — Listings, viewings, notes, scores, preferences, budget
//! - [`integrations`] — Geocoding, page scraping, object storage
//! - [`server`] — HTTP routes and configuration

pub use hh_core         as core;
pub use hh_database     as database;
pub use hh_auth         as auth;
pub use hh_listings     as listings;
pub use hh_integrations as integrations;
pub use hh_server       as server;

pub use hh_core::*;
