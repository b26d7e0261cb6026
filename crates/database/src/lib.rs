//! PostgreSQL connectivity for the housing tracker.
//!
//! ## Connectivity
//!
//! - [`db()`] — Establishes a database connection from a URL
//!
//! ## Schema
//!
//! - [`Schema`] — Table metadata and DDL generation
//! - [`install()`] — Creates a table and its indices if missing
//! - [`Check`] — Row counts logged at startup
//!
//! ## Errors
//!
//! - [`fail()`] — Classifies driver errors into the shared taxonomy
//!
//! ## Table Names
//!
//! Constants for all persistent entities.
mod check;
mod schema;

pub use check::*;
pub use schema::*;

use hh_core::Error;
use std::sync::Arc;
use tokio_postgres::Client;
use tokio_postgres::error::SqlState;

/// Establishes a database connection.
///
/// Returns an `Arc<Client>` suitable for sharing across async tasks.
/// The connection future is driven on a spawned task and logs when it ends.
pub async fn db(url: &str) -> anyhow::Result<Arc<Client>> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok(Arc::new(client))
}

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Classify a driver error. Unique violations surface as conflicts,
/// everything else is an internal failure.
pub fn fail(e: PgErr) -> Error {
    match e.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => Error::conflict("already exists"),
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
            Error::missing("referenced record does not exist")
        }
        _ => Error::internal(e.to_string()),
    }
}

/// Table for household member credentials.
#[rustfmt::skip]
pub const USERS:       &str = "users";
/// Table for rental listings.
#[rustfmt::skip]
pub const LISTINGS:    &str = "listings";
/// Table for scheduled and completed viewings.
#[rustfmt::skip]
pub const VIEWINGS:    &str = "viewings";
/// Table for member notes on listings.
#[rustfmt::skip]
pub const NOTES:       &str = "notes";
/// Table for AI and manual listing scores.
#[rustfmt::skip]
pub const SCORES:      &str = "scores";
/// Table for per-member search preferences.
#[rustfmt::skip]
pub const PREFERENCES: &str = "preferences";
/// Table for per-member neighbourhood ratings.
#[rustfmt::skip]
pub const AREAS:       &str = "areas";
/// Single-row table for the shared household budget.
#[rustfmt::skip]
pub const BUDGET:      &str = "budget";
