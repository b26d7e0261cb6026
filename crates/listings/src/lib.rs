//! Household records: the listing pool and everything attached to it.
//!
//! ## Records
//!
//! - [`Listing`] — A rental under consideration, with its [`Status`]
//! - [`Viewing`] — A scheduled visit
//! - [`Note`] — A member's remark on a listing
//! - [`Score`] — AI and manual scores; the override wins
//! - [`Preferences`], [`AreaPreference`] — Per-member search criteria
//! - [`Budget`] — Household spending limit and its [`BudgetView`]
//!
//! ## Input
//!
//! Request bodies deserialize into `*Request` types and are validated into
//! typed inputs before any record is touched.
//!
//! ## Storage (feature `database`)
//!
//! - [`Listings`] — Listing pool repository, including the atomic select
//! - [`Household`] — Preferences and budget repository
mod budget;
mod dto;
mod listing;
mod note;
mod preferences;
mod score;
mod viewing;

pub use budget::*;
pub use dto::*;
pub use listing::*;
pub use note::*;
pub use preferences::*;
pub use score::*;
pub use viewing::*;

#[cfg(feature = "database")]
mod repository;
#[cfg(feature = "database")]
pub use repository::*;
