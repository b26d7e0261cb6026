//! Thin wrappers around third-party services.
//!
//! Geocoding and scraping are best-effort: failures are logged and surface
//! as missing data, never as errors. Photo storage validates its input and
//! reports failures through [`hh_core::Error`].
//!
//! - [`Geocoder`] / [`Nominatim`] — Address to coordinates
//! - [`Scraper`] / [`HttpScraper`] — Listing page metadata
//! - [`ObjectStore`] / [`Disk`] — Photo storage
mod geocoder;
mod scraper;
mod store;

pub use geocoder::*;
pub use scraper::*;
pub use store::*;
