//! Core identifiers, constants, and error taxonomy for the housing tracker.
//!
//! This crate provides the foundational types and configuration parameters
//! used throughout the workspace.
mod error;

pub use error::*;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Parse a path segment; malformed ids are simply absent.
    pub fn parse(s: &str) -> Option<Self> {
        Self::try_from(s).ok()
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> TryFrom<&str> for ID<T> {
    type Error = uuid::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        uuid::Uuid::parse_str(s).map(Self::from)
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Hash for ID<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state)
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ID({})", self.inner)
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.serialize(serializer)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        uuid::Uuid::deserialize(deserializer).map(Self::from)
    }
}

impl<T> Arbitrary for ID<T> {
    fn random() -> Self {
        use rand::Rng;
        Self::from(uuid::Uuid::from_u128(rand::rng().random()))
    }
}

// ============================================================================
// SESSIONS
// ============================================================================
/// Lifetime of an issued session token and of the cookie carrying it.
pub const SESSION_TTL: std::time::Duration = std::time::Duration::from_secs(7 * 24 * 60 * 60);
/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "housing_session";
/// Route of the login page that unauthenticated page requests are sent to.
pub const LOGIN_PAGE: &str = "/login";

// ============================================================================
// CREDENTIALS
// ============================================================================
/// Fixed work factor for password hashing (Argon2 time cost).
pub const HASH_WORK_FACTOR: u32 = 12;
/// Shortest password accepted on any write path.
pub const MIN_PASSWORD_LEN: usize = 8;
/// Username length bounds after normalization.
pub const MIN_USERNAME_LEN: usize = 2;
pub const MAX_USERNAME_LEN: usize = 32;

// ============================================================================
// LISTINGS
// ============================================================================
/// Largest single photo accepted by the object store (10 MB).
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;
/// Most files accepted in one photo upload.
pub const MAX_PHOTOS_PER_UPLOAD: usize = 10;
/// Most bytes buffered across all files of one photo upload (50 MB).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
/// Inclusive range for AI and manual listing scores.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;
/// Inclusive range for area preference ratings.
pub const RATING_MIN: i16 = 1;
pub const RATING_MAX: i16 = 5;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Current Unix time in whole seconds.
pub fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Normalize a username for storage and lookup.
pub fn normalize(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", now())).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate termination.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("interrupt received, exiting immediately");
            std::process::exit(0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_parses_its_display() {
        let id = ID::<()>::default();
        assert_eq!(ID::<()>::try_from(id.to_string().as_str()).unwrap(), id);
        assert!(ID::<()>::try_from("not-a-uuid").is_err());
    }

    #[test]
    fn usernames_normalize_to_lowercase() {
        assert_eq!(normalize("  Henry "), "henry");
        assert_eq!(normalize("henry"), normalize("HENRY"));
    }

    #[test]
    fn session_lasts_one_week() {
        assert_eq!(SESSION_TTL.as_secs(), 604800);
    }
}
