use super::*;

/// Paths reachable without a session.
const PUBLIC: &[&str] = &[hh_core::LOGIN_PAGE, "/api/auth/login", "/api/auth/logout"];
/// Path prefixes served without a session.
const ASSET_PREFIXES: &[&str] = &["/static/", "/assets/", "/_internal/"];
/// File extensions treated as static assets.
const ASSET_EXTENSIONS: &[&str] = &[
    "css", "js", "map", "ico", "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "woff",
    "woff2", "ttf", "txt", "webmanifest",
];

/// Header carrying the verified user id downstream.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the verified username downstream.
pub const USERNAME_HEADER: &str = "x-username";
/// Header carrying the verified admin flag downstream.
pub const ADMIN_HEADER: &str = "x-user-admin";
/// Identity headers stripped from every inbound request before gating.
pub const IDENTITY_HEADERS: [&str; 3] = [USER_ID_HEADER, USERNAME_HEADER, ADMIN_HEADER];

/// Public mount of uploaded photos, served without a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploads(String);

impl Uploads {
    pub fn new(url: &str) -> Self {
        Self(format!("/{}/", url.trim_matches('/')))
    }
    /// A mount at the site root would open every path, so it covers nothing.
    fn covers(&self, path: &str) -> bool {
        self.0 != "//" && path.starts_with(&self.0)
    }
}

impl Default for Uploads {
    fn default() -> Self {
        Self::new("/uploads")
    }
}

/// How a request path is treated by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Public,
    Asset,
    Page,
    Api,
}

impl Route {
    pub fn classify(path: &str, uploads: &Uploads) -> Self {
        if PUBLIC.contains(&path) {
            Self::Public
        } else if uploads.covers(path) || ASSET_PREFIXES.iter().any(|p| path.starts_with(p)) {
            Self::Asset
        } else if path
            .rsplit('/')
            .next()
            .and_then(|file| file.rsplit_once('.'))
            .is_some_and(|(stem, ext)| {
                !stem.is_empty() && ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
            })
        {
            Self::Asset
        } else if path == "/api" || path.starts_with("/api/") {
            Self::Api
        } else {
            Self::Page
        }
    }
}

/// Outcome of gating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Public or static path; forwarded without identity.
    Open,
    /// Valid session; forwarded with these claims.
    Admit(Claims),
    /// Page route without a valid session; send to the login page.
    Redirect,
    /// API route without a valid session; answer 401.
    Deny,
}

/// Decide what happens to a request for `path` carrying `token` at `now`.
/// Pure: no state is read or kept between calls.
pub fn gate(
    path: &str,
    uploads: &Uploads,
    token: Option<&str>,
    crypto: &Crypto,
    now: i64,
) -> Verdict {
    let route = Route::classify(path, uploads);
    match route {
        Route::Public | Route::Asset => Verdict::Open,
        Route::Page | Route::Api => match token.and_then(|t| crypto.decode_at(t, now)) {
            Some(claims) => Verdict::Admit(claims),
            None if route == Route::Api => Verdict::Deny,
            None => Verdict::Redirect,
        },
    }
}
