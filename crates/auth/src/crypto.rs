use super::*;

/// Session token codec: HS256-signed JWTs over [`Claims`].
///
/// The secret is injected once at startup. Verification never reports why a
/// token was rejected.
pub struct Crypto {
    encoding: jsonwebtoken::EncodingKey,
    decoding: jsonwebtoken::DecodingKey,
    validation: jsonwebtoken::Validation,
}

impl Crypto {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        // expiry is checked against an explicit clock in `decode_at`
        validation.validate_exp = false;
        validation.leeway = 0;
        Self {
            encoding: jsonwebtoken::EncodingKey::from_secret(secret),
            decoding: jsonwebtoken::DecodingKey::from_secret(secret),
            validation,
        }
    }
    pub fn encode(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256);
        jsonwebtoken::encode(&header, claims, &self.encoding)
    }
    pub fn decode(&self, token: &str) -> Option<Claims> {
        self.decode_at(token, hh_core::now())
    }
    /// Decode as of unix time `now`. Bad signature, wrong shape, and expiry
    /// all collapse to `None`.
    pub fn decode_at(&self, token: &str, now: i64) -> Option<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .ok()
            .map(|data| data.claims)
            .filter(|claims| !claims.expired(now))
    }
    pub const fn duration() -> std::time::Duration {
        hh_core::SESSION_TTL
    }
}
