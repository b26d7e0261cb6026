use super::*;
use hh_core::Arbitrary;
use hh_core::ID;
use hh_core::Unique;

/// Identity carried inside a session token.
///
/// Claims are never mutated once issued; a new login issues new claims.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: uuid::Uuid,
    pub username: String,
    pub is_admin: bool,
    pub exp: i64,
}

impl Claims {
    pub fn new(member: &Member) -> Self {
        Self::issued(member, hh_core::now())
    }
    /// Claims for `member` as if issued at unix time `iat`.
    pub fn issued(member: &Member, iat: i64) -> Self {
        Self {
            user_id: member.id().inner(),
            username: member.username().to_string(),
            is_admin: member.is_admin(),
            exp: iat + hh_core::SESSION_TTL.as_secs() as i64,
        }
    }
    /// Expiry is inclusive: a token is dead at its `exp` instant.
    pub fn expired(&self, now: i64) -> bool {
        now >= self.exp
    }
    pub fn user(&self) -> ID<Member> {
        ID::from(self.user_id)
    }
    pub fn username(&self) -> &str {
        &self.username
    }
    pub fn admin(&self) -> bool {
        self.is_admin
    }
}

impl Arbitrary for Claims {
    fn random() -> Self {
        use rand::Rng;
        let ref mut rng = rand::rng();
        let username = (0..rng.random_range(2..16))
            .map(|_| rng.random_range(b'a'..=b'z') as char)
            .collect();
        Self {
            user_id: ID::<Member>::random().inner(),
            username,
            is_admin: rng.random_bool(0.5),
            exp: hh_core::now() + rng.random_range(60..hh_core::SESSION_TTL.as_secs() as i64),
        }
    }
}
