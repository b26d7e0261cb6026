use hh_core::ID;
use hh_core::Unique;

/// Household member as stored in the credential table.
/// The password digest never lives on this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    id: ID<Self>,
    username: String,
    display: String,
    admin: bool,
    created: chrono::DateTime<chrono::Utc>,
}

impl Member {
    pub fn new(id: ID<Self>, username: String, display: String, admin: bool) -> Self {
        Self::restore(id, username, display, admin, chrono::Utc::now())
    }
    pub fn restore(
        id: ID<Self>,
        username: String,
        display: String,
        admin: bool,
        created: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            id,
            username: hh_core::normalize(&username),
            display,
            admin,
            created,
        }
    }
    pub fn username(&self) -> &str {
        &self.username
    }
    pub fn display(&self) -> &str {
        &self.display
    }
    pub fn is_admin(&self) -> bool {
        self.admin
    }
    pub fn created(&self) -> chrono::DateTime<chrono::Utc> {
        self.created
    }
    pub fn rename(&mut self, display: String) {
        self.display = display;
    }
    pub fn promote(&mut self, admin: bool) {
        self.admin = admin;
    }
}

impl Unique for Member {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hh_database::*;

    /// Schema implementation for Member (users table).
    /// Note: hashword is a database-only field, not part of Member domain type.
    impl Schema for Member {
        fn name() -> &'static str {
            USERS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                USERS,
                " (
                    id          UUID PRIMARY KEY,
                    username    VARCHAR(32) UNIQUE NOT NULL,
                    display     VARCHAR(64) NOT NULL,
                    hashword    TEXT NOT NULL,
                    is_admin    BOOLEAN NOT NULL DEFAULT FALSE,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_users_username ON ",
                USERS,
                " (username);"
            )
        }
    }
}
