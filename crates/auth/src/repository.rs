use super::*;
use hh_core::Error;
use hh_core::ID;
use hh_core::Unique;
use hh_database::*;
use std::sync::Arc;
use tokio_postgres::Client;
use tokio_postgres::Row;

/// Credential store operations.
/// Abstracts SQL from handlers; usernames are compared normalized.
#[async_trait::async_trait]
pub trait Credentials: Send + Sync {
    async fn lookup(&self, username: &str) -> Result<Option<(Member, String)>, Error>;
    async fn member(&self, id: ID<Member>) -> Result<Option<Member>, Error>;
    async fn members(&self) -> Result<Vec<Member>, Error>;
    async fn hashword(&self, id: ID<Member>) -> Result<Option<String>, Error>;
    async fn create(&self, member: &Member, hashword: &str) -> Result<(), Error>;
    /// Display name and admin flag, plus the digest when one is given, in one write.
    async fn update(&self, member: &Member, hashword: Option<&str>) -> Result<(), Error>;
    async fn rehash(&self, id: ID<Member>, hashword: &str) -> Result<(), Error>;
    async fn delete(&self, id: ID<Member>) -> Result<bool, Error>;
    async fn headcount(&self) -> Result<usize, Error>;
}

fn member_from_row(row: &Row) -> Member {
    Member::restore(
        ID::from(row.get::<_, uuid::Uuid>("id")),
        row.get::<_, String>("username"),
        row.get::<_, String>("display"),
        row.get::<_, bool>("is_admin"),
        row.get::<_, chrono::DateTime<chrono::Utc>>("created_at"),
    )
}

#[async_trait::async_trait]
impl Credentials for Arc<Client> {
    async fn lookup(&self, username: &str) -> Result<Option<(Member, String)>, Error> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, username, display, is_admin, created_at, hashword FROM ",
                USERS,
                " WHERE username = $1"
            ),
            &[&hh_core::normalize(username)],
        )
        .await
        .map(|opt| opt.map(|ref row| (member_from_row(row), row.get::<_, String>("hashword"))))
        .map_err(fail)
    }

    async fn member(&self, id: ID<Member>) -> Result<Option<Member>, Error> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, username, display, is_admin, created_at FROM ",
                USERS,
                " WHERE id = $1"
            ),
            &[&id.inner()],
        )
        .await
        .map(|opt| opt.as_ref().map(member_from_row))
        .map_err(fail)
    }

    async fn members(&self) -> Result<Vec<Member>, Error> {
        self.query(
            const_format::concatcp!(
                "SELECT id, username, display, is_admin, created_at FROM ",
                USERS,
                " ORDER BY created_at"
            ),
            &[],
        )
        .await
        .map(|rows| rows.iter().map(member_from_row).collect())
        .map_err(fail)
    }

    async fn hashword(&self, id: ID<Member>) -> Result<Option<String>, Error> {
        self.query_opt(
            const_format::concatcp!("SELECT hashword FROM ", USERS, " WHERE id = $1"),
            &[&id.inner()],
        )
        .await
        .map(|opt| opt.map(|row| row.get::<_, String>(0)))
        .map_err(fail)
    }

    async fn create(&self, member: &Member, hashword: &str) -> Result<(), Error> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                USERS,
                " (id, username, display, hashword, is_admin, created_at) VALUES ($1, $2, $3, $4, $5, $6)"
            ),
            &[
                &member.id().inner(),
                &member.username(),
                &member.display(),
                &hashword,
                &member.is_admin(),
                &member.created(),
            ],
        )
        .await
        .map(|_| ())
        .map_err(|e| match fail(e) {
            Error::Conflict(_) => {
                Error::conflict(format!("username '{}' is already taken", member.username()))
            }
            other => other,
        })
    }

    async fn update(&self, member: &Member, hashword: Option<&str>) -> Result<(), Error> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                USERS,
                " SET display = $2, is_admin = $3, hashword = COALESCE($4, hashword) WHERE id = $1"
            ),
            &[
                &member.id().inner(),
                &member.display(),
                &member.is_admin(),
                &hashword,
            ],
        )
        .await
        .map(|_| ())
        .map_err(fail)
    }

    async fn rehash(&self, id: ID<Member>, hashword: &str) -> Result<(), Error> {
        self.execute(
            const_format::concatcp!("UPDATE ", USERS, " SET hashword = $2 WHERE id = $1"),
            &[&id.inner(), &hashword],
        )
        .await
        .map(|_| ())
        .map_err(fail)
    }

    async fn delete(&self, id: ID<Member>) -> Result<bool, Error> {
        self.execute(
            const_format::concatcp!("DELETE FROM ", USERS, " WHERE id = $1"),
            &[&id.inner()],
        )
        .await
        .map(|n| n > 0)
        .map_err(fail)
    }

    async fn headcount(&self) -> Result<usize, Error> {
        self.query_one(const_format::concatcp!("SELECT COUNT(*) FROM ", USERS), &[])
            .await
            .map(|row| row.get::<_, i64>(0) as usize)
            .map_err(fail)
    }
}
