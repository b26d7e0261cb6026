use super::*;

/// Schema metadata for PostgreSQL tables.
///
/// All methods return `&'static str` so DDL can be assembled at compile time
/// via [`const_format::concatcp!`]. The trait performs no I/O; see
/// [`install`] for applying it.
pub trait Schema {
    /// Returns the table name in the database.
    fn name() -> &'static str;
    /// Returns `CREATE TABLE IF NOT EXISTS` DDL statement.
    fn creates() -> &'static str;
    /// Returns `CREATE INDEX IF NOT EXISTS` statements for all indices.
    fn indices() -> &'static str;
}

/// Create the table and indices for `T` if they do not exist yet.
pub async fn install<T: Schema>(client: &Client) -> Result<(), PgErr> {
    log::debug!("installing table {}", T::name());
    client.batch_execute(T::creates()).await?;
    client.batch_execute(T::indices()).await?;
    Ok(())
}
