use diesel::{prelude::*, sql_query, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub mod config;
pub mod error;
pub mod models;
pub mod schema;
pub mod seed;
pub mod serializer;
pub mod service;

pub use error::CatalogError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Opens a SQLite connection with foreign-key enforcement switched on, which
/// SQLite leaves off by default.
pub fn establish_connection(database_url: &str) -> Result<SqliteConnection, CatalogError> {
    let mut conn = SqliteConnection::establish(database_url)?;
    sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;
    Ok(conn)
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<usize, CatalogError> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| CatalogError::Migration(err.to_string()))?;
    Ok(applied.len())
}

#[cfg(test)]
pub(crate) fn test_connection() -> SqliteConnection {
    let mut conn = establish_connection(":memory:").unwrap();
    run_migrations(&mut conn).unwrap();
    conn
}
