//! Test database setup
#![allow(dead_code)]

use sea_orm::{DatabaseConnection, DbErr};
use tempfile::TempDir;

/// A fresh SQLite database with the full schema. The file lives in a
/// temporary directory that is removed when this is dropped.
pub struct TestDatabase {
    pub conn: DatabaseConnection,
    _dir: TempDir,
}

/// Set up an empty database for one test.
pub async fn setup_test_database() -> Result<TestDatabase, DbErr> {
    let dir = tempfile::tempdir().map_err(|e| DbErr::Custom(format!("tempdir: {}", e)))?;
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.sqlite3").display());

    let conn = moviedb::db::connect(&url).await?;
    moviedb::db::create_schema(&conn).await?;

    Ok(TestDatabase { conn, _dir: dir })
}
