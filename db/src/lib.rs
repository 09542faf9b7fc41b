pub mod models;
pub mod test_utils;

use sea_orm::{Database, DatabaseConnection, DbErr};
use util::{config, paths};

/// Opens the database named by `DATABASE_PATH`.
///
/// A plain file path is treated as a SQLite database and its parent directory
/// is created first (SQLite won't create intermediate dirs).
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let path_or_url = config::database_path();
    let url = paths::database_url(&path_or_url);
    if !path_or_url.contains("://") && !path_or_url.starts_with("sqlite:") {
        if let Err(e) = paths::ensure_parent_dir(&path_or_url) {
            tracing::warn!(error = %e, path = %path_or_url, "could not create database directory");
        }
    }

    Database::connect(&url).await
}
