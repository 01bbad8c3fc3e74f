//! Database connection utilities.

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::{DbError, run_migrations};

/// Opens (or creates) the `SQLite` database at `path` and applies any
/// pending migrations.
///
/// The parent directory is created if it does not exist yet.
///
/// # Errors
///
/// Returns [`DbError`] if the directory cannot be created, the database
/// cannot be opened, or a migration fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    log::debug!("Opening SQLite database at {}", path.display());
    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Connection(e.to_string()))?;

    run_migrations(db.as_ref()).await?;

    Ok(db)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use switchy_database::Database;

    /// A throwaway database file that is removed on drop.
    pub struct TempDb {
        pub db: Box<dyn Database>,
        path: PathBuf,
    }

    impl TempDb {
        pub async fn new() -> Self {
            let path =
                std::env::temp_dir().join(format!("fire_map_db_test_{}.db", uuid::Uuid::new_v4()));
            let db = super::open_db(&path).await.unwrap();
            Self { db, path }
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
