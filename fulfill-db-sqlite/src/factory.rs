use std::path::PathBuf;

use async_trait::async_trait;
use fulfill_core::db::{DbConfig, FulfillmentRepository, RepositoryError, RepositoryFactory};

use crate::repository::SqliteRepository;

/// Environment variable that overrides where seed SQL is read from.
pub const SEEDS_DIR_ENV: &str = "FULFILL_DB_SQLITE_SEEDS_DIR";

/// Finds the seed SQL directory.
///
/// Checked in order: [`SEEDS_DIR_ENV`], `./seeds` in the working directory,
/// then the `seeds` directory next to this crate's manifest.
pub fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(SEEDS_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// The `"sqlite"` backend.
///
/// ```rust,no_run
/// use fulfill_core::db::RepositoryRegistry;
/// use fulfill_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// `config.connection_string` is a file path (created when missing) or
    /// `":memory:"`. Migrations and seeds run before the repository is returned.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn FulfillmentRepository>, RepositoryError> {
        let repo = SqliteRepository::open(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        repo.run_seeds(&seeds_dir())
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use fulfill_core::DEFAULT_RATE_CARD;
    use fulfill_core::db::{DbConfig, RepositoryFactory};
    use pretty_assertions::assert_eq;

    use super::SqliteRepositoryFactory;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn in_memory_repository_is_seeded() {
        let repo = SqliteRepositoryFactory
            .create(&DbConfig::default())
            .await
            .expect("failed to create in-memory repository");

        assert_eq!(
            repo.list_rate_cards().await.unwrap(),
            vec![DEFAULT_RATE_CARD.to_string()]
        );
    }

    #[tokio::test]
    async fn file_database_is_created_when_missing() {
        let dir = std::env::temp_dir().join(format!("fulfill-db-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fresh.db");
        let _ = std::fs::remove_file(&path);

        let config = DbConfig::sqlite_file(path.to_string_lossy());
        let result = SqliteRepositoryFactory.create(&config).await;

        assert!(result.is_ok(), "failed to open file database: {:#?}", result.err());
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
