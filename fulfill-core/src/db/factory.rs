use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::repository::{FulfillmentRepository, RepositoryError};

/// Which storage backend to open and how to reach it.
///
/// `backend` selects a registered [`RepositoryFactory`]; `connection_string`
/// is handed to that factory as-is.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `sqlite`   | `fulfillment.db`, `:memory:`        |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

impl DbConfig {
    /// A SQLite database stored in the file at `path`.
    pub fn sqlite_file(path: impl Into<String>) -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: path.into(),
        }
    }
}

/// Opens repositories for one backend. Backend crates export one of these.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Connects, prepares the schema and returns the repository.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn FulfillmentRepository>, RepositoryError>;
}

/// Backend factories keyed by name.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a factory, replacing any factory registered under the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names in alphabetical order.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens a repository with the factory named by `config.backend`.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Configuration`] when no factory has that name,
    /// otherwise whatever the factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn FulfillmentRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        info!(backend = %config.backend, "opening repository");
        factory.create(config).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::models::{
        CustomRequirementsState, NewQuoteRequest, QuoteRequest, RateCard,
        StandardFulfillmentState,
    };

    use super::{
        DbConfig, FulfillmentRepository, RepositoryError, RepositoryFactory, RepositoryRegistry,
    };

    // Routing tests never touch the repository itself.
    struct StubRepository;

    #[async_trait]
    impl FulfillmentRepository for StubRepository {
        async fn get_rate_card(
            &self,
            _name: &str,
        ) -> Result<RateCard, RepositoryError> {
            unimplemented!()
        }
        async fn list_rate_cards(&self) -> Result<Vec<String>, RepositoryError> {
            unimplemented!()
        }
        async fn save_rate_card(
            &self,
            _card: &RateCard,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn delete_rate_card(
            &self,
            _name: &str,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn load_standard_fulfillment(
            &self
        ) -> Result<Option<StandardFulfillmentState>, RepositoryError> {
            unimplemented!()
        }
        async fn save_standard_fulfillment(
            &self,
            _state: &StandardFulfillmentState,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn load_custom_requirements(
            &self
        ) -> Result<Option<CustomRequirementsState>, RepositoryError> {
            unimplemented!()
        }
        async fn save_custom_requirements(
            &self,
            _state: &CustomRequirementsState,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn create_quote_request(
            &self,
            _request: NewQuoteRequest,
        ) -> Result<QuoteRequest, RepositoryError> {
            unimplemented!()
        }
        async fn get_quote_request(
            &self,
            _id: i64,
        ) -> Result<QuoteRequest, RepositoryError> {
            unimplemented!()
        }
        async fn list_quote_requests(&self) -> Result<Vec<QuoteRequest>, RepositoryError> {
            unimplemented!()
        }
        async fn delete_quote_request(
            &self,
            _id: i64,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
    }

    /// Records whether `create` was reached.
    struct StubFactory {
        name: &'static str,
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl RepositoryFactory for StubFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn FulfillmentRepository>, RepositoryError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Box::new(StubRepository))
        }
    }

    struct FailingFactory;

    #[async_trait]
    impl RepositoryFactory for FailingFactory {
        fn backend_name(&self) -> &'static str {
            "failing"
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn FulfillmentRepository>, RepositoryError> {
            Err(RepositoryError::Connection("disk unavailable".to_string()))
        }
    }

    fn stub_factory(name: &'static str) -> (Box<dyn RepositoryFactory>, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Box::new(StubFactory {
                name,
                called: flag.clone(),
            }),
            flag,
        )
    }

    fn config(backend: &str) -> DbConfig {
        DbConfig {
            backend: backend.to_string(),
            connection_string: ":memory:".to_string(),
        }
    }

    // ── DbConfig ─────────────────────────────────────────────────────────
    #[test]
    fn default_config_is_in_memory_sqlite() {
        let cfg = DbConfig::default();
        assert_eq!(cfg.backend, "sqlite");
        assert_eq!(cfg.connection_string, ":memory:");
    }

    #[test]
    fn sqlite_file_points_at_path() {
        let cfg = DbConfig::sqlite_file("fulfillment.db");
        assert_eq!(cfg.backend, "sqlite");
        assert_eq!(cfg.connection_string, "fulfillment.db");
    }

    // ── registration ─────────────────────────────────────────────────────
    #[test]
    fn new_registry_has_no_backends() {
        assert!(RepositoryRegistry::new().available_backends().is_empty());
    }

    #[test]
    fn backends_are_listed_alphabetically() {
        let mut reg = RepositoryRegistry::new();
        let (f1, _) = stub_factory("sqlite");
        let (f2, _) = stub_factory("postgres");
        reg.register(f1);
        reg.register(f2);
        assert_eq!(reg.available_backends(), vec!["postgres", "sqlite"]);
    }

    #[test]
    fn registering_same_name_twice_keeps_one_entry() {
        let mut reg = RepositoryRegistry::new();
        let (old, _) = stub_factory("sqlite");
        let (new, _) = stub_factory("sqlite");
        reg.register(old);
        reg.register(new);
        assert_eq!(reg.available_backends(), vec!["sqlite"]);
    }

    // ── dispatch ─────────────────────────────────────────────────────────
    #[tokio::test]
    async fn create_routes_to_named_backend_only() {
        let mut reg = RepositoryRegistry::new();
        let (sqlite, sqlite_called) = stub_factory("sqlite");
        let (postgres, postgres_called) = stub_factory("postgres");
        reg.register(sqlite);
        reg.register(postgres);

        let result = reg.create(&config("sqlite")).await;

        assert!(result.is_ok(), "expected Ok, got {:#?}", result.err());
        assert!(sqlite_called.load(Ordering::SeqCst));
        assert!(!postgres_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unknown_backend_error_names_requested_and_available() {
        let mut reg = RepositoryRegistry::new();
        let (f, _) = stub_factory("sqlite");
        reg.register(f);

        match reg.create(&config("postgres")).await {
            Err(RepositoryError::Configuration(msg)) => {
                assert!(msg.contains("postgres"));
                assert!(msg.contains("sqlite"));
            }
            Err(other) => panic!("expected Configuration error, got {other:#?}"),
            Ok(_) => panic!("expected Configuration error, got a repository"),
        }
    }

    #[tokio::test]
    async fn factory_errors_are_passed_through() {
        let mut reg = RepositoryRegistry::new();
        reg.register(Box::new(FailingFactory));

        match reg.create(&config("failing")).await {
            Err(err) => assert_eq!(
                err,
                RepositoryError::Connection("disk unavailable".to_string())
            ),
            Ok(_) => panic!("expected the factory error"),
        }
    }
}
