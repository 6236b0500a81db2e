//! Test context for unified test setup

use std::sync::Arc;

use tempfile::TempDir;
use event_manager::config::{DatabaseBackend, Settings};
use event_manager::database::{DatabaseService, MemoryStore};
use event_manager::services::{LocalObjectStorage, ServiceFactory};

/// Knobs for a test context
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub max_list_results: usize,
    pub request_timeout_seconds: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            max_list_results: 1000,
            request_timeout_seconds: 5,
        }
    }
}

/// Services wired over a fresh in-process store
pub struct TestContext {
    pub store: MemoryStore,
    pub database: DatabaseService,
    pub services: ServiceFactory,
    pub settings: Settings,
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::new_with_config(TestConfig::default())
    }

    pub fn new_with_config(config: TestConfig) -> Self {
        crate::helpers::init_test_logging();

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let settings = Self::create_test_settings(&config, &temp_dir);

        let store = MemoryStore::new();
        let database = DatabaseService::from_memory(store.clone());
        let storage = Arc::new(LocalObjectStorage::new(&settings.storage));
        let services = ServiceFactory::new(&database, &settings, storage);

        Self {
            store,
            database,
            services,
            settings,
            temp_dir,
        }
    }

    fn create_test_settings(config: &TestConfig, temp_dir: &TempDir) -> Settings {
        let mut settings = Settings::default();
        settings.database.backend = DatabaseBackend::Memory;
        settings.service.max_list_results = config.max_list_results;
        settings.service.request_timeout_seconds = config.request_timeout_seconds;
        settings.storage.upload_dir = temp_dir.path().join("uploads").to_string_lossy().to_string();
        settings.storage.public_base_url = "https://cdn.test/uploads".to_string();
        settings.logging.file_path = temp_dir.path().join("test.log").to_string_lossy().to_string();
        settings
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
