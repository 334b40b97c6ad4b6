//! Application state wiring services together.
//!
//! AppState holds the per-user session registry plus the shared read-only
//! services. Services are generic over the port traits, but AppState pins
//! them to the concrete infra implementations.

use std::sync::Arc;

use dashmap::DashMap;
use secrecy::SecretString;

use confab_core::library::LibraryService;
use confab_core::session::service::SessionService;
use confab_infra::completion::HttpCompletionClient;
use confab_infra::config::{AppConfig, load_config};
use confab_infra::resolve_data_dir;
use confab_infra::sqlite::conversation::SqliteConversationRepository;
use confab_infra::sqlite::keyword::SqliteKeywordRepository;
use confab_infra::sqlite::pool::DatabasePool;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteSessionService =
    SessionService<SqliteConversationRepository, HttpCompletionClient>;

pub type ConcreteLibraryService = LibraryService<SqliteKeywordRepository>;

/// Shared application state.
///
/// Each authenticated user gets one session service in the registry,
/// created on mount and dropped on unmount; the library service and the
/// conversation repository are shared read paths.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<DashMap<String, Arc<ConcreteSessionService>>>,
    pub library_service: Arc<ConcreteLibraryService>,
    pub conversation_repo: Arc<SqliteConversationRepository>,
    pub db_pool: DatabasePool,
    pub config: AppConfig,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        // Initialize database
        let db_url = format!("sqlite://{}?mode=rwc", data_dir.join("confab.db").display());
        let db_pool = DatabasePool::new(&db_url).await?;

        let config = load_config(&data_dir).await;

        let library_service = LibraryService::new(SqliteKeywordRepository::new(db_pool.clone()));
        let conversation_repo = SqliteConversationRepository::new(db_pool.clone());

        Ok(Self {
            sessions: Arc::new(DashMap::new()),
            library_service: Arc::new(library_service),
            conversation_repo: Arc::new(conversation_repo),
            db_pool,
            config,
        })
    }

    /// Build a fresh session service for one user's mount.
    ///
    /// Each session owns its own repository handle and completion client;
    /// the underlying pools are shared.
    pub fn new_session_service(&self) -> ConcreteSessionService {
        let repo = SqliteConversationRepository::new(self.db_pool.clone());
        let mut client = HttpCompletionClient::new(self.config.completion.base_url.clone());
        if let Some(env_name) = &self.config.completion.api_key_env
            && let Ok(key) = std::env::var(env_name)
        {
            client = client.with_api_key(SecretString::from(key));
        }
        SessionService::new(repo, client)
    }
}
