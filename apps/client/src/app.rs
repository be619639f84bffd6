use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::api_client::{ApiClient, ProjectService};
use crate::config::Config;
use crate::notifications::{NotificationCenter, Notifier};
use crate::settings::{Settings, SettingsStore};
use crate::storage::{FileStore, Persistence};
use crate::workspace::{ProjectStore, WorkspaceSync};

/// Every piece of client state, built once at startup and handed to whatever
/// drives the UI. Nothing here is reachable through globals.
pub struct AppState {
    pub config: Config,
    pub persistence: Persistence,
    pub settings: Arc<SettingsStore>,
    pub notifications: Arc<NotificationCenter>,
    pub api: Arc<dyn ProjectService>,
    /// Directory and workspace state; also reachable through `sync.store()`.
    pub projects: Arc<ProjectStore>,
    pub sync: WorkspaceSync,
}

impl AppState {
    /// Builds the state core over the configured storage, talking HTTP to the
    /// backend named in the saved settings.
    pub fn initialize(config: Config) -> Result<Self> {
        let persistence = match &config.storage_path {
            Some(path) => {
                info!("Persisting client state to {}", path.display());
                Persistence::new(Arc::new(FileStore::new(path)))
            }
            None => {
                info!("No storage path configured; client state is in-memory");
                Persistence::in_memory()
            }
        };

        let settings = load_settings(&config, &persistence);
        let api_url = settings.get().api_url;
        let api = ApiClient::with_timeout(api_url.clone(), config.request_timeout())
            .with_context(|| format!("Failed to build API client for {api_url}"))?;
        info!("API client initialized (base url: {})", api.base_url());

        Ok(Self::assemble(config, persistence, settings, Arc::new(api)))
    }

    /// Builds the state core around an already constructed backend.
    pub fn with_service(
        config: Config,
        persistence: Persistence,
        api: Arc<dyn ProjectService>,
    ) -> Self {
        let settings = load_settings(&config, &persistence);
        Self::assemble(config, persistence, settings, api)
    }

    fn assemble(
        config: Config,
        persistence: Persistence,
        settings: Arc<SettingsStore>,
        api: Arc<dyn ProjectService>,
    ) -> Self {
        let notifications = Arc::new(NotificationCenter::with_cap(config.notification_cap));
        let projects = Arc::new(ProjectStore::new(persistence.clone()));
        let sync = WorkspaceSync::new(
            api.clone(),
            projects.clone(),
            notifications.clone() as Arc<dyn Notifier>,
        );

        Self {
            config,
            persistence,
            settings,
            notifications,
            api,
            projects,
            sync,
        }
    }
}

fn load_settings(config: &Config, persistence: &Persistence) -> Arc<SettingsStore> {
    let defaults = Settings {
        api_url: config.api_url.clone(),
        ..Settings::default()
    };
    let store = SettingsStore::new(defaults, persistence.clone());
    let loaded = store.load();
    info!(
        "Settings loaded (model: {}, theme: {:?})",
        loaded.default_model, loaded.theme
    );
    Arc::new(store)
}
