use std::sync::Arc;
use std::time::Duration;

use crate::auth::session::SessionStore;
use crate::config::{BackendMode, Config};
use crate::error::ClientResult;
use crate::gateway::Gateway;
use crate::repository::{
    AuthRepository, DonationRepository, HttpBackend, MemoryBackend, ThreadRepository,
    UserRepository,
};

/// Repository handles shared by every flow. Both fields of a pair point at
/// the same backend instance.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthRepository>,
    pub users: Arc<dyn UserRepository>,
    pub threads: Arc<dyn ThreadRepository>,
    pub donations: Arc<dyn DonationRepository>,
}

impl Backend {
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        match config.backend.mode {
            BackendMode::Http => {
                let gateway = Gateway::new(
                    &config.api.base_url,
                    Duration::from_secs(config.api.timeout_secs),
                )?;
                tracing::info!("Using API at {}", gateway.base_url());
                Ok(Self::shared(HttpBackend::new(gateway)))
            }
            BackendMode::Memory => {
                tracing::info!("Using in-memory backend");
                let delay = Duration::from_millis(config.donation.processing_delay_ms);
                Ok(Self::shared(
                    MemoryBackend::seeded().with_processing_delay(delay),
                ))
            }
        }
    }

    pub fn shared<B>(backend: B) -> Self
    where
        B: AuthRepository + UserRepository + ThreadRepository + DonationRepository + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            auth: backend.clone(),
            users: backend.clone(),
            threads: backend.clone(),
            donations: backend,
        }
    }
}

pub struct AppState {
    pub config: Config,
    pub backend: Backend,
    pub session: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> ClientResult<Self> {
        let backend = Backend::from_config(&config)?;
        let session = SessionStore::open(config.session_path())?;
        Ok(Self {
            config,
            backend,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::Session;

    #[tokio::test]
    async fn memory_mode_serves_fixtures_and_opens_session_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.backend.mode = BackendMode::Memory;
        config.session.path = Some(tmp.path().join("session.json"));

        let state = AppState::new(config).unwrap();
        assert_eq!(state.session.path(), Some(tmp.path().join("session.json").as_path()));
        let threads = state
            .backend
            .threads
            .list_threads(&Session::default())
            .await
            .unwrap();
        assert_eq!(threads.len(), 3);
    }

    #[test]
    fn http_mode_rejects_unparseable_api_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(Backend::from_config(&config).is_err());
    }
}
