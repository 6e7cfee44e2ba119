use std::time::Duration;

use log::{info, warn};

use crate::connections::{Connector, Endpoint};
use crate::core::context::AppContext;
use crate::core::prompt::Prompter;
use crate::core::session::{ConsoleSession, SessionError};
use crate::storage::{AutocompleteCache, CacheError, CacheLoad, FavoritesStore, LoadStatus, StorageError};

/// Outcome of a successful `connect`. The cache result is reported
/// separately: a failed cache load does not undo the connection.
#[derive(Debug)]
pub struct ConnectReport {
    pub endpoint: Endpoint,
    pub cache: Result<CacheLoad, CacheError>,
}

/// Application context: the one session plus the stores it consults.
pub struct Console {
    context: AppContext,
    session: ConsoleSession,
    favorites: FavoritesStore,
    cache: AutocompleteCache,
}

impl Console {
    /// Ensures the config directory exists and loads the favorites.
    pub fn open(
        context: AppContext,
        connector: Box<dyn Connector>,
        timeout: Option<Duration>,
    ) -> Result<(Self, LoadStatus), StorageError> {
        context.ensure()?;
        let (favorites, status) = FavoritesStore::load(context.settings_path());
        let cache = AutocompleteCache::new(context.config_dir());
        let session = ConsoleSession::new(connector).with_timeout(timeout);
        info!("Using config directory {:?}", context.config_dir());
        Ok((
            Self {
                context,
                session,
                favorites,
                cache,
            },
            status,
        ))
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn session(&self) -> &ConsoleSession {
        &self.session
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesStore {
        &mut self.favorites
    }

    pub fn cache(&self) -> &AutocompleteCache {
        &self.cache
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Connects and loads (or builds) the autocomplete cache for the host.
    pub async fn connect(
        &mut self,
        identifier: &str,
        password: Option<String>,
        port: Option<u16>,
        prompter: &mut dyn Prompter,
    ) -> Result<ConnectReport, SessionError> {
        let endpoint = self
            .session
            .connect(identifier, password, port, &self.favorites, prompter)
            .await?;
        let cache = self.cache.load(&mut self.session).await;
        if let Err(e) = &cache {
            warn!("Autocomplete cache for {} unavailable: {e}", endpoint.address);
        }
        Ok(ConnectReport { endpoint, cache })
    }

    pub fn disconnect(&mut self) -> Option<Endpoint> {
        self.session.disconnect()
    }

    pub async fn dispatch(&mut self, text: &str) -> Result<String, SessionError> {
        self.session.dispatch(text).await
    }

    /// Rebuilds the autocomplete cache from the connected server.
    pub async fn update(&mut self) -> Result<usize, CacheError> {
        self.cache.rebuild(&mut self.session).await
    }

    pub fn search(&self, pattern: &str) -> Result<Vec<&str>, glob::PatternError> {
        self.cache.search(pattern)
    }
}
