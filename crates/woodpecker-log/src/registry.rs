//! Origin-keyed registry of log clients.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use woodpecker_fetch::ByteFetcher;

use crate::client::{LogClient, LogKind};
use crate::error::LogError;
use crate::identity::LogIdentity;

/// Static description of one log source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSource {
    /// Origin string, also used as the display name and registry key.
    pub origin: String,
    /// Root location: an http(s) or file URL, or a filesystem path.
    pub url: String,
    /// Verifier key string for the log's checkpoints.
    pub key: String,
    /// Layout of the log.
    pub kind: LogKind,
}

/// Immutable map from origin to [`LogClient`], in configuration order.
#[derive(Debug, Default)]
pub struct LogRegistry {
    clients: HashMap<String, Arc<LogClient>>,
    origins: Vec<String>,
}

impl LogRegistry {
    /// Build clients for every source, sharing one HTTP client.
    ///
    /// Fails on the first source with a malformed key or unsupported location.
    pub fn from_sources(sources: &[LogSource], http: reqwest::Client) -> Result<Self, LogError> {
        let mut clients = Vec::with_capacity(sources.len());
        for source in sources {
            let identity =
                LogIdentity::new(&source.origin, &source.key).map_err(|e| LogError::InvalidKey {
                    origin: source.origin.clone(),
                    source: e,
                })?;
            let fetcher = ByteFetcher::with_client(&source.url, http.clone()).map_err(|e| {
                LogError::InvalidLocation {
                    origin: source.origin.clone(),
                    source: e,
                }
            })?;
            info!(origin = %source.origin, root = %fetcher.root(), kind = ?source.kind, "registered log");
            clients.push(LogClient::new(identity, fetcher, source.kind));
        }
        Self::from_clients(clients)
    }

    /// Build a registry from already constructed clients.
    pub fn from_clients(clients: Vec<LogClient>) -> Result<Self, LogError> {
        let mut registry = Self::default();
        for client in clients {
            let origin = client.origin().to_string();
            if registry.clients.contains_key(&origin) {
                return Err(LogError::DuplicateOrigin(origin));
            }
            registry.origins.push(origin.clone());
            registry.clients.insert(origin, Arc::new(client));
        }
        Ok(registry)
    }

    /// Look up a client by origin.
    pub fn get(&self, origin: &str) -> Option<Arc<LogClient>> {
        self.clients.get(origin).cloned()
    }

    /// All origins, in the order they were configured.
    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    /// The first configured client, if any.
    pub fn first(&self) -> Option<Arc<LogClient>> {
        self.origins.first().and_then(|o| self.get(o))
    }
}
