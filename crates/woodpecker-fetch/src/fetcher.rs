//! The [`ByteFetcher`] and its backends.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use reqwest::{StatusCode, Url};
use tracing::{debug, info};

use crate::error::FetchError;

/// Fetches resources relative to a fixed root location.
///
/// The set of backends is closed: the root's scheme picks one when the
/// fetcher is built, and an unsupported scheme is a construction error rather
/// than a per-call one. Dropping a pending [`fetch`](Self::fetch) future
/// abandons the request.
#[derive(Debug, Clone)]
pub enum ByteFetcher {
    /// HTTP(S) GET relative to a base URL (always ending in `/`).
    Http {
        /// Shared HTTP client.
        client: reqwest::Client,
        /// Base URL that paths are resolved against.
        root: Url,
    },
    /// Local files relative to a directory.
    File {
        /// Directory that paths are resolved against.
        root: PathBuf,
    },
    /// In-process map from path to bytes.
    Memory(MemoryFetcher),
}

impl ByteFetcher {
    /// Build a fetcher for `location`, using a fresh HTTP client if needed.
    pub fn for_root(location: &str) -> Result<Self, FetchError> {
        Self::with_client(location, reqwest::Client::new())
    }

    /// Build a fetcher for `location`, sharing `client` for HTTP roots.
    ///
    /// `location` is either a URL (`http`, `https` or `file` scheme) or a
    /// plain filesystem path.
    pub fn with_client(location: &str, client: reqwest::Client) -> Result<Self, FetchError> {
        if !location.contains("://") {
            return Ok(Self::File {
                root: PathBuf::from(location),
            });
        }

        let url = Url::parse(location)
            .map_err(|e| FetchError::InvalidUrl(format!("{location}: {e}")))?;
        match url.scheme() {
            "http" | "https" => {
                let root = if url.path().ends_with('/') {
                    url
                } else {
                    let mut url = url;
                    let path = format!("{}/", url.path());
                    url.set_path(&path);
                    url
                };
                Ok(Self::Http { client, root })
            }
            "file" => {
                let root = url
                    .to_file_path()
                    .map_err(|()| FetchError::InvalidUrl(location.to_string()))?;
                Ok(Self::File { root })
            }
            other => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Fetch the resource at `path`, relative to the root.
    pub async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
        match self {
            Self::Http { client, root } => {
                let url = root
                    .join(path)
                    .map_err(|e| FetchError::InvalidUrl(format!("{path}: {e}")))?;
                read_http(client, url).await
            }
            Self::File { root } => {
                let full = resolve_file(root, path)?;
                read_file(&full).await
            }
            Self::Memory(mem) => mem.get(path),
        }
    }

    /// Human-readable root location, for logs.
    pub fn root(&self) -> String {
        match self {
            Self::Http { root, .. } => root.to_string(),
            Self::File { root } => root.display().to_string(),
            Self::Memory(_) => "memory:".to_string(),
        }
    }
}

impl From<MemoryFetcher> for ByteFetcher {
    fn from(mem: MemoryFetcher) -> Self {
        Self::Memory(mem)
    }
}

/// Join `path` onto `root`, refusing anything that would escape it.
fn resolve_file(root: &Path, path: &str) -> Result<PathBuf, FetchError> {
    let rel = Path::new(path.trim_start_matches('/'));
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(FetchError::InvalidUrl(path.to_string()));
    }
    Ok(root.join(rel))
}

async fn read_http(client: &reqwest::Client, url: Url) -> Result<Bytes, FetchError> {
    debug!(%url, "GET");
    let resp = client.get(url.clone()).send().await?;
    match resp.status() {
        StatusCode::OK => Ok(resp.bytes().await?),
        StatusCode::NOT_FOUND => {
            info!(%url, "not found");
            Err(FetchError::NotFound(url.to_string()))
        }
        status => Err(FetchError::UnexpectedStatus {
            location: url.to_string(),
            status: status.as_u16(),
        }),
    }
}

async fn read_file(path: &Path) -> Result<Bytes, FetchError> {
    debug!(path = %path.display(), "read");
    match tokio::fs::read(path).await {
        Ok(data) => Ok(Bytes::from(data)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(FetchError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(FetchError::Io {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

/// In-memory resource map.
///
/// Clones share the same underlying map, so a test can keep one handle to
/// add or remove resources while a fetcher built from another clone serves
/// them.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    entries: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under `path`, replacing any previous value.
    pub fn insert(&self, path: impl Into<String>, data: impl Into<Bytes>) {
        let mut map = self.entries.write().unwrap_or_else(|e| e.into_inner());
        map.insert(path.into(), data.into());
    }

    /// Remove the resource at `path`, if present.
    pub fn remove(&self, path: &str) {
        let mut map = self.entries.write().unwrap_or_else(|e| e.into_inner());
        map.remove(path);
    }

    fn get(&self, path: &str) -> Result<Bytes, FetchError> {
        let map = self.entries.read().unwrap_or_else(|e| e.into_inner());
        map.get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("memory:{path}")))
    }
}
