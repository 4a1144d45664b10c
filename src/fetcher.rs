use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid page url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request for {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("could not read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Retrieves the markup of a site page given its catalog path.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Box<T> {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}

/// Fetches pages over http(s) relative to a base URL, always asking for a
/// fresh copy.
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base: &str) -> Result<HttpFetcher> {
        let mut base = Url::parse(base).with_context(|| format!("Invalid site root url {base}"))?;
        // join() drops the last segment unless the base is a directory
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(HttpFetcher {
            client: reqwest::Client::new(),
            base,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        self.base.join(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let target = self.resolve(url)?;
        let transport = |source| FetchError::Transport {
            url: target.to_string(),
            source,
        };
        let res = self
            .client
            .get(target.clone())
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: target.to_string(),
                status: status.as_u16(),
            });
        }
        res.text().await.map_err(transport)
    }
}

/// Reads pages from a built site on disk.
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> DirFetcher {
        DirFetcher { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a relative page url onto a file below the root. Urls that would
    /// leave the root are rejected.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, FetchError> {
        let invalid = |reason: &str| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let mut resolved = self.root.clone();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(invalid("path leaves the site root")),
            }
        }
        if resolved == self.root {
            return Err(invalid("empty path"));
        }
        Ok(resolved)
    }
}

#[async_trait]
impl PageFetcher for DirFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let path = self.resolve(url)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(source) => return Err(FetchError::Io { path, source }),
        };
        // decoded leniently, like reqwest's `text()`
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Picks the fetcher for a site root: http(s) urls go over the network,
/// anything else is a directory.
pub fn fetcher_for(root: &str) -> Result<Box<dyn PageFetcher>> {
    if root.starts_with("http://") || root.starts_with("https://") {
        Ok(Box::new(HttpFetcher::new(root)?))
    } else {
        Ok(Box::new(DirFetcher::new(root)))
    }
}
