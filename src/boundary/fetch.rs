//! Boundary document loading.
//!
//! All layers are fetched concurrently and joined: either every document arrives and
//! parses, or the whole load fails. Nothing is handed to the map before that point.

use std::{future::Future, path::PathBuf};

use anyhow::{Context, Result};
use futures::future::try_join_all;
use serde_json::Value;

use crate::config::LayerConfig;

/// Source of boundary documents, addressed by the layer's `serviceUrl`.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>>;
}

/// Fetch every layer's document and parse it as JSON, in layer order.
/// Fails as a whole if any single fetch or parse fails.
pub async fn load_all<F: Fetch>(fetcher: &F, layers: &[LayerConfig]) -> Result<Vec<Value>> {
    let docs = try_join_all(layers.iter().enumerate().map(|(i, layer)| async move {
        let text = fetcher.fetch(&layer.service_url).await
            .with_context(|| format!("[boundary::fetch] Failed to fetch layer {i} from {}", layer.service_url))?;
        serde_json::from_str::<Value>(&text)
            .with_context(|| format!("[boundary::fetch] Layer {i} ({}) is not valid JSON", layer.service_url))
    })).await?;

    tracing::debug!("[boundary::fetch] Fetched {} boundary documents", docs.len());
    Ok(docs)
}

/// Reads boundary documents from the local filesystem. URLs are treated as paths,
/// resolved against `root` when given (a leading `/` is relative to the root).
///
/// Reads are blocking and never yield, so under [`load_all`] the files are read one
/// after another on the polling thread. No reactor is needed; concurrent loading
/// only applies to `HttpFetcher`.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self { Self::default() }

    pub fn with_root(root: impl Into<PathBuf>) -> Self { Self { root: Some(root.into()) } }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = url.strip_prefix("file://").unwrap_or(url);
        match &self.root {
            Some(root) => root.join(path.trim_start_matches('/')),
            None => PathBuf::from(path),
        }
    }
}

impl Fetch for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let path = self.resolve(url);
        std::fs::read_to_string(&path)
            .with_context(|| format!("[boundary::fetch] Failed to read {}", path.display()))
    }
}

/// Fetches boundary documents over HTTP(S).
#[cfg(feature = "download")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "download")]
impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("sdgmap/0.1")
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("[boundary::fetch] Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[cfg(feature = "download")]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.client.get(url).send().await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned error status"))?
            .text().await
            .with_context(|| format!("GET {url}: failed to read body"))
    }
}
