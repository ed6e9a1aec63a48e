//! Image cache and loader.
//!
//! [`ImageCache`] is an LRU keyed by URL with a byte budget. [`ImageLoader`]
//! fetches misses in background tasks, one in flight per listener key, and
//! hands completions back through a channel drained by the owning thread.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::TransportError;
use crate::transport::{HttpRequest, Method, Transport};

pub type ImageBytes = Arc<Vec<u8>>;

/// LRU of encoded image bytes, bounded by total size.
pub struct ImageCache {
    entries: LruCache<String, ImageBytes>,
    used: usize,
    budget: usize,
}

impl ImageCache {
    pub fn new(budget_kb: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            used: 0,
            budget: budget_kb * 1024,
        }
    }

    /// Look up and mark as recently used.
    pub fn get(&mut self, url: &str) -> Option<ImageBytes> {
        self.entries.get(url).cloned()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains(url)
    }

    /// Insert, evicting least recently used entries until the budget holds.
    ///
    /// Entries larger than the whole budget are rejected.
    pub fn insert(&mut self, url: impl Into<String>, bytes: ImageBytes) -> bool {
        let url = url.into();
        let size = bytes.len();
        if size > self.budget {
            debug!(%url, size, budget = self.budget, "image larger than cache budget");
            return false;
        }
        if let Some(old) = self.entries.pop(&url) {
            self.used -= old.len();
        }
        while self.used + size > self.budget {
            match self.entries.pop_lru() {
                Some((evicted, old)) => {
                    self.used -= old.len();
                    trace!(url = %evicted, size = old.len(), "evicted image");
                }
                None => break,
            }
        }
        self.used += size;
        self.entries.put(url, bytes);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.used
    }

    pub fn budget_bytes(&self) -> usize {
        self.budget
    }
}

/// Source of image bytes keyed by URL.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// [`AssetFetcher`] that issues plain GETs through a [`Transport`].
pub struct HttpAssetFetcher {
    transport: Arc<dyn Transport>,
}

impl HttpAssetFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let url = Url::parse(url).map_err(|e| TransportError::InvalidUrl(format!("{url}: {e}")))?;
        let response = self
            .transport
            .send(HttpRequest {
                method: Method::Get,
                url,
                headers: Vec::new(),
                body: None,
            })
            .await?;
        if !response.is_success() {
            return Err(TransportError::Io(format!("status {}", response.status)));
        }
        Ok(response.body)
    }
}

/// Result of [`ImageLoader::load`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// Served from cache.
    Ready(ImageBytes),
    /// A fetch is running; watch [`ImageLoader::poll_completed`].
    Pending,
}

/// A finished fetch, delivered on the owning thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageReady {
    pub key: String,
    pub url: String,
    pub result: Result<ImageBytes, TransportError>,
}

struct Fetched {
    key: String,
    ticket: u64,
    url: String,
    result: Result<Vec<u8>, TransportError>,
}

struct InFlight {
    ticket: u64,
    handle: JoinHandle<()>,
}

/// Loads images for listeners (views), one in-flight fetch per listener key.
///
/// Loading a new URL for a key aborts the key's previous fetch; a stale
/// completion that raced the abort is discarded.
pub struct ImageLoader {
    cache: ImageCache,
    fetcher: Arc<dyn AssetFetcher>,
    in_flight: HashMap<String, InFlight>,
    next_ticket: u64,
    sender: mpsc::UnboundedSender<Fetched>,
    receiver: mpsc::UnboundedReceiver<Fetched>,
}

impl ImageLoader {
    pub fn new(cache: ImageCache, fetcher: Arc<dyn AssetFetcher>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            cache,
            fetcher,
            in_flight: HashMap::new(),
            next_ticket: 0,
            sender,
            receiver,
        }
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Request `url` for `key`. Must be called inside a Tokio runtime.
    pub fn load(&mut self, key: impl Into<String>, url: impl Into<String>) -> LoadState {
        let key = key.into();
        let url = url.into();
        self.cancel(&key);

        if let Some(bytes) = self.cache.get(&url) {
            trace!(%key, %url, "image cache hit");
            return LoadState::Ready(bytes);
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let fetcher = Arc::clone(&self.fetcher);
        let sender = self.sender.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = fetcher.fetch(&url).await;
            // The loader may be gone already; nothing to deliver to.
            let _ = sender.send(Fetched {
                key: task_key,
                ticket,
                url,
                result,
            });
        });
        debug!(%key, ticket, "image fetch started");
        self.in_flight.insert(key, InFlight { ticket, handle });
        LoadState::Pending
    }

    /// Abort the fetch running for `key`, if any.
    pub fn cancel(&mut self, key: &str) -> bool {
        match self.in_flight.remove(key) {
            Some(flight) => {
                flight.handle.abort();
                debug!(%key, ticket = flight.ticket, "image fetch canceled");
                true
            }
            None => false,
        }
    }

    /// Drain finished fetches without blocking.
    pub fn poll_completed(&mut self) -> Vec<ImageReady> {
        let mut ready = Vec::new();
        while let Ok(fetched) = self.receiver.try_recv() {
            if let Some(done) = self.accept(fetched) {
                ready.push(done);
            }
        }
        ready
    }

    /// Wait for the next current (non-stale) completion.
    pub async fn next_completed(&mut self) -> Option<ImageReady> {
        while !self.in_flight.is_empty() {
            let fetched = self.receiver.recv().await?;
            if let Some(done) = self.accept(fetched) {
                return Some(done);
            }
        }
        None
    }

    fn accept(&mut self, fetched: Fetched) -> Option<ImageReady> {
        match self.in_flight.get(&fetched.key) {
            Some(flight) if flight.ticket == fetched.ticket => {
                self.in_flight.remove(&fetched.key);
            }
            _ => {
                trace!(key = %fetched.key, ticket = fetched.ticket, "dropping stale image");
                return None;
            }
        }

        let result = match fetched.result {
            Ok(bytes) => {
                let bytes = Arc::new(bytes);
                self.cache.insert(fetched.url.clone(), Arc::clone(&bytes));
                Ok(bytes)
            }
            Err(err) => {
                warn!(url = %fetched.url, error = %err, "image fetch failed");
                Err(err)
            }
        };
        Some(ImageReady {
            key: fetched.key,
            url: fetched.url,
            result,
        })
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        for (_, flight) in self.in_flight.drain() {
            flight.handle.abort();
        }
    }
}
