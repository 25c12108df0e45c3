//! Shared fixtures for integration tests: in-memory collaborators and record
//! builders. Nothing here touches the network.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use mtg_art_finder::{
    CardError, CardFace, CardRecord, CardSearch, ImageFetcher, ImageStream, ImageUris,
    RunConfig, SearchOptions,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Route library logs through the test harness; `RUST_LOG` overrides.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

// ── Search ───────────────────────────────────────────────────────────────

/// A recorded search call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    pub query: String,
    pub options: SearchOptions,
}

/// In-memory [`CardSearch`]: canned records per exact query text.
///
/// Unknown queries return `Ok(vec![])`; queries registered with
/// [`MockSearch::fail`] return `SearchFailed`.
#[derive(Default)]
pub struct MockSearch {
    results: HashMap<String, Vec<CardRecord>>,
    failing: HashSet<String>,
    calls: Mutex<Vec<RecordedSearch>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &str, records: Vec<CardRecord>) -> Self {
        self.results.insert(query.to_string(), records);
        self
    }

    pub fn fail(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedSearch> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CardSearch for MockSearch {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<CardRecord>, CardError> {
        self.calls.lock().unwrap().push(RecordedSearch {
            query: query.to_string(),
            options: *options,
        });
        if self.failing.contains(query) {
            return Err(CardError::SearchFailed {
                query: query.to_string(),
                detail: "simulated outage".into(),
            });
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

// ── Fetch ────────────────────────────────────────────────────────────────

/// In-memory [`ImageFetcher`]: serves `jpeg:<uri>` for every URI except the
/// ones registered with [`MockFetcher::fail`].
#[derive(Default)]
pub struct MockFetcher {
    failing: HashSet<String>,
    fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(mut self, uri: &str) -> Self {
        self.failing.insert(uri.to_string());
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    /// Bytes served for `uri`.
    pub fn body_for(uri: &str) -> Vec<u8> {
        format!("jpeg:{uri}").into_bytes()
    }
}

#[async_trait]
impl ImageFetcher for MockFetcher {
    async fn fetch(&self, uri: &str) -> Result<ImageStream, CardError> {
        self.fetched.lock().unwrap().push(uri.to_string());
        if self.failing.contains(uri) {
            return Err(CardError::FetchFailed {
                uri: uri.to_string(),
                detail: "HTTP 500 Internal Server Error".into(),
            });
        }
        let chunks: Vec<Result<Vec<u8>, CardError>> = vec![Ok(Self::body_for(uri))];
        Ok(Box::pin(stream::iter(chunks)))
    }
}

// ── Record builders ──────────────────────────────────────────────────────

pub fn uris(art: &str) -> Option<ImageUris> {
    Some(ImageUris {
        art_crop: Some(art.to_string()),
        ..Default::default()
    })
}

/// A single-faced printing with an art crop.
pub fn printing(name: &str, set: &str, artist: &str, art: &str) -> CardRecord {
    CardRecord {
        name: name.to_string(),
        artist: Some(artist.to_string()),
        set: set.to_string(),
        image_uris: uris(art),
        ..Default::default()
    }
}

pub fn face(name: &str, artist: &str, art: Option<&str>) -> CardFace {
    CardFace {
        name: name.to_string(),
        artist: Some(artist.to_string()),
        image_uris: art.and_then(uris),
    }
}

/// Fresh config pointing every path into `dir`, with no delay.
pub fn config_in(dir: &Path, deck: &str) -> RunConfig {
    let input = dir.join("cards.txt");
    std::fs::write(&input, deck).unwrap();
    RunConfig::builder()
        .input_path(input)
        .output_dir(dir.join("art"))
        .missing_report_path(dir.join("cards-missing.txt"))
        .request_delay_ms(0)
        .build()
        .unwrap()
}
