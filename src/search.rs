//! Card search: the `CardSearch` trait and its Scryfall implementation.
//!
//! The run loop only needs "query in, every matching card record out".
//! Hiding the remote API behind a trait keeps the orchestrator testable
//! with canned records and lets the pagination details stay here.
//!
//! ## Scryfall paging
//!
//! `GET /cards/search` returns a `list` object with at most 175 cards,
//! `has_more` and a ready-made `next_page` URL. [`ScryfallClient`] follows
//! `next_page` until `has_more` is false, pausing between pages. A query
//! with no hits answers HTTP 404 with an `error` object of code
//! `not_found`; that is mapped to an empty result rather than an error.

use crate::error::{CardError, FinderError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Default Scryfall search endpoint.
pub const SCRYFALL_SEARCH_URL: &str = "https://api.scryfall.com/cards/search";

// ── Card records ─────────────────────────────────────────────────────────

/// One card record as returned by the search collaborator.
///
/// Only the fields the ranker and the downloader read are modelled; serde
/// ignores the rest of Scryfall's card object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Set code, e.g. `lea`.
    #[serde(default)]
    pub set: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_at: Option<NaiveDate>,
    #[serde(default)]
    pub textless: bool,
    #[serde(default)]
    pub promo: bool,
    #[serde(default)]
    pub full_art: bool,
    #[serde(default)]
    pub variation: bool,
    #[serde(default)]
    pub highres_image: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uris: Option<ImageUris>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_faces: Option<Vec<CardFace>>,
}

impl CardRecord {
    /// Art-crop URI of the record itself, if it carries a usable one.
    pub fn art_crop(&self) -> Option<&str> {
        self.image_uris.as_ref().and_then(ImageUris::art_crop)
    }
}

/// One printed side of a multi-faced card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFace {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uris: Option<ImageUris>,
}

impl CardFace {
    pub fn art_crop(&self) -> Option<&str> {
        self.image_uris.as_ref().and_then(ImageUris::art_crop)
    }
}

/// Image variants for a record or face.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUris {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art_crop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<String>,
}

impl ImageUris {
    /// The art-crop URI, treating an empty string as absent.
    pub fn art_crop(&self) -> Option<&str> {
        self.art_crop.as_deref().filter(|u| !u.is_empty())
    }
}

// ── Search options ───────────────────────────────────────────────────────

/// Options passed alongside the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Return tokens and other extras. Set only for token requests.
    pub include_extras: bool,
    pub unique: UniqueMode,
}

/// Scryfall's `unique` rollup mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniqueMode {
    /// One record per Oracle card.
    Cards,
    /// One record per unique artwork.
    Art,
    /// Every printing; gives the ranker the most to choose from. (default)
    #[default]
    Prints,
}

impl UniqueMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueMode::Cards => "cards",
            UniqueMode::Art => "art",
            UniqueMode::Prints => "prints",
        }
    }
}

impl fmt::Display for UniqueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UniqueMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cards" => Ok(UniqueMode::Cards),
            "art" => Ok(UniqueMode::Art),
            "prints" => Ok(UniqueMode::Prints),
            other => Err(format!("invalid unique mode '{other}'")),
        }
    }
}

// ── Trait ────────────────────────────────────────────────────────────────

/// The card-search collaborator.
///
/// Implementations return every matching record, with pagination already
/// exhausted. "No match" is `Ok(vec![])`, not an error.
#[async_trait]
pub trait CardSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<CardRecord>, CardError>;
}

// ── Scryfall client ──────────────────────────────────────────────────────

/// A page of search results.
#[derive(Debug, Deserialize)]
struct ListPage {
    #[serde(default)]
    data: Vec<CardRecord>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_page: Option<String>,
}

/// Scryfall's error object.
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    details: String,
}

/// HTTP client identifying this tool, as Scryfall requires a `User-Agent`.
pub fn build_http_client() -> Result<reqwest::Client, FinderError> {
    reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FinderError::HttpClient(e.to_string()))
}

/// [`CardSearch`] backed by the Scryfall REST API.
pub struct ScryfallClient {
    client: reqwest::Client,
    search_url: String,
    page_delay: Duration,
}

impl ScryfallClient {
    /// Create a client for the public Scryfall API.
    pub fn new(page_delay: Duration) -> Result<Self, FinderError> {
        Self::with_base_url(SCRYFALL_SEARCH_URL, page_delay)
    }

    /// Create a client against a different search endpoint (mirrors, tests).
    pub fn with_base_url(
        search_url: impl Into<String>,
        page_delay: Duration,
    ) -> Result<Self, FinderError> {
        Ok(Self::with_client(build_http_client()?, search_url, page_delay))
    }

    /// Wrap an existing client, e.g. one shared with the image fetcher.
    pub fn with_client(
        client: reqwest::Client,
        search_url: impl Into<String>,
        page_delay: Duration,
    ) -> Self {
        Self {
            client,
            search_url: search_url.into(),
            page_delay,
        }
    }

    /// Query parameters for the first page.
    fn first_page_params(query: &str, options: &SearchOptions) -> Vec<(&'static str, String)> {
        vec![
            ("q", query.to_string()),
            ("unique", options.unique.as_str().to_string()),
            ("include_extras", options.include_extras.to_string()),
        ]
    }

    /// Fetch one page. `Ok(None)` means Scryfall reported `not_found`.
    async fn fetch_page(
        &self,
        request: reqwest::RequestBuilder,
        query: &str,
    ) -> Result<Option<ListPage>, CardError> {
        let failed = |detail: String| CardError::SearchFailed {
            query: query.to_string(),
            detail,
        };

        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| failed(e.to_string()))?;

        if status.is_success() {
            let page: ListPage =
                serde_json::from_slice(&body).map_err(|e| failed(format!("bad response: {e}")))?;
            return Ok(Some(page));
        }

        match serde_json::from_slice::<ApiError>(&body) {
            Ok(err) if status == reqwest::StatusCode::NOT_FOUND && err.code == "not_found" => {
                debug!("No results: {}", err.details);
                Ok(None)
            }
            Ok(err) => Err(failed(format!("HTTP {status}: {}", err.details))),
            Err(_) => Err(failed(format!("HTTP {status}"))),
        }
    }
}

#[async_trait]
impl CardSearch for ScryfallClient {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<CardRecord>, CardError> {
        let mut records = Vec::new();

        let first = self
            .client
            .get(&self.search_url)
            .query(&Self::first_page_params(query, options));
        let mut page = match self.fetch_page(first, query).await? {
            Some(page) => page,
            None => return Ok(records),
        };

        loop {
            debug!("Query '{}': page with {} records", query, page.data.len());
            records.extend(page.data);

            let next = match (page.has_more, page.next_page) {
                (true, Some(next)) => next,
                _ => break,
            };
            tokio::time::sleep(self.page_delay).await;
            page = match self.fetch_page(self.client.get(&next), query).await? {
                Some(page) => page,
                None => break,
            };
        }

        Ok(records)
    }
}
