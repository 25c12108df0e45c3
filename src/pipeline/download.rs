//! Image download: fetch a candidate's art crop and write it to disk.
//!
//! The fetch collaborator hands back a stream of byte chunks. The stream is
//! drained to completion into memory and then written in one call, so a
//! failed transfer never leaves a half-written file behind. A failed *write*
//! can, and existing files of the same name are overwritten without warning.

use crate::config::RankingPolicy;
use crate::error::CardError;
use crate::pipeline::rank::CandidateCard;
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tracing::debug;

/// A boxed stream of image byte chunks.
pub type ImageStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, CardError>> + Send>>;

/// The image-fetch collaborator.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<ImageStream, CardError>;
}

/// [`ImageFetcher`] over plain HTTP GET.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, uri: &str) -> Result<ImageStream, CardError> {
        let failed = |detail: String| CardError::FetchFailed {
            uri: uri.to_string(),
            detail,
        };

        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let owned_uri = uri.to_string();
        let stream = response.bytes_stream().map(move |chunk| {
            chunk.map(|b| b.to_vec()).map_err(|e| CardError::FetchFailed {
                uri: owned_uri.clone(),
                detail: e.to_string(),
            })
        });
        Ok(Box::pin(stream))
    }
}

// ── File naming ──────────────────────────────────────────────────────────

/// Characters that cannot appear in a file name on common file systems.
static RE_UNSAFE_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).unwrap());

/// Replace path separators and other reserved characters with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    RE_UNSAFE_FILENAME.replace_all(name, "_").trim().to_string()
}

/// File name for a candidate under the given policy.
///
/// * single winner: `<name>.jpg`
/// * all faces: `<face name> (<artist>).jpg`
pub fn file_name_for(candidate: &CandidateCard, policy: RankingPolicy) -> String {
    let stem = match policy {
        RankingPolicy::SingleWinner => candidate.name.clone(),
        RankingPolicy::AllFaces => format!("{} ({})", candidate.name, candidate.artist),
    };
    format!("{}.jpg", sanitize_file_name(&stem))
}

// ── Dispatch ─────────────────────────────────────────────────────────────

/// Download one candidate into `output_dir`.
///
/// Returns the written path. A candidate without an image URI fails with
/// [`CardError::NoArt`] before any network call.
pub async fn download_candidate(
    fetcher: &dyn ImageFetcher,
    candidate: &CandidateCard,
    output_dir: &Path,
    policy: RankingPolicy,
    query: &str,
) -> Result<PathBuf, CardError> {
    let uri = candidate
        .image_uri
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| CardError::NoArt {
            name: candidate.name.clone(),
            query: query.to_string(),
        })?;

    let destination = output_dir.join(file_name_for(candidate, policy));
    download_image(fetcher, uri, &destination).await?;
    Ok(destination)
}

/// Fetch `uri` and write its bytes to `destination`.
pub async fn download_image(
    fetcher: &dyn ImageFetcher,
    uri: &str,
    destination: &Path,
) -> Result<(), CardError> {
    let mut stream = fetcher.fetch(uri).await?;

    let mut bytes = Vec::new();
    while let Some(chunk) = stream.next().await {
        bytes.extend_from_slice(&chunk?);
    }

    debug!(
        "Image downloaded ({} bytes). Writing to {}",
        bytes.len(),
        destination.display()
    );
    tokio::fs::write(destination, &bytes)
        .await
        .map_err(|e| CardError::WriteFailed {
            path: destination.to_path_buf(),
            detail: e.to_string(),
        })
}
