//! Error types for the mtg-art-finder library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FinderError`] — **Fatal**: the run cannot start or cannot continue
//!   (missing property, missing input file, unwritable output directory).
//!   Returned as `Err(FinderError)` from [`crate::run::run`].
//!
//! * [`CardError`] — **Non-fatal**: a single line or a single candidate
//!   failed (search error, no art, download glitch) while every other line is
//!   fine. Logged, counted in [`crate::output::RunStats`] and never
//!   propagated out of the run loop.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mtg-art-finder library.
///
/// Per-line and per-candidate failures use [`CardError`] instead.
#[derive(Debug, Error)]
pub enum FinderError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The property file could not be found.
    #[error("Property file not found: '{path}'\nCreate it or pass --input and --output.")]
    PropertiesNotFound { path: PathBuf },

    /// The property file exists but could not be read.
    #[error("Failed to read property file '{path}': {source}")]
    PropertiesReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The property file is not valid `.properties` syntax.
    #[error("Invalid property file syntax: {0}")]
    PropertiesSyntax(String),

    /// A mandatory property is absent.
    #[error("Missing property {key}")]
    MissingProperty { key: String },

    /// A property is present but its value cannot be used.
    #[error("Property {key} must be {expected}. Found '{value}'")]
    InvalidProperty {
        key: String,
        value: String,
        expected: String,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input / output errors ─────────────────────────────────────────────
    /// The deck list does not exist.
    #[error("No file found at input file path {path}")]
    InputNotFound { path: PathBuf },

    /// The deck list exists but reading it failed.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be created.
    #[error("Failed to create output folder '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The miss report could not be written.
    #[error("Failed to write missing-cards report '{path}': {source}")]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// A non-fatal error for a single card line or candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum CardError {
    /// The search collaborator failed for a query.
    #[error("Search failed for query '{query}': {detail}")]
    SearchFailed { query: String, detail: String },

    /// A candidate carries no art-crop image reference.
    #[error("No cards with art_crop found for '{name}' (query '{query}')")]
    NoArt { name: String, query: String },

    /// The image could not be fetched.
    #[error("Failed to fetch image '{uri}': {detail}")]
    FetchFailed { uri: String, detail: String },

    /// The image was fetched but could not be written.
    #[error("Error saving file {path}: {detail}")]
    WriteFailed { path: PathBuf, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_property_display() {
        let e = FinderError::MissingProperty {
            key: "input.cards".into(),
        };
        assert_eq!(e.to_string(), "Missing property input.cards");
    }

    #[test]
    fn input_not_found_display() {
        let e = FinderError::InputNotFound {
            path: PathBuf::from("/tmp/cards.txt"),
        };
        assert!(e.to_string().contains("/tmp/cards.txt"));
    }

    #[test]
    fn invalid_property_display() {
        let e = FinderError::InvalidProperty {
            key: "app.request-delay-ms".into(),
            value: "soon".into(),
            expected: "a number".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("app.request-delay-ms"), "got: {msg}");
        assert!(msg.contains("soon"), "got: {msg}");
    }

    #[test]
    fn write_failed_names_the_file() {
        let e = CardError::WriteFailed {
            path: PathBuf::from("art/Forest.jpg"),
            detail: "disk full".into(),
        };
        assert!(e.to_string().contains("art/Forest.jpg"));
    }
}
