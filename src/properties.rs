//! Java-style `.properties` configuration, read with `java-properties`.
//!
//! ```text
//! # comment
//! ! also a comment
//! input.cards = cards.txt
//! output.folder: art
//! app.log-level debug
//! input.cards = C\:\\decks\\cards.txt
//! ```
//!
//! `=`, `:` or plain whitespace separate key from value; `\` escapes and
//! trailing-backslash continuations follow the Java rules. Values are
//! trimmed. A key that appears more than once keeps its last value.

use crate::error::FinderError;
use java_properties::PropertiesIter;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Parsed property file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Parse properties from text.
    ///
    /// The text is decoded as UTF-8, not the ISO-8859-1 Java default, so
    /// non-ASCII paths survive without `\uXXXX` escapes.
    pub fn parse(text: &str) -> Result<Self, FinderError> {
        let mut entries = BTreeMap::new();
        PropertiesIter::new_with_encoding(text.as_bytes(), encoding_rs::UTF_8)
            .read_into(|key, value| {
                entries.insert(key, value.trim().to_string());
            })
            .map_err(|e| FinderError::PropertiesSyntax(e.to_string()))?;
        Ok(Self { entries })
    }

    /// Read and parse a property file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, FinderError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FinderError::PropertiesNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            FinderError::PropertiesReadFailed {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        let props = Self::parse(text.trim_start_matches('\u{FEFF}'))?;
        debug!("Loaded {} properties from {}", props.len(), path.display());
        Ok(props)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set or replace a value; used for command-line overrides.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return a mandatory property or fail with [`FinderError::MissingProperty`].
    pub fn require(&self, key: &str) -> Result<&str, FinderError> {
        let value = self
            .get(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| FinderError::MissingProperty {
                key: key.to_string(),
            })?;
        debug!("Property detected. {}: {}", key, value);
        Ok(value)
    }

    /// Parse an optional property, failing only when present but malformed.
    pub fn parse_optional<T: FromStr>(
        &self,
        key: &str,
        expected: &str,
    ) -> Result<Option<T>, FinderError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| FinderError::InvalidProperty {
                    key: key.to_string(),
                    value: raw.to_string(),
                    expected: expected.to_string(),
                }),
        }
    }
}
