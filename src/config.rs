//! Configuration types for an art-download run.
//!
//! All run behaviour is controlled through [`RunConfig`], built either via its
//! [`RunConfigBuilder`] or from a property file with
//! [`RunConfig::from_properties`]. The config is created once before the run
//! loop starts and is read-only afterwards.

use crate::error::FinderError;
use crate::progress::ProgressCallback;
use crate::properties::Properties;
use crate::search::UniqueMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ── Property keys ────────────────────────────────────────────────────────

pub const KEY_INPUT: &str = "input.cards";
pub const KEY_OUTPUT: &str = "output.folder";
pub const KEY_LOG_LEVEL: &str = "app.log-level";
pub const KEY_POLICY: &str = "app.policy";
pub const KEY_DELAY: &str = "app.request-delay-ms";
pub const KEY_TOKEN_PREFIX: &str = "input.token-prefix";
pub const KEY_UNIQUE: &str = "search.unique";
pub const KEY_MISSING_REPORT: &str = "output.missing-report";

/// Default property file name, looked up in the working directory.
pub const DEFAULT_PROPERTIES_FILE: &str = "mtg-art-finder.properties";

/// Fixed name of the miss report written to the working directory.
pub const MISSING_REPORT_FILE: &str = "cards-missing.txt";

/// Configuration for one pass over a deck list.
///
/// # Example
/// ```rust
/// use mtg_art_finder::{RankingPolicy, RunConfig};
///
/// let config = RunConfig::builder()
///     .input_path("decks/elves.txt")
///     .output_dir("art")
///     .policy(RankingPolicy::AllFaces)
///     .request_delay_ms(100)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// Deck list to read, one card reference per line. Default: `cards.txt`.
    pub input_path: PathBuf,

    /// Directory that receives the downloaded images. Default: `art`.
    ///
    /// Created (with parents) at startup when absent.
    pub output_dir: PathBuf,

    /// Where the miss report is written when at least one card was not found.
    /// Default: `cards-missing.txt`.
    pub missing_report_path: PathBuf,

    /// Verbosity the binary configures its subscriber with. Default: `Info`.
    pub log_level: LogLevel,

    /// One image per request, or every face of every result. Default: single winner.
    pub policy: RankingPolicy,

    /// Which token markers the line parser accepts. Default: any `X:` tag.
    pub token_prefix: TokenPrefix,

    /// Pause after each processed line, and between result pages. Default: 50.
    ///
    /// Scryfall asks clients to keep to roughly ten requests per second;
    /// 50 ms keeps a sequential run comfortably below that.
    pub request_delay_ms: u64,

    /// Which printings the search returns. Default: every print.
    pub unique: UniqueMode,

    /// Optional per-line progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("cards.txt"),
            output_dir: PathBuf::from("art"),
            missing_report_path: PathBuf::from(MISSING_REPORT_FILE),
            log_level: LogLevel::default(),
            policy: RankingPolicy::default(),
            token_prefix: TokenPrefix::default(),
            request_delay_ms: 50,
            unique: UniqueMode::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("input_path", &self.input_path)
            .field("output_dir", &self.output_dir)
            .field("missing_report_path", &self.missing_report_path)
            .field("log_level", &self.log_level)
            .field("policy", &self.policy)
            .field("token_prefix", &self.token_prefix)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("unique", &self.unique)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RunProgressCallback>"),
            )
            .finish()
    }
}

impl RunConfig {
    /// Create a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from a property file, resolving relative paths against
    /// `base_dir` (normally the working directory).
    ///
    /// `input.cards` and `output.folder` are mandatory. An invalid
    /// `app.log-level` falls back to `info`; any other malformed optional
    /// value is fatal.
    pub fn from_properties(props: &Properties, base_dir: &Path) -> Result<Self, FinderError> {
        let input = props.require(KEY_INPUT)?;
        let output = props.require(KEY_OUTPUT)?;

        let mut builder = Self::builder()
            .input_path(base_dir.join(input))
            .output_dir(base_dir.join(output))
            .missing_report_path(base_dir.join(MISSING_REPORT_FILE))
            .log_level(LogLevel::parse_or_default(props.get(KEY_LOG_LEVEL)).0);

        if let Some(policy) = props.parse_optional::<RankingPolicy>(KEY_POLICY, "single or all-faces")? {
            builder = builder.policy(policy);
        }
        if let Some(prefix) = props.parse_optional::<TokenPrefix>(KEY_TOKEN_PREFIX, "any or strict")? {
            builder = builder.token_prefix(prefix);
        }
        if let Some(ms) = props.parse_optional::<u64>(KEY_DELAY, "a number")? {
            builder = builder.request_delay_ms(ms);
        }
        if let Some(unique) = props.parse_optional::<UniqueMode>(KEY_UNIQUE, "cards, art or prints")? {
            builder = builder.unique(unique);
        }
        if let Some(report) = props.get(KEY_MISSING_REPORT).filter(|v| !v.is_empty()) {
            builder = builder.missing_report_path(base_dir.join(report));
        }

        builder.build()
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input_path = path.into();
        self
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_dir = path.into();
        self
    }

    pub fn missing_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.missing_report_path = path.into();
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    pub fn policy(mut self, policy: RankingPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn token_prefix(mut self, prefix: TokenPrefix) -> Self {
        self.config.token_prefix = prefix;
        self
    }

    pub fn request_delay_ms(mut self, ms: u64) -> Self {
        self.config.request_delay_ms = ms;
        self
    }

    pub fn unique(mut self, unique: UniqueMode) -> Self {
        self.config.unique = unique;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RunConfig, FinderError> {
        let c = &self.config;
        if c.input_path.as_os_str().is_empty() {
            return Err(FinderError::InvalidConfig("input path is empty".into()));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(FinderError::InvalidConfig("output folder is empty".into()));
        }
        if c.missing_report_path.as_os_str().is_empty() {
            return Err(FinderError::InvalidConfig(
                "missing-cards report path is empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Log verbosity accepted by `app.log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Resolve a raw property value, falling back to `Info`.
    ///
    /// The boolean is `false` when the fallback was taken so the caller can
    /// report it once logging is up.
    pub fn parse_or_default(raw: Option<&str>) -> (Self, bool) {
        match raw.map(str::parse::<LogLevel>) {
            Some(Ok(level)) => (level, true),
            _ => (LogLevel::Info, false),
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "error" => Ok(LogLevel::Error),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("invalid log level '{other}'")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter())
    }
}

/// How search results become downloads.
///
/// | Policy | Downloads | File name |
/// |--------|-----------|-----------|
/// | `SingleWinner` | best-ranked printing only | `<name>.jpg` |
/// | `AllFaces` | every face of every result | `<face> (<artist>).jpg` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankingPolicy {
    /// Rank all printings and keep the first. (default)
    #[default]
    SingleWinner,
    /// Flatten every record into one candidate per face, unranked.
    AllFaces,
}

impl FromStr for RankingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" | "single-winner" => Ok(RankingPolicy::SingleWinner),
            "all-faces" | "faces" | "all" => Ok(RankingPolicy::AllFaces),
            other => Err(format!("invalid policy '{other}'")),
        }
    }
}

/// Which token markers the line parser recognises before a card name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPrefix {
    /// Any single word character followed by `:` (`t:`, `e:`, …). (default)
    #[default]
    Any,
    /// Only the literal `t:`.
    Strict,
}

impl FromStr for TokenPrefix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" => Ok(TokenPrefix::Any),
            "strict" | "t" => Ok(TokenPrefix::Strict),
            other => Err(format!("invalid token prefix mode '{other}'")),
        }
    }
}
