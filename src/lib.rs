//! # mtg-art-finder
//!
//! Batch-download Magic: The Gathering card art crops from a plain-text deck
//! list.
//!
//! Each line of the deck list names a card, optionally with a quantity
//! (`4x`), a token prefix (`t:`) and a set code (`(M21)`). For every line the
//! crate queries the Scryfall search API, ranks the returned printings, and
//! saves the preferred printing's art crop as a JPEG. Cards that cannot be
//! resolved are collected in a miss report that can be fed back in as a deck
//! list once fixed.
//!
//! ## Pipeline Overview
//!
//! ```text
//! deck list
//!  │
//!  ├─ 1. Parse     "4x Lightning Bolt (M10)" → CardRequest
//!  ├─ 2. Query     CardRequest → !"Lightning Bolt" set:M10
//!  ├─ 3. Search    CardSearch collaborator (paginated, Scryfall by default)
//!  ├─ 4. Rank      art > non-textless > non-promo > … > newest
//!  ├─ 5. Download  ImageFetcher stream → <output>/<name>.jpg
//!  └─ 6. Report    misses → cards-missing.txt, counters → RunStats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mtg_art_finder::{run_with_scryfall, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::builder()
//!         .input_path("cards.txt")
//!         .output_dir("art")
//!         .build()?;
//!     let report = run_with_scryfall(&config).await?;
//!     eprintln!("{} images, {} missing",
//!         report.stats.images_downloaded,
//!         report.stats.missing);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mtg-art-finder` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! mtg-art-finder = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod properties;
pub mod run;
pub mod search;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{LogLevel, RankingPolicy, RunConfig, RunConfigBuilder, TokenPrefix};
pub use error::{CardError, FinderError};
pub use output::{MissReport, RunReport, RunStats};
pub use pipeline::download::{HttpImageFetcher, ImageFetcher, ImageStream};
pub use pipeline::parse::{parse_line, CardRequest};
pub use pipeline::rank::CandidateCard;
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
pub use properties::Properties;
pub use run::{run, run_with_scryfall};
pub use search::{CardFace, CardRecord, CardSearch, ImageUris, ScryfallClient, SearchOptions, UniqueMode};
