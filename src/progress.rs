//! Progress-callback trait for per-line run events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::RunConfigBuilder::progress_callback`] to receive events
//! as the run loop works through the deck list. The library knows nothing
//! about how the host displays them; the CLI forwards them to an `indicatif`
//! spinner.
//!
//! # Example
//!
//! ```rust
//! use mtg_art_finder::{RunConfig, RunProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     saved: AtomicUsize,
//! }
//!
//! impl RunProgressCallback for CountingCallback {
//!     fn on_card_downloaded(&self, line_no: usize, file: &Path) {
//!         self.saved.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("line {line_no}: saved {}", file.display());
//!     }
//! }
//!
//! let config = RunConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { saved: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::RunStats;
use std::path::Path;
use std::sync::Arc;

/// Called by the run loop as it processes each line.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Lines are processed strictly one after another, so
/// events for a line never interleave with another line's.
pub trait RunProgressCallback: Send + Sync {
    /// Called once, after startup validation, before the first line is read.
    fn on_run_start(&self, input: &Path) {
        let _ = input;
    }

    /// Called when a line parsed into a card request, before searching.
    ///
    /// # Arguments
    /// * `line_no` — 1-indexed line number in the input file
    /// * `label`   — `name` or `name (SET)` as shown to the user
    fn on_card_start(&self, line_no: usize, label: &str) {
        let _ = (line_no, label);
    }

    /// Called for every image written to disk.
    fn on_card_downloaded(&self, line_no: usize, file: &Path) {
        let _ = (line_no, file);
    }

    /// Called when a request produced no candidates and joined the miss report.
    fn on_card_missing(&self, line_no: usize, entry: &str) {
        let _ = (line_no, entry);
    }

    /// Called for a non-fatal candidate or download failure.
    fn on_card_error(&self, line_no: usize, error: &str) {
        let _ = (line_no, error);
    }

    /// Called once after the last line, before the miss report is written.
    fn on_run_complete(&self, stats: &RunStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RunConfig`].
pub type ProgressCallback = Arc<dyn RunProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        downloads: AtomicUsize,
        missing: AtomicUsize,
        errors: AtomicUsize,
    }

    impl RunProgressCallback for TrackingCallback {
        fn on_card_start(&self, _line_no: usize, _label: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_card_downloaded(&self, _line_no: usize, _file: &Path) {
            self.downloads.fetch_add(1, Ordering::SeqCst);
        }

        fn on_card_missing(&self, _line_no: usize, _entry: &str) {
            self.missing.fetch_add(1, Ordering::SeqCst);
        }

        fn on_card_error(&self, _line_no: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(Path::new("cards.txt"));
        cb.on_card_start(1, "Forest");
        cb.on_card_downloaded(1, Path::new("art/Forest.jpg"));
        cb.on_card_missing(2, "Nonexistent Card");
        cb.on_card_error(3, "fetch failed");
        cb.on_run_complete(&RunStats::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let file = PathBuf::from("art/Llanowar Elves.jpg");

        tracker.on_card_start(1, "Llanowar Elves");
        tracker.on_card_downloaded(1, &file);
        tracker.on_card_start(2, "Missing Card (XYZ)");
        tracker.on_card_missing(2, "Missing Card(XYZ)");
        tracker.on_card_start(3, "Delver of Secrets");
        tracker.on_card_error(3, "no art_crop");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.downloads.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.missing.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }
}
