//! Run orchestration: deck list in, art folder and miss report out.
//!
//! Lines are processed strictly one after another. Each line goes through
//! parse → query → search → rank → download, then the loop sleeps for
//! `request_delay_ms` before reading the next line. Only startup validation
//! and I/O on the input or the miss report can fail the run; everything that
//! goes wrong for a single card is logged and counted in [`RunStats`].
//! Undecodable bytes in the deck list are replaced, not fatal.
//!
//! [`RunStats`]: crate::output::RunStats

use crate::config::RunConfig;
use crate::error::{CardError, FinderError};
use crate::output::RunReport;
use crate::pipeline::download::{download_candidate, HttpImageFetcher, ImageFetcher};
use crate::pipeline::parse::{parse_line, BYTE_ORDER_MARK};
use crate::pipeline::query::{build_query, search_options};
use crate::pipeline::rank::select_candidates;
use crate::search::{build_http_client, CardSearch, ScryfallClient, SCRYFALL_SEARCH_URL};
use std::borrow::Cow;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

/// Run against the public Scryfall API.
///
/// Search requests and image downloads share one HTTP client.
pub async fn run_with_scryfall(config: &RunConfig) -> Result<RunReport, FinderError> {
    let client = build_http_client()?;
    let search = ScryfallClient::with_client(
        client.clone(),
        SCRYFALL_SEARCH_URL,
        Duration::from_millis(config.request_delay_ms),
    );
    let fetcher = HttpImageFetcher::new(client);
    run(config, &search, &fetcher).await
}

/// Process every line of `config.input_path`.
///
/// # Returns
/// `Ok(RunReport)` once the whole file has been read, even if some cards
/// were missing or failed to download (see `report.stats`). A non-empty miss
/// report has already been written to `config.missing_report_path`.
///
/// # Errors
/// Returns `Err(FinderError)` only for fatal errors:
/// - input file missing or unreadable
/// - output folder cannot be created
/// - miss report cannot be written
pub async fn run(
    config: &RunConfig,
    search: &dyn CardSearch,
    fetcher: &dyn ImageFetcher,
) -> Result<RunReport, FinderError> {
    let start = Instant::now();

    // ── Step 1: Validate paths ───────────────────────────────────────────
    prepare(config).await?;

    // ── Step 2: Open input ───────────────────────────────────────────────
    // Lines are read as bytes so one bad byte costs one line, not the run.
    let input_path = &config.input_path;
    let read_failed = |e: std::io::Error| FinderError::InputReadFailed {
        path: input_path.clone(),
        source: e,
    };
    let file = tokio::fs::File::open(input_path).await.map_err(read_failed)?;
    let mut reader = BufReader::new(file);
    info!("Reading cards from {}", input_path.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(input_path);
    }

    // ── Step 3: Process lines ────────────────────────────────────────────
    let delay = Duration::from_millis(config.request_delay_ms);
    let mut report = RunReport::default();
    let mut line_no = 0;
    let mut raw = Vec::new();

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).await.map_err(read_failed)? == 0 {
            break;
        }
        line_no += 1;
        report.stats.lines_read += 1;

        let line = decode_line(&raw, line_no);
        if line.trim().is_empty() {
            report.stats.blank_lines += 1;
            continue;
        }

        process_line(&line, line_no, config, search, fetcher, &mut report).await;
        tokio::time::sleep(delay).await;
    }
    drop(reader);

    report.stats.total_duration_ms = start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(&report.stats);
    }

    // ── Step 4: Miss report ──────────────────────────────────────────────
    let report_path = &config.missing_report_path;
    let written = report
        .missing
        .write_to(report_path)
        .await
        .map_err(|e| FinderError::ReportWriteFailed {
            path: report_path.clone(),
            source: e,
        })?;
    if written {
        warn!(
            "{} card(s) not found; list written to {}",
            report.missing.len(),
            report_path.display()
        );
        report.missing_report_path = Some(report_path.clone());
    }

    info!(
        "Run complete: {} requests, {} images, {} missing, {}ms",
        report.stats.requests,
        report.stats.images_downloaded,
        report.stats.missing,
        report.stats.total_duration_ms
    );

    Ok(report)
}

/// Startup validation: the input must exist; the output folder is created
/// when absent.
pub async fn prepare(config: &RunConfig) -> Result<(), FinderError> {
    if !config.input_path.is_file() {
        return Err(FinderError::InputNotFound {
            path: config.input_path.clone(),
        });
    }

    let output = &config.output_dir;
    if !output.is_dir() {
        debug!("No directory for output found. Creating it at {}", output.display());
        tokio::fs::create_dir_all(output)
            .await
            .map_err(|e| FinderError::OutputDirFailed {
                path: output.clone(),
                source: e,
            })?;
    }
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Decode one raw line without its terminator.
///
/// Invalid UTF-8 is replaced with U+FFFD and logged rather than failing the
/// run. A byte-order mark on the first line is dropped.
fn decode_line(raw: &[u8], line_no: usize) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

    let text = match String::from_utf8_lossy(raw) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            warn!("Line {} is not valid UTF-8; undecodable bytes replaced: {:?}", line_no, text);
            text
        }
    };

    if line_no == 1 {
        if let Some(stripped) = text.strip_prefix(BYTE_ORDER_MARK) {
            return stripped.to_string();
        }
    }
    text
}

/// Run one non-blank line through the pipeline. Never fails the run.
async fn process_line(
    line: &str,
    line_no: usize,
    config: &RunConfig,
    search: &dyn CardSearch,
    fetcher: &dyn ImageFetcher,
    report: &mut RunReport,
) {
    let Some(request) = parse_line(line, config.token_prefix) else {
        debug!("Skipping unparseable line {}: {:?}", line_no, line);
        report.stats.unparsed_lines += 1;
        return;
    };

    let label = request.to_string();
    info!("Downloading card: {}", label);
    if let Some(ref cb) = config.progress_callback {
        cb.on_card_start(line_no, &label);
    }

    let query = build_query(&request);
    let options = search_options(&request, config.unique);
    report.stats.requests += 1;

    let records = match search.search(&query, &options).await {
        Ok(records) => records,
        Err(e) => {
            error!("{}", e);
            Vec::new()
        }
    };
    debug!("Query '{}' returned {} records", query, records.len());

    let candidates = select_candidates(records, config.policy);
    if candidates.is_empty() {
        error!("No cards found for query: {}", query);
        let entry = report.missing.record(&request).to_string();
        report.stats.missing += 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_card_missing(line_no, &entry);
        }
        return;
    }

    for candidate in &candidates {
        let result =
            download_candidate(fetcher, candidate, &config.output_dir, config.policy, &query).await;
        match result {
            Ok(path) => {
                debug!("Saved {}", path.display());
                report.stats.images_downloaded += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_card_downloaded(line_no, &path);
                }
                report.downloaded.push(path);
            }
            Err(e) => record_card_error(line_no, config, report, &e),
        }
    }
}

fn record_card_error(line_no: usize, config: &RunConfig, report: &mut RunReport, e: &CardError) {
    error!("{}", e);
    report.stats.image_failures += 1;
    if let Some(ref cb) = config.progress_callback {
        cb.on_card_error(line_no, &e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_strips_terminators() {
        assert_eq!(decode_line(b"Lightning Bolt\r\n", 2), "Lightning Bolt");
        assert_eq!(decode_line(b"Forest\n", 2), "Forest");
        assert_eq!(decode_line(b"Island", 2), "Island");
    }

    #[test]
    fn decode_replaces_invalid_bytes() {
        assert_eq!(decode_line(b"Lim-D\xfbl's Vault\n", 2), "Lim-D\u{FFFD}l's Vault");
    }

    #[test]
    fn decode_drops_bom_on_first_line_only() {
        assert_eq!(decode_line("\u{FEFF}Opt\n".as_bytes(), 1), "Opt");
        assert_eq!(decode_line("\u{FEFF}Opt\n".as_bytes(), 2), "\u{FEFF}Opt");
    }
}
