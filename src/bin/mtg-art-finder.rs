//! CLI binary for mtg-art-finder.
//!
//! A thin shim over the library crate: loads the property file, applies
//! flag overrides, sets up logging and runs against Scryfall.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mtg_art_finder::config::{
    DEFAULT_PROPERTIES_FILE, KEY_DELAY, KEY_INPUT, KEY_LOG_LEVEL, KEY_OUTPUT, KEY_POLICY,
    KEY_TOKEN_PREFIX,
};
use mtg_art_finder::{
    run_with_scryfall, FinderError, LogLevel, ProgressCallback, Properties, RunConfig,
    RunProgressCallback, RunStats,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner showing the current card plus one
/// log line per saved image, miss or failure.
struct CliProgressCallback {
    bar: ProgressBar,
    cards: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            cards: AtomicUsize::new(0),
        })
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, input: &Path) {
        self.bar.set_message(format!("reading {}", input.display()));
    }

    fn on_card_start(&self, _line_no: usize, label: &str) {
        let n = self.cards.fetch_add(1, Ordering::SeqCst) + 1;
        self.bar.set_prefix(format!("Card {n:>3}"));
        self.bar.set_message(label.to_string());
    }

    fn on_card_downloaded(&self, _line_no: usize, file: &Path) {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.println(format!("  {} {}", green("✓"), name));
    }

    fn on_card_missing(&self, line_no: usize, entry: &str) {
        self.bar.println(format!(
            "  {} {}  {}",
            yellow("?"),
            entry,
            dim(&format!("line {line_no}: not found"))
        ));
    }

    fn on_card_error(&self, line_no: usize, error: &str) {
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {}  {}",
            red("✗"),
            red(&msg),
            dim(&format!("line {line_no}"))
        ));
    }

    fn on_run_complete(&self, stats: &RunStats) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} images saved  {}",
            if stats.image_failures == 0 && stats.missing == 0 {
                green("✔")
            } else {
                yellow("⚠")
            },
            bold(&stats.images_downloaded.to_string()),
            dim(&format!(
                "{} requests, {} missing, {} failed, {:.1}s",
                stats.requests,
                stats.missing,
                stats.image_failures,
                stats.total_duration_ms as f64 / 1000.0
            )),
        );
    }
}

const AFTER_HELP: &str = r#"INPUT FORMAT:
  One card per line. Quantity, token tag and set code are optional:

    Lightning Bolt
    4x Llanowar Elves (M19)
    2 t:Goblin (M13)

PROPERTY FILE (mtg-art-finder.properties):
  input.cards=cards.txt          deck list (mandatory)
  output.folder=art              image folder (mandatory)
  app.log-level=info             error | info | debug
  app.policy=single              single | all-faces
  app.request-delay-ms=50        pause after each line
  input.token-prefix=any         any | strict
  search.unique=prints           cards | art | prints
  output.missing-report=cards-missing.txt

EXAMPLES:
  # Use mtg-art-finder.properties in the current directory
  mtg-art-finder

  # No property file: flags supply everything
  mtg-art-finder --input deck.txt --output art

  # Every face of every printing, with artist in the file name
  mtg-art-finder --policy all-faces

  # Machine-readable summary
  mtg-art-finder --json > report.json

ENVIRONMENT VARIABLES:
  RUST_LOG                   Overrides the log filter entirely
"#;

/// Download Magic: The Gathering card art from a deck list.
#[derive(Parser, Debug)]
#[command(
    name = "mtg-art-finder",
    version,
    about = "Download Magic: The Gathering card art crops from a deck list",
    long_about = "Read a deck list, look every card up on Scryfall, pick the preferred printing \
and save its art crop as a JPEG. Cards that cannot be found are listed in cards-missing.txt.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Property file to read.
    #[arg(
        short,
        long,
        env = "MTG_ART_FINDER_PROPERTIES",
        default_value = DEFAULT_PROPERTIES_FILE
    )]
    properties: PathBuf,

    /// Deck list path (overrides input.cards).
    #[arg(short, long, env = "MTG_ART_FINDER_INPUT")]
    input: Option<String>,

    /// Output folder (overrides output.folder).
    #[arg(short, long, env = "MTG_ART_FINDER_OUTPUT")]
    output: Option<String>,

    /// Log level: error, info, debug (overrides app.log-level).
    #[arg(long, env = "MTG_ART_FINDER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Ranking policy: single, all-faces (overrides app.policy).
    #[arg(long, env = "MTG_ART_FINDER_POLICY")]
    policy: Option<String>,

    /// Delay after each line in milliseconds (overrides app.request-delay-ms).
    #[arg(long, env = "MTG_ART_FINDER_DELAY_MS")]
    delay_ms: Option<u64>,

    /// Token tag mode: any, strict (overrides input.token-prefix).
    #[arg(long, env = "MTG_ART_FINDER_TOKEN_PREFIX")]
    token_prefix: Option<String>,

    /// Print the run report (stats, saved files, misses) as JSON on stdout.
    #[arg(long, env = "MTG_ART_FINDER_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "MTG_ART_FINDER_NO_PROGRESS")]
    no_progress: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MTG_ART_FINDER_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let props = load_properties(&cli).await?;

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO-level lines; debug always shows everything.
    let (level, level_valid) = LogLevel::parse_or_default(props.get(KEY_LOG_LEVEL));
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if level == LogLevel::Debug {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        level.as_filter()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if !level_valid && props.get(KEY_LOG_LEVEL).is_some() {
        warn!(
            "Property {} is not one of error, info, debug; using info",
            KEY_LOG_LEVEL
        );
    }

    // ── Build config ─────────────────────────────────────────────────────
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let mut config = RunConfig::from_properties(&props, &cwd).context("Invalid configuration")?;

    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        config.progress_callback = Some(cb);
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let report = run_with_scryfall(&config).await.context("Run failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    }

    if let Some(ref path) = report.missing_report_path {
        let shown = path.strip_prefix(&cwd).unwrap_or(path.as_path());
        for line in missing_banner(&shown.display().to_string()) {
            eprintln!("{line}");
        }
    }
    if !cli.quiet && !show_progress {
        eprintln!(
            "{} images saved to {}  ({} missing, {} failed, {}ms)",
            report.stats.images_downloaded,
            config.output_dir.display(),
            report.stats.missing,
            report.stats.image_failures,
            report.stats.total_duration_ms
        );
    }
    eprintln!("Done");

    Ok(())
}

/// Boxed notice pointing at the miss report, sized to its file name.
fn missing_banner(report_name: &str) -> Vec<String> {
    let lines = [
        "Some cards' art could not be found".to_string(),
        format!("A list is written to '{report_name}'"),
    ];
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let rule = "-".repeat(width + 6);

    let mut banner = vec![rule.clone()];
    banner.extend(lines.iter().map(|l| format!("-- {l:<width$} --")));
    banner.push(rule);
    banner
}

/// Read the property file and layer command-line overrides on top.
///
/// A missing file is only an error when the flags don't supply both
/// mandatory paths.
async fn load_properties(cli: &Cli) -> Result<Properties> {
    let mut props = match Properties::load(&cli.properties).await {
        Ok(props) => props,
        Err(FinderError::PropertiesNotFound { .. })
            if cli.input.is_some() && cli.output.is_some() =>
        {
            Properties::default()
        }
        Err(e) => return Err(e).context("Failed to load properties"),
    };

    let overrides = [
        (KEY_INPUT, cli.input.clone()),
        (KEY_OUTPUT, cli.output.clone()),
        (KEY_LOG_LEVEL, cli.log_level.clone()),
        (KEY_POLICY, cli.policy.clone()),
        (KEY_DELAY, cli.delay_ms.map(|ms| ms.to_string())),
        (KEY_TOKEN_PREFIX, cli.token_prefix.clone()),
    ];
    for (key, value) in overrides {
        if let Some(value) = value {
            props.set(key, value);
        }
    }

    Ok(props)
}
