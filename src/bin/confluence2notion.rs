//! CLI binary for confluence2notion.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `MigrationConfig`, builds the Confluence and Notion clients and prints
//! results.

use anyhow::{Context, Result};
use clap::Parser;
use confluence2notion::{
    migrate, parse_page_id, BlankLines, BlockHandle, ConfluenceClient, Credentials, MigrationConfig,
    MigrationOutput, MigrationProgressCallback, NotionClient, ProgressCallback, SpaceSelection,
    UnitStats,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the whole run plus a log line per
/// space. Spaces finish out of order, so start times are kept per name.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<String, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_migration_start` reports the number of spaces.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Listing Confluence spaces…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} spaces  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Migrating");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, name: &str) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(name))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl MigrationProgressCallback for CliProgressCallback {
    fn on_migration_start(&self, total_units: usize) {
        self.activate_bar(total_units);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Migrating {total_units} spaces…"))
        ));
    }

    fn on_unit_start(&self, name: &str) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(name.to_string(), Instant::now());
        }
        self.bar.set_message(name.to_string());
    }

    fn on_unit_complete(&self, name: &str, stats: &UnitStats) {
        let secs = self.elapsed_secs(name);
        self.bar.println(format!(
            "  {} {:<32}  {}  {}",
            green("✓"),
            name,
            dim(&format!(
                "{:>4} pages {:>5} blocks {:>3} files",
                stats.pages, stats.blocks, stats.attachments
            )),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_unit_error(&self, name: &str, error: &str) {
        let secs = self.elapsed_secs(name);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:<32}  {}  {}",
            red("✗"),
            name,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_migration_complete(&self, total_units: usize, succeeded: usize) {
        let failed = total_units.saturating_sub(succeeded);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} spaces migrated successfully",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} spaces migrated  ({} failed)",
                if failed == total_units { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                total_units,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Migrate every space under a Notion page
  confluence2notion https://acme.atlassian.net/wiki https://www.notion.so/acme/Wiki-0123456789abcdef0123456789abcdef

  # Only two spaces, eight at a time
  confluence2notion --spaces ENG,OPS --concurrency 8 https://acme.atlassian.net/wiki 0123456789abcdef0123456789abcdef

  # Drop blank lines between paragraphs
  confluence2notion --blank-lines drop https://acme.atlassian.net/wiki 0123456789abcdef0123456789abcdef

  # Machine-readable results
  confluence2notion --json https://acme.atlassian.net/wiki 0123456789abcdef0123456789abcdef > result.json

ENVIRONMENT VARIABLES:
  CONFLUENCE_API_USERNAME  Confluence account e-mail
  CONFLUENCE_API_TOKEN     Confluence API token
  NOTION_TOKEN             Notion integration secret (the integration must
                           have access to the target page)
  RUST_LOG                 Override log filter (e.g. confluence2notion=debug)

Each space becomes a page under the target page. Its icon is set to ✅ when
the space migrated completely and ❌ when it stopped on an error.
"#;

/// Migrate Confluence spaces into a Notion page.
#[derive(Parser, Debug)]
#[command(
    name = "confluence2notion",
    version,
    about = "Migrate Confluence spaces (pages, child pages, attachments) into Notion",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Confluence site URL, e.g. https://acme.atlassian.net/wiki.
    confluence_url: String,

    /// Target Notion page: id or URL.
    notion_page: String,

    /// Number of spaces migrated in parallel.
    #[arg(short, long, env = "C2N_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Comma-separated space keys to migrate (default: all spaces).
    #[arg(long, env = "C2N_SPACES", value_delimiter = ',')]
    spaces: Vec<String>,

    /// Blank lines inside converted text: preserve or drop.
    #[arg(long, env = "C2N_BLANK_LINES", value_enum, default_value = "preserve")]
    blank_lines: BlankLinesArg,

    /// Path prefix stripped from attachment links before lookup.
    #[arg(long, env = "C2N_LINK_PREFIX", default_value = "/wiki")]
    link_prefix: String,

    /// Confluence and Notion API timeout in seconds.
    #[arg(long, env = "C2N_REQUEST_TIMEOUT", default_value_t = 60)]
    request_timeout: u64,

    /// Attachment download timeout in seconds.
    #[arg(long, env = "C2N_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print the results as JSON (MigrationOutput) on stdout.
    #[arg(long, env = "C2N_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "C2N_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "C2N_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "C2N_QUIET")]
    quiet: bool,

    #[arg(long, env = "CONFLUENCE_API_USERNAME", hide_env_values = true)]
    confluence_username: String,

    #[arg(long, env = "CONFLUENCE_API_TOKEN", hide_env_values = true)]
    confluence_token: String,

    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    notion_token: String,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum BlankLinesArg {
    Preserve,
    Drop,
}

impl From<BlankLinesArg> for BlankLines {
    fn from(v: BlankLinesArg) -> Self {
        match v {
            BlankLinesArg::Preserve => BlankLines::Preserve,
            BlankLinesArg::Drop => BlankLines::Drop,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn MigrationProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Clients ──────────────────────────────────────────────────────────
    let root = BlockHandle::new(
        parse_page_id(&cli.notion_page).context("Invalid target Notion page")?,
    );
    let source = ConfluenceClient::new(
        &cli.confluence_url,
        Credentials::new(&cli.confluence_username, &cli.confluence_token),
        &config,
    )
    .context("Invalid Confluence settings")?;
    let target = NotionClient::new(&cli.notion_token, &config).context("Invalid Notion settings")?;

    // ── Run migration ────────────────────────────────────────────────────
    let output = migrate(Arc::new(source), Arc::new(target), &root, &config)
        .await
        .context("Migration failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&output, show_progress);
    }

    if output.stats.failed_units > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Map CLI args to `MigrationConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<MigrationConfig> {
    let spaces = if cli.spaces.is_empty() {
        SpaceSelection::All
    } else {
        SpaceSelection::Keys(cli.spaces.iter().map(|s| s.trim().to_string()).collect())
    };

    let mut builder = MigrationConfig::builder()
        .concurrency(cli.concurrency)
        .blank_lines(cli.blank_lines.clone().into())
        .link_prefix(cli.link_prefix.clone())
        .spaces(spaces)
        .request_timeout_secs(cli.request_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(output: &MigrationOutput, show_progress: bool) {
    let totals = &output.stats.totals;
    if !show_progress {
        for unit in &output.units {
            match &unit.error {
                None => eprintln!("{} {}: {} pages", unit.status.glyph(), unit.name, unit.stats.pages),
                Some(e) => eprintln!("{} {}: {}", unit.status.glyph(), unit.name, e),
            }
        }
        eprintln!(
            "Migrated {}/{} spaces in {}ms",
            output.stats.succeeded_units, output.stats.total_units, output.stats.total_duration_ms
        );
    }
    eprintln!(
        "   {} pages  /  {} blocks  /  {} files  ·  {}ms total",
        dim(&totals.pages.to_string()),
        dim(&totals.blocks.to_string()),
        dim(&totals.attachments.to_string()),
        output.stats.total_duration_ms,
    );
    let skipped = totals.missing_attachments + totals.unsupported_constructs + totals.table_fallbacks;
    if skipped > 0 {
        eprintln!(
            "   {} missing attachments, {} unsupported embeds, {} tables kept as text",
            totals.missing_attachments, totals.unsupported_constructs, totals.table_fallbacks
        );
    }
}
