//! CLI binary for credit-report-md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and writes JSON results.

use anyhow::{Context, Result};
use clap::Parser;
use credit_report_md::{
    extract_batch, extract_with, write_json, BatchProgressCallback, ExtractionConfig,
    ExtractionOutput, HeadingStrategy, ProgressCallback, DEFAULT_SENTINEL, REPORT_TEMPLATE_PROMPT,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch plus a log line per
/// document. Documents may finish out of order.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-document start times, keyed by 1-based batch index.
    start_times: Mutex<HashMap<usize, Instant>>,
    /// File names, keyed by 1-based batch index.
    names: Mutex<HashMap<usize, String>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} reports  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            names: Mutex::new(HashMap::new()),
        })
    }

    /// Remove and return the name and elapsed seconds recorded for `index`.
    fn finish_document(&self, index: usize) -> (String, f64) {
        let elapsed = self
            .start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&index))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let name = self
            .names
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&index))
            .unwrap_or_default();
        (name, elapsed)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting {total} reports…"))
        ));
    }

    fn on_document_start(&self, index: usize, _total: usize, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.bar.set_message(name.clone());
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(index, Instant::now());
        }
        if let Ok(mut m) = self.names.lock() {
            m.insert(index, name);
        }
    }

    fn on_document_complete(&self, index: usize, total: usize, missing_fields: usize) {
        let (name, secs) = self.finish_document(index);
        let mark = if missing_fields == 0 {
            green("✓")
        } else {
            yellow("✓")
        };
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {:<32}  {}  {}",
            mark,
            index,
            total,
            name,
            dim(&format!("{missing_fields} missing")),
            dim(&format!("{:.3}s", secs)),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let (name, _) = self.finish_document(index);

        // First line only; file errors carry a hint on the second.
        let msg = error.lines().next().unwrap_or(error);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {:<32}  {}",
            red("✗"),
            index,
            total,
            name,
            red(msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let failed = total.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} reports extracted",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} reports extracted  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract one report to stdout
  report2json report.md

  # Read from stdin
  cat report.md | report2json -

  # Write to a file, failing if any section is missing
  report2json report.md -o report.json --strict

  # Batch: one <stem>.json per input inside out/
  report2json reports/*.md -o out/

  # Typed rows and diagnostics
  report2json --typed report.md
  report2json --diagnostics report.md

  # Exact substring behaviour of the legacy extractor
  report2json --strategy first-occurrence --no-preclean report.md

  # Print the prompt that makes model output match the template
  report2json --print-prompt > prompt.txt

OUTPUT:
  Default      StructuredReport (nine fields + presence map)
  --typed      TypedReport (named row records, rejected rows listed)
  --diagnostics ExtractionOutput (report + issues + stats)

ENVIRONMENT VARIABLES:
  REPORT2JSON_OUTPUT         Output file or directory
  REPORT2JSON_STRATEGY       structural | first-occurrence
  REPORT2JSON_SENTINEL       Value for missing Full Name / Report Date
  REPORT2JSON_CONCURRENCY    Concurrent documents in batch mode
  RUST_LOG                   Overrides the log filter (e.g. credit_report_md=debug)
"#;

/// Extract structured credit-report records from AI-generated Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "report2json",
    version,
    about = "Extract structured credit-report records from AI-generated Markdown",
    long_about = "Read credit reports written by an AI model in the fixed Markdown template \
(labels, `## ` headings, pipe tables and bullet lists) and emit them as JSON. Missing or \
malformed sections never abort extraction; they fall back to empty values and are listed \
in the presence map.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown files to read. No input or `-` reads stdin.
    inputs: Vec<PathBuf>,

    /// Output file (single input) or directory (several inputs).
    #[arg(short, long, env = "REPORT2JSON_OUTPUT")]
    output: Option<PathBuf>,

    /// Heading matching: structural or first-occurrence.
    #[arg(long, env = "REPORT2JSON_STRATEGY", value_enum, default_value = "structural")]
    strategy: StrategyArg,

    /// Use the input verbatim (no fence stripping or whitespace cleanup).
    #[arg(long, env = "REPORT2JSON_NO_PRECLEAN")]
    no_preclean: bool,

    /// Value used when Full Name or Report Date is missing.
    #[arg(long, env = "REPORT2JSON_SENTINEL", default_value = DEFAULT_SENTINEL)]
    sentinel: String,

    /// Emit typed row records instead of string grids.
    #[arg(long, env = "REPORT2JSON_TYPED", conflicts_with = "diagnostics")]
    typed: bool,

    /// Emit the report together with issues and stats.
    #[arg(long, env = "REPORT2JSON_DIAGNOSTICS")]
    diagnostics: bool,

    /// Single-line JSON instead of pretty-printed.
    #[arg(long, env = "REPORT2JSON_COMPACT")]
    compact: bool,

    /// Exit with status 2 when any field is missing.
    #[arg(long, env = "REPORT2JSON_STRICT")]
    strict: bool,

    /// Number of documents processed concurrently.
    #[arg(short, long, env = "REPORT2JSON_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// Refuse inputs larger than this many bytes.
    #[arg(long, env = "REPORT2JSON_MAX_INPUT_BYTES", default_value_t = 4 * 1024 * 1024)]
    max_input_bytes: usize,

    /// Disable progress bar.
    #[arg(long, env = "REPORT2JSON_NO_PROGRESS")]
    no_progress: bool,

    /// Print the report-template prompt and exit.
    #[arg(long)]
    print_prompt: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "REPORT2JSON_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "REPORT2JSON_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Structural,
    FirstOccurrence,
}

impl From<StrategyArg> for HeadingStrategy {
    fn from(v: StrategyArg) -> Self {
        match v {
            StrategyArg::Structural => HeadingStrategy::Structural,
            StrategyArg::FirstOccurrence => HeadingStrategy::FirstOccurrence,
        }
    }
}

/// Exit status for `--strict` when a field is missing or a document failed.
const EXIT_INCOMPLETE: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_prompt {
        print!("{REPORT_TEMPLATE_PROMPT}");
        return Ok(());
    }

    let is_batch = cli.inputs.len() > 1;

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs in batch mode.
    let show_progress = is_batch && !cli.quiet && !cli.no_progress;
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

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    let complete = if is_batch {
        run_batch(&cli, &config).await?
    } else {
        run_single(&cli, &config).await?
    };

    if cli.strict && !complete {
        std::process::exit(EXIT_INCOMPLETE);
    }
    Ok(())
}

/// Extract one document (file or stdin). Returns whether it was complete.
async fn run_single(cli: &Cli, config: &ExtractionConfig) -> Result<bool> {
    let input = cli.inputs.first().filter(|p| p.as_os_str() != "-");

    let output = match input {
        Some(path) => credit_report_md::extract_file(path, config)
            .await
            .with_context(|| format!("Extraction failed for {}", path.display()))?,
        None => {
            let text = read_stdin(config.max_input_bytes).await?;
            extract_with(&text, config)
        }
    };

    let value = render(cli, &output)?;
    if let Some(ref out_path) = cli.output {
        write_json(out_path, &value, !cli.compact)
            .await
            .context("Failed to write output")?;
        if !cli.quiet {
            eprintln!(
                "{}  {} found  {} empty  {} missing  {}µs  →  {}",
                if output.is_complete() {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                output.stats.found_fields,
                output.stats.empty_fields,
                output.stats.missing_fields,
                output.stats.duration_us,
                bold(&out_path.display().to_string()),
            );
        }
    } else {
        let json = to_json(&value, cli.compact)?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    }

    if !cli.quiet && !output.is_complete() {
        let missing: Vec<String> = output
            .report
            .missing_fields()
            .iter()
            .map(|f| f.to_string())
            .collect();
        eprintln!("{} missing: {}", yellow("⚠"), missing.join(", "));
    }

    Ok(output.is_complete())
}

/// Extract several files; each is written to `<stem>.json`.
///
/// Returns whether every document succeeded and was complete.
async fn run_batch(cli: &Cli, config: &ExtractionConfig) -> Result<bool> {
    if cli.inputs.iter().any(|p| p.as_os_str() == "-") {
        anyhow::bail!("stdin ('-') cannot be combined with other inputs");
    }

    let out_paths = batch_output_paths(&cli.inputs, cli.output.as_deref())?;
    let items = extract_batch(&cli.inputs, config).await;
    let mut complete = true;

    for (item, out_path) in items.into_iter().zip(out_paths) {
        let output = match item.result {
            Ok(output) => output,
            Err(e) => {
                // Already reported by the progress callback or the library log.
                if !cli.quiet && config.progress_callback.is_none() {
                    eprintln!("{} {}: {}", red("✗"), item.path.display(), e);
                }
                complete = false;
                continue;
            }
        };
        complete &= output.is_complete();

        let value = render(cli, &output)?;
        write_json(&out_path, &value, !cli.compact)
            .await
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
    }

    Ok(complete)
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .heading_strategy(cli.strategy.into())
        .preclean(!cli.no_preclean)
        .unknown_sentinel(cli.sentinel.clone())
        .max_input_bytes(cli.max_input_bytes)
        .concurrency(cli.concurrency);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Select the JSON shape requested on the command line.
fn render(cli: &Cli, output: &ExtractionOutput) -> Result<serde_json::Value> {
    let value = if cli.typed {
        serde_json::to_value(output.report.to_typed())
    } else if cli.diagnostics {
        serde_json::to_value(output)
    } else {
        serde_json::to_value(&output.report)
    };
    value.context("Failed to serialise output")
}

fn to_json(value: &serde_json::Value, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    json.context("Failed to serialise output")
}

/// `out/` + `reports/jane.md` → `out/jane.json`; without `-o` the JSON
/// lands next to the input.
fn batch_output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    dir.join(format!("{}.json", stem.to_string_lossy()))
}

/// Output path for every input, in input order.
///
/// Fails before anything is extracted when two inputs would write the same
/// file (`a/report.md` and `b/report.md` into one `-o` directory).
fn batch_output_paths(inputs: &[PathBuf], out_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let paths: Vec<PathBuf> = inputs
        .iter()
        .map(|input| batch_output_path(input, out_dir))
        .collect();

    let mut seen = HashSet::new();
    for (input, path) in inputs.iter().zip(&paths) {
        if !seen.insert(path) {
            anyhow::bail!(
                "{} would overwrite {} written for an earlier input; rename the file or run it separately",
                input.display(),
                path.display()
            );
        }
    }
    Ok(paths)
}

async fn read_stdin(limit: usize) -> Result<String> {
    let mut bytes = Vec::new();
    tokio::io::stdin()
        .take(limit as u64 + 1)
        .read_to_end(&mut bytes)
        .await
        .context("Failed to read stdin")?;
    if bytes.len() > limit {
        anyhow::bail!("stdin exceeds the {limit}-byte limit (raise --max-input-bytes)");
    }
    String::from_utf8(bytes).context("stdin is not valid UTF-8")
}
