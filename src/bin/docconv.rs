//! CLI binary for docconv-client.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ClientConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docconv_client::{
    format_file_size, ApiStatus, ClientConfig, ConversionClient, ConversionKind,
    ConversionResult, FileUpload, HealthStatus, ProgressCallback, UploadProgress,
    UploadProgressCallback, DEFAULT_API_URL,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Upload progress bar; switches to a spinner once every byte is sent and
/// the backend is busy converting.
struct CliUploadCallback {
    bar: ProgressBar,
}

impl CliUploadCallback {
    fn new(total: u64) -> Arc<Self> {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {bytes}/{total_bytes}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Uploading");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self, ok: bool) {
        if ok {
            self.bar.finish_with_message(green("done ✓"));
        } else {
            self.bar.abandon_with_message(red("failed ✗"));
        }
    }
}

impl UploadProgressCallback for CliUploadCallback {
    fn on_upload_progress(&self, progress: UploadProgress) {
        self.bar.set_position(progress.loaded);
        if progress.is_complete() {
            self.bar.set_prefix("Converting");
            self.bar.set_message("waiting for server…");
        } else {
            self.bar.set_message(format!("{}%", progress.percentage));
        }
    }
}

// ── CLI definition ───────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Is the backend up?
  docconv health

  # Convert a PDF to Word and save the result next to it
  docconv convert pdf-to-word report.pdf -o .

  # Merge several PDFs (order is preserved)
  docconv convert merge-pdf a.pdf b.pdf c.pdf -o out/

  # Fetch a previous result by its download locator
  docconv download report_3f2a.docx -o report.docx

CONVERSION KINDS:
  pdf-to-word     .pdf            exactly one file
  word-to-pdf     .docx, .doc     exactly one file
  merge-pdf       .pdf            2 to 10 files
  pdf-to-images   .pdf            exactly one file (result is a ZIP)

ENVIRONMENT VARIABLES:
  CONVERTER_API_URL       Backend base URL (default http://127.0.0.1:5000)
  RUST_LOG                Override log filter (e.g. docconv_client=debug)
"#;

/// Convert PDF and Word documents through a conversion backend.
#[derive(Parser, Debug)]
#[command(
    name = "docconv",
    version,
    about = "Convert PDF and Word documents through a conversion backend",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Backend base URL.
    #[arg(long, global = true, env = "CONVERTER_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Health-check timeout in seconds.
    #[arg(long, global = true, env = "DOCCONV_HEALTH_TIMEOUT", default_value_t = 10)]
    health_timeout: u64,

    /// Conversion upload timeout in seconds.
    #[arg(long, global = true, env = "DOCCONV_CONVERT_TIMEOUT", default_value_t = 300)]
    convert_timeout: u64,

    /// Download timeout in seconds.
    #[arg(long, global = true, env = "DOCCONV_DOWNLOAD_TIMEOUT", default_value_t = 60)]
    download_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCCONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCCONV_QUIET")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query the backend health endpoint.
    Health {
        /// Print the raw health payload as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Report reachability without failing (exit code 0 either way).
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Upload files for conversion.
    Convert {
        /// pdf-to-word, word-to-pdf, merge-pdf or pdf-to-images.
        kind: ConversionKind,

        /// Input files.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Download the result into this directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the ConversionResult as JSON.
        #[arg(long)]
        json: bool,

        /// Disable progress bar.
        #[arg(long, env = "DOCCONV_NO_PROGRESS")]
        no_progress: bool,
    },

    /// Download a converted file by its locator.
    Download {
        filename: String,

        /// Destination path. Default: ./<filename>.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the absolute download URL for a locator (no network).
    Url { filename: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let client = ConversionClient::new(config).context("Failed to create client")?;

    match cli.command {
        Command::Health { json } => {
            let health = client
                .check_health()
                .await
                .context("Health check failed")?;
            let report = render(&health, json, cli.quiet, |h| {
                health_text(client.base_url(), h)
            })?;
            if let Some(text) = report {
                println!("{text}");
            }
        }

        Command::Status { json } => {
            let status = client.api_status().await;
            if let Some(text) = render(&status, json, cli.quiet, status_text)? {
                println!("{text}");
            }
        }

        Command::Convert {
            kind,
            files,
            output,
            json,
            no_progress,
        } => {
            let uploads = load_files(&files).await?;
            let show_progress = !cli.quiet && !no_progress && !json;
            let total: u64 = uploads.iter().map(FileUpload::size).sum();

            let bar = show_progress.then(|| CliUploadCallback::new(total));
            let callback = bar.clone().map(|b| b as ProgressCallback);

            let outcome = client.convert(kind, &uploads, callback).await;
            if let Some(ref b) = bar {
                b.finish(outcome.is_ok());
            }
            let result = outcome.with_context(|| format!("{} failed", kind.label()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if !cli.quiet {
                print_result(&client, &result);
            }

            if let Some(dir) = output {
                let dest = dir.join(&result.filename);
                let written = client
                    .download_to_file(&result.filename, &dest)
                    .await
                    .context("Download failed")?;
                if !cli.quiet {
                    eprintln!(
                        "{}  {}  →  {}",
                        green("✔"),
                        format_file_size(written),
                        bold(&dest.display().to_string())
                    );
                }
            }
        }

        Command::Download { filename, output } => {
            let dest = output.unwrap_or_else(|| PathBuf::from(&filename));
            let written = client
                .download_to_file(&filename, &dest)
                .await
                .with_context(|| format!("Failed to download '{filename}'"))?;
            if !cli.quiet {
                eprintln!(
                    "{}  {}  →  {}",
                    green("✔"),
                    format_file_size(written),
                    bold(&dest.display().to_string())
                );
            }
        }

        Command::Url { filename } => {
            println!("{}", client.download_url(&filename));
        }
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    ClientConfig::builder()
        .base_url(&cli.api_url)
        .health_timeout_secs(cli.health_timeout)
        .conversion_timeout_secs(cli.convert_timeout)
        .download_timeout_secs(cli.download_timeout)
        .build()
        .context("Invalid configuration")
}

async fn load_files(paths: &[PathBuf]) -> Result<Vec<FileUpload>> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        uploads.push(load_file(path).await?);
    }
    Ok(uploads)
}

async fn load_file(path: &Path) -> Result<FileUpload> {
    FileUpload::from_path(path)
        .await
        .with_context(|| format!("Cannot read input {:?}", path))
}

/// What a report command prints: JSON when asked for, nothing under
/// `--quiet`, the human-readable form otherwise.
fn render<T: Serialize>(
    value: &T,
    json: bool,
    quiet: bool,
    human: impl FnOnce(&T) -> String,
) -> Result<Option<String>> {
    if json {
        return Ok(Some(serde_json::to_string_pretty(value)?));
    }
    Ok((!quiet).then(|| human(value)))
}

fn health_text(base_url: &str, health: &HealthStatus) -> String {
    let mut lines = vec![
        format!("URL:          {base_url}"),
        format!("Status:       {}", health.status),
        format!("Version:      {}", health.version),
        format!("Timestamp:    {}", health.timestamp),
    ];
    for (name, ok) in &health.dependencies {
        let mark = if *ok { green("✓") } else { red("✗") };
        lines.push(format!("  {mark} {name}"));
    }
    lines.join("\n")
}

fn status_text(status: &ApiStatus) -> String {
    if status.reachable {
        format!("{}  {} is reachable", green("✔"), bold(&status.url))
    } else {
        format!(
            "{}  {} is unreachable: {}",
            red("✘"),
            bold(&status.url),
            status.error.as_deref().unwrap_or("unknown error")
        )
    }
}

fn print_result(client: &ConversionClient, result: &ConversionResult) {
    println!("{}", result.message);
    if let Some(count) = result.image_count {
        println!("Images:       {count}");
    }
    println!("File:         {}", result.filename);
    println!("Download:     {}", dim(&client.download_url(&result.filename)));
}
