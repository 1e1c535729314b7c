use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use exif_scrub::{config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "exif-scrub",
    version,
    about = "Inspect and remove EXIF metadata — report GPS, camera, and exposure data, then write a clean copy"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Report metadata only; do not write clean copies
    #[arg(long)]
    scan_only: bool,

    /// Run the strip but write no files
    #[arg(long)]
    dry_run: bool,

    /// Directory for clean copies (default: next to each original)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    // Load config, then apply CLI overrides
    let mut config = config::Config::load(cli.config.as_deref())?;
    if cli.dry_run {
        config.output.dry_run = true;
    }
    if let Some(ref dir) = cli.output_dir {
        config.output.directory = Some(dir.display().to_string());
    }

    // Collect images
    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    log::info!("Found {} image(s) to process", images.len());
    if config.output.dry_run {
        log::info!("DRY RUN — no files will be written");
    }

    let strip = !cli.scan_only;
    let mut results = Vec::new();
    let total = images.len();

    for (i, image_path) in images.iter().enumerate() {
        log::info!("[{}/{}] Processing: {}", i + 1, total, image_path.display());

        let result = pipeline::process_file(image_path, &config, strip).await;

        if let Some(ref err) = result.error {
            log::error!("  Error: {err}");
        } else if !cli.json {
            print_report(&result, config.output.dry_run);
        }

        results.push(result);
    }

    // JSON output
    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "report": r.report,
                    "stripped": r.stripped,
                    "output_path": r.output_path.as_ref().map(|p| p.display().to_string()),
                    "error": r.error,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    // Summary
    let success = results.iter().filter(|r| r.error.is_none()).count();
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    log::info!("Done: {success} succeeded, {failed} failed out of {total} images");

    Ok(())
}

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Print the metadata report and strip outcome for one file.
fn print_report(result: &pipeline::ProcessResult, dry_run: bool) {
    println!();
    println!("  {BOLD}Metadata:{RESET}");
    println!("  {DIM}{}{RESET}", "─".repeat(72));

    for entry in &result.report.entries {
        let tag_col = format!("{:<22}", entry.label);
        if entry.sensitive {
            println!("  {RED}{tag_col} : {} !{RESET}", entry.value);
        } else {
            println!("  {tag_col} : {}", entry.value);
        }
    }

    println!("  {DIM}{}{RESET}", "─".repeat(72));
    if result.report.has_sensitive_data {
        println!("  {RED}!{RESET} = sensitive (location or device identity)");
    }

    if let Some(ref stripped) = result.stripped {
        let delta = if stripped.saved_bytes >= 0 {
            format!("saved {} bytes ({}%)", stripped.saved_bytes, stripped.saved_percent)
        } else {
            format!("grew by {} bytes", -stripped.saved_bytes)
        };
        if let Some(ref path) = result.output_path {
            let note = if dry_run { " (dry run, not written)" } else { "" };
            println!("  {GREEN}Clean copy:{RESET} {}{note} — {delta}", path.display());
        }
    }
    println!();
}
