use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use downbooru::booru::{DanbooruClient, PostSource};
use downbooru::{booru, config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "downbooru",
    version,
    about = "Download Danbooru posts as JPEGs with the post tags embedded as IPTC keywords"
)]
struct Cli {
    /// Post ids or post URLs to download
    #[arg(value_name = "POST")]
    posts: Vec<String>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Preview what would be downloaded without writing files
    #[arg(long)]
    dry_run: bool,

    /// Directory to save images into (overrides config)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Overwrite files that already exist
    #[arg(long)]
    overwrite: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Fetch and print the tags of each post without downloading
    #[arg(long = "show-tags")]
    show_tags: bool,
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

    if cli.posts.is_empty() {
        anyhow::bail!("No post ids or URLs specified. Use --help for usage.");
    }

    // Load config
    let mut config = config::Config::load(cli.config.as_deref())?;

    // CLI flag overrides
    if cli.dry_run {
        config.output.dry_run = true;
    }
    if cli.overwrite {
        config.output.overwrite_existing = true;
    }
    if let Some(ref dir) = cli.output_dir {
        config.output.dir = Some(dir.display().to_string());
    }

    let client = DanbooruClient::new(
        config.network.base_url.clone(),
        &config.network.user_agent,
        config.network.timeout_secs,
    )?;

    // Handle --show-tags
    if cli.show_tags {
        for reference in &cli.posts {
            print_post_tags(&client, reference).await;
        }
        return Ok(());
    }

    log::info!("Found {} post(s) to download", cli.posts.len());
    if config.output.dry_run {
        log::info!("DRY RUN — no files will be written");
    }

    // Process each post
    let mut results = Vec::new();
    let total = cli.posts.len();

    for (i, reference) in cli.posts.iter().enumerate() {
        log::info!("[{}/{}] Processing: {reference}", i + 1, total);

        let result = pipeline::process_post(&client, reference, &config).await;

        if let Some(ref err) = result.error {
            log::error!("  Error: {err}");
        } else if let Some(ref path) = result.path {
            log::info!("  Saved: {} ({} tags)", path.display(), result.tags.len());
        }

        results.push(result);
    }

    // JSON output
    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "reference": r.reference,
                    "id": r.id,
                    "tags": r.tags,
                    "file_name": r.file_name,
                    "path": r.path.as_ref().map(|p| p.display().to_string()),
                    "skipped": r.skipped,
                    "error": r.error,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    // Summary
    let saved = results.iter().filter(|r| r.path.is_some()).count();
    let skipped = results.iter().filter(|r| r.skipped.is_some()).count();
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    log::info!("Done: {saved} saved, {skipped} skipped, {failed} failed out of {total} posts");

    Ok(())
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Fetch one post and print its tag list without downloading the file.
async fn print_post_tags(client: &DanbooruClient, reference: &str) {
    let id = match booru::parse_post_ref(reference) {
        Some(id) => id,
        None => {
            log::error!("Not a post id or post URL: {reference}");
            return;
        }
    };

    match client.fetch_post(id).await {
        Ok(post) => {
            println!();
            println!("{BOLD}Post {}{RESET} (.{})", post.id, post.file_ext);
            println!("{DIM}{}{RESET}", "─".repeat(60));
            for tag in post.tags() {
                println!("  {tag}");
            }
        }
        Err(e) => log::error!("Failed to fetch post {id}: {e}"),
    }
}
