// src/main.rs
// =============================================================================
// This is the entry point of fetchkit.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) and load configuration
// 3. Dispatch to `serve` or `download`
// 4. Exit with proper code (0 = success, 1 = some files failed, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;     // src/cli.rs - command-line parsing
mod config;  // src/config.rs - environment configuration
mod error;   // src/error.rs - AppError and its HTTP mapping
mod export;  // src/export/ - zip archive export
mod github;  // src/github/ - GitHub API client, URLs, file records
mod hydrate; // src/hydrate/ - batched content fetching
mod images;  // src/images/ - image renditions
mod server;  // src/server/ - axum HTTP API
mod walk;    // src/walk/ - recursive directory walk and tree view

#[cfg(test)]
mod testing; // src/testing.rs - fake GitHub API for tests

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, DownloadArgs};
use config::AppConfig;
use export::{export_archive, todays_archive_filename};
use github::{parse_source_url, validate_token, GitHubClient};
use hydrate::{hydrate, DirectFetcher, HydrationReport, RemoteFetcher};
use walk::{build_tree, fetch_directory, format_file_size, render_tree};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = everything worked
//   Ok(1) = archive written, but some files could not be fetched
//   Err   = anything fatal (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            init_tracing("info");
            let mut config = AppConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            server::serve(config).await?;
            Ok(0)
        }
        Commands::Download(args) => {
            // The download command talks to the user with println!;
            // logs only show up for warnings unless RUST_LOG says otherwise
            init_tracing("warn");
            handle_download(args).await
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// validate -> walk -> hydrate -> export -> write
async fn handle_download(args: DownloadArgs) -> Result<i32> {
    let config = AppConfig::from_env()?;
    let http = config.http_client()?;

    println!("🔍 Reading GitHub directory: {}", args.repo_url);
    let location = parse_source_url(&args.repo_url, &config.default_branch)?;

    let client = GitHubClient::new(http.clone(), &config.github_api_url, args.token.as_str())?;
    validate_token(&client).await?;
    println!("🔑 Token accepted");

    let listing = fetch_directory(&client, &location).await?;
    println!(
        "📄 Found {} file(s) in {}/{}@{}",
        listing.files.len(),
        location.owner,
        location.repo,
        location.branch
    );
    for warning in &listing.warnings {
        println!("   ⚠️  {warning}");
    }

    let mut files = listing.files;

    if args.tree {
        println!();
        print!("{}", render_tree(&build_tree(&files)));
        println!();
    }

    let report = match &args.server {
        Some(server_url) => {
            println!("🌐 Fetching contents through {server_url}");
            let fetcher = RemoteFetcher::new(http.clone(), server_url, args.token.as_str())?;
            hydrate(&fetcher, &mut files, args.batch_size, args.parallel_batches).await
        }
        None => {
            let fetcher = DirectFetcher::new(http.clone(), config.content_concurrency);
            hydrate(&fetcher, &mut files, args.batch_size, args.parallel_batches).await
        }
    };
    print_report(&report);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&files)?);
    }

    println!("📦 Building archive...");
    let archive = export_archive(&http, &files).await?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(todays_archive_filename()));
    tokio::fs::write(&output, &archive)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "✅ Wrote {} ({})",
        output.display(),
        format_file_size(archive.len() as u64)
    );

    if report.failures.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn print_report(report: &HydrationReport) {
    if report.requested == 0 {
        println!("📥 All file contents were included in the listing");
        return;
    }

    println!(
        "📥 Fetched {}/{} file(s) in {} batch(es)",
        report.hydrated, report.requested, report.batches
    );
    for (path, reason) in &report.failures {
        println!("   ❌ {path}: {reason}");
    }
}
