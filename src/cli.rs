// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - serve:    run the HTTP API
// - download: walk a GitHub directory, fetch every file, write a zip
// =============================================================================

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::hydrate::BATCH_SIZE;

#[derive(Parser, Debug)]
#[command(
    name = "fetchkit",
    version,
    about = "Export GitHub directories as zip archives and resize images",
    long_about = "fetchkit serves a small HTTP API for listing, fetching and zipping GitHub \
                  directories and for producing resized JPEG renditions of images. \
                  The download subcommand runs the whole GitHub pipeline from the terminal."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    ///
    /// Example: fetchkit serve --port 8080
    Serve {
        /// Address to bind (overrides SERVER_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides SERVER_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Download a GitHub directory as a zip archive
    ///
    /// Example: fetchkit download https://github.com/user/repo/tree/main/docs
    Download(DownloadArgs),
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// GitHub directory URL (e.g., https://github.com/user/repo/tree/main/src)
    pub repo_url: String,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Where to write the archive (default: github-files-<date>.zip)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Hydrate through a running fetchkit server instead of in-process
    #[arg(long)]
    pub server: Option<String>,

    /// Files per hydration batch
    #[arg(long, default_value_t = BATCH_SIZE)]
    pub batch_size: usize,

    /// Batches in flight at once
    #[arg(long, default_value_t = 1)]
    pub parallel_batches: usize,

    /// Print the directory tree before downloading
    #[arg(long)]
    pub tree: bool,

    /// Print the file list as JSON
    #[arg(long)]
    pub json: bool,
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a separate DownloadArgs struct?
//    - Download has many flags; a named struct can be passed around as one value
//    - #[derive(clap::Args)] lets clap flatten it into the subcommand
//
// 2. What does env = "GITHUB_TOKEN" do?
//    - If --token isn't given, clap reads the GITHUB_TOKEN environment variable
//    - hide_env_values keeps the token out of --help output
//
// 3. Option<T> arguments
//    - Option<String> means the flag is optional and has no default
//    - None means "fall back to configuration"
// -----------------------------------------------------------------------------
