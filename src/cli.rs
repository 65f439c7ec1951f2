// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes. clap then generates the parser, --help,
// --version and error messages for us.
// =============================================================================

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "mail-hunter",
    version,
    about = "Crawl a website hunting for email addresses",
    long_about = "mail-hunter starts at a web page, follows links up to a maximum depth \
                  (within the starting domain by default), and collects every email \
                  address it finds along the way, together with a graph of how the \
                  visited pages link to each other."
)]
pub struct Cli {
    /// Web page address (url) where the hunt starts
    pub url: String,

    /// Maximal number of simultaneous fetches
    #[arg(short = 'w', long, default_value_t = 5)]
    pub max_workers: usize,

    /// Maximal distance (in link hops) of traversed pages from the start
    ///
    /// Depth 0 = only the starting page
    /// Depth 1 = starting page + every page it links to
    /// etc.
    #[arg(short = 'd', long, default_value_t = 1)]
    pub max_depth: usize,

    /// Follow links that leave the starting page's domain
    ///
    /// By default the crawl never leaves the host[:port] of the start URL
    #[arg(long)]
    pub all_domains: bool,

    /// Output results in JSON format instead of the plain report
    #[arg(long)]
    pub json: bool,

    /// Write "page;email" rows to this CSV file
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Write the discovered page graph as "page;page" rows to this CSV file
    #[arg(long, value_name = "PATH")]
    pub edges: Option<PathBuf>,

    /// Never follow urls whose path ends with one of these extensions
    #[arg(
        long,
        value_name = "EXT,EXT,...",
        value_delimiter = ',',
        default_value = "bmp,jpeg,jpg,pdf,php,css,js,ico,png"
    )]
    pub skip_extensions: Vec<String>,

    /// Only follow urls matching this regex
    #[arg(long, value_name = "REGEX")]
    pub allow: Option<String>,

    /// Never follow urls matching this regex
    #[arg(long, value_name = "REGEX")]
    pub deny: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// After the crawl, print the shortest link path from the start page
    /// to this url
    #[arg(long, value_name = "URL")]
    pub path_to: Option<String>,
}
