// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Build the filter chain from the CLI configuration
// 3. Wire Ctrl-C to the crawl's cancellation channel, so an interrupt
//    drains in-flight work and reports partial results instead of dying
// 4. Run the crawl and print/export the results
// 5. Exit with proper code (0 = success, 2 = error)
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use regex::Regex;
use tokio::sync::watch;

use mail_hunter::cli::Cli;
use mail_hunter::crawl::{CrawlOptions, CrawlResult, Crawler};
use mail_hunter::fetch::HttpFetcher;
use mail_hunter::filters::{self, FilterChain};
use mail_hunter::{report, urls};

#[tokio::main]
async fn main() {
    env_logger::init();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Caller-configured filters; the orchestrator appends the built-in
    // within-domain filter itself
    let mut chain = FilterChain::new();
    chain.add(filters::extension_blacklist(cli.skip_extensions.clone()));
    if let Some(pattern) = &cli.allow {
        let pattern = Regex::new(pattern).context("invalid --allow pattern")?;
        chain.add(filters::allow_matching(pattern));
    }
    if let Some(pattern) = &cli.deny {
        let pattern = Regex::new(pattern).context("invalid --deny pattern")?;
        chain.add(filters::deny_matching(pattern));
    }

    // First Ctrl-C asks the crawl to wind down gracefully; the partial
    // results are printed below just like complete ones
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted - collecting partial results...");
            let _ = cancel_tx.send(true);
        }
    });

    let fetcher = HttpFetcher::new(Duration::from_secs(cli.timeout))
        .context("cannot build HTTP client")?;
    let crawler = Crawler::new(Arc::new(fetcher));

    let options = CrawlOptions {
        max_workers: cli.max_workers,
        max_depth: cli.max_depth,
        within_domain: !cli.all_domains,
    };

    let result = crawler.crawl(&cli.url, &options, chain, cancel_rx).await?;

    if cli.json {
        let report = report::Report::from_result(&result);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report::print_report(&result);
    }

    if let Some(target) = &cli.path_to {
        print_path(&result, target);
    }

    if let Some(path) = &cli.csv {
        report::save_emails_csv(path, &result)?;
        eprintln!("Wrote emails to {}", path.display());
    }
    if let Some(path) = &cli.edges {
        report::save_edges_csv(path, &result.graph)?;
        eprintln!("Wrote page graph to {}", path.display());
    }

    Ok(())
}

// Answers --path-to: how do you get from the start page to this URL?
fn print_path(result: &CrawlResult, target: &str) {
    let target = match urls::normalize_url(target) {
        Ok(normalized) => normalized,
        Err(invalid) => {
            eprintln!("--path-to: {}", invalid);
            return;
        }
    };
    match result.graph.find_path(&result.root, &target) {
        Some(path) => {
            println!("\nPath from {} to {}:", result.root, target);
            for page in path {
                println!("\t{}", page.url());
            }
        }
        None => println!("\nNo known path from {} to {}", result.root, target),
    }
}
