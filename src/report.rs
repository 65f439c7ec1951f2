// src/report.rs
// =============================================================================
// Turns a CrawlResult into something a human (or a spreadsheet) can read.
//
// Three output shapes:
// - plain text on stdout: an "Emails:" section and a "Visited web pages:"
//   section
// - JSON (--json): a serialized Report struct
// - CSV files: "page;email" rows (--csv) and "page;page" edge rows (--edges)
//
// The core crawl owns no file format; everything file-shaped lives here.
// =============================================================================

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::crawl::CrawlResult;
use crate::graph::SiteGraph;

/// The JSON-facing summary of one crawl.
#[derive(Debug, Serialize)]
pub struct Report {
    pub emails: Vec<String>,
    pub visited: Vec<String>,
    pub pages_discovered: usize,
    pub interrupted: bool,
}

impl Report {
    pub fn from_result(result: &CrawlResult) -> Self {
        let mut emails: Vec<String> = result.emails().into_iter().collect();
        emails.sort();
        let mut visited: Vec<String> = result.visited.iter().cloned().collect();
        visited.sort();
        Self {
            emails,
            visited,
            pages_discovered: result.graph.len(),
            interrupted: result.interrupted,
        }
    }
}

/// Prints the plain-text report to stdout.
pub fn print_report(result: &CrawlResult) {
    let report = Report::from_result(result);

    println!("\nEmails:");
    if report.emails.is_empty() {
        println!("\t-no emails found");
    } else {
        for email in &report.emails {
            println!("\t{}", email);
        }
    }

    println!("\nVisited web pages:");
    for url in &report.visited {
        println!("\t{}", url);
    }

    if report.interrupted {
        println!("\n(interrupted - results are partial)");
    }
}

// Quotes a CSV field only when the ';' delimiter forces it. URLs and email
// addresses never contain raw '"' or newlines after normalization.
fn csv_field(value: &str) -> String {
    if value.contains(';') {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

/// Writes one "page;email" row per (visited page, email found there) pair.
pub fn save_emails_csv(path: &Path, result: &CrawlResult) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "page;email")?;
    let mut rows: Vec<(&String, &String)> = result
        .emails_by_page
        .iter()
        .flat_map(|(page, emails)| emails.iter().map(move |email| (page, email)))
        .collect();
    rows.sort();
    for (page, email) in rows {
        writeln!(writer, "{};{}", csv_field(page), csv_field(email))?;
    }
    Ok(())
}

/// Writes the site graph as "page;page" rows, one per undirected edge.
pub fn save_edges_csv(path: &Path, graph: &SiteGraph) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "from;to")?;
    for (from, to) in graph.save_edges() {
        writeln!(writer, "{};{}", csv_field(&from), csv_field(&to))?;
    }
    Ok(())
}
