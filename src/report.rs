// src/report.rs
// =============================================================================
// Builds the final health report and gets it out of the process.
//
// Two outputs:
// - a JSON file (the artifact other tooling picks up)
// - a summary on stdout, either as a table or as the same JSON
// =============================================================================

use crate::checker::CheckedLink;
use crate::links::UNREACHABLE;
use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Local time the report was built, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    pub accessible_count: usize,
    pub inaccessible_count: usize,
    pub total_count: usize,
    pub link_status: Vec<CheckedLink>,
}

impl Report {
    /// Counts are taken from each link's final latency, whatever tier set it
    pub fn from_links(link_status: Vec<CheckedLink>) -> Self {
        let accessible_count = link_status.iter().filter(|l| l.is_ok()).count();
        let total_count = link_status.len();

        Report {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            accessible_count,
            inaccessible_count: total_count - accessible_count,
            total_count,
            link_status,
        }
    }

    /// Writes the report as JSON indented with four spaces
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        self.write_json(&mut writer)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        Ok(())
    }

    fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        self.serialize(&mut serializer)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_json(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

// Prints the report either as a table or JSON
pub fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json()?);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(report: &Report) {
    println!("{:<24} {:<50} {:<12}", "NAME", "LINK", "LATENCY");
    println!("{}", "=".repeat(88));

    for link in &report.link_status {
        println!(
            "{:<24} {:<50} {:<12}",
            truncate(&link.record.name, 24),
            truncate(&link.record.link, 50),
            format_latency(f64::from(link.latency)),
        );
    }

    println!();
    println!("📊 Summary ({}):", report.timestamp);
    println!("   ✅ Accessible: {}", report.accessible_count);
    println!("   ❌ Inaccessible: {}", report.inaccessible_count);
    println!("   📋 Total: {}", report.total_count);
}

fn format_latency(secs: f64) -> String {
    if secs == UNREACHABLE {
        "UNREACHABLE".to_string()
    } else {
        format!("{:.2}s", secs)
    }
}

// Cuts on a char boundary so names with CJK characters don't panic
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width - 3).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}
