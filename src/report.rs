use crate::model::{AuthorRow, StatsOutput, SCHEMA_VERSION};
use crate::stats::AuthorStats;
use chrono::Utc;
use console::style;
use std::fmt::Write;

pub const SEPARATOR_WIDTH: usize = 50;

/// Header, separator and one row per author, in the order given.
pub fn render_table(rows: &[AuthorRow]) -> String {
    let mut out = String::new();
    // writing to a String cannot fail
    let _ = writeln!(out, "{:<20} | {:>6} | {:>6} | {:>6}", "User", "Add", "Delete", "Total");
    let _ = writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH));
    for row in rows {
        let _ = writeln!(
            out,
            "{:<20} | {:>6} | {:>6} | {:>6}",
            row.name, row.additions, row.deletions, row.total
        );
    }
    out
}

pub fn output_table(stats: &AuthorStats) {
    println!("\n{}", style("Statistics by author:").bold());
    print!("{}", render_table(&stats.rows()));
}

pub fn build_output(
    stats: &AuthorStats,
    repository_url: &str,
    selection: &str,
    extensions: &[String],
) -> StatsOutput {
    StatsOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository_url: repository_url.to_string(),
        selection: selection.to_string(),
        extensions: extensions.to_vec(),
        authors: stats.rows(),
    }
}

pub fn output_json(output: &StatsOutput) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}
