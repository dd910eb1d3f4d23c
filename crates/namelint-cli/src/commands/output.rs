//! Shared output formatting for lint results and fix summaries.

use anyhow::Result;
use namelint_core::{LintResult, RejectReason};
use serde::Serialize;
use std::path::PathBuf;

use crate::OutputFormat;

/// Summary of an `--apply-fixes` run.
#[derive(Debug, Default, Serialize)]
pub struct FixReport {
    /// Number of apply rounds that wrote edits.
    pub rounds: usize,
    /// Renames applied across all rounds.
    pub renames: usize,
    /// Fixes rejected in the final round, with the reason.
    pub rejected: Vec<RejectedFix>,
}

/// One fix the planner refused to apply.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedFix {
    /// The identifier that stays too long.
    pub name: String,
    /// File with the declaration.
    pub file: PathBuf,
    /// Line of the declaration.
    pub line: usize,
    /// Why the rename was rejected.
    pub reason: RejectReason,
}

/// Print lint results (and the fix summary, if fixes ran) in the
/// specified format.
pub fn print(result: &LintResult, fixes: Option<&FixReport>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print_text(result);
            if let Some(report) = fixes {
                print_fixes_text(report);
            }
        }
        OutputFormat::Json => return print_json(result, fixes),
        OutputFormat::Compact => print_compact(result),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for diagnostic in &result.diagnostics {
        println!(
            "\x1b[33mwarning\x1b[0m: {} name `{}` is too long (limit {})",
            diagnostic.kind, diagnostic.name, diagnostic.limit,
        );
        println!(
            "  --> {}:{}:{}",
            diagnostic.location.file.display(),
            diagnostic.location.line,
            diagnostic.location.column,
        );
        println!();
    }

    let total = result.diagnostics.len();
    let summary_color = if total > 0 { "\x1b[33m" } else { "\x1b[32m" };
    let by_kind: Vec<String> = result
        .count_by_kind()
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(kind, count)| format!("{count} {kind}"))
        .collect();
    let breakdown = if by_kind.is_empty() {
        String::new()
    } else {
        format!(" ({})", by_kind.join(", "))
    };

    println!(
        "{}Found {} naming violation(s){} in {} file(s), {} failed to parse\x1b[0m",
        summary_color, total, breakdown, result.files_checked, result.files_failed,
    );
}

fn print_fixes_text(report: &FixReport) {
    println!(
        "Applied {} rename(s) in {} round(s)",
        report.renames, report.rounds
    );
    for rejected in &report.rejected {
        let reason = match &rejected.reason {
            RejectReason::RenameCollision { existing } => {
                format!("would collide with {existing}")
            }
            other => other.to_string(),
        };
        println!(
            "  skipped `{}` at {}:{}: {}",
            rejected.name,
            rejected.file.display(),
            rejected.line,
            reason,
        );
    }
}

fn print_json(result: &LintResult, fixes: Option<&FixReport>) -> Result<()> {
    #[derive(Serialize)]
    struct Payload<'a> {
        #[serde(flatten)]
        result: &'a LintResult,
        #[serde(skip_serializing_if = "Option::is_none")]
        fixes: Option<&'a FixReport>,
    }

    let json = serde_json::to_string_pretty(&Payload { result, fixes })?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for diagnostic in &result.diagnostics {
        println!(
            "{}:{}:{}: {}",
            diagnostic.location.file.display(),
            diagnostic.location.line,
            diagnostic.location.column,
            diagnostic.message,
        );
    }
}
