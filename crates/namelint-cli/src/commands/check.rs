//! Check command implementation.

use anyhow::{Context, Result};
use namelint_core::{fix, Analyzer, Config, LintResult};
use namelint_syntax::{apply_edits, Project, RustParser, SymbolTable};
use std::path::Path;

use super::output::{self, FixReport, RejectedFix};
use crate::config_resolver::ConfigSource;
use crate::{LimitOverrides, OutputFormat};

/// Upper bound on fix rounds. Each round renames at most one symbol per
/// touched file, so a round that applies nothing new means the remainder
/// is permanently rejected.
const MAX_FIX_ROUNDS: usize = 32;

/// Runs the check command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    apply_fixes: bool,
    overrides: LimitOverrides,
    exclude: Vec<String>,
    source: &ConfigSource,
) -> Result<()> {
    let mut config = match source {
        ConfigSource::Default => Config::default(),
        other => {
            // Invariant: non-Default variants always have a path
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            }
            Config::from_file(p)
                .with_context(|| format!("Failed to load config: {}", p.display()))?
        }
    };
    apply_overrides(&mut config, overrides);
    config
        .limits
        .validate()
        .context("Invalid limit override")?;

    // Container resolution is fatal before any file is parsed.
    let project = Project::load(path)
        .with_context(|| format!("Failed to load project at {}", path.display()))?;

    let mut builder = Analyzer::builder()
        .root(project.root())
        .files(project.files().to_vec())
        .parser(RustParser::new())
        .config(config);
    for pattern in exclude {
        builder = builder.exclude(pattern);
    }
    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} files under {}",
        project.files().len(),
        project.root().display()
    );

    let mut result = analyzer.analyze().context("Analysis failed")?;

    let fixes = if apply_fixes {
        Some(run_fixes(&analyzer, &project, &mut result)?)
    } else {
        None
    };

    output::print(&result, fixes.as_ref(), format)?;

    // Exit with error code if violations remain
    if result.has_diagnostics() {
        std::process::exit(1);
    }

    Ok(())
}

/// Plans and applies rename rounds until nothing more can be fixed.
///
/// Edits touching a file already claimed this round are deferred; the next
/// round re-analyzes and re-plans them against the rewritten sources, so
/// offsets are never stale.
fn run_fixes(
    analyzer: &Analyzer,
    project: &Project,
    result: &mut LintResult,
) -> Result<FixReport> {
    let mut report = FixReport::default();

    for _ in 0..MAX_FIX_ROUNDS {
        if !result.has_diagnostics() {
            break;
        }
        let table = SymbolTable::build(project.root(), project.files());
        let plan = fix::plan_batch(&result.diagnostics, &table);
        report.rejected = plan
            .rejected
            .iter()
            .map(|(index, reason)| {
                let diagnostic = &result.diagnostics[*index];
                RejectedFix {
                    name: diagnostic.name.clone(),
                    file: diagnostic.location.file.clone(),
                    line: diagnostic.location.line,
                    reason: reason.clone(),
                }
            })
            .collect();
        if plan.ready.is_empty() {
            break;
        }

        let applied = apply_edits(project.root(), &plan.ready)
            .context("Failed to apply rename edits")?;
        tracing::info!(
            "Applied {} rename(s) across {} file(s)",
            applied.renames,
            applied.files.len()
        );
        report.renames += applied.renames;
        report.rounds += 1;

        *result = analyzer.analyze().context("Analysis failed")?;
    }

    Ok(report)
}

fn apply_overrides(config: &mut Config, overrides: LimitOverrides) {
    if overrides.r#type.is_some() {
        config.limits.r#type = overrides.r#type;
    }
    if overrides.method.is_some() {
        config.limits.method = overrides.method;
    }
    if overrides.property.is_some() {
        config.limits.property = overrides.property;
    }
    if overrides.field.is_some() {
        config.limits.field = overrides.field;
    }
    if overrides.variable.is_some() {
        config.limits.variable = overrides.variable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_beat_config_values() {
        let mut config = Config::parse("[limits]\nmethod = 24\nfield = 10\n").unwrap();
        let overrides = LimitOverrides {
            method: Some(8),
            variable: Some(12),
            ..LimitOverrides::default()
        };
        apply_overrides(&mut config, overrides);
        assert_eq!(config.limits.method, Some(8));
        assert_eq!(config.limits.variable, Some(12));
        // Untouched values survive.
        assert_eq!(config.limits.field, Some(10));
        assert_eq!(config.limits.r#type, None);
    }
}
