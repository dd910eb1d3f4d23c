//! Analyzer orchestration: file discovery, traversal, and evaluation.

use crate::config::Config;
use crate::frontend::{FrontendError, SourceParser};
use crate::report::evaluate;
use crate::rules::RuleTable;
use crate::types::{Diagnostic, LintResult};
use crate::walk::walk;

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Glob pattern error.
    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Fatal front-end failure (container load or toolchain init).
    #[error(transparent)]
    Frontend(#[from] FrontendError),

    /// Could not build the requested thread pool.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Cooperative cancellation handle.
///
/// Checked between files; cancelling aborts remaining traversal and the
/// analyzer returns the partial diagnostics collected so far.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    parser: Option<Box<dyn SourceParser>>,
    files: Option<Vec<PathBuf>>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    rules: Option<RuleTable>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the front-end parser.
    #[must_use]
    pub fn parser<P: SourceParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Analyzes exactly these files instead of discovering them under the
    /// root. Paths may be absolute or relative to the root.
    #[must_use]
    pub fn files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = Some(files);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the rule table explicitly, overriding the one derived from
    /// configuration.
    #[must_use]
    pub fn rules(mut self, rules: RuleTable) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if no parser was supplied or the current directory
    /// cannot be resolved.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let parser = self.parser.ok_or_else(|| {
            FrontendError::ToolchainUnavailable("no source parser was registered".into())
        })?;

        let root = self
            .root
            .or_else(|| self.config.as_ref().map(|c| c.analyzer.root.clone()))
            .unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let config = self.config.unwrap_or_default();
        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.clone());

        let rules = self
            .rules
            .unwrap_or_else(|| RuleTable::from_limits(&config.limits));

        Ok(Analyzer {
            root,
            parser,
            files: self.files,
            exclude_patterns,
            rules,
            parallelism: config.analyzer.parallelism,
        })
    }
}

/// The main analyzer orchestrating lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance. The walker and
/// reporter are read-only over immutable trees, so files are analyzed in
/// parallel; the only ordering guarantee is determinism within a single
/// file, restored globally by the final (file, line, column) sort.
pub struct Analyzer {
    root: PathBuf,
    parser: Box<dyn SourceParser>,
    files: Option<Vec<PathBuf>>,
    exclude_patterns: Vec<String>,
    rules: RuleTable,
    parallelism: Option<usize>,
}

/// Per-file outcome, merged after the parallel phase.
enum FileOutcome {
    Checked(Vec<Diagnostic>),
    ParseFailed,
    Skipped,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the rule table in effect.
    #[must_use]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Analyzes all files and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails. Parse failures are fatal
    /// only for the affected file and are counted in `files_failed`.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        self.analyze_with_cancel(&CancelToken::new())
    }

    /// Like [`analyze`](Self::analyze), aborting early when `cancel` fires
    /// and returning the partial diagnostics collected so far.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails.
    pub fn analyze_with_cancel(&self, cancel: &CancelToken) -> Result<LintResult, AnalyzerError> {
        info!("starting analysis at {:?}", self.root);
        let files = self.resolve_files()?;
        info!("found {} files to analyze", files.len());

        let run = || {
            files
                .par_iter()
                .map(|file| {
                    if cancel.is_cancelled() {
                        FileOutcome::Skipped
                    } else {
                        self.analyze_file(file)
                    }
                })
                .collect::<Vec<_>>()
        };
        let outcomes = match self.parallelism {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(run),
            None => run(),
        };

        let mut result = LintResult::new();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Checked(diagnostics) => {
                    result.diagnostics.extend(diagnostics);
                    result.files_checked += 1;
                }
                FileOutcome::ParseFailed => result.files_failed += 1,
                FileOutcome::Skipped => {}
            }
        }

        result.diagnostics.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
        });

        info!(
            "analysis complete: {} diagnostics in {} files ({} failed to parse)",
            result.diagnostics.len(),
            result.files_checked,
            result.files_failed,
        );
        Ok(result)
    }

    /// Analyzes a single file: parse, walk, classify, evaluate.
    fn analyze_file(&self, path: &Path) -> FileOutcome {
        debug!("analyzing {}", path.display());
        let relative = path
            .strip_prefix(&self.root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to read {}: {}", path.display(), e);
                return FileOutcome::ParseFailed;
            }
        };

        let tree = match self.parser.parse(&relative, &source) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("{e}");
                return FileOutcome::ParseFailed;
            }
        };

        let diagnostics = walk(&tree)
            .filter_map(|decl| evaluate(&decl, &self.rules))
            .collect();
        FileOutcome::Checked(diagnostics)
    }

    /// Returns the files to analyze: the explicit list when one was set,
    /// otherwise every `.rs` file under the root. Exclude patterns apply to
    /// both sources.
    fn resolve_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        if let Some(files) = &self.files {
            return Ok(files
                .iter()
                .map(|f| {
                    if f.is_absolute() {
                        f.clone()
                    } else {
                        self.root.join(f)
                    }
                })
                .filter(|path| {
                    if self.should_exclude(path) {
                        debug!("excluding {}", path.display());
                        false
                    } else {
                        true
                    }
                })
                .collect());
        }

        let pattern = format!("{}/**/*.rs", self.root.display());
        let mut files = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = entry.map_err(|e| AnalyzerError::Io(e.into()))?;
            if self.should_exclude(&path) {
                debug!("excluding {}", path.display());
                continue;
            }
            files.push(path);
        }
        files.sort();
        Ok(files)
    }

    /// Checks if a path matches an exclude pattern.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        for pattern in &self.exclude_patterns {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
            }
            // Substring fallback for patterns like "**/target/**".
            let normalized = pattern.replace("**", "");
            if !normalized.is_empty() && path_str.contains(&normalized) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{NodeKind, SyntaxNode, Token};
    use crate::types::Location;

    /// Parser stub: one method declaration named after the file stem.
    struct StemParser;

    impl SourceParser for StemParser {
        fn parse(&self, path: &Path, _source: &str) -> Result<SyntaxNode, FrontendError> {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let loc = Location::new(path.to_path_buf(), 1, 1).with_span(0, stem.len());
            Ok(SyntaxNode::new(NodeKind::Other, loc.clone()).with_child(
                SyntaxNode::new(NodeKind::MethodDecl, loc.clone())
                    .with_token(Token::identifier(stem, loc)),
            ))
        }
    }

    #[test]
    fn analyzes_explicit_file_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("extremely_long_stem.rs"), "").unwrap();
        std::fs::write(dir.path().join("ok.rs"), "").unwrap();

        let analyzer = Analyzer::builder()
            .root(dir.path())
            .parser(StemParser)
            .files(vec![
                PathBuf::from("extremely_long_stem.rs"),
                PathBuf::from("ok.rs"),
            ])
            .build()
            .unwrap();

        let result = analyzer.analyze().unwrap();
        assert_eq!(result.files_checked, 2);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].name, "extremely_long_stem");
    }

    #[test]
    fn cancelled_run_returns_partial_results() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "").unwrap();

        let analyzer = Analyzer::builder()
            .root(dir.path())
            .parser(StemParser)
            .build()
            .unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let result = analyzer.analyze_with_cancel(&cancel).unwrap();
        assert_eq!(result.files_checked, 0);
    }

    #[test]
    fn exclude_patterns_match_target_directories() {
        let analyzer = Analyzer::builder()
            .root(".")
            .parser(StemParser)
            .exclude("**/target/**")
            .build()
            .unwrap();
        assert!(analyzer.should_exclude(Path::new("/p/target/debug/main.rs")));
        assert!(!analyzer.should_exclude(Path::new("/p/src/lib.rs")));
    }

    #[test]
    fn explicit_file_list_honors_exclude_patterns() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("vendor")).unwrap();
        std::fs::write(dir.path().join("vendor/generated_binding_table.rs"), "").unwrap();
        std::fs::write(dir.path().join("ok.rs"), "").unwrap();

        let analyzer = Analyzer::builder()
            .root(dir.path())
            .parser(StemParser)
            .exclude("**/vendor/**")
            .files(vec![
                PathBuf::from("vendor/generated_binding_table.rs"),
                PathBuf::from("ok.rs"),
            ])
            .build()
            .unwrap();

        let result = analyzer.analyze().unwrap();
        assert_eq!(result.files_checked, 1);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn missing_parser_is_a_toolchain_error() {
        match Analyzer::builder().root(".").build() {
            Err(AnalyzerError::Frontend(FrontendError::ToolchainUnavailable(_))) => {}
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("build succeeded without a parser"),
        }
    }
}
