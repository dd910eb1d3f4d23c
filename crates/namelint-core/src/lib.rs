//! # namelint-core
//!
//! Core engine for identifier-length linting with an automated rename fixer.
//!
//! This crate provides the rule-evaluation engine, the declaration traversal,
//! and the rename/fix engine. It consumes a front-end collaborator (parsing,
//! symbol resolution, reference finding) through the types and traits in
//! [`frontend`]; the `namelint-syntax` crate supplies the Rust front-end.
//!
//! - [`RuleTable`] holds per-kind maximum identifier lengths
//! - [`walk`](walk::walk) traverses a syntax tree and yields classified declarations
//! - [`evaluate`](report::evaluate) turns an over-long declaration into a [`Diagnostic`]
//! - [`propose`](fix::propose) turns a diagnostic into a validated [`RenameEdit`]
//!
//! ## Example
//!
//! ```ignore
//! use namelint_core::{Analyzer, Config};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .parser(namelint_syntax::RustParser::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod classify;
mod config;
mod report;
mod rules;
mod types;
mod walk;

/// Front-end collaborator surface: syntax tree model and symbol model traits.
pub mod frontend;

/// Rename fixer: candidate computation, validation, and batch scheduling.
pub mod fix;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, CancelToken};
pub use classify::classify;
pub use config::{AnalyzerConfig, Config, ConfigError, LimitsConfig};
pub use report::evaluate;
pub use rules::RuleTable;
pub use types::{
    Declaration, DeclKind, Diagnostic, DiagnosticReport, FixOutcome, LintResult, Location,
    Occurrence, RejectReason, RenameEdit, SymbolId,
};
pub use walk::{walk, Declarations};
