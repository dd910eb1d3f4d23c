//! # namelint-syntax
//!
//! The Rust front-end collaborator for namelint, built on `syn`.
//!
//! This crate supplies everything the core engine treats as external:
//!
//! - [`RustParser`] parses a source file and lowers the `syn` AST into the
//!   core's generic syntax tree
//! - [`SymbolTable`] is the symbol model: declarations, lexical scopes,
//!   reference sites, and collision queries over one project snapshot
//! - [`apply_edits`] materializes rename edits all-or-nothing
//! - [`Project::load`] resolves a CLI path (lone file, directory, or
//!   `Cargo.toml`) into a project root and file list

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod edits;
mod lower;
mod references;
mod span;
mod symbols;

/// Project/container loading.
pub mod project;

pub use edits::{apply_edits, AppliedFixes, EditApplyError};
pub use lower::RustParser;
pub use project::Project;
pub use symbols::SymbolTable;
