//! Core types: declarations, diagnostics, rename edits, and results.

use miette::{Diagnostic as MietteDiagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// The kind of a reportable declaration. Fixed, closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    /// A type declaration (struct, enum, trait, union, type alias).
    Type,
    /// A function or method declaration.
    Method,
    /// A value member: const or static item, or an associated const.
    Property,
    /// A named field of a type.
    Field,
    /// A single identifier bound by a local `let` statement.
    LocalVariable,
}

impl DeclKind {
    /// All kinds, in reporting order.
    pub const ALL: [Self; 5] = [
        Self::Type,
        Self::Method,
        Self::Property,
        Self::Field,
        Self::LocalVariable,
    ];
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Type => write!(f, "type"),
            Self::Method => write!(f, "method"),
            Self::Property => write!(f, "property"),
            Self::Field => write!(f, "field"),
            Self::LocalVariable => write!(f, "variable"),
        }
    }
}

/// Source code location of an identifier token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to the project root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in the file.
    pub offset: usize,
    /// Length of the identifier in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a new location without span information.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// Opaque handle into the front-end's symbol model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

/// A classified declaration produced by the walker.
///
/// Immutable once created; owned by the walk that produced it and not
/// persisted beyond one analysis pass. The symbol handle for a declaration
/// is obtained at fix time through `SymbolModel::resolve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Declaration kind.
    pub kind: DeclKind,
    /// Declared identifier text.
    pub name: String,
    /// Location of the identifier token.
    pub location: Location,
}

/// A diagnostic for an over-long identifier.
///
/// One diagnostic per declaration, never duplicated or merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Kind of the offending declaration.
    pub kind: DeclKind,
    /// The offending identifier.
    pub name: String,
    /// Location of the identifier token.
    pub location: Location,
    /// The limit that was exceeded.
    pub limit: usize,
    /// Human-readable message.
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.message
        )
    }
}

/// Converts a [`Diagnostic`] to a miette diagnostic for rich terminal display.
#[derive(Debug, thiserror::Error, MietteDiagnostic)]
#[error("{message}")]
pub struct DiagnosticReport {
    message: String,
    #[help]
    help: String,
    #[label("{label}")]
    span: SourceSpan,
    label: String,
}

impl From<&Diagnostic> for DiagnosticReport {
    fn from(d: &Diagnostic) -> Self {
        Self {
            message: d.message.clone(),
            help: format!("shorten `{}` to at most {} characters", d.name, d.limit),
            span: SourceSpan::from((d.location.offset, d.location.length)),
            label: format!("{} name too long", d.kind),
        }
    }
}

/// One textual change belonging to a [`RenameEdit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// File path relative to the project root.
    pub file: PathBuf,
    /// Byte offset of the replaced range.
    pub offset: usize,
    /// Byte length of the replaced range.
    pub length: usize,
    /// Text expected at the range; a mismatch means the edit is stale.
    pub old_text: String,
    /// Replacement text.
    pub new_text: String,
}

/// The full, atomic set of textual changes renaming one symbol everywhere
/// it is declared and referenced. Partial renames are unrepresentable: the
/// occurrence list is built in one place from the declaration site plus the
/// complete reference list, and the caller applies all occurrences or none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameEdit {
    /// The renamed symbol.
    pub symbol: SymbolId,
    /// The new identifier.
    pub new_name: String,
    /// Ordered occurrences, sorted by (file, offset), duplicates removed.
    pub occurrences: Vec<Occurrence>,
}

impl RenameEdit {
    /// Builds an edit, sorting occurrences by (file, offset) and dropping
    /// exact duplicates (a site can be reported both as declaration and
    /// reference).
    #[must_use]
    pub fn new(symbol: SymbolId, new_name: String, mut occurrences: Vec<Occurrence>) -> Self {
        occurrences.sort_by(|a, b| a.file.cmp(&b.file).then(a.offset.cmp(&b.offset)));
        occurrences.dedup_by(|a, b| a.file == b.file && a.offset == b.offset);
        Self {
            symbol,
            new_name,
            occurrences,
        }
    }

    /// Returns the set of files this edit touches.
    #[must_use]
    pub fn files_touched(&self) -> BTreeSet<PathBuf> {
        self.occurrences.iter().map(|o| o.file.clone()).collect()
    }
}

/// Why a proposed fix was rejected. Non-fatal; the diagnostic remains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The symbol model could not resolve the declaration.
    SymbolUnavailable,
    /// The truncated candidate already denotes a distinct visible symbol.
    RenameCollision {
        /// Description of the colliding symbol.
        existing: String,
    },
    /// Truncation produced an empty name.
    EmptyCandidate,
    /// The name does not exceed its limit; nothing to fix.
    NotTooLong,
    /// Another edit in the same batch already renamed this symbol.
    OverlappingBatch,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SymbolUnavailable => write!(f, "symbol could not be resolved"),
            Self::RenameCollision { existing } => {
                write!(f, "new name collides with existing symbol `{existing}`")
            }
            Self::EmptyCandidate => write!(f, "truncated name is empty"),
            Self::NotTooLong => write!(f, "name does not exceed its limit"),
            Self::OverlappingBatch => {
                write!(f, "symbol already renamed by another fix in this batch")
            }
        }
    }
}

/// Terminal outcome of one fix attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FixOutcome {
    /// A validated edit set covering declaration and all references.
    Applied(RenameEdit),
    /// The fix was rejected; no edit was produced.
    Rejected(RejectReason),
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All diagnostics found, sorted by (file, line, column).
    pub diagnostics: Vec<Diagnostic>,
    /// Number of files successfully analyzed.
    pub files_checked: usize,
    /// Number of files skipped because they failed to parse.
    pub files_failed: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any diagnostics were produced.
    #[must_use]
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Counts diagnostics per declaration kind, in [`DeclKind::ALL`] order.
    #[must_use]
    pub fn count_by_kind(&self) -> [(DeclKind, usize); 5] {
        DeclKind::ALL.map(|kind| {
            let count = self.diagnostics.iter().filter(|d| d.kind == kind).count();
            (kind, count)
        })
    }

    /// Adds diagnostics and counters from another result.
    pub fn extend(&mut self, other: Self) {
        self.diagnostics.extend(other.diagnostics);
        self.files_checked += other.files_checked;
        self.files_failed += other.files_failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(file: &str, offset: usize) -> Occurrence {
        Occurrence {
            file: PathBuf::from(file),
            offset,
            length: 4,
            old_text: "Name".into(),
            new_text: "Nam".into(),
        }
    }

    #[test]
    fn rename_edit_sorts_and_dedups() {
        let edit = RenameEdit::new(
            SymbolId(1),
            "Nam".into(),
            vec![occ("b.rs", 10), occ("a.rs", 20), occ("b.rs", 10), occ("a.rs", 5)],
        );
        let positions: Vec<_> = edit
            .occurrences
            .iter()
            .map(|o| (o.file.clone(), o.offset))
            .collect();
        assert_eq!(
            positions,
            vec![
                (PathBuf::from("a.rs"), 5),
                (PathBuf::from("a.rs"), 20),
                (PathBuf::from("b.rs"), 10),
            ]
        );
    }

    #[test]
    fn files_touched_is_deduplicated() {
        let edit = RenameEdit::new(
            SymbolId(1),
            "Nam".into(),
            vec![occ("a.rs", 1), occ("a.rs", 9), occ("b.rs", 3)],
        );
        let files: Vec<_> = edit.files_touched().into_iter().collect();
        assert_eq!(files, vec![PathBuf::from("a.rs"), PathBuf::from("b.rs")]);
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(DeclKind::LocalVariable.to_string(), "variable");
        assert_eq!(DeclKind::Type.to_string(), "type");
    }

    #[test]
    fn count_by_kind_partitions_diagnostics() {
        let mut result = LintResult::new();
        result.diagnostics.push(Diagnostic {
            kind: DeclKind::Method,
            name: "CalculateTotal".into(),
            location: Location::new(PathBuf::from("src/lib.rs"), 3, 4),
            limit: 4,
            message: String::new(),
        });
        let counts = result.count_by_kind();
        assert_eq!(counts[1], (DeclKind::Method, 1));
        assert_eq!(counts[0], (DeclKind::Type, 0));
    }
}
