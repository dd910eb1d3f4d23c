//! Textual application of rename edits.
//!
//! Edits are staged entirely in memory before anything is written: every
//! occurrence is verified against the current file text, then each touched
//! file's new content is built by replacing ranges back to front so earlier
//! offsets stay valid. Only once every file in the batch has verified and
//! rewritten cleanly do the files hit disk. A stale occurrence (file
//! changed since analysis) fails the whole batch with nothing written.

use namelint_core::{Occurrence, RenameEdit};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Summary of a successfully applied batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedFixes {
    /// Number of rename edits applied.
    pub renames: usize,
    /// Files rewritten, sorted.
    pub files: Vec<PathBuf>,
}

/// Errors surfaced while applying edits. Any of these leaves every file
/// untouched.
#[derive(Debug, Error)]
pub enum EditApplyError {
    /// A file touched by the batch could not be read or written.
    #[error("cannot access {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The text at an occurrence no longer matches what the analysis saw.
    #[error("stale edit in {path} at offset {offset}: expected `{expected}`, found `{found}`")]
    Stale {
        /// The file involved.
        path: PathBuf,
        /// Byte offset of the occurrence.
        offset: usize,
        /// Text the edit expected.
        expected: String,
        /// Text actually present.
        found: String,
    },

    /// An occurrence range runs past the end of the file.
    #[error("edit range {offset}..{end} out of bounds in {path}")]
    OutOfBounds {
        /// The file involved.
        path: PathBuf,
        /// Range start.
        offset: usize,
        /// Range end.
        end: usize,
    },
}

/// Applies a batch of rename edits under `root`, all or nothing.
///
/// The edits must touch disjoint offset ranges; the batch planner
/// guarantees this by scheduling overlapping edits into separate rounds.
///
/// # Errors
///
/// Returns an error without writing anything when a file cannot be read,
/// an occurrence is stale or out of bounds, or a rewrite cannot be
/// persisted.
pub fn apply_edits(root: &Path, edits: &[RenameEdit]) -> Result<AppliedFixes, EditApplyError> {
    let mut by_file: BTreeMap<PathBuf, Vec<&Occurrence>> = BTreeMap::new();
    for edit in edits {
        for occurrence in &edit.occurrences {
            by_file.entry(occurrence.file.clone()).or_default().push(occurrence);
        }
    }

    // Stage every file before writing any.
    let mut staged: Vec<(PathBuf, String)> = Vec::new();
    for (rel, mut occurrences) in by_file {
        let path = root.join(&rel);
        let content = std::fs::read_to_string(&path).map_err(|source| EditApplyError::Io {
            path: path.clone(),
            source,
        })?;
        occurrences.sort_by_key(|o| o.offset);
        let rewritten = rewrite(&path, &content, &occurrences)?;
        staged.push((path, rewritten));
    }

    for (path, content) in &staged {
        std::fs::write(path, content).map_err(|source| EditApplyError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(file = %path.display(), "rewrote file");
    }

    Ok(AppliedFixes {
        renames: edits.len(),
        files: staged.into_iter().map(|(path, _)| path).collect(),
    })
}

/// Verifies and applies occurrences to one file's text, back to front.
fn rewrite(
    path: &Path,
    content: &str,
    occurrences: &[&Occurrence],
) -> Result<String, EditApplyError> {
    let mut text = content.to_string();
    for occurrence in occurrences.iter().rev() {
        let end = occurrence.offset + occurrence.length;
        if end > text.len() {
            return Err(EditApplyError::OutOfBounds {
                path: path.to_path_buf(),
                offset: occurrence.offset,
                end,
            });
        }
        let found = &text[occurrence.offset..end];
        if found != occurrence.old_text {
            return Err(EditApplyError::Stale {
                path: path.to_path_buf(),
                offset: occurrence.offset,
                expected: occurrence.old_text.clone(),
                found: found.to_string(),
            });
        }
        text.replace_range(occurrence.offset..end, &occurrence.new_text);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use namelint_core::SymbolId;
    use std::fs;
    use tempfile::TempDir;

    fn occurrence(file: &str, offset: usize, old: &str, new: &str) -> Occurrence {
        Occurrence {
            file: PathBuf::from(file),
            offset,
            length: old.len(),
            old_text: old.to_string(),
            new_text: new.to_string(),
        }
    }

    #[test]
    fn applies_multiple_occurrences_in_one_file() {
        let dir = TempDir::new().unwrap();
        let src = "fn long_name() {}\nfn caller() { long_name(); }\n";
        fs::write(dir.path().join("lib.rs"), src).unwrap();

        let edit = RenameEdit::new(
            SymbolId(0),
            "long".to_string(),
            vec![
                occurrence("lib.rs", src.find("long_name").unwrap(), "long_name", "long"),
                occurrence("lib.rs", src.rfind("long_name").unwrap(), "long_name", "long"),
            ],
        );
        let applied = apply_edits(dir.path(), &[edit]).unwrap();
        assert_eq!(applied.renames, 1);
        assert_eq!(applied.files.len(), 1);

        let after = fs::read_to_string(dir.path().join("lib.rs")).unwrap();
        assert_eq!(after, "fn long() {}\nfn caller() { long(); }\n");
    }

    #[test]
    fn spans_multiple_files_atomically() {
        let dir = TempDir::new().unwrap();
        let lib = "pub fn expensive() {}\n";
        let main = "fn main() { expensive(); }\n";
        fs::write(dir.path().join("lib.rs"), lib).unwrap();
        fs::write(dir.path().join("main.rs"), main).unwrap();

        let edit = RenameEdit::new(
            SymbolId(0),
            "exp".to_string(),
            vec![
                occurrence("lib.rs", lib.find("expensive").unwrap(), "expensive", "exp"),
                occurrence("main.rs", main.find("expensive").unwrap(), "expensive", "exp"),
            ],
        );
        apply_edits(dir.path(), &[edit]).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("lib.rs")).unwrap(),
            "pub fn exp() {}\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("main.rs")).unwrap(),
            "fn main() { exp(); }\n"
        );
    }

    #[test]
    fn stale_text_fails_without_writing_anything() {
        let dir = TempDir::new().unwrap();
        let lib = "pub fn expensive() {}\n";
        let main = "fn main() { something_else(); }\n";
        fs::write(dir.path().join("lib.rs"), lib).unwrap();
        fs::write(dir.path().join("main.rs"), main).unwrap();

        let edit = RenameEdit::new(
            SymbolId(0),
            "exp".to_string(),
            vec![
                occurrence("lib.rs", lib.find("expensive").unwrap(), "expensive", "exp"),
                // Wrong expectation for main.rs.
                occurrence("main.rs", 12, "expensive", "exp"),
            ],
        );
        let err = apply_edits(dir.path(), &[edit]).unwrap_err();
        assert!(matches!(err, EditApplyError::Stale { .. }));

        // Neither file changed, including the one that verified cleanly.
        assert_eq!(fs::read_to_string(dir.path().join("lib.rs")).unwrap(), lib);
        assert_eq!(
            fs::read_to_string(dir.path().join("main.rs")).unwrap(),
            main
        );
    }

    #[test]
    fn out_of_bounds_range_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lib.rs"), "fn x() {}\n").unwrap();
        let edit = RenameEdit::new(
            SymbolId(0),
            "y".to_string(),
            vec![occurrence("lib.rs", 500, "x", "y")],
        );
        let err = apply_edits(dir.path(), &[edit]).unwrap_err();
        assert!(matches!(err, EditApplyError::OutOfBounds { .. }));
    }
}
