//! The rename fixer.
//!
//! Turns a "shorten this name" decision into a consistent, solution-wide,
//! collision-free rename. A fix attempt is terminal in one pass
//! (proposed, validated, then applied or rejected); there is no retry
//! loop and exactly one deterministic truncation is considered.
//!
//! The batch driver computes edits for many diagnostics in a parallel
//! read-only phase, then partitions them so that edit sets touching an
//! overlapping file are never applied together: applying them concurrently
//! would let one edit's byte ranges go stale after the other shifts
//! offsets. Overlapping sets are deferred for a later round computed
//! against the updated snapshot.

use crate::frontend::SymbolModel;
use crate::types::{Diagnostic, FixOutcome, Occurrence, RejectReason, RenameEdit, SymbolId};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

/// Proposes a rename fix for one diagnostic.
///
/// The candidate name is the leftmost `limit` characters of the offending
/// identifier. The candidate is validated against scope collisions before
/// any edit exists; on acceptance the edit covers the declaration site plus
/// every reference reported by the symbol model.
#[must_use]
pub fn propose(diagnostic: &Diagnostic, model: &dyn SymbolModel) -> FixOutcome {
    let candidate: String = diagnostic.name.chars().take(diagnostic.limit).collect();

    if candidate.is_empty() {
        return FixOutcome::Rejected(RejectReason::EmptyCandidate);
    }
    if candidate == diagnostic.name {
        return FixOutcome::Rejected(RejectReason::NotTooLong);
    }

    let Some(symbol) = model.resolve(&diagnostic.location) else {
        return FixOutcome::Rejected(RejectReason::SymbolUnavailable);
    };

    if let Some(existing) = model.lookup_collision(symbol, &candidate) {
        debug!(
            "rename of `{}` to `{}` collides with `{}`",
            diagnostic.name, candidate, existing
        );
        return FixOutcome::Rejected(RejectReason::RenameCollision { existing });
    }

    let mut occurrences = vec![Occurrence {
        file: diagnostic.location.file.clone(),
        offset: diagnostic.location.offset,
        length: diagnostic.location.length,
        old_text: diagnostic.name.clone(),
        new_text: candidate.clone(),
    }];
    for site in model.find_references(symbol) {
        occurrences.push(Occurrence {
            file: site.file,
            offset: site.offset,
            length: site.length,
            old_text: site.text,
            new_text: candidate.clone(),
        });
    }

    FixOutcome::Applied(RenameEdit::new(symbol, candidate, occurrences))
}

/// Outcome of planning fixes for one batch of diagnostics.
#[derive(Debug, Default)]
pub struct BatchPlan {
    /// Edits whose file sets are pairwise disjoint; safe to apply together.
    pub ready: Vec<RenameEdit>,
    /// Indices (into the input diagnostics) whose edits overlap a ready
    /// edit's files and must be recomputed against the updated snapshot.
    pub deferred: Vec<usize>,
    /// Indices rejected by the fixer, with the reason.
    pub rejected: Vec<(usize, RejectReason)>,
}

/// Computes rename edits for a batch of diagnostics and partitions them
/// into a set that can be applied at once and a deferred remainder.
///
/// The proposal phase is read-only over the symbol model and runs in
/// parallel. Scheduling is sequential and deterministic: diagnostics are
/// considered in input order, an edit is ready when its touched files are
/// disjoint from every earlier ready edit, and at most one rename per
/// symbol is in flight in a round.
#[must_use]
pub fn plan_batch(diagnostics: &[Diagnostic], model: &dyn SymbolModel) -> BatchPlan {
    let outcomes: Vec<FixOutcome> = diagnostics
        .par_iter()
        .map(|d| propose(d, model))
        .collect();

    let mut plan = BatchPlan::default();
    let mut claimed_files: BTreeSet<PathBuf> = BTreeSet::new();
    let mut claimed_symbols: BTreeSet<SymbolId> = BTreeSet::new();

    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            FixOutcome::Rejected(reason) => plan.rejected.push((index, reason)),
            FixOutcome::Applied(edit) => {
                if claimed_symbols.contains(&edit.symbol) {
                    plan.rejected.push((index, RejectReason::OverlappingBatch));
                    continue;
                }
                let files = edit.files_touched();
                if files.iter().any(|f| claimed_files.contains(f)) {
                    debug!(
                        "deferring rename to `{}`: edit set overlaps a file touched this round",
                        edit.new_name
                    );
                    plan.deferred.push(index);
                    continue;
                }
                claimed_files.extend(files);
                claimed_symbols.insert(edit.symbol);
                plan.ready.push(edit);
            }
        }
    }

    plan
}
