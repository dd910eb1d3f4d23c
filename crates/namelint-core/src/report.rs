//! Diagnostic evaluation: identifier length against the rule table.

use crate::rules::RuleTable;
use crate::types::{Declaration, Diagnostic};

/// Emits a diagnostic iff the declaration's name is longer than the limit
/// for its kind. Lengths are measured in characters, not bytes. Never
/// fails; a conforming declaration yields `None`.
#[must_use]
pub fn evaluate(declaration: &Declaration, rules: &RuleTable) -> Option<Diagnostic> {
    let limit = rules.limit_for(declaration.kind);
    let length = declaration.name.chars().count();
    if length <= limit {
        return None;
    }

    let message = format!(
        "{} name `{}` is {} characters long; maximum is {} (line {})",
        declaration.kind, declaration.name, length, limit, declaration.location.line,
    );

    Some(Diagnostic {
        kind: declaration.kind,
        name: declaration.name.clone(),
        location: declaration.location.clone(),
        limit,
        message,
    })
}
