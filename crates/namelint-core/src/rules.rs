//! The rule table: maximum identifier length per declaration kind.

use crate::config::LimitsConfig;
use crate::types::DeclKind;

/// Default maximum length for type names.
pub const DEFAULT_TYPE_LEN: usize = 3;
/// Default maximum length for method names.
pub const DEFAULT_METHOD_LEN: usize = 4;
/// Default maximum length for property names.
pub const DEFAULT_PROPERTY_LEN: usize = 5;
/// Default maximum length for field names.
pub const DEFAULT_FIELD_LEN: usize = 6;
/// Default maximum length for local variable names.
pub const DEFAULT_VARIABLE_LEN: usize = 7;

/// Immutable mapping from declaration kind to maximum identifier length.
///
/// Constructed once per analysis run and threaded through every call;
/// never read from ambient state. Every kind has exactly one threshold
/// and thresholds are >= 1 (enforced at configuration validation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleTable {
    type_len: usize,
    method_len: usize,
    property_len: usize,
    field_len: usize,
    variable_len: usize,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            type_len: DEFAULT_TYPE_LEN,
            method_len: DEFAULT_METHOD_LEN,
            property_len: DEFAULT_PROPERTY_LEN,
            field_len: DEFAULT_FIELD_LEN,
            variable_len: DEFAULT_VARIABLE_LEN,
        }
    }
}

impl RuleTable {
    /// Creates a table with the default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from a partial configuration override.
    /// Unspecified kinds keep their defaults.
    #[must_use]
    pub fn from_limits(limits: &LimitsConfig) -> Self {
        let mut table = Self::default();
        if let Some(n) = limits.r#type {
            table.type_len = n;
        }
        if let Some(n) = limits.method {
            table.method_len = n;
        }
        if let Some(n) = limits.property {
            table.property_len = n;
        }
        if let Some(n) = limits.field {
            table.field_len = n;
        }
        if let Some(n) = limits.variable {
            table.variable_len = n;
        }
        table
    }

    /// Returns the maximum allowed identifier length for a kind.
    /// Total over the closed kind set; never fails.
    #[must_use]
    pub fn limit_for(&self, kind: DeclKind) -> usize {
        match kind {
            DeclKind::Type => self.type_len,
            DeclKind::Method => self.method_len,
            DeclKind::Property => self.property_len,
            DeclKind::Field => self.field_len,
            DeclKind::LocalVariable => self.variable_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_constants() {
        let table = RuleTable::new();
        assert_eq!(table.limit_for(DeclKind::Type), 3);
        assert_eq!(table.limit_for(DeclKind::Method), 4);
        assert_eq!(table.limit_for(DeclKind::Property), 5);
        assert_eq!(table.limit_for(DeclKind::Field), 6);
        assert_eq!(table.limit_for(DeclKind::LocalVariable), 7);
    }

    #[test]
    fn partial_override_keeps_unspecified_defaults() {
        let limits = LimitsConfig {
            method: Some(20),
            variable: Some(12),
            ..LimitsConfig::default()
        };
        let table = RuleTable::from_limits(&limits);
        assert_eq!(table.limit_for(DeclKind::Method), 20);
        assert_eq!(table.limit_for(DeclKind::LocalVariable), 12);
        assert_eq!(table.limit_for(DeclKind::Type), 3);
        assert_eq!(table.limit_for(DeclKind::Field), 6);
    }
}
