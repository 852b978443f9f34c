//! Error types for the rule engine.

/// Errors that can occur when editing or querying a rule graph.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The edit would make the relation inconsistent: either a choice
    /// beating itself, or the reverse of an already-established rule.
    /// The graph is left untouched.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// The named choice is not part of the graph.
    #[error("unknown choice: {0}")]
    UnknownChoice(String),
}
