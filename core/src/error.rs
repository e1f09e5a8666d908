use thiserror::Error;

/// Errors produced when parsing the textual form of a domain value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not one of `high`, `medium`, `low`
    #[error("unknown priority '{0}' (expected high, medium or low)")]
    UnknownPriority(String),

    /// Not one of the filter names
    #[error("unknown filter '{0}' (expected all, pending, completed, overdue or high)")]
    UnknownFilter(String),

    /// Category names must contain at least one non-whitespace character
    #[error("category name cannot be empty")]
    EmptyCategory,
}
