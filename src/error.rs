use serde::Serialize;
use thiserror::Error;

/// Why a parse was rejected. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no text provided or text is empty")]
    InvalidInput,
    #[error("input too large ({len} characters, maximum {max})")]
    TooLarge { len: usize, max: usize },
    #[error("line {line}: too many {resource} (maximum {max})")]
    ResourceLimitExceeded {
        line: usize,
        resource: Resource,
        max: usize,
    },
    #[error("line {line}: invalid node name {name:?} ({reason})")]
    InvalidNodeName {
        line: usize,
        name: String,
        reason: String,
    },
    #[error("line {line}: invalid value: {token} (must be a non-negative finite number)")]
    InvalidValue { line: usize, token: String },
    #[error("line {line}: {detail}: {text}")]
    SyntaxError {
        line: usize,
        text: String,
        detail: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Nodes,
    Links,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Nodes => f.write_str("nodes"),
            Resource::Links => f.write_str("links"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseErrorKind {
    InvalidInput,
    TooLarge,
    ResourceLimitExceeded,
    InvalidNodeName,
    InvalidValue,
    SyntaxError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Editor-facing view of a [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: Option<usize>,
    pub severity: Severity,
    pub kind: ParseErrorKind,
    pub message: String,
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::InvalidInput => ParseErrorKind::InvalidInput,
            ParseError::TooLarge { .. } => ParseErrorKind::TooLarge,
            ParseError::ResourceLimitExceeded { .. } => ParseErrorKind::ResourceLimitExceeded,
            ParseError::InvalidNodeName { .. } => ParseErrorKind::InvalidNodeName,
            ParseError::InvalidValue { .. } => ParseErrorKind::InvalidValue,
            ParseError::SyntaxError { .. } => ParseErrorKind::SyntaxError,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::InvalidInput | ParseError::TooLarge { .. } => None,
            ParseError::ResourceLimitExceeded { line, .. }
            | ParseError::InvalidNodeName { line, .. }
            | ParseError::InvalidValue { line, .. }
            | ParseError::SyntaxError { line, .. } => Some(*line),
        }
    }

    /// Size guards trip on documents that are well-formed, so they only warn.
    pub fn severity(&self) -> Severity {
        match self.kind() {
            ParseErrorKind::TooLarge | ParseErrorKind::ResourceLimitExceeded => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            line: self.line(),
            severity: self.severity(),
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("link {link} references node {node}, but the graph has {node_count} nodes")]
    UnresolvedNode {
        link: usize,
        node: usize,
        node_count: usize,
    },
    #[error("link {link} has invalid value {value}")]
    InvalidLinkValue { link: usize, value: f64 },
    #[error("invalid layout config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_scoped_messages_start_with_line_number() {
        let err = ParseError::InvalidValue {
            line: 7,
            token: "1.2.3".to_string(),
        };
        assert!(err.to_string().starts_with("line 7: "));
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn guards_are_warnings() {
        let too_large = ParseError::TooLarge { len: 10, max: 5 };
        let too_many = ParseError::ResourceLimitExceeded {
            line: 2,
            resource: Resource::Links,
            max: 1,
        };
        let syntax = ParseError::SyntaxError {
            line: 1,
            text: "nope".to_string(),
            detail: "syntax error",
        };
        assert_eq!(too_large.severity(), Severity::Warning);
        assert_eq!(too_many.severity(), Severity::Warning);
        assert_eq!(syntax.severity(), Severity::Error);
        assert_eq!(too_many.to_string(), "line 2: too many links (maximum 1)");
    }

    #[test]
    fn diagnostic_carries_kind_and_message() {
        let diag = ParseError::InvalidInput.to_diagnostic();
        assert_eq!(diag.kind, ParseErrorKind::InvalidInput);
        assert_eq!(diag.line, None);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "no text provided or text is empty");
    }
}
