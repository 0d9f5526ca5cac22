//! Error types for schema evaluation
//!
//! Failures split into two families. Shape mismatches (`TagMismatch`,
//! `MissingRequiredChild`, `NoAlternativeMatched`) are recoverable: an
//! enclosing alternatives node absorbs them to reject one candidate and try
//! the next. Document corruption (`CountMismatch`, `MalformedAttribute`,
//! `Document`) is fatal and propagates through any amount of backtracking.

use std::fmt;
use thiserror::Error;

/// One rejected candidate of an alternatives node
#[derive(Clone, Debug, PartialEq)]
pub struct Attempt {
    /// Position of the candidate in declaration order
    pub candidate: usize,
    /// The failure that rejected it
    pub error: Error,
}

/// Failure kind for detailed categorization
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    /// The element's tag is not the one the schema declares
    TagMismatch { expected: String, found: String },
    /// A composite's required child tag is absent
    MissingRequiredChild { child: String, parent: String },
    /// A counted list's `count` attribute disagrees with the matched elements
    CountMismatch {
        tag: String,
        declared: u64,
        actual: u64,
    },
    /// An attribute that must parse as a structured value is missing or unparseable
    MalformedAttribute {
        tag: String,
        attribute: String,
        value: Option<String>,
    },
    /// Every candidate of an alternatives node was rejected
    NoAlternativeMatched { attempts: Vec<Attempt> },
    /// The document could not be parsed as XML at all
    Document { message: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TagMismatch { expected, found } => {
                write!(f, "expected tag <{expected}>, found <{found}>")
            }
            Self::MissingRequiredChild { child, parent } => {
                write!(f, "required child <{child}> missing under <{parent}>")
            }
            Self::CountMismatch {
                tag,
                declared,
                actual,
            } => {
                write!(
                    f,
                    "list <{tag}> declares count {declared} but holds {actual} elements"
                )
            }
            Self::MalformedAttribute {
                tag,
                attribute,
                value,
            } => match value {
                Some(value) => write!(
                    f,
                    "attribute '{attribute}' on <{tag}> is not a valid count: '{value}'"
                ),
                None => write!(f, "attribute '{attribute}' missing on <{tag}>"),
            },
            Self::NoAlternativeMatched { attempts } => {
                write!(f, "no alternative matched ({} tried)", attempts.len())
            }
            Self::Document { message } => write!(f, "invalid document: {message}"),
        }
    }
}

/// Main error type for schema evaluation
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    path: Vec<String>,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            path: Vec::new(),
            message,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Element path from the evaluation root to the failure site,
    /// outermost tag first
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prepend an enclosing element tag to the failure path
    pub fn within(mut self, tag: &str) -> Self {
        self.path.insert(0, tag.to_string());
        self
    }

    /// Whether an enclosing alternatives node may absorb this failure to
    /// reject one candidate.
    ///
    /// Count and attribute failures mean the document itself is inconsistent,
    /// not merely differently shaped, so backtracking never swallows them.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::TagMismatch { .. }
                | ErrorKind::MissingRequiredChild { .. }
                | ErrorKind::NoAlternativeMatched { .. }
        )
    }

    /// The per-candidate failures of a `NoAlternativeMatched`, if that is
    /// what this error is
    pub fn attempts(&self) -> Option<&[Attempt]> {
        match &self.kind {
            ErrorKind::NoAlternativeMatched { attempts } => Some(attempts),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "parse error: {}", self.message)
        } else {
            write!(f, "parse error at {}: {}", self.path.join("/"), self.message)
        }
    }
}

/// Result type alias for schema evaluation
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_path() {
        let err = Error::new(ErrorKind::MissingRequiredChild {
            child: "id".to_string(),
            parent: "job".to_string(),
        })
        .within("jobs")
        .within("result");

        let display = err.to_string();
        assert!(display.contains("result/jobs"));
        assert!(display.contains("required child <id> missing under <job>"));
    }

    #[test]
    fn test_shape_failures_are_recoverable() {
        let tag = Error::new(ErrorKind::TagMismatch {
            expected: "result".to_string(),
            found: "joblist".to_string(),
        });
        assert!(tag.is_recoverable());

        let missing = Error::new(ErrorKind::MissingRequiredChild {
            child: "user".to_string(),
            parent: "execution".to_string(),
        });
        assert!(missing.is_recoverable());

        let exhausted = Error::new(ErrorKind::NoAlternativeMatched {
            attempts: vec![Attempt {
                candidate: 0,
                error: tag,
            }],
        });
        assert!(exhausted.is_recoverable());
    }

    #[test]
    fn test_document_failures_are_fatal() {
        let count = Error::new(ErrorKind::CountMismatch {
            tag: "jobs".to_string(),
            declared: 2,
            actual: 3,
        });
        assert!(!count.is_recoverable());

        let attribute = Error::new(ErrorKind::MalformedAttribute {
            tag: "jobs".to_string(),
            attribute: "count".to_string(),
            value: Some("many".to_string()),
        });
        assert!(!attribute.is_recoverable());

        let document = Error::new(ErrorKind::Document {
            message: "unexpected end of stream".to_string(),
        });
        assert!(!document.is_recoverable());
    }

    #[test]
    fn test_attempts_accessor() {
        let inner = Error::new(ErrorKind::TagMismatch {
            expected: "result".to_string(),
            found: "joblist".to_string(),
        });
        let err = Error::new(ErrorKind::NoAlternativeMatched {
            attempts: vec![Attempt {
                candidate: 0,
                error: inner,
            }],
        });

        let attempts = err.attempts().expect("attempt list");
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].candidate, 0);

        assert!(Error::new(ErrorKind::Document {
            message: "eof".to_string()
        })
        .attempts()
        .is_none());
    }
}
