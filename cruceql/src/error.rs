//! Error types for the condition language

use std::fmt;
use thiserror::Error;

use crate::ast::OperatorKind;
use crate::wire::ConditionSpec;

/// Error raised while parsing the textual condition syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the (trimmed) input
    pub position: Option<usize>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    pub fn with_position(mut self, pos: usize) -> Self {
        self.position = Some(pos);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error: {}", self.message)?;
        if let Some(pos) = self.position {
            write!(f, " at position {}", pos)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<nom::Err<nom::error::Error<&str>>> for ParseError {
    fn from(err: nom::Err<nom::error::Error<&str>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => ParseError::new("Incomplete input"),
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                let near: String = e.input.chars().take(20).collect();
                if near.is_empty() {
                    ParseError::new("Unexpected end of condition")
                } else {
                    ParseError::new(format!("Unexpected input near {:?}", near))
                }
            }
        }
    }
}

/// Why a wire condition could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("field name is empty")]
    EmptyField,

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("operator '{operator}' expects {expected}")]
    ValueShape {
        operator: OperatorKind,
        expected: &'static str,
    },
}

/// A wire condition that was rejected, kept with what the caller sent
#[derive(Debug, Clone, PartialEq, Error)]
#[error("malformed condition on field '{}': {reason}", .spec.field)]
pub struct MalformedCondition {
    pub spec: ConditionSpec,
    pub reason: MalformedReason,
}
