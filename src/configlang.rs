use crate::runtime::Action;
use thiserror::*;

mod ast;
pub use ast::*;

mod compiler;
pub use compiler::*;

mod lexer;
pub use lexer::*;

mod parser;
pub use parser::*;

mod schema;
pub use schema::*;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("invalid token {0:?}")]
    InvalidToken(String),
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },
    #[error("expected {expected}, found end of input")]
    UnexpectedEnd { expected: &'static str },
    #[error("unknown property {0:?}")]
    UnknownProperty(String),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("expected an integer, found {0:?}")]
    ExpectedInteger(String),
    #[error("parameter `{param}` expects {expected}, found {found:?}")]
    Mismatch {
        param: &'static str,
        expected: String,
        found: String,
    },
    #[error("unknown time unit {0:?}: expected t, ticks, b, beats, s or ms")]
    UnknownUnit(String),
    #[error("negative time {0:?}")]
    NegativeTime(String),
    #[error("unknown timing function {0:?}")]
    UnknownTimingFunction(String),
    #[error("unknown condition {0:?}: expected startup, end, time or mode")]
    UnknownCondition(String),
    #[error("unknown playback mode {0:?}: expected play or realtime")]
    UnknownMode(String),
    #[error("unknown selector attribute {0:?}: expected channel, key, white, black or tick")]
    UnknownAttribute(String),
    #[error("property {0} does not support transitions")]
    NotAnimatable(&'static str),
    #[error("interval must be greater than zero")]
    ZeroInterval,
    #[error("{0}")]
    Handler(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("in property {property} at offset {offset}: {kind}")]
    Property {
        property: String,
        offset: usize,
        kind: ParseErrorKind,
    },
    #[error("in `{keyword}` block at offset {offset}: {kind}")]
    Block {
        keyword: &'static str,
        offset: usize,
        kind: ParseErrorKind,
    },
    #[error("at offset {offset}: {kind}")]
    Syntax { offset: usize, kind: ParseErrorKind },
}

impl ConfigError {
    pub fn offset(&self) -> usize {
        match self {
            ConfigError::Property { offset, .. }
            | ConfigError::Block { offset, .. }
            | ConfigError::Syntax { offset, .. } => *offset,
        }
    }

    pub fn kind(&self) -> &ParseErrorKind {
        match self {
            ConfigError::Property { kind, .. }
            | ConfigError::Block { kind, .. }
            | ConfigError::Syntax { kind, .. } => kind,
        }
    }
}

/// 1-based line and column of a byte offset in `source`.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let col = before
        .rfind('\n')
        .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
        + 1;
    (line, col)
}

/// Parses and validates a whole config script.
pub fn compile_script(source: &str, schema: &Schema) -> Result<Vec<Action>, ConfigError> {
    let statements = parse_script(source, schema)?;
    compile(&statements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let source = "title \"a\"\n  fall_speed x";
        assert_eq!((1, 1), line_col(source, 0));
        assert_eq!((2, 3), line_col(source, 12));
        assert_eq!((2, 15), line_col(source, 1000));
    }

    #[test]
    fn test_error_message() {
        let err = compile_script("title \"x\"\nfall_speed 500", &Schema::standard()).unwrap_err();
        assert_eq!(21, err.offset());
        assert_eq!(
            "in property fall_speed at offset 21: parameter `speed` expects 0.01-100, found \"500\"",
            err.to_string()
        );
    }
}
