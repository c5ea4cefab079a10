//! Cell input lexing
//!
//! This module turns a textual cell sequence into [`CellCode`]s using a logos lexer. Two
//! spellings are accepted and may be mixed freely:
//!
//! - dot-number groups such as `1 12 3456 245`, one cell per group;
//! - Unicode braille patterns such as `⠁⠃⠼⠚`, one cell per character.
//!
//! Whitespace, the blank pattern U+2800 and `-` separate cells and are otherwise ignored.
//! Anything else is an error carrying its byte offset, so a caller can point at it.

use super::cell::{CellCode, CellError};
use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Raw tokens of the cell input grammar
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f\u{2800}\-]+")]
enum CellInput {
    #[regex(r"[1-6]+")]
    Dots,

    #[regex(r"[\u{2801}-\u{283F}]")]
    Pattern,
}

/// Errors raised while reading a cell sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Text that is neither a dot group, a braille pattern nor a separator
    UnexpectedInput { offset: usize, text: String },
    /// A dot group that does not form a valid cell (e.g. a repeated dot)
    InvalidCell { offset: usize, error: CellError },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::UnexpectedInput { offset, text } => {
                write!(f, "unexpected input {text:?} at byte {offset}")
            }
            InputError::InvalidCell { offset, error } => {
                write!(f, "invalid cell at byte {offset}: {error}")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// Lex a cell sequence, keeping the byte range each cell came from.
pub fn tokenize_cells(source: &str) -> Result<Vec<(CellCode, Range<usize>)>, InputError> {
    let mut lexer = CellInput::lexer(source);
    let mut cells = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let slice = lexer.slice();
        let cell = match result {
            Ok(CellInput::Dots) => slice.parse::<CellCode>(),
            Ok(CellInput::Pattern) => slice
                .chars()
                .next()
                .map_or(Err(CellError::Empty), CellCode::from_unicode),
            Err(()) => {
                return Err(InputError::UnexpectedInput {
                    offset: span.start,
                    text: slice.to_string(),
                })
            }
        };
        let cell = cell.map_err(|error| InputError::InvalidCell {
            offset: span.start,
            error,
        })?;
        cells.push((cell, span));
    }

    Ok(cells)
}

/// Lex a cell sequence, dropping source locations.
pub fn parse_cells(source: &str) -> Result<Vec<CellCode>, InputError> {
    Ok(tokenize_cells(source)?
        .into_iter()
        .map(|(cell, _)| cell)
        .collect())
}

/// Render cells as a Unicode braille string.
pub fn to_unicode(cells: &[CellCode]) -> String {
    cells.iter().map(|c| c.to_unicode()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(codes: &[&str]) -> Vec<CellCode> {
        codes.iter().map(|c| c.parse().unwrap()).collect()
    }

    #[test]
    fn test_dot_groups() {
        assert_eq!(
            parse_cells("1 12  3456\n245").unwrap(),
            cells(&["1", "12", "3456", "245"])
        );
    }

    #[test]
    fn test_unicode_patterns() {
        assert_eq!(parse_cells("⠁⠃⠼⠚").unwrap(), cells(&["1", "12", "3456", "245"]));
    }

    #[test]
    fn test_mixed_and_separators() {
        assert_eq!(
            parse_cells("1-12 ⠼\u{2800}245").unwrap(),
            cells(&["1", "12", "3456", "245"])
        );
    }

    #[test]
    fn test_spans_are_byte_ranges() {
        let tokens = tokenize_cells("13 ⠁").unwrap();
        assert_eq!(tokens[0].1, 0..2);
        // '⠁' is three bytes in UTF-8
        assert_eq!(tokens[1].1, 3..6);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_cells("").unwrap(), vec![]);
        assert_eq!(parse_cells("  \n ").unwrap(), vec![]);
    }

    #[test]
    fn test_unexpected_input() {
        let err = parse_cells("12 x").unwrap_err();
        assert_eq!(
            err,
            InputError::UnexpectedInput {
                offset: 3,
                text: "x".to_string()
            }
        );
        assert_eq!(err.to_string(), "unexpected input \"x\" at byte 3");
    }

    #[test]
    fn test_out_of_range_digit() {
        assert!(matches!(
            parse_cells("127"),
            Err(InputError::UnexpectedInput { offset: 2, .. })
        ));
    }

    #[test]
    fn test_repeated_dot_is_invalid_cell() {
        let err = parse_cells("1 2332").unwrap_err();
        assert!(matches!(
            err,
            InputError::InvalidCell {
                offset: 2,
                error: CellError::RepeatedPosition { position: 3, .. }
            }
        ));
    }

    #[test]
    fn test_eight_dot_pattern_rejected() {
        assert!(matches!(
            parse_cells("⡁"),
            Err(InputError::UnexpectedInput { offset: 0, .. })
        ));
    }

    #[test]
    fn test_to_unicode() {
        assert_eq!(to_unicode(&cells(&["1", "12", "3456"])), "⠁⠃⠼");
    }
}
