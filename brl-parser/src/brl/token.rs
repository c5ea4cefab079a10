//! Decoder output: tokens and diagnostics

use super::cell::CellCode;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// What a token stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Letter,
    Digit,
    Operator,
    Punctuation,
    MarkoutStart,
    MarkoutEnd,
    Unknown,
}

impl TokenKind {
    /// Structural tokens delimit spans and carry no text
    pub fn is_structural(self) -> bool {
        matches!(self, TokenKind::MarkoutStart | TokenKind::MarkoutEnd)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Letter => "letter",
            TokenKind::Digit => "digit",
            TokenKind::Operator => "operator",
            TokenKind::Punctuation => "punctuation",
            TokenKind::MarkoutStart => "markout-start",
            TokenKind::MarkoutEnd => "markout-end",
            TokenKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved output unit.
///
/// `span` is the half-open range of input cell indices the token was derived from. Content
/// tokens usually cover one cell; a fraction covers its whole numeral run plus the denominator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, span: Range<usize>) -> Self {
        Token {
            text: text.into(),
            kind,
            span,
        }
    }

    /// A text-less structural token for the marker cell at `index`
    pub fn structural(kind: TokenKind, index: usize) -> Self {
        Token::new(String::new(), kind, index..index + 1)
    }

    pub fn is_content(&self) -> bool {
        !self.kind.is_structural()
    }
}

/// A non-fatal event recorded while decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// No table had an entry for this cell
    UnknownCell { index: usize, cell: CellCode },
    /// A paired bracket was still open at end of input
    UnmatchedBracket { index: usize },
    /// A markout span was still open at end of input and was closed there
    UnclosedMarkout { opened_at: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownCell { index, cell } => {
                write!(f, "cell {index}: unknown cell {cell}")
            }
            Diagnostic::UnmatchedBracket { index } => {
                write!(f, "cell {index}: unmatched bracket")
            }
            Diagnostic::UnclosedMarkout { opened_at } => {
                write!(f, "cell {opened_at}: markout span not closed before end of input")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_kinds() {
        assert!(TokenKind::MarkoutStart.is_structural());
        assert!(TokenKind::MarkoutEnd.is_structural());
        assert!(!TokenKind::Unknown.is_structural());
        let t = Token::structural(TokenKind::MarkoutEnd, 4);
        assert_eq!(t.span, 4..5);
        assert!(t.text.is_empty());
        assert!(!t.is_content());
    }

    #[test]
    fn test_serialize_token() {
        let t = Token::new("ක", TokenKind::Letter, 0..1);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"text": "ක", "kind": "letter", "span": {"start": 0, "end": 1}})
        );
    }

    #[test]
    fn test_serialize_diagnostic() {
        let d = Diagnostic::UnknownCell {
            index: 3,
            cell: "6".parse().unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&d).unwrap(),
            serde_json::json!({"kind": "unknown-cell", "index": 3, "cell": "6"})
        );
        assert_eq!(d.to_string(), "cell 3: unknown cell 6");
    }
}
