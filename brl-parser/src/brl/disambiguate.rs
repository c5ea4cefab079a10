//! Contextual disambiguation
//!
//!     Some cells cannot be read from a table alone. Their text depends on the token emitted just
//!     before and on the cell coming next, never on anything further away:
//!
//!         point     between two digits a decimal point, otherwise multiplication
//!         ratio     always a colon
//!         bracket   first occurrence opens, the next one closes; a bracket still open at the
//!                   end of input falls back to its two-character table text
//!         fraction  a numeral run followed by a denominator becomes one "n/d" token, and
//!                   "0" over "/0" becomes "%"
//!
//!     The bracket count can only be zero or one, so it is kept as the position of the open
//!     token. That position is also what the decoder has to hold back until the pair closes.

use super::table::{Role, Symbol};
use super::token::TokenKind;

pub const DECIMAL_POINT: &str = ".";
pub const MULTIPLY: &str = "*";
pub const PERCENT: &str = "%";

/// How a point-role cell reads in its context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointReading {
    Decimal,
    Multiply,
}

/// Decide a point from its neighbours: the previous emitted token and whether the next cell
/// will read as a digit.
pub fn read_point(previous: Option<TokenKind>, next_is_digit: bool) -> PointReading {
    if previous == Some(TokenKind::Digit) && next_is_digit {
        PointReading::Decimal
    } else {
        PointReading::Multiply
    }
}

/// The text a ratio cell emits
pub fn read_ratio(symbol: &Symbol) -> String {
    symbol.text.chars().next().map_or_else(|| ":".to_string(), String::from)
}

/// Compose a numeral run and a denominator into one token
pub fn compose_fraction(numerator: &str, denominator: &str) -> (String, TokenKind) {
    if numerator == "0" && denominator == "/0" {
        (PERCENT.to_string(), TokenKind::Operator)
    } else {
        (format!("{numerator}{denominator}"), TokenKind::Digit)
    }
}

/// A bracket waiting for its partner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBracket {
    /// Output position of the opening token
    pub position: usize,
    /// Table text used if the bracket is never closed
    pub fallback: String,
}

/// Per-decode disambiguation state: one token of lookback plus the open bracket, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Disambiguator {
    previous: Option<TokenKind>,
    open_bracket: Option<OpenBracket>,
}

impl Disambiguator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kind of the last content token emitted, `None` at the start or after a fraction
    pub fn previous(&self) -> Option<TokenKind> {
        self.previous
    }

    pub fn record(&mut self, kind: TokenKind) {
        self.previous = Some(kind);
    }

    /// Record a composed fraction. It carries the digit kind in the output but is not a digit
    /// a decimal point can follow.
    pub fn record_fraction(&mut self) {
        self.previous = None;
    }

    /// Output position of the bracket waiting for its partner
    pub fn open_bracket(&self) -> Option<usize> {
        self.open_bracket.as_ref().map(|open| open.position)
    }

    /// Text for a bracket-role cell whose token will sit at output position `position`
    pub fn read_bracket(&mut self, symbol: &Symbol, position: usize) -> String {
        match self.open_bracket.take() {
            None => {
                self.open_bracket = Some(OpenBracket {
                    position,
                    fallback: symbol.text.clone(),
                });
                symbol.text.chars().next().map(String::from).unwrap_or_default()
            }
            Some(_) => symbol
                .text
                .chars()
                .last()
                .map(String::from)
                .unwrap_or_default(),
        }
    }

    /// The bracket left open at end of input, if any
    pub fn finish(&mut self) -> Option<OpenBracket> {
        self.open_bracket.take()
    }

    /// Apply the role of a resolved symbol; `None` means the table text stands as is
    pub fn apply_role(
        &mut self,
        symbol: &Symbol,
        next_is_digit: bool,
        position: usize,
    ) -> Option<(String, Option<TokenKind>)> {
        match symbol.role? {
            Role::Point => Some(match read_point(self.previous, next_is_digit) {
                PointReading::Decimal => (DECIMAL_POINT.to_string(), Some(TokenKind::Punctuation)),
                PointReading::Multiply => (MULTIPLY.to_string(), None),
            }),
            Role::Ratio => Some((read_ratio(symbol), None)),
            Role::Bracket => Some((self.read_bracket(symbol, position), None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brl::table::Origin;

    fn symbol(text: &str, role: Role) -> Symbol {
        Symbol {
            text: text.to_string(),
            role: Some(role),
            origin: Origin {
                fragment: "test".to_string(),
                position: 0,
            },
        }
    }

    #[test]
    fn test_point_needs_digits_on_both_sides() {
        assert_eq!(read_point(Some(TokenKind::Digit), true), PointReading::Decimal);
        assert_eq!(read_point(Some(TokenKind::Digit), false), PointReading::Multiply);
        assert_eq!(read_point(Some(TokenKind::Letter), true), PointReading::Multiply);
        assert_eq!(read_point(None, true), PointReading::Multiply);
    }

    #[test]
    fn test_ratio_is_colon() {
        assert_eq!(read_ratio(&symbol("::", Role::Ratio)), ":");
    }

    #[test]
    fn test_fraction() {
        assert_eq!(compose_fraction("3", "/4"), ("3/4".to_string(), TokenKind::Digit));
        assert_eq!(compose_fraction("10", "/0"), ("10/0".to_string(), TokenKind::Digit));
        assert_eq!(compose_fraction("0", "/0"), ("%".to_string(), TokenKind::Operator));
    }

    #[test]
    fn test_bracket_alternates() {
        let paren = symbol("()", Role::Bracket);
        let mut d = Disambiguator::new();
        assert_eq!(d.read_bracket(&paren, 0), "(");
        assert_eq!(d.open_bracket(), Some(0));
        assert_eq!(d.read_bracket(&paren, 2), ")");
        assert_eq!(d.open_bracket(), None);
        assert_eq!(d.read_bracket(&paren, 5), "(");
        assert_eq!(
            d.finish(),
            Some(OpenBracket {
                position: 5,
                fallback: "()".to_string()
            })
        );
        assert_eq!(d.finish(), None);
    }

    #[test]
    fn test_apply_role() {
        let mut d = Disambiguator::new();
        let point = symbol("..", Role::Point);
        assert_eq!(d.apply_role(&point, true, 0), Some(("*".to_string(), None)));
        d.record(TokenKind::Digit);
        assert_eq!(
            d.apply_role(&point, true, 1),
            Some((".".to_string(), Some(TokenKind::Punctuation)))
        );
        d.record_fraction();
        assert_eq!(d.apply_role(&point, true, 2), Some(("*".to_string(), None)));
        let plain = Symbol {
            role: None,
            ..point
        };
        assert_eq!(d.apply_role(&plain, true, 3), None);
    }
}
