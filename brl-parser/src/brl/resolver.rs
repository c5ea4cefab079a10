//! Cell resolver
//!
//! Looks one cell up in the tables the current mode selects. Lookup order:
//!
//! - Letter: letters, then punctuation
//! - Math: math operators, then punctuation (letters stand in for a language without math)
//! - Number: digits, then denominators. There is no punctuation fallback here; a miss ends the
//!   number run and the caller resolves the cell again in the resting mode.

use super::cell::CellCode;
use super::mode::Mode;
use super::registry::TableSet;
use super::table::{Category, Symbol, SymbolTable};
use super::token::TokenKind;

/// A table hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'t> {
    pub category: Category,
    pub symbol: &'t Symbol,
}

impl Resolved<'_> {
    pub fn kind(&self) -> TokenKind {
        match self.category {
            Category::Letters => TokenKind::Letter,
            Category::Punctuation => TokenKind::Punctuation,
            Category::Digits | Category::Denominators => TokenKind::Digit,
            Category::Math => TokenKind::Operator,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'t> {
    tables: &'t TableSet,
}

impl<'t> Resolver<'t> {
    pub fn new(tables: &'t TableSet) -> Self {
        Resolver { tables }
    }

    pub fn tables(&self) -> &'t TableSet {
        self.tables
    }

    /// First table hit for `cell` in `mode`, or `None` when no table knows it
    pub fn lookup(&self, cell: CellCode, mode: Mode) -> Option<Resolved<'t>> {
        let t = self.tables;
        let order: [Option<&'t SymbolTable>; 2] = match mode {
            Mode::Letter => [Some(t.letters()), Some(t.punctuation())],
            Mode::Math => [t.math().or(Some(t.letters())), Some(t.punctuation())],
            Mode::Number => [Some(t.digits()), Some(t.denominators())],
        };
        order.into_iter().flatten().find_map(|table| {
            table.get(cell).map(|symbol| Resolved {
                category: table.category(),
                symbol,
            })
        })
    }

    /// Whether `cell` would read as a digit once inside a number
    pub fn is_digit(&self, cell: CellCode) -> bool {
        self.tables.digits().contains(cell)
    }
}
