//! Decoder driver
//!
//!     The decoder walks the cell sequence once, left to right. For every cell it applies the
//!     mode state machine, then the resolver, then the disambiguator, and appends the result to
//!     an accumulator:
//!
//!         cells ──► marker? ──yes──► ModeState (maybe a markout token)
//!                      │
//!                      no
//!                      ▼
//!               Number mode? ──► digit / denominator / decimal point, or revert
//!                      │
//!                      ▼
//!               Resolver (mode tables + punctuation) ──► Disambiguator ──► Accumulator
//!
//!     `Decoder` is an iterator. It hands tokens out as soon as nothing can rewrite them any
//!     more. Two things can still rewrite an emitted token: a numeral run may be folded into a
//!     fraction by a following denominator, and an open bracket falls back to its two-character
//!     text if it is never closed. Tokens from the start of either pending construction onward
//!     are held back; everything before is released.
//!
//!     Decoding is never resumable half way: the state lives inside the iterator and is dropped
//!     with it. Data problems never stop decoding; they are recorded as diagnostics instead.

use super::cell::CellCode;
use super::disambiguate::{
    compose_fraction, read_point, Disambiguator, PointReading, DECIMAL_POINT,
};
use super::mode::{Marker, Mode, ModeState, Transition};
use super::registry::{self, LoadError, TableSet};
use super::resolver::{Resolved, Resolver};
use super::table::{Category, Role};
use super::token::{Diagnostic, Token, TokenKind};
use serde::Serialize;
use std::collections::VecDeque;
use std::iter::Peekable;
use std::path::Path;

/// Per-call decoding options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Mode before the first cell; Math declares a mathematical document
    pub start_mode: Mode,
}

impl DecodeOptions {
    pub fn math() -> Self {
        DecodeOptions {
            start_mode: Mode::Math,
        }
    }
}

/// Everything one decode call produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Transcript {
    /// Concatenated text of the content tokens
    pub fn text(&self) -> String {
        self.content().map(|t| t.text.as_str()).collect()
    }

    pub fn content(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_content())
    }
}

/// Tokens not yet handed out, indexed by their absolute output position
#[derive(Debug, Default)]
struct Accumulator {
    pending: VecDeque<Token>,
    released: usize,
}

impl Accumulator {
    fn push(&mut self, token: Token) -> usize {
        self.pending.push_back(token);
        self.next_position() - 1
    }

    fn next_position(&self) -> usize {
        self.released + self.pending.len()
    }

    fn get_mut(&mut self, position: usize) -> Option<&mut Token> {
        let offset = position.checked_sub(self.released)?;
        self.pending.get_mut(offset)
    }

    fn drain_from(&mut self, position: usize) -> Vec<Token> {
        let offset = position.saturating_sub(self.released).min(self.pending.len());
        self.pending.drain(offset..).collect()
    }

    /// Release the oldest token unless it sits at or after `hold`
    fn pop_ready(&mut self, hold: Option<usize>) -> Option<Token> {
        if hold.is_some_and(|h| self.released >= h) {
            return None;
        }
        let token = self.pending.pop_front()?;
        self.released += 1;
        Some(token)
    }
}

/// A run of digit tokens that a denominator may still turn into a fraction
#[derive(Debug, Clone, Copy)]
struct NumeralRun {
    first_token: usize,
    first_cell: usize,
}

/// State owned by one decode call
#[derive(Debug)]
struct DecoderState {
    mode: ModeState,
    disambiguator: Disambiguator,
    numeral: Option<NumeralRun>,
    accumulator: Accumulator,
    diagnostics: Vec<Diagnostic>,
}

impl DecoderState {
    fn new(options: DecodeOptions) -> Self {
        DecoderState {
            mode: ModeState::new(options.start_mode),
            disambiguator: Disambiguator::new(),
            numeral: None,
            accumulator: Accumulator::default(),
            diagnostics: Vec::new(),
        }
    }

    fn hold(&self) -> Option<usize> {
        let numeral = self.numeral.map(|run| run.first_token);
        let bracket = self.disambiguator.open_bracket();
        numeral.into_iter().chain(bracket).min()
    }

    fn push_content(&mut self, token: Token) -> usize {
        self.disambiguator.record(token.kind);
        self.accumulator.push(token)
    }

    fn diagnose(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

/// Lazy decoder over a cell sequence
pub struct Decoder<'t, I: Iterator<Item = CellCode>> {
    cells: Peekable<I>,
    resolver: Resolver<'t>,
    state: DecoderState,
    index: usize,
    finished: bool,
}

impl<'t, I: Iterator<Item = CellCode>> Decoder<'t, I> {
    pub fn new<C>(cells: C, tables: &'t TableSet, options: DecodeOptions) -> Self
    where
        C: IntoIterator<IntoIter = I, Item = CellCode>,
    {
        Decoder {
            cells: cells.into_iter().peekable(),
            resolver: Resolver::new(tables),
            state: DecoderState::new(options),
            index: 0,
            finished: false,
        }
    }

    /// Diagnostics raised so far. Complete once the iterator is exhausted.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.state.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.state.diagnostics
    }

    fn step(&mut self, cell: CellCode, next: Option<CellCode>) {
        let index = self.index;
        let markers = *self.resolver.tables().markers();
        log::trace!("cell {index}: {cell} in {} mode", self.state.mode.mode());

        if let Some(marker) = Marker::classify(cell, &markers) {
            self.state.numeral = None;
            match self.state.mode.apply(marker, index) {
                Transition::Consumed => {}
                Transition::MarkoutStart => {
                    self.state
                        .accumulator
                        .push(Token::structural(TokenKind::MarkoutStart, index));
                }
                Transition::MarkoutEnd => {
                    self.state
                        .accumulator
                        .push(Token::structural(TokenKind::MarkoutEnd, index));
                }
            }
            return;
        }

        let caps = self.state.mode.take_caps();

        if self.state.mode.mode() == Mode::Number {
            match self.resolver.lookup(cell, Mode::Number) {
                Some(hit) if hit.category == Category::Digits => {
                    self.push_digit(hit, index);
                    return;
                }
                Some(hit) => {
                    self.push_fraction(hit, index);
                    return;
                }
                None => {}
            }
            let next_is_digit = next.is_some_and(|n| self.resolver.is_digit(n) || n == markers.number);
            if self.is_point(cell, self.state.mode.resting())
                && read_point(self.state.disambiguator.previous(), next_is_digit)
                    == PointReading::Decimal
            {
                self.state.numeral = None;
                self.state.push_content(Token::new(
                    DECIMAL_POINT,
                    TokenKind::Punctuation,
                    index..index + 1,
                ));
                return;
            }
            self.state.mode.revert();
        }

        self.state.numeral = None;
        let token = match self.resolver.lookup(cell, self.state.mode.mode()) {
            Some(hit) => {
                // Outside Number mode only a number sign can make the next cell a digit
                let next_is_digit = next == Some(markers.number);
                let position = self.state.accumulator.next_position();
                let (text, kind) =
                    match self
                        .state
                        .disambiguator
                        .apply_role(hit.symbol, next_is_digit, position)
                    {
                        Some((text, kind)) => (text, kind.unwrap_or_else(|| hit.kind())),
                        None => (hit.symbol.text.clone(), hit.kind()),
                    };
                let text = if caps && kind == TokenKind::Letter {
                    text.to_uppercase()
                } else {
                    text
                };
                Token::new(text, kind, index..index + 1)
            }
            None => {
                self.state.diagnose(Diagnostic::UnknownCell { index, cell });
                Token::new(cell.canonical(), TokenKind::Unknown, index..index + 1)
            }
        };
        self.state.push_content(token);
    }

    fn is_point(&self, cell: CellCode, mode: Mode) -> bool {
        self.resolver
            .lookup(cell, mode)
            .is_some_and(|hit| hit.symbol.role == Some(Role::Point))
    }

    fn push_digit(&mut self, hit: Resolved<'_>, index: usize) {
        let position = self.state.push_content(Token::new(
            hit.symbol.text.clone(),
            TokenKind::Digit,
            index..index + 1,
        ));
        if self.state.numeral.is_none() {
            self.state.numeral = Some(NumeralRun {
                first_token: position,
                first_cell: index,
            });
        }
    }

    fn push_fraction(&mut self, hit: Resolved<'_>, index: usize) {
        let denominator = &hit.symbol.text;
        let token = match self.state.numeral.take() {
            Some(run) => {
                let numerator: String = self
                    .state
                    .accumulator
                    .drain_from(run.first_token)
                    .into_iter()
                    .map(|t| t.text)
                    .collect();
                let (text, kind) = compose_fraction(&numerator, denominator);
                log::trace!("fraction {numerator}{denominator} -> {text}");
                Token::new(text, kind, run.first_cell..index + 1)
            }
            None => Token::new(denominator.clone(), TokenKind::Digit, index..index + 1),
        };
        self.state.push_content(token);
        self.state.disambiguator.record_fraction();
    }

    fn finish(&mut self) {
        let end = self.index;
        self.state.numeral = None;

        if let Some(open) = self.state.disambiguator.finish() {
            if let Some(token) = self.state.accumulator.get_mut(open.position) {
                let index = token.span.start;
                token.text = open.fallback;
                self.state.diagnose(Diagnostic::UnmatchedBracket { index });
            }
        }

        if let Some(opened_at) = self.state.mode.close_markout() {
            self.state
                .accumulator
                .push(Token::new(String::new(), TokenKind::MarkoutEnd, end..end));
            self.state.diagnose(Diagnostic::UnclosedMarkout { opened_at });
        }
        self.finished = true;
    }
}

impl<I: Iterator<Item = CellCode>> Iterator for Decoder<'_, I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let hold = self.state.hold();
            if let Some(token) = self.state.accumulator.pop_ready(hold) {
                return Some(token);
            }
            if self.finished {
                return None;
            }
            match self.cells.next() {
                Some(cell) => {
                    let next = self.cells.peek().copied();
                    self.step(cell, next);
                    self.index += 1;
                }
                None => self.finish(),
            }
        }
    }
}

/// Decode a whole cell sequence with already loaded tables
pub fn decode<C>(cells: C, tables: &TableSet, options: DecodeOptions) -> Transcript
where
    C: IntoIterator<Item = CellCode>,
{
    let mut decoder = Decoder::new(cells, tables, options);
    let tokens: Vec<Token> = decoder.by_ref().collect();
    Transcript {
        tokens,
        diagnostics: decoder.into_diagnostics(),
    }
}

/// Decode with the built-in tables of `language`.
///
/// An unsupported language fails before any cell is read.
pub fn decode_language<C>(
    cells: C,
    language: &str,
    options: DecodeOptions,
) -> Result<Transcript, LoadError>
where
    C: IntoIterator<Item = CellCode>,
{
    decode_with(cells, None, language, options)
}

/// Decode with the tables of `language` from the symbol data at `tables`, or the built-in data
pub fn decode_with<C>(
    cells: C,
    tables: Option<&Path>,
    language: &str,
    options: DecodeOptions,
) -> Result<Transcript, LoadError>
where
    C: IntoIterator<Item = CellCode>,
{
    let set = registry::load(tables, language)?;
    Ok(decode(cells, &set, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brl::input::parse_cells;
    use crate::brl::registry::Registry;
    use std::cell::Cell;
    use std::sync::Arc;

    fn si() -> Arc<TableSet> {
        Registry::builtin().unwrap().load("SI").unwrap()
    }

    fn run(source: &str, options: DecodeOptions) -> Transcript {
        decode(parse_cells(source).unwrap(), &si(), options)
    }

    fn texts(t: &Transcript) -> Vec<(&str, TokenKind)> {
        t.tokens.iter().map(|t| (t.text.as_str(), t.kind)).collect()
    }

    #[test]
    fn test_letters() {
        let t = run("13 1 1235", DecodeOptions::default());
        assert_eq!(t.text(), "කඅර");
        assert!(t.diagnostics.is_empty());
        assert_eq!(t.tokens[2].span, 2..3);
    }

    #[test]
    fn test_number_reverts_before_resolving() {
        let t = run("13 3456 1 12 13", DecodeOptions::default());
        assert_eq!(
            texts(&t),
            vec![
                ("ක", TokenKind::Letter),
                ("1", TokenKind::Digit),
                ("2", TokenKind::Digit),
                ("ක", TokenKind::Letter),
            ]
        );
    }

    #[test]
    fn test_fraction_and_percent() {
        let t = run("3456 14 256", DecodeOptions::default());
        assert_eq!(texts(&t), vec![("3/4", TokenKind::Digit)]);
        assert_eq!(t.tokens[0].span, 1..3);

        let t = run("3456 245 356", DecodeOptions::default());
        assert_eq!(texts(&t), vec![("%", TokenKind::Operator)]);
    }

    #[test]
    fn test_multi_digit_numerator() {
        let t = run("3456 1 245 23", DecodeOptions::default());
        assert_eq!(texts(&t), vec![("10/2", TokenKind::Digit)]);
        assert_eq!(t.tokens[0].span, 1..4);
    }

    #[test]
    fn test_denominator_without_numerator() {
        let t = run("3456 14 256 26", DecodeOptions::default());
        assert_eq!(
            texts(&t),
            vec![("3/4", TokenKind::Digit), ("/5", TokenKind::Digit)]
        );
    }

    #[test]
    fn test_decimal_point_in_math() {
        let t = run("3456 1 3 245", DecodeOptions::math());
        assert_eq!(t.text(), "1.0");
        assert_eq!(t.tokens[1].kind, TokenKind::Punctuation);
    }

    #[test]
    fn test_point_as_multiplication() {
        let t = run("3456 12 3 26", DecodeOptions::math());
        assert_eq!(
            texts(&t),
            vec![
                ("2", TokenKind::Digit),
                ("*", TokenKind::Operator),
                ("?", TokenKind::Punctuation),
            ]
        );
    }

    #[test]
    fn test_point_before_number_sign() {
        let t = run("3456 12 3 3456 14", DecodeOptions::math());
        assert_eq!(t.text(), "2.3");
    }

    #[test]
    fn test_point_after_fraction_is_multiplication() {
        let t = run("3456 14 256 3 1", DecodeOptions::math());
        assert_eq!(t.tokens[0], Token::new("3/4", TokenKind::Digit, 1..3));
        assert_eq!(t.tokens[1], Token::new("*", TokenKind::Operator, 3..4));
        assert!(!t.text().contains("3/4."));
    }

    #[test]
    fn test_ratio_is_colon() {
        let t = run("3456 14 256", DecodeOptions::math());
        // In a number 256 is the /4 denominator
        assert_eq!(t.text(), "3/4");
        let t = run("126 256 345", DecodeOptions::math());
        assert_eq!(t.text(), "(:)");
        assert_eq!(t.tokens[1].kind, TokenKind::Operator);
    }

    #[test]
    fn test_brackets_pair_and_fall_back() {
        let t = run("2356 13 2356 2356", DecodeOptions::default());
        assert_eq!(t.text(), "(ක)()");
        assert_eq!(t.diagnostics, vec![Diagnostic::UnmatchedBracket { index: 3 }]);
    }

    #[test]
    fn test_unknown_cell() {
        let t = run("13 6 1", DecodeOptions::default());
        assert_eq!(t.tokens[1], Token::new("6", TokenKind::Unknown, 1..2));
        assert_eq!(
            t.diagnostics,
            vec![Diagnostic::UnknownCell {
                index: 1,
                cell: "6".parse().unwrap()
            }]
        );
    }

    #[test]
    fn test_markout_span() {
        let t = run("123456 13 123456 1", DecodeOptions::default());
        assert_eq!(
            texts(&t),
            vec![
                ("", TokenKind::MarkoutStart),
                ("ක", TokenKind::Letter),
                ("", TokenKind::MarkoutEnd),
                ("අ", TokenKind::Letter),
            ]
        );
        assert!(t.diagnostics.is_empty());
    }

    #[test]
    fn test_unclosed_markout_is_closed_at_end() {
        let t = run("13 123456 1", DecodeOptions::default());
        assert_eq!(t.tokens.last().unwrap().kind, TokenKind::MarkoutEnd);
        assert_eq!(t.tokens.last().unwrap().span, 3..3);
        assert_eq!(t.diagnostics, vec![Diagnostic::UnclosedMarkout { opened_at: 1 }]);
    }

    #[test]
    fn test_empty_input() {
        let t = decode(Vec::<CellCode>::new(), &si(), DecodeOptions::default());
        assert!(t.tokens.is_empty());
        assert!(t.diagnostics.is_empty());
    }

    #[test]
    fn test_decoder_is_lazy() {
        let cells = parse_cells("13 1 1235 12").unwrap();
        let pulled = Cell::new(0);
        let tables = si();
        let mut decoder = Decoder::new(
            cells.iter().copied().inspect(|_| pulled.set(pulled.get() + 1)),
            &tables,
            DecodeOptions::default(),
        );
        assert_eq!(decoder.next().unwrap().text, "ක");
        // The current cell plus one cell of lookahead
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn test_numeral_run_is_held_until_settled() {
        let cells = parse_cells("3456 1 12 23 13").unwrap();
        let pulled = Cell::new(0);
        let tables = si();
        let mut decoder = Decoder::new(
            cells.iter().copied().inspect(|_| pulled.set(pulled.get() + 1)),
            &tables,
            DecodeOptions::default(),
        );
        assert_eq!(decoder.next().unwrap().text, "12/2");
        assert_eq!(pulled.get(), 5);
    }

    #[test]
    fn test_decode_language_rejects_placeholder() {
        let err = decode_language(Vec::<CellCode>::new(), "EN", DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported(_)));
    }
}
