//! # brl-parser
//!
//! Decodes sequences of six-dot braille cells into text.
//!
//! A decode call takes the cells in reading order plus a language, and produces tokens
//! (letters, digits, operators, punctuation, struck-out span delimiters) together with
//! diagnostics for anything it could not read cleanly:
//!
//! ```no_run
//! use brl_parser::brl::{decode_language, parse_cells, DecodeOptions};
//!
//! let cells = parse_cells("13 3456 1 12")?;
//! let transcript = decode_language(cells, "SI", DecodeOptions::default())?;
//! assert_eq!(transcript.text(), "ක12");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Symbol tables are declared in `data/symbols.yaml`; see [`brl::registry`].

pub mod brl;
