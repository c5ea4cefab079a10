//! Braille cell-stream decoding
//!
//! Modules, leaves first:
//!
//! - [`cell`]: six-dot cell codes and their canonical form
//! - [`input`]: reading cell sequences from text
//! - [`table`]: symbol tables and their composition from fragments
//! - [`registry`]: per-language table sets built from declarative data
//! - [`mode`]: the letter / number / math state machine
//! - [`resolver`]: single-cell lookup in the active tables
//! - [`disambiguate`]: cells whose reading depends on their neighbours
//! - [`token`]: decoder output
//! - [`decoder`]: the driver tying it together
//! - [`formats`]: transcript output formats

pub mod cell;
pub mod decoder;
pub mod disambiguate;
pub mod formats;
pub mod input;
pub mod mode;
pub mod registry;
pub mod resolver;
pub mod table;
pub mod token;

pub use cell::{CellCode, CellError};
pub use decoder::{decode, decode_language, decode_with, DecodeOptions, Decoder, Transcript};
pub use input::{parse_cells, to_unicode, InputError};
pub use mode::Mode;
pub use registry::{load, LoadError, Registry, TableSet, UnsupportedLanguage};
pub use token::{Diagnostic, Token, TokenKind};
