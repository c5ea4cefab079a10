//! Output formats for decoded transcripts
//!
//! - text: the transcription itself, markout spans wrapped in `~~`
//! - simple: one `<kind:text>` tag per token
//! - json: tokens and diagnostics as pretty JSON
//! - braille: the input cells as Unicode braille

pub mod braille;
pub mod json;
pub mod registry;
pub mod simple;
pub mod text;

pub use braille::BrailleFormatter;
pub use json::JsonFormatter;
pub use registry::{FormatError, FormatRegistry, Formatter, Output};
pub use simple::SimpleFormatter;
pub use text::TextFormatter;
