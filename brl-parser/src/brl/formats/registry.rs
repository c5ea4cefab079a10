//! Named output formats
//!
//!     A transcript can be written out in several ways. Each way is a `Formatter` keyed by its
//!     name, which is what `output.format` in the configuration and `--format` on the command
//!     line select. Formats that render the input rather than the tokens read the cells from
//!     `Output` and fail with `MissingCells` when the caller did not pass them.

use crate::brl::cell::CellCode;
use crate::brl::decoder::Transcript;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// No formatter is registered under this name
    FormatNotFound(String),
    SerializationError(String),
    /// The format renders input cells, but none were supplied
    MissingCells(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(name) => write!(f, "Format '{name}' not found"),
            FormatError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            FormatError::MissingCells(name) => {
                write!(f, "Format '{name}' needs the input cells")
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// A decode result together with the cells it was decoded from, when the caller has them
#[derive(Debug, Clone, Copy)]
pub struct Output<'a> {
    pub transcript: &'a Transcript,
    pub cells: Option<&'a [CellCode]>,
}

impl<'a> Output<'a> {
    pub fn new(transcript: &'a Transcript) -> Self {
        Output {
            transcript,
            cells: None,
        }
    }

    pub fn with_cells(mut self, cells: &'a [CellCode]) -> Self {
        self.cells = Some(cells);
        self
    }
}

pub trait Formatter: Send + Sync {
    /// Name the format is selected by
    fn name(&self) -> &str;

    fn serialize(&self, output: &Output<'_>) -> Result<String, FormatError>;

    /// One line shown by `--list-formats`
    fn description(&self) -> &str {
        ""
    }
}

/// Formatters by name. A later registration under the same name replaces the earlier one.
pub struct FormatRegistry {
    formatters: BTreeMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formatters: BTreeMap::new(),
        }
    }

    /// The text, simple, json and braille formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(super::TextFormatter);
        registry.register(super::SimpleFormatter);
        registry.register(super::JsonFormatter);
        registry.register(super::BrailleFormatter);
        registry
    }

    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    /// Registered formatters in name order
    pub fn formatters(&self) -> impl Iterator<Item = &dyn Formatter> {
        self.formatters.values().map(|f| f.as_ref())
    }

    pub fn serialize(&self, output: &Output<'_>, format: &str) -> Result<String, FormatError> {
        let formatter = self
            .get(format)
            .ok_or_else(|| FormatError::FormatNotFound(format.to_string()))?;
        formatter.serialize(output)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brl::input::parse_cells;
    use crate::brl::token::{Token, TokenKind};

    /// Counts tokens, to check that registration replaces by name
    struct CountFormatter;

    impl Formatter for CountFormatter {
        fn name(&self) -> &str {
            "text"
        }
        fn serialize(&self, output: &Output<'_>) -> Result<String, FormatError> {
            Ok(output.transcript.tokens.len().to_string())
        }
    }

    fn transcript() -> Transcript {
        Transcript {
            tokens: vec![
                Token::new("ක", TokenKind::Letter, 0..1),
                Token::new("1", TokenKind::Digit, 2..3),
            ],
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_defaults_in_name_order() {
        let registry = FormatRegistry::with_defaults();
        let names: Vec<_> = registry.formatters().map(|f| f.name()).collect();
        assert_eq!(names, vec!["braille", "json", "simple", "text"]);
        assert!(registry.formatters().all(|f| !f.description().is_empty()));
    }

    #[test]
    fn test_serialize_by_name() {
        let registry = FormatRegistry::default();
        let transcript = transcript();
        let cells = parse_cells("13 3456 1").unwrap();
        let output = Output::new(&transcript).with_cells(&cells);

        assert_eq!(registry.serialize(&output, "text").unwrap(), "ක1");
        assert_eq!(registry.serialize(&output, "braille").unwrap(), "⠅⠼⠁");
    }

    #[test]
    fn test_unknown_format() {
        let registry = FormatRegistry::with_defaults();
        let transcript = transcript();
        let err = registry
            .serialize(&Output::new(&transcript), "html")
            .unwrap_err();
        assert_eq!(err, FormatError::FormatNotFound("html".to_string()));
        assert_eq!(err.to_string(), "Format 'html' not found");
    }

    #[test]
    fn test_cells_required_through_registry() {
        let registry = FormatRegistry::with_defaults();
        let transcript = transcript();
        assert_eq!(
            registry.serialize(&Output::new(&transcript), "braille"),
            Err(FormatError::MissingCells("braille".to_string()))
        );
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut registry = FormatRegistry::with_defaults();
        registry.register(CountFormatter);
        assert_eq!(registry.formatters().count(), 4);

        let transcript = transcript();
        assert_eq!(
            registry.serialize(&Output::new(&transcript), "text").unwrap(),
            "2"
        );
    }
}
