//! Input cells rendered as Unicode braille

use super::registry::{FormatError, Formatter, Output};
use crate::brl::input::to_unicode;

pub struct BrailleFormatter;

impl Formatter for BrailleFormatter {
    fn name(&self) -> &str {
        "braille"
    }

    fn serialize(&self, output: &Output<'_>) -> Result<String, FormatError> {
        let cells = output
            .cells
            .ok_or_else(|| FormatError::MissingCells(self.name().to_string()))?;
        Ok(to_unicode(cells))
    }

    fn description(&self) -> &str {
        "Input cells as Unicode braille patterns"
    }
}
