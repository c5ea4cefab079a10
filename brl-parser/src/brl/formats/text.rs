//! Plain transcription

use super::registry::{FormatError, Formatter, Output};
use crate::brl::token::TokenKind;

/// Markout spans are wrapped in this delimiter
pub const MARKOUT_DELIMITER: &str = "~~";

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn serialize(&self, output: &Output<'_>) -> Result<String, FormatError> {
        let mut out = String::new();
        for token in &output.transcript.tokens {
            match token.kind {
                TokenKind::MarkoutStart | TokenKind::MarkoutEnd => out.push_str(MARKOUT_DELIMITER),
                _ => out.push_str(&token.text),
            }
        }
        Ok(out)
    }

    fn description(&self) -> &str {
        "Transcribed text, struck-out spans wrapped in ~~"
    }
}
