//! One tag per token
//!
//! Content tokens render as `<kind:text>`, structural tokens as `<kind>`. Tags are separated
//! by a single space, so the output stays on one line per transcript.

use super::registry::{FormatError, Formatter, Output};
use crate::brl::token::Token;

pub struct SimpleFormatter;

pub fn tag(token: &Token) -> String {
    if token.is_content() {
        format!("<{}:{}>", token.kind, token.text)
    } else {
        format!("<{}>", token.kind)
    }
}

impl Formatter for SimpleFormatter {
    fn name(&self) -> &str {
        "simple"
    }

    fn serialize(&self, output: &Output<'_>) -> Result<String, FormatError> {
        Ok(output
            .transcript
            .tokens
            .iter()
            .map(tag)
            .collect::<Vec<_>>()
            .join(" "))
    }

    fn description(&self) -> &str {
        "One <kind:text> tag per token"
    }
}
