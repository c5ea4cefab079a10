//! JSON output of tokens and diagnostics

use super::registry::{FormatError, Formatter, Output};

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, output: &Output<'_>) -> Result<String, FormatError> {
        serde_json::to_string_pretty(output.transcript)
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "Tokens and diagnostics as JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brl::decoder::{decode, DecodeOptions};
    use crate::brl::input::parse_cells;
    use crate::brl::registry::Registry;
    use serde_json::json;

    #[test]
    fn test_tokens_and_diagnostics() {
        let si = Registry::builtin().unwrap().load("SI").unwrap();
        let transcript = decode(parse_cells("13 6").unwrap(), &si, DecodeOptions::default());
        let rendered = JsonFormatter.serialize(&Output::new(&transcript)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(
            value,
            json!({
                "tokens": [
                    {"text": "ක", "kind": "letter", "span": {"start": 0, "end": 1}},
                    {"text": "6", "kind": "unknown", "span": {"start": 1, "end": 2}}
                ],
                "diagnostics": [
                    {"kind": "unknown-cell", "index": 1, "cell": "6"}
                ]
            })
        );
    }
}
