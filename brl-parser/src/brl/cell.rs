//! Cell codes
//!
//!     A cell is one six-dot braille pattern. Dots are numbered the usual way: 1-2-3 down the
//!     left column, 4-5-6 down the right. A `CellCode` holds the set of raised dots as a bitmask
//!     (bit `n - 1` for dot `n`), so equality, hashing and ordering are plain integer operations.
//!
//!     The canonical text form lists the raised positions ascending, e.g. `{2, 5, 6}` -> `"256"`.
//!     Parsing accepts any order but rejects repeats, so every valid subset has exactly one
//!     canonical spelling and every canonical spelling names exactly one subset.
//!
//!     Cells also map one-to-one onto the Unicode braille block (U+2801..=U+283F): the low six
//!     bits of the code point offset use the same dot numbering as our mask.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const UNICODE_BASE: u32 = 0x2800;
const SIX_DOT_MASK: u8 = 0b0011_1111;

/// One raised-dot pattern on the six-position grid. Never empty.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCode(u8);

/// Errors produced when building a [`CellCode`] from text or positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellError {
    /// No dots at all
    Empty,
    /// A character that is not one of the positions `1`..=`6`
    InvalidPosition { text: String, found: char },
    /// The same position listed twice
    RepeatedPosition { text: String, position: u8 },
    /// A Unicode character outside the six-dot braille patterns
    NotSixDot(char),
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellError::Empty => write!(f, "cell has no raised dots"),
            CellError::InvalidPosition { text, found } => {
                write!(f, "invalid dot position '{found}' in cell '{text}'")
            }
            CellError::RepeatedPosition { text, position } => {
                write!(f, "dot {position} repeated in cell '{text}'")
            }
            CellError::NotSixDot(c) => {
                write!(f, "'{c}' (U+{:04X}) is not a six-dot braille cell", *c as u32)
            }
        }
    }
}

impl std::error::Error for CellError {}

impl CellCode {
    /// Build a cell from a raw bitmask. Returns `None` for zero or for bits above dot 6.
    pub fn from_mask(mask: u8) -> Option<Self> {
        if mask == 0 || mask & !SIX_DOT_MASK != 0 {
            None
        } else {
            Some(CellCode(mask))
        }
    }

    /// Build a cell from a list of dot positions (each `1..=6`, no repeats).
    pub fn from_positions(positions: &[u8]) -> Result<Self, CellError> {
        let text: String = positions.iter().map(|p| p.to_string()).collect();
        let mut mask = 0u8;
        for &position in positions {
            if !(1..=6).contains(&position) {
                let found = char::from_digit(position as u32 % 10, 10).unwrap_or('?');
                return Err(CellError::InvalidPosition { text, found });
            }
            let bit = 1 << (position - 1);
            if mask & bit != 0 {
                return Err(CellError::RepeatedPosition { text, position });
            }
            mask |= bit;
        }
        CellCode::from_mask(mask).ok_or(CellError::Empty)
    }

    /// Decode a Unicode braille pattern character.
    pub fn from_unicode(c: char) -> Result<Self, CellError> {
        let offset = (c as u32).wrapping_sub(UNICODE_BASE);
        if offset > SIX_DOT_MASK as u32 {
            return Err(CellError::NotSixDot(c));
        }
        CellCode::from_mask(offset as u8).ok_or(CellError::Empty)
    }

    /// All 63 non-empty cells, in mask order
    pub fn all() -> impl Iterator<Item = CellCode> {
        (1..=SIX_DOT_MASK).map(CellCode)
    }

    pub fn mask(self) -> u8 {
        self.0
    }

    pub fn contains(self, position: u8) -> bool {
        (1..=6).contains(&position) && self.0 & (1 << (position - 1)) != 0
    }

    /// Raised positions, ascending
    pub fn positions(self) -> impl Iterator<Item = u8> {
        (1..=6u8).filter(move |p| self.contains(*p))
    }

    /// Canonical string: raised positions ascending, concatenated
    pub fn canonical(self) -> String {
        self.positions()
            .map(|p| char::from(b'0' + p))
            .collect()
    }

    pub fn to_unicode(self) -> char {
        // Always inside U+2801..=U+283F, which are all assigned scalar values.
        char::from_u32(UNICODE_BASE + self.0 as u32).unwrap_or('\u{2800}')
    }
}

impl FromStr for CellCode {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut positions = Vec::with_capacity(s.len());
        for c in s.chars() {
            match c.to_digit(10) {
                Some(d @ 1..=6) => positions.push(d as u8),
                _ => {
                    return Err(CellError::InvalidPosition {
                        text: s.to_string(),
                        found: c,
                    })
                }
            }
        }
        CellCode::from_positions(&positions).map_err(|e| match e {
            CellError::RepeatedPosition { position, .. } => CellError::RepeatedPosition {
                text: s.to_string(),
                position,
            },
            other => other,
        })
    }
}

impl fmt::Display for CellCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl fmt::Debug for CellCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellCode({})", self.canonical())
    }
}

impl Serialize for CellCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for CellCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // YAML may hand us `256` as an integer; accept both spellings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }
        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Number(n) => n.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> CellCode {
        s.parse().unwrap()
    }

    #[test]
    fn test_canonical_is_sorted() {
        assert_eq!(cell("652").canonical(), "256");
        assert_eq!(cell("256"), cell("526"));
        assert_eq!(cell("123456").canonical(), "123456");
    }

    #[test]
    fn test_positions_and_mask() {
        let c = cell("146");
        assert_eq!(c.positions().collect::<Vec<_>>(), vec![1, 4, 6]);
        assert_eq!(c.mask(), 0b10_1001);
        assert!(c.contains(4));
        assert!(!c.contains(2));
        assert!(!c.contains(7));
    }

    #[test]
    fn test_rejects_bad_text() {
        assert_eq!("".parse::<CellCode>(), Err(CellError::Empty));
        assert!(matches!(
            "127".parse::<CellCode>(),
            Err(CellError::InvalidPosition { found: '7', .. })
        ));
        assert!(matches!(
            "0".parse::<CellCode>(),
            Err(CellError::InvalidPosition { found: '0', .. })
        ));
        assert_eq!(
            "1221".parse::<CellCode>(),
            Err(CellError::RepeatedPosition {
                text: "1221".to_string(),
                position: 2
            })
        );
    }

    #[test]
    fn test_from_positions() {
        assert_eq!(CellCode::from_positions(&[3, 4, 5, 6]).unwrap(), cell("3456"));
        assert_eq!(CellCode::from_positions(&[]), Err(CellError::Empty));
        assert!(CellCode::from_positions(&[0]).is_err());
    }

    #[test]
    fn test_from_mask_bounds() {
        assert!(CellCode::from_mask(0).is_none());
        assert!(CellCode::from_mask(0b0100_0000).is_none());
        assert_eq!(CellCode::from_mask(1), Some(cell("1")));
        assert_eq!(CellCode::all().count(), 63);
    }

    #[test]
    fn test_unicode_mapping() {
        assert_eq!(cell("1").to_unicode(), '⠁');
        assert_eq!(cell("3456").to_unicode(), '⠼');
        assert_eq!(cell("123456").to_unicode(), '⠿');
        assert_eq!(CellCode::from_unicode('⠼').unwrap(), cell("3456"));
        assert_eq!(CellCode::from_unicode('\u{2800}'), Err(CellError::Empty));
        assert_eq!(CellCode::from_unicode('⡀'), Err(CellError::NotSixDot('⡀')));
        assert_eq!(CellCode::from_unicode('a'), Err(CellError::NotSixDot('a')));
    }

    #[test]
    fn test_serde_as_canonical_string() {
        let json = serde_json::to_string(&cell("62")).unwrap();
        assert_eq!(json, "\"26\"");
        let back: CellCode = serde_json::from_str("\"26\"").unwrap();
        assert_eq!(back, cell("26"));
        let numeric: CellCode = serde_yaml::from_str("256").unwrap();
        assert_eq!(numeric, cell("256"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(CellError::Empty.to_string(), "cell has no raised dots");
        let err = "19".parse::<CellCode>().unwrap_err();
        assert_eq!(err.to_string(), "invalid dot position '9' in cell '19'");
    }
}
