//! Mode state machine
//!
//!     Exactly one `Mode` is active at a time. Two modifiers ride on top of it and never touch
//!     it: caps-pending (one shot) and the markout span (a toggle).
//!
//!     Marker cells are classified before any content table is consulted:
//!
//!         number    ->  Mode::Number, no token
//!         markout   ->  toggles the span, emits markout-start / markout-end
//!         caps      ->  caps-pending, no token
//!         math      ->  flips the resting mode between Letter and Math, no token
//!
//!     The resting mode is where Number falls back to when a cell is neither a digit nor a
//!     denominator. It is Letter unless the decode started in Math or a math marker flipped it.

use super::cell::CellCode;
use super::registry::Markers;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which content tables are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Letter,
    Number,
    Math,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Letter => "letter",
            Mode::Number => "number",
            Mode::Math => "math",
        })
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "letter" => Ok(Mode::Letter),
            "number" => Ok(Mode::Number),
            "math" => Ok(Mode::Math),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

/// A reserved cell that changes state instead of producing content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Number,
    Markout,
    Caps,
    Math,
}

impl Marker {
    pub fn classify(cell: CellCode, markers: &Markers) -> Option<Marker> {
        if cell == markers.number {
            Some(Marker::Number)
        } else if cell == markers.markout {
            Some(Marker::Markout)
        } else if Some(cell) == markers.caps {
            Some(Marker::Caps)
        } else if Some(cell) == markers.math {
            Some(Marker::Math)
        } else {
            None
        }
    }
}

/// What applying a marker produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The marker only changed state
    Consumed,
    MarkoutStart,
    MarkoutEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeState {
    mode: Mode,
    resting: Mode,
    caps_pending: bool,
    markout_opened_at: Option<usize>,
}

impl ModeState {
    pub fn new(start: Mode) -> Self {
        let resting = match start {
            Mode::Math => Mode::Math,
            _ => Mode::Letter,
        };
        ModeState {
            mode: start,
            resting,
            caps_pending: false,
            markout_opened_at: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn resting(&self) -> Mode {
        self.resting
    }

    pub fn caps_pending(&self) -> bool {
        self.caps_pending
    }

    pub fn in_markout(&self) -> bool {
        self.markout_opened_at.is_some()
    }

    /// Apply a marker found at cell `index`
    pub fn apply(&mut self, marker: Marker, index: usize) -> Transition {
        let transition = match marker {
            Marker::Number => {
                self.mode = Mode::Number;
                Transition::Consumed
            }
            Marker::Caps => {
                self.caps_pending = true;
                Transition::Consumed
            }
            Marker::Math => {
                self.resting = match self.resting {
                    Mode::Math => Mode::Letter,
                    _ => Mode::Math,
                };
                self.mode = self.resting;
                Transition::Consumed
            }
            Marker::Markout => match self.markout_opened_at.take() {
                Some(_) => Transition::MarkoutEnd,
                None => {
                    self.markout_opened_at = Some(index);
                    Transition::MarkoutStart
                }
            },
        };
        log::trace!("cell {index}: {marker:?} marker -> mode {}", self.mode);
        transition
    }

    /// Leave Number mode for the resting mode
    pub fn revert(&mut self) {
        if self.mode == Mode::Number {
            log::trace!("number run ended -> mode {}", self.resting);
            self.mode = self.resting;
        }
    }

    /// Clear caps-pending, returning whether it was set
    pub fn take_caps(&mut self) -> bool {
        std::mem::take(&mut self.caps_pending)
    }

    /// Force-close an open markout span, returning where it was opened
    pub fn close_markout(&mut self) -> Option<usize> {
        self.markout_opened_at.take()
    }
}

impl Default for ModeState {
    fn default() -> Self {
        ModeState::new(Mode::Letter)
    }
}
