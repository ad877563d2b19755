//! Common types shared across hardware device implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Colors of the three-LED indicator.
///
/// The set is closed: every color is an atomic target state of the red,
/// green and blue lines, colors are never combined from smaller units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedColor {
    /// All LEDs off.
    Off,

    /// Red LED.
    Red,

    /// Green LED.
    Green,

    /// Blue LED.
    Blue,

    /// Red + green.
    Yellow,

    /// Green + blue.
    Cyan,

    /// Red + blue.
    Magenta,

    /// All LEDs on.
    White,
}

impl LedColor {
    /// Every color, in table order.
    pub const ALL: [LedColor; 8] = [
        Self::Off,
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Cyan,
        Self::Magenta,
        Self::White,
    ];

    /// Get the (red, green, blue) line states of the color.
    pub fn as_rgb(&self) -> (bool, bool, bool) {
        match self {
            Self::Off => (false, false, false),
            Self::Red => (true, false, false),
            Self::Green => (false, true, false),
            Self::Blue => (false, false, true),
            Self::Yellow => (true, true, false),
            Self::Cyan => (false, true, true),
            Self::Magenta => (true, false, true),
            Self::White => (true, true, true),
        }
    }

    /// Get the color shown by the given (red, green, blue) line states.
    pub fn from_rgb(red: bool, green: bool, blue: bool) -> Self {
        match (red, green, blue) {
            (false, false, false) => Self::Off,
            (true, false, false) => Self::Red,
            (false, true, false) => Self::Green,
            (false, false, true) => Self::Blue,
            (true, true, false) => Self::Yellow,
            (false, true, true) => Self::Cyan,
            (true, false, true) => Self::Magenta,
            (true, true, true) => Self::White,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Red => "RED",
            Self::Green => "GREEN",
            Self::Blue => "BLUE",
            Self::Yellow => "YELLOW",
            Self::Cyan => "CYAN",
            Self::Magenta => "MAGENTA",
            Self::White => "WHITE",
        }
    }
}

impl fmt::Display for LedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
