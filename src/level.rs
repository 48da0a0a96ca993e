//! Shelf level detection from a location code.
//!
//! The fourth character of a location code carries the shelf level: `1` is the
//! lower level (arrow pointing down), `2` the upper level (arrow pointing up).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static LEVEL_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.{3}([0-9])").expect("level pattern is valid"));

/// Direction of the arrow printed on a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelIndicator {
    None,
    Down,
    Up,
}

impl LevelIndicator {
    /// Derive the indicator from a location code. Codes shorter than four
    /// characters, or whose fourth character is not a digit, have no arrow.
    pub fn from_code(code: &str) -> Self {
        let digit = LEVEL_DIGIT
            .captures(code)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u8>().ok());

        match digit {
            Some(1) => LevelIndicator::Down,
            Some(2) => LevelIndicator::Up,
            _ => LevelIndicator::None,
        }
    }
}
