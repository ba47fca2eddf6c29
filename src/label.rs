//! Gesture labels: the lookup key into the action table.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::LabelError;

/// Labels offered for binding by default.
pub const KNOWN_LABELS: [&str; 16] = [
    "up",
    "down",
    "left",
    "right",
    "up-right",
    "up-left",
    "down-right",
    "down-left",
    "right-up",
    "right-down",
    "left-up",
    "left-down",
    "up-down",
    "down-up",
    "left-right",
    "right-left",
];

/// Longest label: three diagonal segments.
const MAX_TOKENS: usize = 6;

/// Directions joined by `-`, e.g. `down-right`. Empty means nothing was
/// recognized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GestureLabel(String);

impl GestureLabel {
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// `Unknown` never makes it into a label.
    pub fn from_directions(dirs: &[Direction]) -> Self {
        let parts: Vec<&str> = dirs
            .iter()
            .filter(|d| d.is_known())
            .map(|d| d.as_str())
            .collect();
        Self(parts.join("-"))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for GestureLabel {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LabelError::Empty);
        }
        let mut count = 0;
        for tok in s.split('-') {
            match tok {
                "up" | "down" | "left" | "right" => count += 1,
                other => return Err(LabelError::BadToken(other.to_string())),
            }
        }
        if count > MAX_TOKENS {
            return Err(LabelError::TooLong(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for GestureLabel {
    type Error = LabelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<GestureLabel> for String {
    fn from(label: GestureLabel) -> Self {
        label.0
    }
}

impl PartialEq<str> for GestureLabel {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for GestureLabel {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_directions_and_skips_unknown() {
        let l = GestureLabel::from_directions(&[
            Direction::Down,
            Direction::Unknown,
            Direction::UpLeft,
        ]);
        assert_eq!(l, "down-up-left");
        assert!(GestureLabel::from_directions(&[Direction::Unknown]).is_empty());
    }

    #[test]
    fn parses_known_labels() {
        for s in KNOWN_LABELS {
            let l: GestureLabel = s.parse().unwrap();
            assert_eq!(l.as_str(), s);
        }
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!("".parse::<GestureLabel>(), Err(LabelError::Empty));
        assert_eq!(
            "up-sideways".parse::<GestureLabel>(),
            Err(LabelError::BadToken("sideways".into()))
        );
        assert!(matches!(
            "up-down-up-down-up-down-up".parse::<GestureLabel>(),
            Err(LabelError::TooLong(_))
        ));
        assert!("unknown".parse::<GestureLabel>().is_err());
    }
}
