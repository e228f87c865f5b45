//! Compartment addressing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Address of one grid cell: column index and vertical slot counted from the
/// carcass floor. Rendered as column letter plus 1-based slot, e.g. `B2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompartmentKey {
    pub column: usize,
    pub slot: usize,
}

impl CompartmentKey {
    /// The only way grid code derives a key.
    pub const fn new(column: usize, slot: usize) -> Self {
        Self { column, slot }
    }
}

/// Spreadsheet-style column letter: 0 → `A`, 25 → `Z`, 26 → `AA`.
pub fn element_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn parse_letters(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

impl fmt::Display for CompartmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", element_letter(self.column), self.slot + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid compartment key '{0}', expected column letter followed by slot number (e.g. A1)")]
pub struct ParseKeyError(pub String);

impl FromStr for CompartmentKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| ParseKeyError(s.to_string()))?;
        let (letters, digits) = s.split_at(split);
        let column = parse_letters(letters).ok_or_else(|| ParseKeyError(s.to_string()))?;
        let slot: usize = digits.parse().map_err(|_| ParseKeyError(s.to_string()))?;
        if slot == 0 {
            return Err(ParseKeyError(s.to_string()));
        }
        Ok(Self::new(column, slot - 1))
    }
}

impl Serialize for CompartmentKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CompartmentKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_follow_spreadsheet_order() {
        assert_eq!(element_letter(0), "A");
        assert_eq!(element_letter(25), "Z");
        assert_eq!(element_letter(26), "AA");
        assert_eq!(element_letter(27), "AB");
        assert_eq!(element_letter(701), "ZZ");
        assert_eq!(element_letter(702), "AAA");
    }

    #[test]
    fn display_and_parse_agree() {
        for column in [0, 3, 25, 26, 100] {
            for slot in [0, 1, 9] {
                let key = CompartmentKey::new(column, slot);
                assert_eq!(key.to_string().parse::<CompartmentKey>().unwrap(), key);
            }
        }
    }

    #[test]
    fn parse_accepts_lowercase() {
        assert_eq!("b3".parse::<CompartmentKey>().unwrap(), CompartmentKey::new(1, 2));
    }

    #[test]
    fn parse_rejects_malformed_keys() {
        for raw in ["", "A", "12", "A0", "A-1", "Ä1"] {
            assert!(raw.parse::<CompartmentKey>().is_err(), "{raw} should not parse");
        }
    }

    #[test]
    fn keys_order_by_column_then_slot() {
        let mut keys = vec![
            CompartmentKey::new(1, 0),
            CompartmentKey::new(0, 2),
            CompartmentKey::new(0, 1),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["A2", "A3", "B1"]);
    }
}
