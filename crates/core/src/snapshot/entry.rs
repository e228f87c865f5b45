//! Per-entry parsing for editor-authored collections.
//!
//! Compartment extras, element configs and door groups are decoded one entry
//! at a time. An entry that does not fit its type is kept verbatim so it
//! round-trips through storage, and [`Layout::resolve`](super::Layout::resolve)
//! skips it with a warning instead of rejecting the whole snapshot.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Entry<T> {
    Parsed(T),
    Malformed { raw: Value, error: String },
}

impl<T> Entry<T> {
    /// The parsed value, or the reason it could not be parsed.
    pub fn parsed(&self) -> Result<&T, &str> {
        match self {
            Self::Parsed(value) => Ok(value),
            Self::Malformed { error, .. } => Err(error.as_str()),
        }
    }

    pub fn parsed_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Malformed { .. } => None,
        }
    }
}

impl<T> From<T> for Entry<T> {
    fn from(value: T) -> Self {
        Self::Parsed(value)
    }
}

impl<T: Serialize> Serialize for Entry<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Parsed(value) => value.serialize(serializer),
            Self::Malformed { raw, .. } => raw.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Entry<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(match T::deserialize(&raw) {
            Ok(value) => Self::Parsed(value),
            Err(e) => Self::Malformed {
                raw,
                error: e.to_string(),
            },
        })
    }
}
