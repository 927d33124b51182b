use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

use crate::error::CoreError;

/// Number of decimal digits in an allocated id's counter.
pub const COUNTER_WIDTH: usize = 8;

/// Highest counter that still fits in [`COUNTER_WIDTH`] digits.
pub const MAX_COUNTER: u64 = 99_999_999;

pub const DEFAULT_PREFIX: &str = "XX";

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.0.to_string()[..8])
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// Correlates the log lines of one import batch.
uuid_id!(BatchId);

/// Identifier of a homolog within a set.
///
/// Allocated ids look like `XX00000001`; ids supplied by imported records are
/// kept verbatim and only need to be non-empty.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HomologId(String);

impl HomologId {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidId(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Counter encoded in this id, if it has the shape `prefix` allocates.
    pub fn numeric_suffix(&self, prefix: &IdPrefix) -> Option<u64> {
        let digits = self.0.strip_prefix(prefix.as_str())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().filter(|counter| *counter <= MAX_COUNTER)
    }
}

impl fmt::Debug for HomologId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HomologId({})", self.0)
    }
}

impl fmt::Display for HomologId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for HomologId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for HomologId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for HomologId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: String = Deserialize::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Two-letter prefix shared by every id a set allocates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdPrefix([u8; 2]);

impl IdPrefix {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let bytes: [u8; 2] = raw
            .as_bytes()
            .try_into()
            .map_err(|_| CoreError::InvalidPrefix(raw.to_string()))?;
        if !bytes.iter().all(|b| b.is_ascii_uppercase()) {
            return Err(CoreError::InvalidPrefix(raw.to_string()));
        }
        Ok(Self(bytes))
    }

    pub fn as_str(&self) -> &str {
        // Both bytes are ASCII uppercase, checked in `parse`.
        std::str::from_utf8(&self.0).unwrap_or(DEFAULT_PREFIX)
    }

    /// Render the id for `counter`, zero-padded to [`COUNTER_WIDTH`] digits.
    pub fn format(&self, counter: u64) -> Result<HomologId, CoreError> {
        if counter == 0 || counter > MAX_COUNTER {
            return Err(CoreError::IdSpaceExhausted(self.as_str().to_string()));
        }
        Ok(HomologId(format!(
            "{}{:0width$}",
            self.as_str(),
            counter,
            width = COUNTER_WIDTH
        )))
    }
}

impl Default for IdPrefix {
    fn default() -> Self {
        Self(*b"XX")
    }
}

impl fmt::Debug for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdPrefix({})", self.as_str())
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IdPrefix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IdPrefix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: String = Deserialize::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
