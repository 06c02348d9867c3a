//! Session code type.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Serialize, Serializer};

/// Smallest code that can be issued.
pub const MIN_CODE: u32 = 100_000;

/// Largest code that can be issued.
pub const MAX_CODE: u32 = 999_999;

/// Human-enterable identifier for a betting session.
///
/// Codes are six decimal digits without a leading zero, so they survive
/// being typed in by players. They are unique among live sessions only;
/// the store re-samples on collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionCode(u32);

impl SessionCode {
    /// Sample a uniformly random code from the issuable range.
    pub fn random() -> Self {
        Self(rand::rng().random_range(MIN_CODE..=MAX_CODE))
    }

    /// Create a code from a raw value, if it lies in the issuable range.
    pub fn from_raw(value: u32) -> Option<Self> {
        (MIN_CODE..=MAX_CODE).contains(&value).then_some(Self(value))
    }

    /// Get the raw numeric value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

impl FromStr for SessionCode {
    type Err = crate::error::PotboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(crate::error::PotboardError::InvalidSessionCode(s.into()));
        }
        digits
            .parse()
            .ok()
            .and_then(Self::from_raw)
            .ok_or_else(|| crate::error::PotboardError::InvalidSessionCode(s.into()))
    }
}

impl Serialize for SessionCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
