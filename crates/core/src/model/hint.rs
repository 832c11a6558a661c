use std::fmt;

use thiserror::Error;

/// Number of hint levels a problem offers.
pub const MAX_HINT_LEVEL: u8 = 5;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HintError {
    #[error("hint level must be between 1 and {MAX_HINT_LEVEL}, got {0}")]
    OutOfRange(u8),

    #[error("hint level {requested} is locked: {unlocked} hint(s) unlocked so far")]
    Locked { requested: u8, unlocked: u8 },
}

/// A hint level in `1..=MAX_HINT_LEVEL`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HintLevel(u8);

impl HintLevel {
    pub const FIRST: Self = Self(1);

    /// # Errors
    ///
    /// Returns `HintError::OutOfRange` outside `1..=MAX_HINT_LEVEL`.
    pub fn new(level: u8) -> Result<Self, HintError> {
        if (1..=MAX_HINT_LEVEL).contains(&level) {
            Ok(Self(level))
        } else {
            Err(HintError::OutOfRange(level))
        }
    }

    /// The level that unlocks after `unlocked` hints, if any remain.
    #[must_use]
    pub fn after(unlocked: u8) -> Option<Self> {
        Self::new(unlocked.checked_add(1)?).ok()
    }

    /// Checks that this level is exactly the next one after `unlocked`.
    ///
    /// # Errors
    ///
    /// Returns `HintError::Locked` when earlier levels are still missing or the
    /// level was already granted.
    pub fn ensure_next(self, unlocked: u8) -> Result<(), HintError> {
        if u16::from(self.0) == u16::from(unlocked) + 1 {
            Ok(())
        } else {
            Err(HintError::Locked {
                requested: self.0,
                unlocked,
            })
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Zero-based slot in a record's hint sequence.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::after(self.0)
    }

    /// All levels in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=MAX_HINT_LEVEL).map(Self)
    }
}

impl fmt::Debug for HintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HintLevel({})", self.0)
    }
}

impl fmt::Display for HintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for HintLevel {
    type Error = HintError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
