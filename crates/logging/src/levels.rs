//! crates/logging/src/levels.rs
//! Severity levels and their string forms.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ParseLevelError;

/// A log severity.
///
/// Higher values are more severe. Only the top bit is reserved, so any value
/// up to [`LogLevel::MAX_LEVEL`] is a valid level, not just the named ones;
/// `LogLevel::DBG + 3` is a perfectly usable threshold.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct LogLevel(u32);

impl LogLevel {
    /// Marker for a call-site cache that has not been initialized.
    pub const UNINITIALIZED: Self = Self(0);
    /// Lowest real level; a category at `NONE` admits everything.
    pub const NONE: Self = Self(1);
    /// Alias of [`NONE`](Self::NONE).
    pub const MIN_LEVEL: Self = Self(1);
    /// Most verbose debug level.
    pub const DBG: Self = Self(1000);
    /// Informational messages.
    pub const INFO: Self = Self(2000);
    /// Warnings.
    pub const WARN: Self = Self(3000);
    /// Alias of [`WARN`](Self::WARN).
    pub const WARNING: Self = Self(3000);
    /// Errors.
    pub const ERR: Self = Self(4000);
    /// Critical errors.
    pub const CRITICAL: Self = Self(5000);
    /// Aborts the process in debug builds only.
    pub const DFATAL: Self = Self(0x7fff_fffe);
    /// Always aborts the process.
    pub const FATAL: Self = Self(0x7fff_ffff);
    /// Largest representable level, equal to [`FATAL`](Self::FATAL).
    pub const MAX_LEVEL: Self = Self(0x7fff_ffff);

    /// Builds a level from its raw value, clamped to [`MAX_LEVEL`](Self::MAX_LEVEL).
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        if value > Self::MAX_LEVEL.0 {
            Self::MAX_LEVEL
        } else {
            Self(value)
        }
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns true when a message at this level must abort the process.
    ///
    /// Debug builds also treat [`DFATAL`](Self::DFATAL) as fatal.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        if cfg!(debug_assertions) {
            self.0 >= Self::DFATAL.0
        } else {
            self.0 >= Self::FATAL.0
        }
    }

    const fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::UNINITIALIZED => "UNINITIALIZED",
            Self::NONE => "NONE",
            Self::DBG => "DEBUG",
            Self::INFO => "INFO",
            Self::WARN => "WARN",
            Self::ERR => "ERROR",
            Self::CRITICAL => "CRITICAL",
            Self::DFATAL => "DFATAL",
            Self::FATAL => "FATAL",
            _ => return None,
        })
    }
}

/// The root category's level until configured otherwise.
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::INFO;

impl Add<u32> for LogLevel {
    type Output = Self;

    fn add(self, rhs: u32) -> Self {
        Self::from_raw(self.0.saturating_add(rhs))
    }
}

impl AddAssign<u32> for LogLevel {
    fn add_assign(&mut self, rhs: u32) {
        *self = *self + rhs;
    }
}

impl Sub<u32> for LogLevel {
    type Output = Self;

    fn sub(self, rhs: u32) -> Self {
        Self(self.0.saturating_sub(rhs))
    }
}

impl SubAssign<u32> for LogLevel {
    fn sub_assign(&mut self, rhs: u32) {
        *self = *self - rhs;
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "LogLevel({})", self.0),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    /// Parses a level name case-insensitively.
    ///
    /// Accepts bare names (`warn`), the `LogLevel::warn` and `LogLevel(warn)`
    /// spellings, and numeric values either bare or wrapped (`LogLevel(1234)`).
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let lower = input.trim().to_ascii_lowercase();
        let mut name = lower.as_str();
        if let Some(rest) = name.strip_prefix("loglevel::") {
            name = rest;
        } else if let Some(rest) = name
            .strip_prefix("loglevel(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            name = rest;
        }

        let level = match name {
            "uninitialized" => Self::UNINITIALIZED,
            "none" => Self::NONE,
            "debug" | "dbg" => Self::DBG,
            "info" => Self::INFO,
            "warn" | "warning" => Self::WARN,
            "error" | "err" => Self::ERR,
            "critical" => Self::CRITICAL,
            "dfatal" => Self::DFATAL,
            "fatal" => Self::FATAL,
            "max" | "max_level" => Self::MAX_LEVEL,
            other => match other.parse::<u32>() {
                Ok(value) if value <= Self::MAX_LEVEL.0 => Self(value),
                _ => return Err(ParseLevelError::new(input)),
            },
        };
        Ok(level)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for LogLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for LogLevel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
