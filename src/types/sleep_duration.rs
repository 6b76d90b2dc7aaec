// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sleep duration type for the length of one dim cycle.

use std::fmt;
use std::time::Duration;

use crate::error::ValueError;

/// Length of a sleep cycle in minutes (1-120).
///
/// The cycle reaches zero brightness exactly this long after it was started.
///
/// # Examples
///
/// ```
/// use sleeplight::types::SleepDuration;
///
/// let duration = SleepDuration::from_minutes(30).unwrap();
/// assert_eq!(duration.minutes(), 30);
/// assert_eq!(duration.seconds(), 1800);
///
/// assert!(SleepDuration::from_minutes(0).is_err());
/// assert!(SleepDuration::from_minutes(121).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u16", into = "u16")]
pub struct SleepDuration(u16);

impl SleepDuration {
    /// Minimum duration (1 minute).
    pub const MIN: u16 = 1;

    /// Maximum duration (120 minutes).
    pub const MAX: u16 = 120;

    /// Default duration (30 minutes).
    pub const DEFAULT: Self = Self(30);

    /// Creates a sleep duration from minutes.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is outside [1, 120].
    pub fn from_minutes(minutes: u16) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&minutes) {
            return Err(ValueError::OutOfRange {
                min: u32::from(Self::MIN),
                max: u32::from(Self::MAX),
                actual: u32::from(minutes),
            });
        }
        Ok(Self(minutes))
    }

    /// Creates a sleep duration, clamping to the valid range.
    #[must_use]
    pub const fn clamped(minutes: u16) -> Self {
        if minutes < Self::MIN {
            Self(Self::MIN)
        } else if minutes > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(minutes)
        }
    }

    /// Returns the duration in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u16 {
        self.0
    }

    /// Returns the duration in seconds.
    #[must_use]
    pub fn seconds(&self) -> i64 {
        i64::from(self.0) * 60
    }

    /// Returns the duration as a [`std::time::Duration`].
    #[must_use]
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.0) * 60)
    }
}

impl Default for SleepDuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for SleepDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}

impl TryFrom<u16> for SleepDuration {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_minutes(value)
    }
}

impl From<SleepDuration> for u16 {
    fn from(value: SleepDuration) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_range() {
        assert_eq!(SleepDuration::from_minutes(1).unwrap().minutes(), 1);
        assert_eq!(SleepDuration::from_minutes(120).unwrap().minutes(), 120);
    }

    #[test]
    fn out_of_range() {
        assert!(SleepDuration::from_minutes(0).is_err());
        assert!(SleepDuration::from_minutes(500).is_err());
    }

    #[test]
    fn clamped() {
        assert_eq!(SleepDuration::clamped(0).minutes(), 1);
        assert_eq!(SleepDuration::clamped(999).minutes(), 120);
        assert_eq!(SleepDuration::clamped(45).minutes(), 45);
    }

    #[test]
    fn conversions() {
        let duration = SleepDuration::from_minutes(90).unwrap();
        assert_eq!(duration.seconds(), 5400);
        assert_eq!(duration.as_duration(), Duration::from_secs(5400));
        assert_eq!(duration.to_string(), "90 min");
        assert_eq!(SleepDuration::default().minutes(), 30);
    }
}
