// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sleep light configuration.
//!
//! Configuration is read-only for the controller. It carries the two weekly
//! profiles, the initial manual inputs and the optional weekly start times.
//!
//! ```json
//! {
//!   "weekday": { "brightness": 50, "color": "#FF9900", "durationMinutes": 30 },
//!   "weekend": { "brightness": 30, "durationMinutes": 60 },
//!   "weekdayStart": "22:30"
//! }
//! ```

use std::path::Path;

use chrono::{Datelike, Weekday};

use crate::error::ConfigError;
use crate::state::ManualInputs;
use crate::types::{Brightness, RgbColor, SleepDuration, TimeOfDay};

/// Brightness, color and duration of a scheduled cycle.
///
/// A profile without a color leaves the light's color untouched.
///
/// # Examples
///
/// ```
/// use sleeplight::config::ScheduleProfile;
/// use sleeplight::types::{Brightness, RgbColor, SleepDuration};
///
/// let profile = ScheduleProfile::default()
///     .with_brightness(Brightness::new(30).unwrap())
///     .with_duration(SleepDuration::from_minutes(60).unwrap())
///     .without_color();
///
/// assert!(profile.color.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleProfile {
    /// Start brightness.
    pub brightness: Brightness,

    /// Light color, if the light should be recolored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<RgbColor>,

    /// Time until the light is off.
    #[serde(rename = "durationMinutes")]
    pub duration: SleepDuration,
}

impl Default for ScheduleProfile {
    fn default() -> Self {
        let manual = ManualInputs::default();
        Self {
            brightness: manual.brightness,
            color: Some(manual.color),
            duration: manual.duration,
        }
    }
}

impl ScheduleProfile {
    /// Sets the start brightness.
    #[must_use]
    pub fn with_brightness(mut self, brightness: Brightness) -> Self {
        self.brightness = brightness;
        self
    }

    /// Sets the color.
    #[must_use]
    pub fn with_color(mut self, color: RgbColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Leaves the light's color untouched.
    #[must_use]
    pub fn without_color(mut self) -> Self {
        self.color = None;
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration(mut self, duration: SleepDuration) -> Self {
        self.duration = duration;
        self
    }
}

impl From<ManualInputs> for ScheduleProfile {
    fn from(manual: ManualInputs) -> Self {
        Self {
            brightness: manual.brightness,
            color: Some(manual.color),
            duration: manual.duration,
        }
    }
}

/// Complete sleep light configuration.
///
/// # Examples
///
/// ```
/// use sleeplight::config::SleepLightConfig;
///
/// let config = SleepLightConfig::from_json(r#"{
///     "weekday": { "brightness": 40, "color": 16750848, "durationMinutes": 20 },
///     "weekend": { "brightness": 60, "durationMinutes": 45 },
///     "weekendStart": "23:15"
/// }"#).unwrap();
///
/// assert_eq!(config.weekday.duration.minutes(), 20);
/// assert!(config.weekend.color.is_none());
/// assert!(config.weekday_start.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepLightConfig {
    /// Profile used Monday to Friday.
    #[serde(default)]
    pub weekday: ScheduleProfile,

    /// Profile used Saturday and Sunday.
    #[serde(default)]
    pub weekend: ScheduleProfile,

    /// Initial values of the manual inputs.
    #[serde(default)]
    pub manual: ManualInputs,

    /// Weekly start time Monday to Friday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday_start: Option<TimeOfDay>,

    /// Weekly start time Saturday and Sunday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend_start: Option<TimeOfDay>,
}

impl SleepLightConfig {
    /// Parses configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the document is malformed or a value is
    /// out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "Loaded sleep light configuration");
        Ok(config)
    }

    /// Sets the weekday profile.
    #[must_use]
    pub fn with_weekday(mut self, profile: ScheduleProfile) -> Self {
        self.weekday = profile;
        self
    }

    /// Sets the weekend profile.
    #[must_use]
    pub fn with_weekend(mut self, profile: ScheduleProfile) -> Self {
        self.weekend = profile;
        self
    }

    /// Sets the initial manual inputs.
    #[must_use]
    pub fn with_manual(mut self, manual: ManualInputs) -> Self {
        self.manual = manual;
        self
    }

    /// Sets the weekday start time.
    #[must_use]
    pub fn with_weekday_start(mut self, time: TimeOfDay) -> Self {
        self.weekday_start = Some(time);
        self
    }

    /// Sets the weekend start time.
    #[must_use]
    pub fn with_weekend_start(mut self, time: TimeOfDay) -> Self {
        self.weekend_start = Some(time);
        self
    }

    /// Returns the profile for the day `date` falls on.
    #[must_use]
    pub fn profile_for(&self, date: &impl Datelike) -> &ScheduleProfile {
        if is_weekend(date.weekday()) {
            &self.weekend
        } else {
            &self.weekday
        }
    }
}

/// Returns `true` for Saturday and Sunday.
#[must_use]
pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = SleepLightConfig::from_json("{}").unwrap();
        assert_eq!(config, SleepLightConfig::default());
        assert_eq!(config.weekday.brightness.value(), 50);
        assert_eq!(config.weekday.color, Some(RgbColor::WARM_ORANGE));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let result = SleepLightConfig::from_json(
            r#"{"weekday": {"brightness": 101, "durationMinutes": 30}}"#,
        );
        assert!(matches!(result, Err(ConfigError::Json(_))));

        let result = SleepLightConfig::from_json(
            r#"{"weekday": {"brightness": 50, "durationMinutes": 0}}"#,
        );
        assert!(result.is_err());

        let result = SleepLightConfig::from_json(r#"{"weekdayStart": "25:00"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn profile_follows_weekday() {
        let config = SleepLightConfig::default()
            .with_weekend(ScheduleProfile::default().with_brightness(Brightness::clamped(20)));

        // 2024-02-02 is a Friday, 2024-02-03 a Saturday
        let friday = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();

        assert_eq!(config.profile_for(&friday).brightness.value(), 50);
        assert_eq!(config.profile_for(&saturday).brightness.value(), 20);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SleepLightConfig::from_file("/nonexistent/sleeplight.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sleeplight.json"));
    }

    #[test]
    fn serializes_camel_case() {
        let config = SleepLightConfig::default().with_weekday_start(TimeOfDay::new(22, 0).unwrap());
        let json = serde_json::to_string(&config).unwrap();

        assert!(json.contains("\"weekdayStart\":\"22:00\""));
        assert!(json.contains("\"durationMinutes\":30"));
        assert!(!json.contains("weekendStart"));
    }
}
