// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Weekly start times.
//!
//! A [`ScheduleEvaluator`] is polled with the current time and answers
//! whether a cycle should start now. [`WeeklyStartSchedule`] knows one start
//! time for Monday to Friday and one for the weekend.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};

use crate::config::{SleepLightConfig, is_weekend};
use crate::types::TimeOfDay;

/// Decides when a scheduled cycle starts.
pub trait ScheduleEvaluator: Send {
    /// Returns `true` if a start time was reached since the previous call.
    fn should_start(&mut self, now: DateTime<FixedOffset>) -> bool;
}

/// One start time for weekdays and one for weekends.
///
/// Each start time fires once, when a poll first sees it passed. The first
/// poll only records the time, so starting the service late in the evening
/// does not start a cycle for a time that has already gone by.
///
/// # Examples
///
/// ```
/// use chrono::{DateTime, Duration};
/// use sleeplight::schedule::{ScheduleEvaluator, WeeklyStartSchedule};
/// use sleeplight::types::TimeOfDay;
///
/// let mut schedule = WeeklyStartSchedule::new(Some(TimeOfDay::new(22, 30).unwrap()), None);
///
/// // Wednesday evening
/// let now = DateTime::parse_from_rfc3339("2024-01-31T22:29:30+01:00").unwrap();
/// assert!(!schedule.should_start(now));
/// assert!(schedule.should_start(now + Duration::seconds(30)));
/// assert!(!schedule.should_start(now + Duration::seconds(60)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyStartSchedule {
    weekday: Option<TimeOfDay>,
    weekend: Option<TimeOfDay>,
    last_checked: Option<DateTime<FixedOffset>>,
}

impl WeeklyStartSchedule {
    /// Creates a schedule. `None` disables starting on those days.
    #[must_use]
    pub fn new(weekday: Option<TimeOfDay>, weekend: Option<TimeOfDay>) -> Self {
        Self {
            weekday,
            weekend,
            last_checked: None,
        }
    }

    /// Creates the schedule configured in `config`, if any start time is set.
    #[must_use]
    pub fn from_config(config: &SleepLightConfig) -> Option<Self> {
        if config.weekday_start.is_none() && config.weekend_start.is_none() {
            return None;
        }
        Some(Self::new(config.weekday_start, config.weekend_start))
    }

    /// Returns the start time on `date`.
    #[must_use]
    pub fn start_on(&self, date: NaiveDate) -> Option<TimeOfDay> {
        if is_weekend(date.weekday()) {
            self.weekend
        } else {
            self.weekday
        }
    }
}

impl ScheduleEvaluator for WeeklyStartSchedule {
    fn should_start(&mut self, now: DateTime<FixedOffset>) -> bool {
        let Some(previous) = self.last_checked.replace(now) else {
            return false;
        };
        if now <= previous {
            return false;
        }

        let (from, to) = (previous.naive_local(), now.naive_local());
        let mut date = from.date();
        while date <= to.date() {
            if let Some(start) = self.start_on(date) {
                let start = date.and_time(start.as_naive());
                if start > from && start <= to {
                    tracing::debug!(%start, "Weekly start time reached");
                    return true;
                }
            }
            let Some(next) = date.succ_opt() else {
                break;
            };
            date = next;
        }
        false
    }
}
