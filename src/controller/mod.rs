// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The dim cycle state machine.
//!
//! A cycle switches the light on at a start brightness and lowers it by one
//! percent per tick until it reaches zero at a fixed end time, then switches
//! the light off. The interval to the next tick is always recomputed from the
//! time that is actually left, so late ticks do not stretch the cycle.
//!
//! ```text
//!            toggle on                 tick (brightness > 1)
//!   Idle ─────────────────▶ Active ◀──────────────────────┐
//!    ▲                        │  └─────────────────────────┘
//!    │  toggle off / last tick / light switched off /
//!    │  brightness raised externally / end time passed
//!    └────────────────────────┘
//! ```

mod dim_cycle;

pub use dim_cycle::DimCycleController;

use chrono::{DateTime, FixedOffset, TimeZone};

use crate::store::CycleAttributes;
use crate::types::{Brightness, RgbColor, SleepDuration};

/// Where a cycle takes its brightness, color and duration from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Mode {
    /// The manual inputs of the state store.
    #[default]
    Manual,
    /// The weekday or weekend profile of the configuration.
    WeeklySchedule,
}

/// A user operating one of the visible state variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UserAction {
    /// Switches the sleep light on (manual mode) or off.
    SleepLight(bool),
    /// Changes the manual start brightness.
    Brightness(Brightness),
    /// Changes the manual color.
    Color(RgbColor),
    /// Changes the manual duration.
    Duration(SleepDuration),
}

/// Observable state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// No cycle running.
    Idle,
    /// A cycle is running.
    Active {
        /// Brightness the controller wrote last.
        cycling_brightness: u8,
        /// Unix time in seconds at which the light reaches zero.
        end_time: i64,
    },
}

impl CycleState {
    /// Returns `true` for [`CycleState::Active`].
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Returns the end time in the given time zone.
    #[must_use]
    pub fn end_time_in(&self, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Idle => None,
            Self::Active { end_time, .. } => offset.timestamp_opt(*end_time, 0).single(),
        }
    }
}

impl From<CycleAttributes> for CycleState {
    fn from(attributes: CycleAttributes) -> Self {
        if attributes.is_active() {
            Self::Active {
                cycling_brightness: attributes.cycling_brightness,
                end_time: attributes.end_time,
            }
        } else {
            Self::Idle
        }
    }
}
