// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! State changes are the only way the visible sleep light state is updated.
//! They are applied to a [`SleepLightState`](super::SleepLightState) and
//! broadcast to observers of a [`StateStore`](crate::store::StateStore).
//!
//! # Examples
//!
//! ```
//! use sleeplight::state::{SleepLightState, StateChange};
//! use sleeplight::types::Brightness;
//!
//! let mut state = SleepLightState::default();
//!
//! // Apply returns true if state actually changed
//! let changed = state.apply(&StateChange::Brightness(Brightness::new(70).unwrap()));
//! assert!(changed);
//!
//! let changed = state.apply(&StateChange::Brightness(Brightness::new(70).unwrap()));
//! assert!(!changed);
//! ```

use crate::types::{Brightness, RgbColor, SleepDuration};

/// A change of one visible state variable.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StateChange {
    /// The sleep light switch changed.
    Switch(bool),

    /// The manual brightness input changed.
    Brightness(Brightness),

    /// The manual color input changed.
    Color(RgbColor),

    /// The manual duration input changed.
    Duration(SleepDuration),

    /// The displayed power-off time changed. `None` hides it.
    NextPowerOff(Option<String>),

    /// The manual inputs were locked (`false`) or unlocked (`true`).
    ManualControlsEnabled(bool),

    /// Multiple changes at once.
    Batch(Vec<StateChange>),
}

impl StateChange {
    /// Changes applied when a cycle starts.
    #[must_use]
    pub fn cycle_started(next_power_off: impl Into<String>) -> Self {
        Self::Batch(vec![
            Self::Switch(true),
            Self::ManualControlsEnabled(false),
            Self::NextPowerOff(Some(next_power_off.into())),
        ])
    }

    /// Changes applied when a cycle ends for any reason.
    #[must_use]
    pub fn cycle_stopped() -> Self {
        Self::Batch(vec![
            Self::Switch(false),
            Self::ManualControlsEnabled(true),
            Self::NextPowerOff(None),
        ])
    }

    /// Returns `true` if this change touches one of the manual inputs.
    #[must_use]
    pub fn is_manual_input(&self) -> bool {
        match self {
            Self::Brightness(_) | Self::Color(_) | Self::Duration(_) => true,
            Self::Batch(changes) => changes.iter().any(Self::is_manual_input),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_started_batch() {
        let change = StateChange::cycle_started("01.02.2024, 23:30:00");
        let StateChange::Batch(changes) = change else {
            panic!("expected batch");
        };
        assert_eq!(changes.len(), 3);
        assert!(changes.contains(&StateChange::Switch(true)));
        assert!(changes.contains(&StateChange::ManualControlsEnabled(false)));
    }

    #[test]
    fn manual_input_detection() {
        assert!(StateChange::Duration(SleepDuration::DEFAULT).is_manual_input());
        assert!(StateChange::Batch(vec![StateChange::Color(RgbColor::WARM_ORANGE)]).is_manual_input());
        assert!(!StateChange::Switch(true).is_manual_input());
        assert!(!StateChange::cycle_stopped().is_manual_input());
    }
}
