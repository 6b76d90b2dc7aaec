// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Visible sleep light state.

use crate::types::{Brightness, RgbColor, SleepDuration};

use super::StateChange;

/// Brightness, color and duration a manual cycle starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ManualInputs {
    /// Start brightness.
    pub brightness: Brightness,
    /// Light color.
    pub color: RgbColor,
    /// Time until the light is off.
    pub duration: SleepDuration,
}

impl Default for ManualInputs {
    fn default() -> Self {
        Self {
            brightness: Brightness::clamped(50),
            color: RgbColor::WARM_ORANGE,
            duration: SleepDuration::DEFAULT,
        }
    }
}

/// The state variables a user sees and operates.
///
/// # Examples
///
/// ```
/// use sleeplight::state::{SleepLightState, StateChange};
///
/// let mut state = SleepLightState::default();
/// assert!(!state.is_on());
/// assert!(state.manual_controls_enabled());
///
/// state.apply(&StateChange::cycle_started("24.12.2024, 22:30:00"));
/// assert!(state.is_on());
/// assert_eq!(state.next_power_off(), Some("24.12.2024, 22:30:00"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SleepLightState {
    switch: bool,
    manual: ManualInputs,
    next_power_off: Option<String>,
    manual_controls_enabled: bool,
}

impl Default for SleepLightState {
    fn default() -> Self {
        Self::new(ManualInputs::default())
    }
}

impl SleepLightState {
    /// Creates an idle state with the given manual inputs.
    #[must_use]
    pub fn new(manual: ManualInputs) -> Self {
        Self {
            switch: false,
            manual,
            next_power_off: None,
            manual_controls_enabled: true,
        }
    }

    /// Returns the sleep light switch.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.switch
    }

    /// Returns the manual inputs.
    #[must_use]
    pub fn manual(&self) -> ManualInputs {
        self.manual
    }

    /// Returns the displayed power-off time.
    #[must_use]
    pub fn next_power_off(&self) -> Option<&str> {
        self.next_power_off.as_deref()
    }

    /// Returns `false` while manual inputs are locked.
    #[must_use]
    pub fn manual_controls_enabled(&self) -> bool {
        self.manual_controls_enabled
    }

    /// Applies a change.
    ///
    /// Returns `true` if anything actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        fn set<T: PartialEq>(slot: &mut T, value: T) -> bool {
            if *slot == value {
                false
            } else {
                *slot = value;
                true
            }
        }

        match change {
            StateChange::Switch(on) => set(&mut self.switch, *on),
            StateChange::Brightness(value) => set(&mut self.manual.brightness, *value),
            StateChange::Color(value) => set(&mut self.manual.color, *value),
            StateChange::Duration(value) => set(&mut self.manual.duration, *value),
            StateChange::NextPowerOff(text) => set(&mut self.next_power_off, text.clone()),
            StateChange::ManualControlsEnabled(enabled) => {
                set(&mut self.manual_controls_enabled, *enabled)
            }
            StateChange::Batch(changes) => changes
                .iter()
                .fold(false, |changed, change| self.apply(change) || changed),
        }
    }
}
