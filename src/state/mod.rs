// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State variables of the sleep light.
//!
//! [`SleepLightState`] holds what a user sees: the on/off switch, the manual
//! inputs for the next cycle, the displayed power-off time and whether the
//! manual inputs are currently editable. It is only ever changed through
//! [`StateChange`] values.

mod sleep_light_state;
mod state_change;

pub use sleep_light_state::{ManualInputs, SleepLightState};
pub use state_change::StateChange;
