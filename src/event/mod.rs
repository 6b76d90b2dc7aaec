// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events delivered to a running controller.
//!
//! Every input of the controller arrives as a [`ControllerEvent`] on one
//! channel, so the controller handles them strictly one after another.

use tokio::sync::oneshot;

use crate::controller::{CycleState, Mode, UserAction};
use crate::error::Result;
use crate::types::PowerState;

/// An input for the controller.
#[derive(Debug)]
pub enum ControllerEvent {
    /// The runtime (re)started; persisted attributes are re-evaluated.
    KernelReady,

    /// The timer expired.
    Tick {
        /// Generation the timer was armed in.
        generation: u64,
    },

    /// The light's power changed outside the controller.
    DevicePowerChanged(PowerState),

    /// The weekly start time was reached.
    ScheduleFired,

    /// Switch the sleep light on or off.
    Toggle {
        /// Target state.
        on: bool,
        /// Where the cycle settings come from.
        mode: Mode,
        /// Receives the toggle result.
        reply: oneshot::Sender<bool>,
    },

    /// A user operated a state variable.
    Action {
        /// The action.
        action: UserAction,
        /// Receives the action result.
        reply: oneshot::Sender<Result<bool>>,
    },

    /// Report the current cycle state.
    Query {
        /// Receives the state.
        reply: oneshot::Sender<CycleState>,
    },

    /// Stop the runtime. A running cycle stays persisted.
    Shutdown,
}

impl ControllerEvent {
    /// Returns a short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::KernelReady => "kernel_ready",
            Self::Tick { .. } => "tick",
            Self::DevicePowerChanged(_) => "device_power_changed",
            Self::ScheduleFired => "schedule_fired",
            Self::Toggle { .. } => "toggle",
            Self::Action { .. } => "action",
            Self::Query { .. } => "query",
            Self::Shutdown => "shutdown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names() {
        assert_eq!(ControllerEvent::Tick { generation: 3 }.name(), "tick");
        assert_eq!(
            ControllerEvent::DevicePowerChanged(PowerState::Off).name(),
            "device_power_changed"
        );
    }
}
