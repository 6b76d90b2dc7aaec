// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-shot timers driving the dim cycle.
//!
//! A controller owns exactly one timer. Arming replaces whatever was pending,
//! disarming is idempotent.
//!
//! # Implementations
//!
//! - [`TokioTimer`]: sleeps on the tokio runtime and delivers a
//!   [`ControllerEvent::Tick`](crate::event::ControllerEvent::Tick)
//! - [`RecordingTimer`]: never fires, only records what it was asked to do

mod recording;
mod task;

use std::time::Duration;

pub use recording::RecordingTimer;
pub use task::TokioTimer;

/// A timer with at most one pending expiry.
pub trait Timer: Send + Sync {
    /// Fires once after `after`, replacing any pending expiry.
    fn arm(&self, after: Duration);

    /// Cancels the pending expiry, if any.
    fn disarm(&self);
}
