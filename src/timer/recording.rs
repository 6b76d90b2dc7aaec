// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::Timer;

#[derive(Debug, Default)]
struct Recorded {
    pending: Option<Duration>,
    arms: Vec<Duration>,
    disarms: usize,
}

/// A timer that never fires on its own.
///
/// The caller decides when a tick happens. Clones share the same record.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use sleeplight::timer::{RecordingTimer, Timer};
///
/// let timer = RecordingTimer::new();
/// timer.arm(Duration::from_secs(36));
/// assert_eq!(timer.pending(), Some(Duration::from_secs(36)));
///
/// timer.disarm();
/// assert_eq!(timer.pending(), None);
/// assert_eq!(timer.arms(), vec![Duration::from_secs(36)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingTimer {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingTimer {
    /// Creates an unarmed timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pending expiry.
    #[must_use]
    pub fn pending(&self) -> Option<Duration> {
        self.inner.lock().pending
    }

    /// Returns every interval the timer was armed with, in order.
    #[must_use]
    pub fn arms(&self) -> Vec<Duration> {
        self.inner.lock().arms.clone()
    }

    /// Returns how often the timer was disarmed.
    #[must_use]
    pub fn disarm_count(&self) -> usize {
        self.inner.lock().disarms
    }

    /// Consumes the pending expiry as if it had fired.
    pub fn fire(&self) -> Option<Duration> {
        self.inner.lock().pending.take()
    }
}

impl Timer for RecordingTimer {
    fn arm(&self, after: Duration) {
        let mut inner = self.inner.lock();
        inner.pending = Some(after);
        inner.arms.push(after);
    }

    fn disarm(&self) {
        let mut inner = self.inner.lock();
        inner.pending = None;
        inner.disarms += 1;
    }
}
