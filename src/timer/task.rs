// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timer backed by a tokio task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::Timer;
use crate::event::ControllerEvent;

/// Sleeps on the tokio runtime and sends a tick into the controller's event
/// channel.
///
/// Every arm and disarm starts a new generation. A tick carries the
/// generation it was armed in, so a tick that was already queued when the
/// timer was re-armed or disarmed can be recognized with
/// [`is_current`](Self::is_current) and dropped.
///
/// The timer only holds a weak sender, so it does not keep the event
/// channel open on its own.
///
/// Must be armed from within a tokio runtime.
#[derive(Debug)]
pub struct TokioTimer {
    events: mpsc::WeakSender<ControllerEvent>,
    generation: AtomicU64,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TokioTimer {
    /// Creates a timer delivering ticks to `events`.
    #[must_use]
    pub fn new(events: mpsc::WeakSender<ControllerEvent>) -> Self {
        Self {
            events,
            generation: AtomicU64::new(0),
            task: Mutex::new(None),
        }
    }

    /// Returns `true` if a tick of `generation` is still expected.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Returns `true` if an expiry is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Timer for TokioTimer {
    fn arm(&self, after: Duration) {
        let generation = self.next_generation();
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let Some(events) = events.upgrade() else {
                tracing::trace!(generation, "Timer fired after controller stopped");
                return;
            };
            if events
                .send(ControllerEvent::Tick { generation })
                .await
                .is_err()
            {
                tracing::trace!(generation, "Timer fired after controller stopped");
            }
        });

        if let Some(previous) = self.task.lock().replace(task) {
            previous.abort();
        }
        tracing::trace!(generation, after_ms = after.as_millis(), "Timer armed");
    }

    fn disarm(&self) {
        let generation = self.next_generation();
        if let Some(task) = self.task.lock().take() {
            task.abort();
            tracing::trace!(generation, "Timer disarmed");
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
