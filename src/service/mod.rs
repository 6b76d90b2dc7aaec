// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tokio runtime for a controller.
//!
//! [`SleepLightService`] owns a [`DimCycleController`] with a
//! [`TokioTimer`] and feeds it [`ControllerEvent`]s one at a time. Other
//! tasks talk to it through a cloneable [`SleepLightHandle`].
//!
//! # Examples
//!
//! ```no_run
//! use sleeplight::config::SleepLightConfig;
//! use sleeplight::controller::Mode;
//! use sleeplight::gateway::{HttpConfig, TasmotaGateway};
//! use sleeplight::service::SleepLightService;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = TasmotaGateway::new(HttpConfig::new("192.168.1.100"))?;
//! let config = SleepLightConfig::from_file("sleeplight.json")?;
//!
//! let (service, handle) = SleepLightService::builder(gateway, config).build();
//! tokio::spawn(service.run());
//!
//! handle.toggle(true, Mode::Manual).await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod handle;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

pub use builder::SleepLightServiceBuilder;
pub use handle::SleepLightHandle;

use crate::clock::Clock;
use crate::config::SleepLightConfig;
use crate::controller::DimCycleController;
use crate::event::ControllerEvent;
use crate::gateway::DeviceGateway;
use crate::schedule::ScheduleEvaluator;
use crate::timer::{Timer, TokioTimer};

enum Wake {
    Event(ControllerEvent),
    SchedulePoll,
    Closed,
}

/// Owns a controller and serializes everything that happens to it.
pub struct SleepLightService<G> {
    controller: DimCycleController<G, TokioTimer>,
    events: mpsc::Receiver<ControllerEvent>,
    clock: Arc<dyn Clock>,
    schedule: Option<Box<dyn ScheduleEvaluator>>,
    schedule_poll: Duration,
}

impl<G> std::fmt::Debug for SleepLightService<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SleepLightService")
            .field("controller", &self.controller)
            .field("scheduled", &self.schedule.is_some())
            .field("schedule_poll", &self.schedule_poll)
            .finish_non_exhaustive()
    }
}

impl<G: DeviceGateway> SleepLightService<G> {
    /// Starts building a service for `gateway`.
    #[must_use]
    pub fn builder(gateway: G, config: SleepLightConfig) -> SleepLightServiceBuilder<G> {
        SleepLightServiceBuilder::new(gateway, config)
    }

    /// Returns the controller.
    #[must_use]
    pub fn controller(&self) -> &DimCycleController<G, TokioTimer> {
        &self.controller
    }

    /// Runs until [`SleepLightHandle::shutdown`] is called or every handle has
    /// been dropped.
    ///
    /// Persisted attributes are re-evaluated first, so a cycle interrupted
    /// by a restart resumes. On shutdown the timer is stopped but a running
    /// cycle stays persisted.
    pub async fn run(mut self) {
        tracing::debug!("Sleep light service started");
        self.controller.on_kernel_ready();

        let mut poll = self.schedule.as_ref().map(|_| {
            let mut interval = tokio::time::interval(self.schedule_poll);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            let wake = tokio::select! {
                event = self.events.recv() => event.map_or(Wake::Closed, Wake::Event),
                () = next_poll(poll.as_mut()) => Wake::SchedulePoll,
            };

            match wake {
                Wake::Event(ControllerEvent::Shutdown) | Wake::Closed => break,
                Wake::Event(event) => self.handle(event).await,
                Wake::SchedulePoll => self.poll_schedule().await,
            }
        }

        self.controller.timer().disarm();
        tracing::debug!("Sleep light service stopped");
    }

    async fn handle(&mut self, event: ControllerEvent) {
        tracing::trace!(event = event.name(), "Handling event");

        match event {
            ControllerEvent::KernelReady => self.controller.on_kernel_ready(),
            ControllerEvent::Tick { generation } => {
                if self.controller.timer().is_current(generation) {
                    self.controller.decrease_brightness().await;
                } else {
                    tracing::trace!(generation, "Dropping stale tick");
                }
            }
            ControllerEvent::DevicePowerChanged(power) => {
                self.controller.on_device_power_changed(power);
            }
            ControllerEvent::ScheduleFired => {
                self.controller.on_schedule_fired().await;
            }
            ControllerEvent::Toggle { on, mode, reply } => {
                let started = self.controller.toggle_sleep_light(on, mode).await;
                let _ = reply.send(started);
            }
            ControllerEvent::Action { action, reply } => {
                let result = self.controller.request_action(action).await;
                let _ = reply.send(result);
            }
            ControllerEvent::Query { reply } => {
                let _ = reply.send(self.controller.cycle_state());
            }
            ControllerEvent::Shutdown => {}
        }
    }

    async fn poll_schedule(&mut self) {
        let Some(schedule) = self.schedule.as_mut() else {
            return;
        };
        if schedule.should_start(self.clock.now()) {
            self.controller.on_schedule_fired().await;
        }
    }
}

async fn next_poll(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
