// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Service builder.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::{SleepLightHandle, SleepLightService};
use crate::clock::{Clock, SystemClock};
use crate::config::SleepLightConfig;
use crate::controller::DimCycleController;
use crate::gateway::DeviceGateway;
use crate::schedule::{ScheduleEvaluator, WeeklyStartSchedule};
use crate::store::{AttributeStore, InMemoryAttributeStore, InMemoryStateStore, StateStore};
use crate::timer::TokioTimer;

/// Default capacity of the event channel.
const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Default interval between schedule polls.
const DEFAULT_SCHEDULE_POLL: Duration = Duration::from_secs(15);

/// Builder for [`SleepLightService`].
///
/// Without further settings the service keeps its state in memory, uses the
/// system clock and starts cycles at the weekly start times of the
/// configuration, if it has any.
pub struct SleepLightServiceBuilder<G> {
    gateway: G,
    config: SleepLightConfig,
    attributes: Option<Arc<dyn AttributeStore>>,
    state: Option<Arc<dyn StateStore>>,
    clock: Option<Arc<dyn Clock>>,
    schedule: Option<Box<dyn ScheduleEvaluator>>,
    schedule_poll: Duration,
    capacity: usize,
}

impl<G> std::fmt::Debug for SleepLightServiceBuilder<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SleepLightServiceBuilder")
            .field("config", &self.config)
            .field("schedule_poll", &self.schedule_poll)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<G: DeviceGateway> SleepLightServiceBuilder<G> {
    pub(crate) fn new(gateway: G, config: SleepLightConfig) -> Self {
        Self {
            gateway,
            config,
            attributes: None,
            state: None,
            clock: None,
            schedule: None,
            schedule_poll: DEFAULT_SCHEDULE_POLL,
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Persists cycle attributes in `store`.
    #[must_use]
    pub fn with_attribute_store(mut self, store: impl AttributeStore + 'static) -> Self {
        self.attributes = Some(Arc::new(store));
        self
    }

    /// Keeps the visible state variables in `store`.
    #[must_use]
    pub fn with_state_store(mut self, store: impl StateStore + 'static) -> Self {
        self.state = Some(Arc::new(store));
        self
    }

    /// Uses `clock` instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Replaces the weekly start times of the configuration.
    #[must_use]
    pub fn with_schedule(mut self, schedule: impl ScheduleEvaluator + 'static) -> Self {
        self.schedule = Some(Box::new(schedule));
        self
    }

    /// Sets how often the schedule is polled.
    #[must_use]
    pub fn with_schedule_poll(mut self, every: Duration) -> Self {
        self.schedule_poll = every;
        self
    }

    /// Sets the capacity of the event channel.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Builds the service and a handle to it.
    ///
    /// The service does nothing until [`run`](SleepLightService::run) is
    /// awaited.
    #[must_use]
    pub fn build(self) -> (SleepLightService<G>, SleepLightHandle) {
        let (sender, events) = mpsc::channel(self.capacity);

        let state = self.state.unwrap_or_else(|| {
            Arc::new(InMemoryStateStore::with_manual_inputs(self.config.manual))
        });
        let attributes = self
            .attributes
            .unwrap_or_else(|| Arc::new(InMemoryAttributeStore::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let schedule = self.schedule.or_else(|| {
            WeeklyStartSchedule::from_config(&self.config)
                .map(|schedule| Box::new(schedule) as Box<dyn ScheduleEvaluator>)
        });

        let timer = TokioTimer::new(sender.downgrade());
        let controller = DimCycleController::new(self.gateway, timer, self.config)
            .with_attribute_store(attributes)
            .with_state_store(Arc::clone(&state))
            .with_clock(Arc::clone(&clock));

        let service = SleepLightService {
            controller,
            events,
            clock,
            schedule,
            schedule_poll: self.schedule_poll,
        };
        (service, SleepLightHandle::new(sender, state))
    }
}
