// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handle to a running service.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::controller::{CycleState, Mode, UserAction};
use crate::error::{Error, Result};
use crate::event::ControllerEvent;
use crate::state::{SleepLightState, StateChange};
use crate::store::StateStore;
use crate::types::PowerState;

/// Cloneable handle to a [`SleepLightService`](super::SleepLightService).
///
/// Every method fails with [`Error::ServiceStopped`] once the service has
/// stopped.
#[derive(Clone)]
pub struct SleepLightHandle {
    sender: mpsc::Sender<ControllerEvent>,
    state: Arc<dyn StateStore>,
}

impl std::fmt::Debug for SleepLightHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SleepLightHandle")
            .field("closed", &self.sender.is_closed())
            .finish_non_exhaustive()
    }
}

impl SleepLightHandle {
    pub(crate) fn new(sender: mpsc::Sender<ControllerEvent>, state: Arc<dyn StateStore>) -> Self {
        Self { sender, state }
    }

    /// Switches the sleep light on or off.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServiceStopped` if the service is not running.
    pub async fn toggle(&self, on: bool, mode: Mode) -> Result<bool> {
        self.request(|reply| ControllerEvent::Toggle { on, mode, reply })
            .await
    }

    /// Applies a user action.
    ///
    /// # Errors
    ///
    /// Returns `Error::CycleActive` if a manual input is changed during a
    /// cycle, or `Error::ServiceStopped` if the service is not running.
    pub async fn request_action(&self, action: UserAction) -> Result<bool> {
        self.request(|reply| ControllerEvent::Action { action, reply })
            .await?
    }

    /// Reports a power change of the light made outside the controller.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServiceStopped` if the service is not running.
    pub async fn notify_device_power(&self, power: PowerState) -> Result<()> {
        self.send(ControllerEvent::DevicePowerChanged(power)).await
    }

    /// Starts a cycle from the weekly profile, unless one is running.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServiceStopped` if the service is not running.
    pub async fn fire_schedule(&self) -> Result<()> {
        self.send(ControllerEvent::ScheduleFired).await
    }

    /// Makes the service re-evaluate its persisted attributes.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServiceStopped` if the service is not running.
    pub async fn kernel_ready(&self) -> Result<()> {
        self.send(ControllerEvent::KernelReady).await
    }

    /// Returns the current cycle state.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServiceStopped` if the service is not running.
    pub async fn cycle_state(&self) -> Result<CycleState> {
        self.request(|reply| ControllerEvent::Query { reply }).await
    }

    /// Stops the service.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServiceStopped` if the service is not running.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(ControllerEvent::Shutdown).await
    }

    /// Returns a copy of the visible state variables.
    #[must_use]
    pub fn state(&self) -> SleepLightState {
        self.state.snapshot()
    }

    /// Subscribes to changes of the visible state variables.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state.subscribe()
    }

    async fn send(&self, event: ControllerEvent) -> Result<()> {
        self.sender
            .send(event)
            .await
            .map_err(|_| Error::ServiceStopped)
    }

    async fn request<R>(
        &self,
        event: impl FnOnce(oneshot::Sender<R>) -> ControllerEvent,
    ) -> Result<R> {
        let (reply, response) = oneshot::channel();
        self.send(event(reply)).await?;
        response.await.map_err(|_| Error::ServiceStopped)
    }
}
