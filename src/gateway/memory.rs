// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulated light kept in memory.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::Capabilities;
use crate::error::DeviceError;
use crate::gateway::{ControlPoint, DeviceGateway};
use crate::types::{Brightness, PowerState, RgbColor};

/// A write that reached the simulated light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightWrite {
    /// Power was switched.
    Power(PowerState),
    /// Brightness was set.
    Brightness(Brightness),
    /// Color was set.
    Color(RgbColor),
}

#[derive(Debug)]
struct LightState {
    capabilities: Capabilities,
    power: PowerState,
    brightness: Brightness,
    color: RgbColor,
    failing_writes: usize,
    writes: Vec<LightWrite>,
}

/// A light that only exists in memory.
///
/// Clones share the same state, so a test (or an embedding application) can
/// keep one handle while the controller owns another, and change the light
/// "externally" the way a user at the wall switch would.
///
/// # Examples
///
/// ```
/// use sleeplight::gateway::{DeviceGateway, InMemoryLight};
/// use sleeplight::types::{Brightness, PowerState};
///
/// # async fn example() {
/// let light = InMemoryLight::rgb();
/// let handle = light.clone();
///
/// light.set_brightness(Brightness::new(40).unwrap()).await.unwrap();
/// assert_eq!(handle.current_brightness().value(), 40);
///
/// handle.set_external_power(PowerState::Off);
/// assert_eq!(light.power().await.unwrap(), PowerState::Off);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryLight {
    inner: Arc<Mutex<LightState>>,
}

impl InMemoryLight {
    /// Creates a switched-off light with the given control points.
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LightState {
                capabilities,
                power: PowerState::Off,
                brightness: Brightness::MIN,
                color: RgbColor::default(),
                failing_writes: 0,
                writes: Vec::new(),
            })),
        }
    }

    /// Creates a light with power, brightness and color.
    #[must_use]
    pub fn rgb() -> Self {
        Self::new(Capabilities::rgb_light())
    }

    /// Creates a light with power and brightness only.
    #[must_use]
    pub fn dimmable() -> Self {
        Self::new(Capabilities::dimmable_light())
    }

    /// Replaces the available control points.
    pub fn set_capabilities(&self, capabilities: Capabilities) {
        self.inner.lock().capabilities = capabilities;
    }

    /// Makes the next `count` writes fail.
    pub fn fail_next_writes(&self, count: usize) {
        self.inner.lock().failing_writes = count;
    }

    /// Changes the power state without going through the gateway.
    pub fn set_external_power(&self, power: PowerState) {
        self.inner.lock().power = power;
    }

    /// Changes the brightness without going through the gateway.
    pub fn set_external_brightness(&self, brightness: Brightness) {
        self.inner.lock().brightness = brightness;
    }

    /// Returns the current power state.
    #[must_use]
    pub fn current_power(&self) -> PowerState {
        self.inner.lock().power
    }

    /// Returns the current brightness.
    #[must_use]
    pub fn current_brightness(&self) -> Brightness {
        self.inner.lock().brightness
    }

    /// Returns the current color.
    #[must_use]
    pub fn current_color(&self) -> RgbColor {
        self.inner.lock().color
    }

    /// Returns every successful write in order.
    #[must_use]
    pub fn writes(&self) -> Vec<LightWrite> {
        self.inner.lock().writes.clone()
    }

    fn write(&self, point: ControlPoint, write: LightWrite) -> Result<(), DeviceError> {
        let mut state = self.inner.lock();

        if !state.capabilities.supports(point) {
            return Err(DeviceError::Unavailable(point));
        }
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(DeviceError::WriteFailed {
                point,
                message: "simulated failure".to_string(),
            });
        }

        match write {
            LightWrite::Power(power) => state.power = power,
            LightWrite::Brightness(brightness) => state.brightness = brightness,
            LightWrite::Color(color) => state.color = color,
        }
        state.writes.push(write);
        Ok(())
    }

    fn read<T>(
        &self,
        point: ControlPoint,
        get: impl FnOnce(&LightState) -> T,
    ) -> Result<T, DeviceError> {
        let state = self.inner.lock();
        if !state.capabilities.supports(point) {
            return Err(DeviceError::Unavailable(point));
        }
        Ok(get(&state))
    }
}

impl DeviceGateway for InMemoryLight {
    fn capabilities(&self) -> Capabilities {
        self.inner.lock().capabilities
    }

    async fn set_power(&self, state: PowerState) -> Result<(), DeviceError> {
        self.write(ControlPoint::Power, LightWrite::Power(state))
    }

    async fn set_brightness(&self, brightness: Brightness) -> Result<(), DeviceError> {
        self.write(ControlPoint::Brightness, LightWrite::Brightness(brightness))
    }

    async fn set_color(&self, color: RgbColor) -> Result<(), DeviceError> {
        self.write(ControlPoint::Color, LightWrite::Color(color))
    }

    async fn power(&self) -> Result<PowerState, DeviceError> {
        self.read(ControlPoint::Power, |state| state.power)
    }

    async fn brightness(&self) -> Result<Brightness, DeviceError> {
        self.read(ControlPoint::Brightness, |state| state.brightness)
    }
}
