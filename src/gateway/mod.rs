// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device gateways: how the controller reaches the light.
//!
//! A [`DeviceGateway`] exposes the five operations the dim cycle needs. Every
//! write may fail; the controller retries each failed write exactly once
//! through [`write_with_retry`] and otherwise only logs it.
//!
//! # Implementations
//!
//! - [`InMemoryLight`]: simulated light, shared between clones
//! - [`TasmotaGateway`]: Tasmota web API over HTTP (feature `http`)

#[cfg(feature = "http")]
mod http;
mod memory;
#[cfg(feature = "http")]
mod response;

use std::fmt;
use std::future::Future;

#[cfg(feature = "http")]
pub use http::{HttpConfig, TasmotaGateway};
pub use memory::{InMemoryLight, LightWrite};
#[cfg(feature = "http")]
pub use response::{DimmerResponse, PowerResponse};

use crate::Capabilities;
use crate::error::DeviceError;
use crate::types::{Brightness, PowerState, RgbColor};

/// A configured reference to one setting of the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlPoint {
    /// Power on/off.
    Power,
    /// Brightness level.
    Brightness,
    /// Color.
    Color,
}

impl ControlPoint {
    /// Returns the lowercase name used in logs and errors.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Brightness => "brightness",
            Self::Color => "color",
        }
    }
}

impl fmt::Display for ControlPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access to the light driven by a sleep cycle.
#[allow(async_fn_in_trait)]
pub trait DeviceGateway {
    /// Returns which control points are configured and currently exist.
    fn capabilities(&self) -> Capabilities;

    /// Switches the light on or off.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError` if the write was not acknowledged.
    async fn set_power(&self, state: PowerState) -> Result<(), DeviceError>;

    /// Sets the brightness.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError` if the write was not acknowledged.
    async fn set_brightness(&self, brightness: Brightness) -> Result<(), DeviceError>;

    /// Sets the color.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError` if the write was not acknowledged.
    async fn set_color(&self, color: RgbColor) -> Result<(), DeviceError>;

    /// Reads the actual power state.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError` if the state cannot be read.
    async fn power(&self) -> Result<PowerState, DeviceError>;

    /// Reads the actual brightness.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError` if the brightness cannot be read.
    async fn brightness(&self) -> Result<Brightness, DeviceError>;
}

/// Runs a device write and repeats it once if it fails.
///
/// Returns `true` if either attempt succeeded. Failures are only logged.
pub async fn write_with_retry<F, Fut>(point: ControlPoint, mut write: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), DeviceError>>,
{
    let Err(first) = write().await else {
        return true;
    };
    tracing::debug!(%point, error = %first, "Device write failed, retrying once");

    match write().await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(%point, error = %e, "Device write failed again, giving up");
            false
        }
    }
}
