// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tasmota response parsing.

use serde::Deserialize;

use crate::error::ParseError;
use crate::types::{Brightness, PowerState};

/// Response from a `Power` command.
///
/// Tasmota answers `{"POWER": "ON"}`, or `{"POWER1": "ON"}` on devices that
/// number their relays.
///
/// # Examples
///
/// ```
/// use sleeplight::gateway::PowerResponse;
/// use sleeplight::types::PowerState;
///
/// let response: PowerResponse = serde_json::from_str(r#"{"POWER": "ON"}"#).unwrap();
/// assert_eq!(response.power_state().unwrap(), PowerState::On);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PowerResponse {
    #[serde(rename = "POWER", default)]
    power: Option<String>,
    #[serde(rename = "POWER1", default)]
    power1: Option<String>,
}

impl PowerResponse {
    /// Returns the reported power state.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if no power field is present or it cannot be parsed.
    pub fn power_state(&self) -> Result<PowerState, ParseError> {
        let raw = self
            .power
            .as_ref()
            .or(self.power1.as_ref())
            .ok_or_else(|| ParseError::MissingField("POWER".to_string()))?;

        raw.parse::<PowerState>()
            .map_err(|e| ParseError::InvalidValue {
                field: "POWER".to_string(),
                message: e.to_string(),
            })
    }
}

/// Response from a `Dimmer` command.
///
/// Tasmota answers `{"Dimmer": 75}`, usually with `"POWER"` and the color
/// fields alongside.
///
/// # Examples
///
/// ```
/// use sleeplight::gateway::DimmerResponse;
///
/// let json = r#"{"POWER": "ON", "Dimmer": 75, "Color": "BF7300"}"#;
/// let response: DimmerResponse = serde_json::from_str(json).unwrap();
/// assert_eq!(response.brightness().unwrap().value(), 75);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DimmerResponse {
    #[serde(rename = "Dimmer")]
    dimmer: u8,

    #[serde(rename = "POWER", default)]
    power: Option<String>,
}

impl DimmerResponse {
    /// Returns the reported brightness.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the value exceeds 100.
    pub fn brightness(&self) -> Result<Brightness, ParseError> {
        Brightness::new(self.dimmer).map_err(|e| ParseError::InvalidValue {
            field: "Dimmer".to_string(),
            message: e.to_string(),
        })
    }

    /// Returns `true` if the device is on according to the response.
    ///
    /// Returns `None` if power state was not included in the response.
    #[must_use]
    pub fn is_on(&self) -> Option<bool> {
        self.power.as_ref().map(|s| s == "ON")
    }
}
