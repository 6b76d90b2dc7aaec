// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the sleep light library.
//!
//! The dim cycle itself never surfaces errors to its caller: device failures are
//! retried once and logged, interference ends the cycle. The types here cover
//! everything around it: value validation, device and transport failures,
//! configuration loading and attribute persistence.

use thiserror::Error;

use crate::gateway::ControlPoint;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the light.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// Error occurred while loading configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurred while reading or writing persisted attributes.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The controller service is no longer running.
    #[error("sleep light service has stopped")]
    ServiceStopped,

    /// A manual input was changed while a cycle is running.
    #[error("manual inputs are locked while the sleep light is active")]
    CycleActive,
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u32,
        /// Maximum allowed value.
        max: u32,
        /// The actual value that was provided.
        actual: u32,
    },

    /// An invalid power state string was provided.
    #[error("invalid power state: {0}")]
    InvalidPowerState(String),

    /// An invalid hex color string was provided.
    #[error("invalid hex color: {0}")]
    InvalidHexColor(String),

    /// An invalid time of day was provided.
    #[error("invalid time of day: {0}")]
    InvalidTimeOfDay(String),
}

/// Errors reported by a [`DeviceGateway`](crate::gateway::DeviceGateway).
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The control point is not configured or no longer exists.
    #[error("control point {0} is not available")]
    Unavailable(ControlPoint),

    /// The device rejected or did not acknowledge a write.
    #[error("write to {point} failed: {message}")]
    WriteFailed {
        /// The control point that was written.
        point: ControlPoint,
        /// Description of the failure.
        message: String,
    },

    /// Transport level failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The device answered with something unexpected.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors related to HTTP communication with the light.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,
}

/// Errors related to parsing device responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration is not valid JSON or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the configuration file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors related to the persistent attribute store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("attribute file {path}: {source}")]
    Io {
        /// Path of the attribute file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The backing file does not contain valid attributes.
    #[error("corrupt attribute file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 100,
            actual: 150,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [0, 100]");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::InvalidHexColor("#XYZ".to_string());
        let err: Error = value_err.into();
        assert!(matches!(err, Error::Value(ValueError::InvalidHexColor(_))));
    }

    #[test]
    fn device_error_display() {
        let err = DeviceError::Unavailable(ControlPoint::Brightness);
        assert_eq!(err.to_string(), "control point brightness is not available");

        let err = DeviceError::WriteFailed {
            point: ControlPoint::Power,
            message: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), "write to power failed: timeout");
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::MissingField("Dimmer".to_string());
        assert_eq!(err.to_string(), "missing field in response: Dimmer");
    }
}
