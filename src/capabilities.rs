// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control point availability.
//!
//! A light is driven through up to three control points: power, brightness
//! and color. [`Capabilities`] records which of them are configured and
//! currently exist. The controller checks them before a cycle starts and
//! again on every tick.

use crate::gateway::ControlPoint;

/// Control points a gateway can currently serve.
///
/// # Examples
///
/// ```
/// use sleeplight::Capabilities;
/// use sleeplight::gateway::ControlPoint;
///
/// let dimmable = Capabilities::dimmable_light();
/// assert!(dimmable.supports(ControlPoint::Brightness));
/// assert!(!dimmable.supports(ControlPoint::Color));
///
/// let rgb = Capabilities::rgb_light();
/// assert!(rgb.missing(&[ControlPoint::Power, ControlPoint::Color]).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Power on/off control point exists.
    pub power: bool,

    /// Brightness control point exists.
    pub brightness: bool,

    /// Color control point exists.
    pub color: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::none()
    }
}

impl Capabilities {
    /// No control point configured.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            power: false,
            brightness: false,
            color: false,
        }
    }

    /// Power and brightness, no color.
    #[must_use]
    pub const fn dimmable_light() -> Self {
        Self {
            power: true,
            brightness: true,
            color: false,
        }
    }

    /// Power, brightness and color.
    #[must_use]
    pub const fn rgb_light() -> Self {
        Self {
            power: true,
            brightness: true,
            color: true,
        }
    }

    /// Returns `true` if the control point is available.
    #[must_use]
    pub const fn supports(&self, point: ControlPoint) -> bool {
        match point {
            ControlPoint::Power => self.power,
            ControlPoint::Brightness => self.brightness,
            ControlPoint::Color => self.color,
        }
    }

    /// Returns the first of `required` that is not available.
    #[must_use]
    pub fn missing(&self, required: &[ControlPoint]) -> Option<ControlPoint> {
        required.iter().copied().find(|point| !self.supports(*point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_nothing() {
        let caps = Capabilities::default();
        assert_eq!(caps, Capabilities::none());
        assert_eq!(
            caps.missing(&[ControlPoint::Power]),
            Some(ControlPoint::Power)
        );
    }

    #[test]
    fn missing_reports_first_gap_in_order() {
        let caps = Capabilities {
            power: true,
            brightness: false,
            color: false,
        };
        assert_eq!(
            caps.missing(&[ControlPoint::Power, ControlPoint::Brightness, ControlPoint::Color]),
            Some(ControlPoint::Brightness)
        );
    }

    #[test]
    fn rgb_light_supports_everything() {
        let caps = Capabilities::rgb_light();
        assert!(caps.supports(ControlPoint::Power));
        assert!(caps.supports(ControlPoint::Brightness));
        assert!(caps.supports(ControlPoint::Color));
    }
}
