// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for sleep light control.
//!
//! Each type ensures values are within their valid ranges at construction
//! time, so the controller never has to re-check them.
//!
//! # Types
//!
//! - [`Brightness`] - Brightness level (0-100%)
//! - [`RgbColor`] - Light color, convertible to the packed `0xRRGGBB` form
//! - [`SleepDuration`] - Cycle length (1-120 minutes)
//! - [`PowerState`] - On/Off
//! - [`TimeOfDay`] - Wall clock time (`HH:MM`)

mod brightness;
mod power;
mod rgb_color;
mod sleep_duration;
mod time_of_day;

pub use brightness::Brightness;
pub use power::PowerState;
pub use rgb_color::RgbColor;
pub use sleep_duration::SleepDuration;
pub use time_of_day::TimeOfDay;
