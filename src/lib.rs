// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sleep light - dims a light to zero over a configured time, then switches it off.
//!
//! A sleep cycle switches a light on at a start brightness and lowers the
//! brightness by one percent at a time, spacing the steps so the light
//! reaches zero exactly when the configured duration has passed. Switching
//! the light off or turning it brighter by hand ends the cycle early.
//!
//! # Supported Features
//!
//! - **Manual cycles**: brightness, color and duration from user inputs
//! - **Weekly schedule**: separate weekday and weekend profiles and start times
//! - **Restart recovery**: a running cycle survives a restart of the process
//! - **Tasmota lights**: HTTP gateway for the Tasmota web API (feature `http`)
//!
//! # Quick Start
//!
//! ## Controller with a simulated light
//!
//! ```
//! use sleeplight::config::SleepLightConfig;
//! use sleeplight::controller::{DimCycleController, Mode};
//! use sleeplight::gateway::InMemoryLight;
//! use sleeplight::timer::RecordingTimer;
//!
//! # async fn example() {
//! let light = InMemoryLight::rgb();
//! let timer = RecordingTimer::new();
//! let controller = DimCycleController::new(light.clone(), timer.clone(), SleepLightConfig::default());
//!
//! // 50 % for 30 minutes: one step about every 36 seconds
//! controller.toggle_sleep_light(true, Mode::Manual).await;
//! assert!(timer.pending().unwrap().as_secs_f64() > 35.9);
//!
//! controller.decrease_brightness().await;
//! assert_eq!(light.current_brightness().value(), 49);
//! # }
//! ```
//!
//! ## Service with a Tasmota light
//!
//! ```no_run
//! use sleeplight::config::SleepLightConfig;
//! use sleeplight::controller::Mode;
//! use sleeplight::gateway::{HttpConfig, TasmotaGateway};
//! use sleeplight::service::SleepLightService;
//! use sleeplight::store::JsonFileAttributeStore;
//!
//! #[tokio::main]
//! async fn main() -> sleeplight::Result<()> {
//!     let gateway = TasmotaGateway::new(HttpConfig::new("192.168.1.100"))
//!         .map_err(sleeplight::DeviceError::from)?;
//!     let config = SleepLightConfig::from_file("sleeplight.json")?;
//!
//!     let (service, handle) = SleepLightService::builder(gateway, config)
//!         .with_attribute_store(JsonFileAttributeStore::open("sleeplight-state.json")?)
//!         .build();
//!     tokio::spawn(service.run());
//!
//!     handle.toggle(true, Mode::Manual).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! The library logs through [`tracing`] and never installs a subscriber.
//! Retries, abort reasons and computed intervals are logged at debug level.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod capabilities;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod gateway;
pub mod schedule;
pub mod service;
pub mod state;
pub mod store;
pub mod timer;
pub mod types;

pub use capabilities::Capabilities;
pub use controller::{CycleState, DimCycleController, Mode, UserAction};
pub use error::{
    ConfigError, DeviceError, Error, ParseError, ProtocolError, Result, StoreError, ValueError,
};
pub use gateway::{ControlPoint, DeviceGateway};
pub use service::{SleepLightHandle, SleepLightService};
pub use types::{Brightness, PowerState, RgbColor, SleepDuration, TimeOfDay};
