// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stores the controller reads and writes.
//!
//! - [`AttributeStore`]: the two integers a cycle needs to survive a restart
//! - [`StateStore`]: the visible state variables
//!
//! Both traits take `&self`; implementations synchronize internally so a
//! caller can keep a clone for observation while the controller owns another.

mod file;
mod memory;

use tokio::sync::broadcast;

pub use file::JsonFileAttributeStore;
pub use memory::{InMemoryAttributeStore, InMemoryStateStore};

use crate::error::StoreError;
use crate::state::{SleepLightState, StateChange};

/// Persisted cycle attributes.
///
/// A cycle is active exactly when `end_time` is greater than zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleAttributes {
    /// Brightness the controller itself wrote last.
    pub cycling_brightness: u8,

    /// Unix time in seconds at which the light reaches zero, or 0 if idle.
    pub end_time: i64,
}

impl CycleAttributes {
    /// Attributes of an idle controller.
    pub const IDLE: Self = Self {
        cycling_brightness: 0,
        end_time: 0,
    };

    /// Returns `true` if a cycle is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.end_time > 0
    }
}

/// Persistent integer attributes.
pub trait AttributeStore: Send + Sync {
    /// Returns the current attributes.
    fn load(&self) -> CycleAttributes;

    /// Replaces the attributes.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the attributes could not be persisted. The
    /// in-memory view is updated regardless.
    fn save(&self, attributes: CycleAttributes) -> Result<(), StoreError>;
}

/// Mutable state variables with change notification.
pub trait StateStore: Send + Sync {
    /// Returns a copy of the current state.
    fn snapshot(&self) -> SleepLightState;

    /// Applies a change. Returns `true` if anything changed.
    fn apply(&self, change: StateChange) -> bool;

    /// Subscribes to applied changes.
    fn subscribe(&self) -> broadcast::Receiver<StateChange>;
}
