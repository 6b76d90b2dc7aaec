// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory stores.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use super::{AttributeStore, CycleAttributes, StateStore};
use crate::error::StoreError;
use crate::state::{ManualInputs, SleepLightState, StateChange};

/// Default channel capacity for state change notifications.
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Attribute store without persistence. Clones share the same attributes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAttributeStore {
    attributes: Arc<Mutex<CycleAttributes>>,
}

impl InMemoryAttributeStore {
    /// Creates an idle store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given attributes.
    #[must_use]
    pub fn with_attributes(attributes: CycleAttributes) -> Self {
        Self {
            attributes: Arc::new(Mutex::new(attributes)),
        }
    }
}

impl AttributeStore for InMemoryAttributeStore {
    fn load(&self) -> CycleAttributes {
        *self.attributes.lock()
    }

    fn save(&self, attributes: CycleAttributes) -> Result<(), StoreError> {
        *self.attributes.lock() = attributes;
        Ok(())
    }
}

/// State store kept in memory.
///
/// Applied changes that actually modify the state are broadcast to
/// subscribers. Clones share state and channel.
///
/// # Examples
///
/// ```
/// use sleeplight::state::StateChange;
/// use sleeplight::store::{InMemoryStateStore, StateStore};
///
/// let store = InMemoryStateStore::new();
/// let mut rx = store.subscribe();
///
/// assert!(store.apply(StateChange::Switch(true)));
/// assert_eq!(rx.try_recv().unwrap(), StateChange::Switch(true));
///
/// // No-op changes are not broadcast
/// assert!(!store.apply(StateChange::Switch(true)));
/// assert!(rx.try_recv().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryStateStore {
    state: Arc<RwLock<SleepLightState>>,
    sender: broadcast::Sender<StateChange>,
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStateStore {
    /// Creates an idle store with default manual inputs.
    #[must_use]
    pub fn new() -> Self {
        Self::with_manual_inputs(ManualInputs::default())
    }

    /// Creates an idle store with the given manual inputs.
    #[must_use]
    pub fn with_manual_inputs(manual: ManualInputs) -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(SleepLightState::new(manual))),
            sender,
        }
    }
}

impl StateStore for InMemoryStateStore {
    fn snapshot(&self) -> SleepLightState {
        self.state.read().clone()
    }

    fn apply(&self, change: StateChange) -> bool {
        let changed = self.state.write().apply(&change);
        if changed {
            // No subscribers is fine
            let _ = self.sender.send(change);
        }
        changed
    }

    fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.sender.subscribe()
    }
}
