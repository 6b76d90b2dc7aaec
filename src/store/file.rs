// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON file backed attribute store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::{AttributeStore, CycleAttributes};
use crate::error::StoreError;

/// Attribute store persisted as a small JSON document.
///
/// The file is read once on [`open`](Self::open) and rewritten on every
/// [`save`](AttributeStore::save). A missing file means idle.
///
/// ```json
/// {"cyclingBrightness": 41, "endTime": 1706745600}
/// ```
#[derive(Debug)]
pub struct JsonFileAttributeStore {
    path: PathBuf,
    cached: Mutex<CycleAttributes>,
}

impl JsonFileAttributeStore {
    /// Opens the store, reading existing attributes if the file exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let attributes = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound => CycleAttributes::IDLE,
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        tracing::debug!(path = %path.display(), ?attributes, "Opened attribute store");

        Ok(Self {
            path,
            cached: Mutex::new(attributes),
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AttributeStore for JsonFileAttributeStore {
    fn load(&self) -> CycleAttributes {
        *self.cached.lock()
    }

    fn save(&self, attributes: CycleAttributes) -> Result<(), StoreError> {
        let mut cached = self.cached.lock();
        *cached = attributes;

        let json = serde_json::to_string(&attributes)?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}
