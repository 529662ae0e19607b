// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Flat, dotted-key JSON save documents.
//!
//! A [`SaveDocument`] is the transcription layer between a subsystem's
//! in-memory state and its save file. Keys are plain strings; by convention
//! subsystems namespace them with dots (`"Game.Kills"`). Values carry their
//! type on the wire: JSON integers, floats and strings stay distinguishable
//! across a round trip.
//!
//! Reading an existing file before writing lets several subsystems share
//! one document without clobbering each other's keys.

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// An in-memory JSON object addressed by string keys, with file
/// transcription.
#[derive(Debug, Default, Clone)]
pub struct SaveDocument {
    root: Map<String, Value>,
}

impl SaveDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self { root: Map::new() }
    }

    /// Loads and parses a document from `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// its top level is not an object.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read save file {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("save file {} is not valid JSON", path.display()))?;
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => anyhow::bail!(
                "save file {} must contain a JSON object, found {}",
                path.display(),
                json_type_name(&other)
            ),
        }
    }

    /// Transcribes the document to `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if the directories cannot be created or the file
    /// cannot be written.
    pub fn write(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create save directory {}", parent.display())
                })?;
            }
        }
        let text = serde_json::to_string_pretty(&Value::Object(self.root.clone()))?;
        fs::write(path, text)
            .with_context(|| format!("failed to write save file {}", path.display()))?;
        Ok(())
    }

    /// Returns the raw value stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Deserializes the value stored under `key` into `T`.
    ///
    /// Returns `None` if the key is absent or the value does not have the
    /// requested shape.
    #[must_use]
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.root.get(key)?.clone();
        serde_json::from_value(value).ok()
    }

    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// A value that cannot be represented as JSON is traced and dropped.
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                self.root.insert(key, value);
            }
            Err(e) => log::error!("failed to encode save entry \"{key}\": {e}"),
        }
    }

    /// Removes every entry from the document.
    pub fn clear(&mut self) {
        self.root.clear();
    }

    /// Returns `true` if the document has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
