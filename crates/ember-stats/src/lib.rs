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

//! # Ember Stats
//!
//! Hierarchical game-play statistics. The [`GameStats`] registry keeps
//! the three well-known groups of tagged counters (`Game`, `Session`,
//! `Lifetime`), updating them from events on the
//! [`MessageBus`](ember_messaging::MessageBus). Per-game records are
//! promoted into per-session and lifetime rollups, and the whole registry
//! persists as a flat JSON save file.

#![warn(missing_docs)]

pub mod registry;
pub mod value;

pub use registry::GameStats;
pub use value::StatValue;
