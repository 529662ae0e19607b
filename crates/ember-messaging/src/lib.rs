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

//! # Ember Messaging
//!
//! The in-process message bus that decouples the engine's runtime
//! subsystems. The [`MessageBus`] multiplexes six dispatch styles under one
//! registration surface: named events with heterogeneous argument packs,
//! typed queries, typed requests, typed creation, typed state changes, and
//! id-scoped special events.
//!
//! All dispatch is synchronous and runs on the engine thread; there is no
//! buffering and no background delivery. Senders get their answer (or their
//! fan-out) before the call returns.

#![warn(missing_docs)]

pub mod bus;
pub mod event;
pub mod events;

pub use bus::MessageBus;
pub use event::{EntityId, Event, EventArgs};
