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

//! The event contract shared by bus producers and consumers.
//!
//! Events are opaque value carriers: the bus never inspects them, it only
//! hands a borrowed view to each handler for the duration of the fan-out.
//! A handler that needs the concrete payload recovers it with
//! [`downcast_ref`](Event::downcast_ref).

use std::any::Any;

/// The integer id a game object is known by across subsystems.
pub type EntityId = u32;

/// The heterogeneous argument pack handed to an event creator by
/// [`MessageBus::broadcast_by_name`](crate::MessageBus::broadcast_by_name).
///
/// Creators recover each argument with `downcast_ref` in the order the
/// broadcaster packed them.
pub type EventArgs = Vec<Box<dyn Any>>;

/// A payload dispatched over the bus's named event channel.
///
/// Implementors only provide [`as_any`](Event::as_any); the payload itself
/// stays plain data. Handlers must not retain the borrowed event past their
/// own return; the bus drops it after the last handler.
pub trait Event: Any {
    /// Returns the payload as [`Any`] for concrete-type recovery.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Event {
    /// Recovers the concrete payload type, if this event is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
