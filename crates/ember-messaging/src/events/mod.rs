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

//! Concrete event payloads shared by more than one subsystem.
//!
//! Gameplay systems are free to define their own payloads; only the ones
//! several subsystems agree on live here.

use crate::event::{EntityId, Event};
use std::any::Any;

/// A UI button was clicked. `command` names the action bound to the button
/// (`"GAMEPLAY"`, `"PAUSE"`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonPress {
    /// The command string bound to the clicked button.
    pub command: String,
}

impl ButtonPress {
    /// Creates a button-press payload for `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Event for ButtonPress {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An entity gained a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    /// The entity that leveled up.
    pub id: EntityId,
}

impl Event for LevelUp {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The game was paused or resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseEvent {
    /// `true` when entering pause, `false` when resuming.
    pub paused: bool,
}

impl Event for PauseEvent {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_survive_the_trip_through_dyn_event() {
        let events: Vec<Box<dyn Event>> = vec![
            Box::new(ButtonPress::new("GAMEPLAY")),
            Box::new(LevelUp { id: 4 }),
            Box::new(PauseEvent { paused: true }),
        ];

        assert_eq!(
            events[0].downcast_ref::<ButtonPress>().map(|e| e.command.as_str()),
            Some("GAMEPLAY")
        );
        assert_eq!(events[1].downcast_ref::<LevelUp>(), Some(&LevelUp { id: 4 }));
        assert_eq!(
            events[2].downcast_ref::<PauseEvent>(),
            Some(&PauseEvent { paused: true })
        );
        assert!(events[0].downcast_ref::<LevelUp>().is_none());
    }
}
