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

//! The lifecycle contract between the host engine and its subsystems.
//!
//! The engine registrar owns every subsystem and drives these hooks on the
//! engine thread: [`init`](Subsystem::init) once after construction,
//! [`update`](Subsystem::update) every frame, and the persistence pair
//! around startup, shutdown and explicit saves. Teardown is `Drop`.

/// A runtime subsystem managed by the host engine.
///
/// All hooks default to no-ops so a subsystem only implements the phases
/// it participates in. All calls happen on the engine thread; no hook may
/// suspend.
pub trait Subsystem {
    /// A stable, human-readable name used in trace output.
    fn name(&self) -> &'static str;

    /// Called once after construction, before the first frame.
    fn init(&mut self) {}

    /// Per-frame tick. `dt` is the time since the last frame, in seconds.
    fn update(&mut self, _dt: f32) {}

    /// Persists the subsystem's state to disk.
    ///
    /// # Errors
    /// Returns an error on I/O failure. The engine traces the error and
    /// continues; persistence is best-effort.
    fn serialize(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Restores the subsystem's state from disk.
    ///
    /// # Errors
    /// Returns an error if the save file is missing or malformed. A failed
    /// restore leaves the subsystem in its constructed state.
    fn deserialize(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        frames: u32,
        elapsed: f32,
    }

    impl Subsystem for Counter {
        fn name(&self) -> &'static str {
            "Counter"
        }

        fn update(&mut self, dt: f32) {
            self.frames += 1;
            self.elapsed += dt;
        }
    }

    #[test]
    fn default_hooks_are_no_ops() {
        struct Bare;
        impl Subsystem for Bare {
            fn name(&self) -> &'static str {
                "Bare"
            }
        }

        let mut sys = Bare;
        sys.init();
        sys.update(0.016);
        assert!(sys.serialize().is_ok());
        assert!(sys.deserialize().is_ok());
    }

    #[test]
    fn update_receives_frame_delta() {
        let mut sys = Counter {
            frames: 0,
            elapsed: 0.0,
        };
        sys.update(0.5);
        sys.update(0.25);
        assert_eq!(sys.frames, 2);
        assert_eq!(sys.elapsed, 0.75);
    }
}
