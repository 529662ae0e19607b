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

//! The game statistics registry.
//!
//! [`GameStats`] keeps three well-known groups of counters:
//!
//! - `Game`: the run currently being played,
//! - `Session`: records across the runs of this process,
//! - `Lifetime`: records across every session ever persisted.
//!
//! Group membership is explicit: reads and writes against a group or stat
//! that does not exist are traced and ignored, never auto-created. Values
//! flow upward only through [promotion](GameStats::promote), which folds a
//! group into the next one per a fixed schema (best-of for records,
//! accumulation for totals).
//!
//! The registry listens on the message bus for the gameplay lifecycle
//! (`GAMEOVER`, `RESTART`, `BUTTON_CLICK`) and persists itself as a flat
//! dotted-key JSON document.

use crate::value::StatValue;
use anyhow::anyhow;
use ember_core::{SaveDocument, Subsystem};
use ember_messaging::events::ButtonPress;
use ember_messaging::MessageBus;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::rc::Rc;

/// Where the stats document lives unless a caller overrides it.
pub const DEFAULT_SAVE_PATH: &str = "Data/JSONS/GameStats.json";

type StatGroup = BTreeMap<String, StatValue>;

/// Hierarchical game-play counters with promotion and persistence.
#[derive(Debug)]
pub struct GameStats {
    // stat group -> stat name -> stat value
    stats: BTreeMap<String, StatGroup>,
    playing: bool,
    save_path: PathBuf,
}

impl GameStats {
    /// Creates a registry seeded with the well-known schema, saving to
    /// [`DEFAULT_SAVE_PATH`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_save_path(DEFAULT_SAVE_PATH)
    }

    /// Creates a registry seeded with the well-known schema, saving to
    /// `path`.
    pub fn with_save_path(path: impl Into<PathBuf>) -> Self {
        Self {
            stats: default_schema(),
            playing: false,
            save_path: path.into(),
        }
    }

    /// Wires the registry's event handlers onto `bus`.
    ///
    /// Installs the three gameplay subscriptions: `GAMEOVER` promotes
    /// `Game` into `Session` and stops the clock, `RESTART` promotes and
    /// resets `Game`, and `BUTTON_CLICK` drives the
    /// [`ButtonPress`]-command state machine.
    pub fn subscribe(this: &Rc<RefCell<Self>>, bus: &MessageBus) {
        let stats = Rc::clone(this);
        bus.register_event_handler("GAMEOVER", move |_| {
            let mut stats = stats.borrow_mut();
            stats.promote("Session", "Game");
            stats.playing = false;
            Ok(())
        });

        let stats = Rc::clone(this);
        bus.register_event_handler("RESTART", move |_| {
            let mut stats = stats.borrow_mut();
            stats.promote("Session", "Game");
            stats.reset_stats("Game");
            Ok(())
        });

        let stats = Rc::clone(this);
        bus.register_event_handler("BUTTON_CLICK", move |event| {
            let press = event
                .downcast_ref::<ButtonPress>()
                .ok_or_else(|| anyhow!("BUTTON_CLICK payload is not a ButtonPress"))?;
            stats.borrow_mut().on_button_click(press);
            Ok(())
        });
    }

    /// Sets an existing stat to `value`.
    ///
    /// The group and the stat must already exist, and the stored tag is
    /// fixed: a replacement carrying a different tag is traced and
    /// ignored. Only deserialization may change a stat's tag.
    pub fn set_stat(&mut self, name: &str, value: StatValue, group: &str) {
        if name.is_empty() {
            log::error!("attempted to set a stat with no name");
            return;
        }
        let Some(entries) = self.stats.get_mut(group) else {
            log::error!("attempted to set a stat in unknown stat group \"{group}\"");
            return;
        };
        let Some(current) = entries.get_mut(name) else {
            log::error!("attempted to set unknown stat \"{name}\" in group \"{group}\"");
            return;
        };
        if std::mem::discriminant(current) != std::mem::discriminant(&value) {
            log::warn!("attempted to change the type of stat \"{group}.{name}\"");
            return;
        }
        *current = value;
    }

    /// Returns a copy of the named stat, or `None` with a trace when the
    /// name is empty or the group or stat does not exist.
    #[must_use]
    pub fn get_stat(&self, name: &str, group: &str) -> Option<StatValue> {
        if name.is_empty() {
            log::warn!("attempted to get a stat with no name");
            return None;
        }
        let Some(entries) = self.stats.get(group) else {
            log::error!("attempted to get a stat in unknown stat group \"{group}\"");
            return None;
        };
        let Some(value) = entries.get(name) else {
            log::warn!("attempted to get unknown stat \"{name}\" in group \"{group}\"");
            return None;
        };
        Some(value.clone())
    }

    /// Adds `delta` to an existing stat.
    ///
    /// Addition follows [`StatValue::add`]: matching numeric tags add,
    /// anything else leaves the stored value unchanged.
    pub fn increment_stat(&mut self, name: &str, delta: StatValue, group: &str) {
        if name.is_empty() {
            log::error!("attempted to increment a stat with no name");
            return;
        }
        let Some(entries) = self.stats.get_mut(group) else {
            log::error!("attempted to increment a stat in unknown stat group \"{group}\"");
            return;
        };
        let Some(current) = entries.get_mut(name) else {
            log::error!("attempted to increment unknown stat \"{name}\" in group \"{group}\"");
            return;
        };
        *current = current.add(&delta);
    }

    /// Resets every stat in `group` to the zero of its tag.
    pub fn reset_stats(&mut self, group: &str) {
        if group.is_empty() {
            log::warn!("attempted to reset a stat group with no name");
            return;
        }
        let Some(entries) = self.stats.get_mut(group) else {
            log::warn!("attempted to reset unknown stat group \"{group}\"");
            return;
        };
        for value in entries.values_mut() {
            *value = value.zeroed();
        }
    }

    /// Resets every stat in every group to the zero of its tag.
    pub fn reset_all_stats(&mut self) {
        for entries in self.stats.values_mut() {
            for value in entries.values_mut() {
                *value = value.zeroed();
            }
        }
    }

    /// Empties the registry entirely, groups included.
    pub fn clear_stats(&mut self) {
        self.stats.clear();
    }

    /// Returns the names of the stats in `group`, or an empty list with a
    /// trace for an unknown group.
    #[must_use]
    pub fn stat_names(&self, group: &str) -> Vec<&str> {
        match self.stats.get(group) {
            Some(entries) => entries.keys().map(String::as_str).collect(),
            None => {
                log::warn!("attempted to list stats of unknown stat group \"{group}\"");
                Vec::new()
            }
        }
    }

    /// Returns the names of every stat group in the registry.
    #[must_use]
    pub fn group_names(&self) -> Vec<&str> {
        self.stats.keys().map(String::as_str).collect()
    }

    /// Returns `true` while a run is in progress and the clock is ticking.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Folds the stats of `from` into `to`.
    ///
    /// Exactly two directed pairs are valid. `Game` into `Session` updates
    /// the per-game records (`Best Kills`, `Best Level`, `Best Time`) and
    /// accumulates `Levels Gained`; `Session` into `Lifetime` carries the
    /// records upward and accumulates `Games Played` and `Levels Gained`.
    /// Both pairs then accumulate `Kills` and `Time Alive`. Any other pair
    /// is traced and ignored.
    pub fn promote(&mut self, to: &str, from: &str) {
        // stat names vary between groups, so each valid pair spells out
        // its own schema
        let Some(from_map) = self.stats.get(from).cloned() else {
            log::warn!("attempted a stat promotion from unknown group \"{from}\"");
            return;
        };
        let Some(to_map) = self.stats.get_mut(to) else {
            log::warn!("attempted a stat promotion into unknown group \"{to}\"");
            return;
        };

        match (from, to) {
            ("Game", "Session") => {
                raise_record(to_map, "Best Kills", &from_map, "Kills");
                raise_record(to_map, "Best Level", &from_map, "Level");
                raise_record(to_map, "Best Time", &from_map, "Time Alive");
                accumulate(to_map, "Levels Gained", &from_map, "Level");
            }
            ("Session", "Lifetime") => {
                raise_record(to_map, "Best Kills", &from_map, "Best Kills");
                raise_record(to_map, "Best Level", &from_map, "Best Level");
                raise_record(to_map, "Best Time", &from_map, "Best Time");
                accumulate(to_map, "Games Played", &from_map, "Games Played");
                accumulate(to_map, "Levels Gained", &from_map, "Levels Gained");
            }
            _ => {
                log::warn!("attempted an invalid stat promotion \"{from}\" -> \"{to}\"");
                return;
            }
        }

        // accumulations shared by every valid pair
        accumulate(to_map, "Kills", &from_map, "Kills");
        accumulate(to_map, "Time Alive", &from_map, "Time Alive");
    }

    fn on_button_click(&mut self, press: &ButtonPress) {
        match press.command.as_str() {
            "GAMEPLAY" => {
                self.increment_stat("Games Played", StatValue::Int(1), "Session");
                self.promote("Session", "Game");
                self.reset_stats("Game");
                self.playing = true;
            }
            "RESETSTATS" => {
                self.reset_stats("Game");
                self.reset_stats("Lifetime");
                self.reset_stats("Session");
            }
            "PAUSE" => self.playing = !self.playing,
            _ => {}
        }
    }
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Subsystem for GameStats {
    fn name(&self) -> &'static str {
        "GameStats"
    }

    fn init(&mut self) {
        log::info!("GameStats: online");
    }

    fn update(&mut self, dt: f32) {
        if self.playing {
            self.increment_stat("Time Alive", StatValue::Float(f64::from(dt)), "Game");
        }
    }

    /// Persists every group to the save document.
    ///
    /// The in-flight game is promoted into `Session` first (the engine may
    /// be exiting mid-run), and `Session` into `Lifetime`; this is the
    /// only place the lifetime rollup happens.
    fn serialize(&mut self) -> anyhow::Result<()> {
        self.promote("Session", "Game");
        self.promote("Lifetime", "Session");

        // keep whatever other subsystems already wrote to the document
        let mut doc = SaveDocument::load(&self.save_path).unwrap_or_default();

        let mut groups = Vec::new();
        let mut names = BTreeSet::new();
        for (group, entries) in &self.stats {
            groups.push(group.clone());
            for (name, value) in entries {
                names.insert(name.clone());
                doc.set(format!("{group}.{name}"), value.to_json());
            }
        }
        doc.set("Stat Names", &names);
        doc.set("Stat Groups", &groups);

        doc.write(&self.save_path)?;
        doc.clear();
        Ok(())
    }

    /// Restores the registry from the save document.
    ///
    /// Every `(group, name)` pair present in the document is inserted with
    /// the tag its scalar carries on the wire; absent pairs are skipped.
    /// Populated groups are then reset to tag-zero, except `Lifetime`,
    /// which keeps its persisted values.
    fn deserialize(&mut self) -> anyhow::Result<()> {
        let doc = SaveDocument::load(&self.save_path)?;
        let groups: Vec<String> = doc.read("Stat Groups").unwrap_or_default();
        let names: Vec<String> = doc.read("Stat Names").unwrap_or_default();

        for group in &groups {
            let entries = self.stats.entry(group.clone()).or_default();
            for name in &names {
                let Some(raw) = doc.get(&format!("{group}.{name}")) else {
                    continue;
                };
                let Some(value) = StatValue::from_json(raw) else {
                    continue;
                };
                entries.insert(name.clone(), value);
            }
            if group != "Lifetime" {
                self.reset_stats(group);
            }
        }
        Ok(())
    }
}

/// The well-known schema every registry boots with.
fn default_schema() -> BTreeMap<String, StatGroup> {
    use StatValue::{Float, Int};

    let mut stats = BTreeMap::new();
    stats.insert(
        "Game".to_string(),
        BTreeMap::from([
            ("Kills".to_string(), Int(0)),
            ("Level".to_string(), Int(0)),
            ("Time Alive".to_string(), Float(0.0)),
        ]),
    );
    stats.insert(
        "Session".to_string(),
        BTreeMap::from([
            ("Best Kills".to_string(), Int(0)),
            ("Best Level".to_string(), Int(0)),
            ("Best Time".to_string(), Float(0.0)),
            ("Games Played".to_string(), Int(0)),
            ("Kills".to_string(), Int(0)),
            ("Levels Gained".to_string(), Int(0)),
            ("Time Alive".to_string(), Float(0.0)),
        ]),
    );
    stats.insert(
        "Lifetime".to_string(),
        BTreeMap::from([
            ("Best Kills".to_string(), Int(0)),
            ("Best Level".to_string(), Int(0)),
            ("Best Time".to_string(), Float(0.0)),
            ("Games Played".to_string(), Int(0)),
            ("Kills".to_string(), Int(0)),
            ("Levels Gained".to_string(), Int(0)),
            ("Time Alive".to_string(), Float(0.0)),
        ]),
    );
    stats
}

/// Raises `to[to_name]` to `from[from_name]` when the candidate is
/// strictly greater under the tag's natural order.
fn raise_record(to: &mut StatGroup, to_name: &str, from: &StatGroup, from_name: &str) {
    let (Some(current), Some(candidate)) = (to.get(to_name), from.get(from_name)) else {
        return;
    };
    if current < candidate {
        let candidate = candidate.clone();
        to.insert(to_name.to_string(), candidate);
    }
}

/// Adds `from[from_name]` onto `to[to_name]` per [`StatValue::add`].
fn accumulate(to: &mut StatGroup, to_name: &str, from: &StatGroup, from_name: &str) {
    let Some(delta) = from.get(from_name).cloned() else {
        return;
    };
    if let Some(current) = to.get_mut(to_name) {
        *current = current.add(&delta);
    }
}
