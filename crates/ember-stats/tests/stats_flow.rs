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

//! End-to-end gameplay flows: the stats registry wired onto a live bus,
//! driven the way the engine drives it.

use approx::assert_relative_eq;
use ember_core::Subsystem;
use ember_messaging::events::ButtonPress;
use ember_messaging::{Event, MessageBus};
use ember_stats::{GameStats, StatValue};
use std::any::Any;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Payload-free lifecycle marker, as broadcast by the run loop.
struct GameOver;

impl Event for GameOver {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Restart;

impl Event for Restart {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Fixture {
    bus: Rc<MessageBus>,
    stats: Rc<RefCell<GameStats>>,
    _dir: tempfile::TempDir,
    save_path: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let save_path = dir.path().join("GameStats.json");

    let bus = Rc::new(MessageBus::new());
    let stats = Rc::new(RefCell::new(GameStats::with_save_path(&save_path)));
    GameStats::subscribe(&stats, &bus);

    // the UI wires its click events through the creator channel
    bus.register_event_creator("BUTTON_CLICK", |args| {
        let command = args
            .first()
            .and_then(|arg| arg.downcast_ref::<String>())
            .ok_or_else(|| anyhow::anyhow!("expected a command argument"))?;
        Ok(Box::new(ButtonPress::new(command.clone())))
    });

    Fixture {
        bus,
        stats,
        _dir: dir,
        save_path,
    }
}

fn click(fx: &Fixture, command: &str) {
    fx.bus
        .broadcast_by_name("BUTTON_CLICK", vec![Box::new(command.to_string())]);
}

fn get(fx: &Fixture, name: &str, group: &str) -> StatValue {
    fx.stats
        .borrow()
        .get_stat(name, group)
        .unwrap_or_else(|| panic!("stat {group}.{name} should exist"))
}

/// Plays one game's worth of stats into the `Game` group.
fn play_game(fx: &Fixture, kills: i64, level: i64, time_alive: f64) {
    let mut stats = fx.stats.borrow_mut();
    stats.set_stat("Kills", StatValue::Int(kills), "Game");
    stats.set_stat("Level", StatValue::Int(level), "Game");
    stats.set_stat("Time Alive", StatValue::Float(time_alive), "Game");
}

#[test]
fn new_game_flow_starts_the_clock() {
    let fx = fixture();

    click(&fx, "GAMEPLAY");

    assert_eq!(
        get(&fx, "Games Played", "Session"),
        StatValue::Int(1)
    );
    assert!(fx.stats.borrow().is_playing());

    fx.stats.borrow_mut().update(2.5);
    fx.stats.borrow_mut().update(2.5);
    let time_alive = get(&fx, "Time Alive", "Game")
        .as_float()
        .expect("Time Alive is a float");
    assert_relative_eq!(time_alive, 5.0);
}

#[test]
fn pause_click_stops_and_resumes_the_clock() {
    let fx = fixture();
    click(&fx, "GAMEPLAY");

    click(&fx, "PAUSE");
    fx.stats.borrow_mut().update(2.5);
    assert_eq!(get(&fx, "Time Alive", "Game"), StatValue::Float(0.0));

    click(&fx, "PAUSE");
    fx.stats.borrow_mut().update(2.5);
    assert_eq!(get(&fx, "Time Alive", "Game"), StatValue::Float(2.5));
}

#[test]
fn game_over_records_the_run_in_the_session() {
    let fx = fixture();
    play_game(&fx, 7, 3, 42.0);

    fx.bus.broadcast("GAMEOVER", Box::new(GameOver));

    assert_eq!(get(&fx, "Best Kills", "Session"), StatValue::Int(7));
    assert_eq!(get(&fx, "Best Level", "Session"), StatValue::Int(3));
    assert_eq!(get(&fx, "Best Time", "Session"), StatValue::Float(42.0));
    assert_eq!(get(&fx, "Levels Gained", "Session"), StatValue::Int(3));
    assert_eq!(get(&fx, "Kills", "Session"), StatValue::Int(7));
    assert_eq!(get(&fx, "Time Alive", "Session"), StatValue::Float(42.0));
    assert!(!fx.stats.borrow().is_playing());

    // the run itself is left in place on game over
    assert_eq!(get(&fx, "Kills", "Game"), StatValue::Int(7));
}

#[test]
fn restart_preserves_session_bests_and_resets_the_run() {
    let fx = fixture();
    play_game(&fx, 7, 3, 42.0);
    fx.bus.broadcast("GAMEOVER", Box::new(GameOver));

    // game over leaves the run in place, so start the next run clean
    fx.stats.borrow_mut().reset_stats("Game");
    play_game(&fx, 2, 5, 10.0);
    fx.bus.broadcast("RESTART", Box::new(Restart));

    assert_eq!(get(&fx, "Best Kills", "Session"), StatValue::Int(7));
    assert_eq!(get(&fx, "Best Level", "Session"), StatValue::Int(5));
    assert_eq!(get(&fx, "Best Time", "Session"), StatValue::Float(42.0));
    assert_eq!(get(&fx, "Levels Gained", "Session"), StatValue::Int(8));

    assert_eq!(get(&fx, "Kills", "Game"), StatValue::Int(0));
    assert_eq!(get(&fx, "Level", "Game"), StatValue::Int(0));
    assert_eq!(get(&fx, "Time Alive", "Game"), StatValue::Float(0.0));
}

#[test]
fn resetstats_click_zeroes_everything() {
    let fx = fixture();
    play_game(&fx, 7, 3, 42.0);
    fx.bus.broadcast("GAMEOVER", Box::new(GameOver));

    click(&fx, "RESETSTATS");

    for group in ["Game", "Session", "Lifetime"] {
        let stats = fx.stats.borrow();
        for name in stats.stat_names(group) {
            let value = stats.get_stat(name, group).expect("stat exists");
            assert_eq!(value, value.zeroed(), "{group}.{name} should be tag-zero");
        }
    }
}

#[test]
fn serialize_then_deserialize_restores_the_lifetime_group() {
    let fx = fixture();

    click(&fx, "GAMEPLAY");
    play_game(&fx, 7, 3, 42.0);
    fx.bus.broadcast("GAMEOVER", Box::new(GameOver));

    fx.stats
        .borrow_mut()
        .serialize()
        .expect("serialize should succeed");

    // a fresh process: new registry against the same save file
    let mut restored = GameStats::with_save_path(&fx.save_path);
    restored.deserialize().expect("deserialize should succeed");

    // serialize rolled the session into lifetime before writing
    assert_eq!(
        restored.get_stat("Games Played", "Lifetime"),
        Some(StatValue::Int(1))
    );
    assert_eq!(
        restored.get_stat("Best Kills", "Lifetime"),
        Some(StatValue::Int(7))
    );
    assert_eq!(
        restored.get_stat("Best Time", "Lifetime"),
        Some(StatValue::Float(42.0))
    );

    // every other group comes back tag-zero
    for group in ["Game", "Session"] {
        for name in restored.stat_names(group).to_vec() {
            let value = restored.get_stat(name, group).expect("stat exists");
            assert_eq!(value, value.zeroed(), "{group}.{name} should be tag-zero");
        }
    }
}

#[test]
fn serialized_document_carries_the_index_keys() {
    let fx = fixture();
    play_game(&fx, 1, 1, 1.0);
    fx.stats.borrow_mut().serialize().expect("serialize");

    let doc = ember_core::SaveDocument::load(&fx.save_path).expect("load");
    let groups: Vec<String> = doc.read("Stat Groups").expect("Stat Groups");
    assert_eq!(groups, vec!["Game", "Lifetime", "Session"]);

    let names: Vec<String> = doc.read("Stat Names").expect("Stat Names");
    assert!(names.contains(&"Best Kills".to_string()));
    assert!(names.contains(&"Time Alive".to_string()));
    assert!(doc.get("Game.Kills").is_some());
}

#[test]
fn deserialize_skips_absent_entries_and_fails_on_a_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("GameStats.json");

    let mut stats = GameStats::with_save_path(&path);
    assert!(stats.deserialize().is_err());

    // a partial document: only one stat present
    let mut doc = ember_core::SaveDocument::new();
    doc.set("Stat Groups", vec!["Lifetime"]);
    doc.set("Stat Names", vec!["Best Kills", "Best Time"]);
    doc.set("Lifetime.Best Kills", 12);
    doc.write(&path).expect("write");

    stats.deserialize().expect("deserialize");
    assert_eq!(
        stats.get_stat("Best Kills", "Lifetime"),
        Some(StatValue::Int(12))
    );
    // absent on the wire, untouched in memory
    assert_eq!(
        stats.get_stat("Best Time", "Lifetime"),
        Some(StatValue::Float(0.0))
    );
}

#[test]
fn malformed_payload_on_button_click_is_isolated() {
    let fx = fixture();

    // a broadcast whose payload is not a ButtonPress: the handler fails,
    // the bus traces it, and the registry is untouched
    fx.bus.broadcast("BUTTON_CLICK", Box::new(GameOver));

    assert_eq!(get(&fx, "Games Played", "Session"), StatValue::Int(0));
    assert!(!fx.stats.borrow().is_playing());
}
