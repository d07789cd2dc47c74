//! Engine scenario tests.
//!
//! Each scenario builds a small empty world with [`empty_game`], places units
//! under bootstrap privileges and drives the public operations as players do.

mod construction_tests;
mod mutation_tests;
mod weapon_tests;

use std::sync::{Arc, Mutex};

use fogwar_domain::{
    Change, ChangeInt, LevelType, ObjectId, PlayerId, Position, TileRef, Turn,
};

use crate::builder::GameBuilder;
use crate::config::{ResourcePreset, UnitPreset};
use crate::content::UnitType;
use crate::game::Game;
use crate::modules::Module;
use crate::notifier::GameListener;
use crate::object::GameObject;
use crate::player::Player;
use crate::ports::RandomPort;
use crate::security::RequestContext;

/// Always rolls `self.0`, clamped into the requested range.
pub(crate) struct FixedRandom(pub i32);

impl RandomPort for FixedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        self.0.clamp(min, max.max(min))
    }
}

/// Builder for a `size`x`size` world with no resources and no starting units.
pub(crate) fn empty_builder(size: u32, players: usize) -> GameBuilder {
    GameBuilder::new()
        .level_size(size, size)
        .total_players(players)
        .resource_preset(ResourcePreset::None)
        .unit_preset(UnitPreset::None)
        .random(Arc::new(FixedRandom(0)))
}

pub(crate) fn empty_game(players: usize) -> Arc<Game> {
    empty_builder(10, players).build().expect("empty game builds")
}

pub(crate) fn ground(x: i32, y: i32) -> TileRef {
    TileRef::new(LevelType::Ground, Position::new(x, y))
}

pub(crate) fn sky(x: i32, y: i32) -> TileRef {
    TileRef::new(LevelType::Sky, Position::new(x, y))
}

pub(crate) fn pid(id: u32) -> PlayerId {
    PlayerId::new(id)
}

/// Log in as a key-less player.
pub(crate) fn login(game: &Game, player: u32) -> RequestContext {
    RequestContext::authenticate(game, pid(player), None).expect("key-less login")
}

pub(crate) fn spawn(game: &Game, unit_type: UnitType, owner: u32, tile: TileRef) -> Arc<GameObject> {
    GameObject::spawn_unit(game, unit_type, Some(pid(owner)), tile).expect("tile is free")
}

pub(crate) fn spawn_with(
    game: &Game,
    owner: u32,
    tile: TileRef,
    modules: Vec<Module>,
) -> Arc<GameObject> {
    GameObject::spawn(game, UnitType::Scout, Some(pid(owner)), tile, modules, None)
        .expect("tile is free")
}

/// Advance one turn by marking every player ready.
pub(crate) fn next_turn(game: &Game) {
    let ctx = RequestContext::anonymous();
    let mut advanced = false;
    for player in game.players() {
        advanced = game.set_ready(&ctx, player.id()).expect("key-less ready");
    }
    assert!(advanced, "last ready player advances the turn");
}

/// Records a short description of each event it receives.
#[derive(Default)]
pub(crate) struct RecordingListener {
    events: Mutex<Vec<String>>,
}

impl RecordingListener {
    fn record(&self, event: String) {
        self.events.lock().expect("listener lock").push(event);
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().expect("listener lock").clone()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| event.starts_with(prefix))
            .count()
    }
}

impl GameListener for RecordingListener {
    fn on_player_ready(&self, player: &Arc<Player>, _turn: &Arc<Turn>) {
        self.record(format!("player_ready:{}", player.id()));
    }

    fn on_new_turn(&self, turn: &Arc<Turn>) {
        self.record(format!("new_turn:{}", turn.generation()));
    }

    fn on_base_damaged(&self, object: &Arc<GameObject>, damage: &ChangeInt) {
        self.record(format!("base_damaged:{}:{}", object.id(), damage.to()));
    }

    fn on_tile_contents(&self, tile: TileRef, _contents: &Change<Option<ObjectId>>) {
        self.record(format!("tile_contents:{tile}"));
    }

    fn on_player_score(&self, player: &Arc<Player>, score: &ChangeInt) {
        self.record(format!("player_score:{}:{}", player.id(), score.to()));
    }

    fn on_player_gained_object(&self, player: &Arc<Player>, object: &Arc<GameObject>) {
        self.record(format!("gained:{}:{}", player.id(), object.id()));
    }

    fn on_player_lost_object(&self, player: &Arc<Player>, object: &Arc<GameObject>) {
        self.record(format!("lost:{}:{}", player.id(), object.id()));
    }

    fn on_unit_captured(&self, object: &Arc<GameObject>, _owner: &Change<Option<PlayerId>>) {
        self.record(format!("captured:{}", object.id()));
    }

    fn on_unit_moved(&self, object: &Arc<GameObject>, location: &Change<TileRef>) {
        self.record(format!("moved:{}:{}", object.id(), location.to()));
    }

    fn on_unit_died(&self, object: &Arc<GameObject>, _tile: TileRef) {
        self.record(format!("died:{}", object.id()));
    }

    fn on_construction_site_worked(&self, site: &Arc<GameObject>, remaining: &ChangeInt) {
        self.record(format!("site_worked:{}:{}", site.id(), remaining.to()));
    }

    fn on_weapon_fired(&self, object: &Arc<GameObject>, target: TileRef, _ammunition: &ChangeInt) {
        self.record(format!("weapon_fired:{}:{target}", object.id()));
    }

    fn on_game_started(&self, turn: &Arc<Turn>) {
        self.record(format!("game_started:{}", turn.generation()));
    }

    fn on_game_ended(&self, victor: Option<PlayerId>) {
        self.record(format!("game_ended:{victor:?}"));
    }
}
