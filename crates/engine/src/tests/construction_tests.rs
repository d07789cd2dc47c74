//! Extraction, stock and construction across turns.

use std::sync::Arc;

use fogwar_domain::{LevelType, ModuleKind, ResourceType};

use super::{
    empty_builder, empty_game, ground, login, next_turn, pid, spawn, spawn_with, RecordingListener,
};
use crate::content::UnitType;
use crate::error::GameError;
use crate::game::Game;
use crate::modules::{Base, Constructor, Container, Module};
use crate::object::GameObject;

fn stocked_builder(game: &Game, stock: u32) -> Arc<GameObject> {
    let mut modules: Vec<Module> = vec![Base::new(10, 0, 3, &[LevelType::Ground]).into()];
    modules.extend(
        ResourceType::ALL
            .into_iter()
            .map(|resource| Module::from(Container::new(resource, 50))),
    );
    modules.push(Constructor::new(100, &ModuleKind::ALL).into());
    let builder = spawn_with(game, 1, ground(1, 1), modules);
    for container in builder.containers() {
        container.add_stock(game, &builder, stock);
    }
    builder
}

fn stock_of(object: &GameObject, resource: ResourceType) -> u32 {
    object
        .containers()
        .filter(|container| container.resource_type() == resource)
        .map(|container| container.stock())
        .sum()
}

#[test]
fn extractor_mines_into_own_containers() {
    let game = empty_game(1);
    let engineer = spawn(&game, UnitType::Engineer, 1, ground(1, 1));
    let tile = game.tile(ground(1, 1)).expect("tile exists");
    tile.set_resource_quantity(&game, ResourceType::Metals, 3)
        .expect("positive");

    next_turn(&game);
    assert_eq!(stock_of(&engineer, ResourceType::Metals), 2);
    assert_eq!(tile.quantity(ResourceType::Metals), 1);

    next_turn(&game);
    assert_eq!(stock_of(&engineer, ResourceType::Metals), 3);
    assert_eq!(tile.quantity(ResourceType::Metals), 0);

    next_turn(&game);
    assert_eq!(stock_of(&engineer, ResourceType::Metals), 3);
}

#[test]
fn container_stock_is_clamped() {
    let game = empty_game(1);
    let engineer = spawn(&game, UnitType::Engineer, 1, ground(1, 1));
    let metals = engineer
        .containers()
        .find(|container| container.resource_type() == ResourceType::Metals)
        .expect("engineers store metals");

    assert_eq!(metals.add_stock(&game, &engineer, 25), 20);
    assert_eq!(metals.free_capacity(), 0);
    assert_eq!(metals.take_stock(&game, &engineer, 30), 20);
    assert_eq!(metals.stock(), 0);
}

#[test]
fn construction_completes_into_a_unit() {
    let listener = Arc::new(RecordingListener::default());
    let game = empty_builder(10, 1)
        .add_listener(listener.clone())
        .build()
        .expect("game builds");
    let builder = stocked_builder(&game, 50);
    let ctx = login(&game, 1);

    let site = builder
        .schedule_construction(&game, &ctx, UnitType::Scout, ground(1, 2))
        .expect("adjacent free tile");
    assert!(site.is_construction_site());
    let work = site
        .construction_site(&game, &ctx)
        .expect("own site")
        .expect("is a site")
        .remaining_work();
    assert_eq!(work, UnitType::Scout.cost());
    assert_eq!(
        builder.constructor().and_then(|constructor| constructor.target()).map(|target| target.id()),
        Some(site.id())
    );

    next_turn(&game);

    assert!(!site.is_alive());
    let unit = game
        .tile(ground(1, 2))
        .expect("tile exists")
        .occupant()
        .expect("unit replaced the site");
    assert_eq!(unit.unit_type(), UnitType::Scout);
    assert!(!unit.is_construction_site());
    assert_eq!(unit.owner_id(), builder.owner_id());
    assert_eq!(
        stock_of(&builder, ResourceType::Metals),
        50 - UnitType::Scout.cost().get(ResourceType::Metals)
    );
    assert_eq!(listener.count(&format!("site_worked:{}:0", site.id())), 1);
}

#[test]
fn construction_waits_for_resources() {
    let game = empty_game(1);
    let builder = stocked_builder(&game, 0);
    let ctx = login(&game, 1);
    let site = builder
        .schedule_construction(&game, &ctx, UnitType::Scout, ground(2, 1))
        .expect("adjacent free tile");

    next_turn(&game);
    assert!(site.is_alive());
    assert_eq!(
        site.site().map(|work| work.remaining_work()),
        Some(UnitType::Scout.cost())
    );
}

#[test]
fn construction_needs_an_adjacent_free_tile() {
    let game = empty_game(1);
    let builder = stocked_builder(&game, 0);
    let ctx = login(&game, 1);

    assert!(matches!(
        builder.schedule_construction(&game, &ctx, UnitType::Scout, ground(1, 3)),
        Err(GameError::OutOfRange { distance: 2, range: 1 })
    ));
    spawn(&game, UnitType::Engineer, 1, ground(2, 1));
    assert!(matches!(
        builder.schedule_construction(&game, &ctx, UnitType::Scout, ground(2, 1)),
        Err(GameError::Impossible)
    ));
    let scout = spawn(&game, UnitType::Scout, 1, ground(5, 5));
    assert!(matches!(
        scout.schedule_construction(&game, &ctx, UnitType::Scout, ground(5, 6)),
        Err(GameError::Impossible)
    ));
}

#[test]
fn every_object_ticks_in_the_turn_a_site_completes() {
    let game = empty_game(1);
    let builder = stocked_builder(&game, 50);
    let engineer = spawn(&game, UnitType::Engineer, 1, ground(5, 5));
    game.tile(ground(5, 5))
        .expect("tile exists")
        .set_resource_quantity(&game, ResourceType::Metals, 2)
        .expect("positive");
    let ctx = login(&game, 1);
    let site = builder
        .schedule_construction(&game, &ctx, UnitType::Scout, ground(1, 2))
        .expect("adjacent free tile");

    assert!(game.set_ready(&ctx, pid(1)).expect("own readiness"));

    assert!(!site.is_alive());
    assert_eq!(stock_of(&engineer, ResourceType::Metals), 2);
    assert_eq!(game.current_turn().generation(), 1);
    assert!(game.ready_players().is_empty());
    assert!(game.is_running());
}
