//! Occupancy, ownership and movement.

use std::sync::Arc;

use fogwar_domain::{LevelType, Maybool, ResourceType};

use super::{empty_builder, empty_game, ground, login, pid, sky, spawn, RecordingListener};
use crate::content::UnitType;
use crate::error::GameError;
use crate::security::RequestContext;

#[test]
fn occupied_tile_rejects_another_object() {
    let listener = Arc::new(RecordingListener::default());
    let game = empty_builder(10, 1)
        .add_listener(listener.clone())
        .build()
        .expect("game builds");
    let scout = spawn(&game, UnitType::Scout, 1, ground(1, 1));
    let engineer = spawn(&game, UnitType::Engineer, 1, ground(2, 2));
    let tile = game.tile(ground(1, 1)).expect("tile exists");

    let err = tile
        .set_contents(&game, Some(engineer.clone()))
        .expect_err("tile is taken");
    assert!(matches!(
        err,
        GameError::TileOccupied { occupant, .. } if occupant == scout.id()
    ));
    assert!(matches!(
        crate::object::GameObject::spawn_unit(&game, UnitType::Scout, Some(pid(1)), ground(2, 2)),
        Err(GameError::TileOccupied { .. })
    ));

    let before = listener.count("tile_contents");
    tile.set_contents(&game, Some(scout.clone())).expect("same occupant");
    assert_eq!(listener.count("tile_contents"), before);
}

#[test]
fn negative_resource_quantity_is_rejected() {
    let game = empty_game(1);
    let tile = game.tile(ground(3, 3)).expect("tile exists");

    assert!(matches!(
        tile.set_resource_quantity(&game, ResourceType::Metals, -1),
        Err(GameError::NegativeResourceQuantity { quantity: -1, .. })
    ));
    tile.set_resource_quantity(&game, ResourceType::Metals, 5).expect("positive");
    assert_eq!(tile.quantity(ResourceType::Metals), 5);
    tile.set_resource_quantity(&game, ResourceType::Metals, 0).expect("zero");
    assert_eq!(tile.quantity(ResourceType::Metals), 0);
}

#[test]
fn ownership_transfer_notifies_both_players() {
    let internal = Arc::new(RecordingListener::default());
    let game = empty_builder(10, 2)
        .add_listener(internal.clone())
        .build()
        .expect("game builds");
    let scout = spawn(&game, UnitType::Scout, 1, ground(1, 1));
    spawn(&game, UnitType::Engineer, 1, ground(2, 2));

    let loser = Arc::new(RecordingListener::default());
    let winner = Arc::new(RecordingListener::default());
    game.add_listener(&login(&game, 1), loser.clone()).expect("authenticated");
    game.add_listener(&login(&game, 2), winner.clone()).expect("authenticated");

    scout.set_owner(&game, Some(pid(2))).expect("known player");

    assert_eq!(scout.owner_id(), Some(pid(2)));
    assert!(game.player(pid(1)).expect("player 1").owned_object(scout.id()).is_none());
    assert!(game.player(pid(2)).expect("player 2").owned_object(scout.id()).is_some());

    let lost = format!("lost:1:{}", scout.id());
    let gained = format!("gained:2:{}", scout.id());
    assert_eq!(loser.count(&lost), 1);
    assert_eq!(loser.count("gained"), 0);
    assert_eq!(winner.count(&gained), 1);
    assert_eq!(winner.count("lost"), 0);
    assert_eq!(internal.count("captured"), 1);

    let events = internal.events().len();
    scout.set_owner(&game, Some(pid(2))).expect("same owner");
    assert_eq!(internal.events().len(), events);
}

#[test]
fn movement_follows_planned_path() {
    let listener = Arc::new(RecordingListener::default());
    let game = empty_builder(10, 1)
        .add_listener(listener.clone())
        .build()
        .expect("game builds");
    let scout = spawn(&game, UnitType::Scout, 1, ground(1, 1));
    let ctx = login(&game, 1);

    let movement = scout.movement(&game, &ctx, ground(4, 1)).expect("owned");
    assert!(movement.is_possible());
    assert_eq!(movement.cost(), 3.0);
    assert_eq!(movement.path().map(|path| path.len()), Some(3));
    movement.execute(&game, &ctx).expect("path is clear");

    assert_eq!(scout.current_location(), ground(4, 1));
    assert!(game.tile(ground(1, 1)).expect("tile").occupant().is_none());
    assert!(game.tile(ground(4, 1)).expect("tile").occupant().is_some());
    assert_eq!(scout.mobility().map(|mobility| mobility.remaining_speed()), Some(2.0));
    assert_eq!(listener.count(&format!("moved:{}:{}", scout.id(), ground(4, 1))), 1);

    let too_far = scout.movement(&game, &ctx, ground(4, 5)).expect("owned");
    assert!(!too_far.is_possible());
    assert_eq!(too_far.cost(), 1.0);
    assert!(too_far.path().is_some());
    assert!(matches!(too_far.execute(&game, &ctx), Err(GameError::Impossible)));
}

#[test]
fn stale_movement_is_invalidated() {
    let game = empty_game(1);
    let scout = spawn(&game, UnitType::Scout, 1, ground(1, 1));
    let ctx = login(&game, 1);

    let east = scout.movement(&game, &ctx, ground(3, 1)).expect("owned");
    let south = scout.movement(&game, &ctx, ground(1, 3)).expect("owned");
    south.execute(&game, &ctx).expect("path is clear");

    assert!(matches!(east.execute(&game, &ctx), Err(GameError::Invalidated)));
    assert_eq!(scout.current_location(), ground(1, 3));
}

#[test]
fn blocked_path_reports_the_blocked_prefix() {
    let game = empty_game(2);
    let scout = spawn(&game, UnitType::Scout, 1, ground(1, 1));
    let ctx = login(&game, 1);

    let movement = scout.movement(&game, &ctx, ground(4, 1)).expect("owned");
    assert!(movement.is_possible());
    spawn(&game, UnitType::Engineer, 2, ground(3, 1));

    match movement.execute(&game, &ctx) {
        Err(GameError::PathInvalidated { path }) => {
            assert_eq!(*path.target(), ground(3, 1));
            assert_eq!(path.nodes(), vec![ground(1, 1), ground(2, 1), ground(3, 1)]);
        }
        other => panic!("expected PathInvalidated, got {other:?}"),
    }
    assert_eq!(scout.current_location(), ground(1, 1));
}

#[test]
fn only_the_owner_may_plan() {
    let game = empty_game(2);
    let scout = spawn(&game, UnitType::Scout, 1, ground(1, 1));

    assert!(matches!(
        scout.movement(&game, &login(&game, 2), ground(2, 1)),
        Err(GameError::NotOwned { .. })
    ));
    assert!(matches!(
        scout.movement(&game, &RequestContext::anonymous(), ground(2, 1)),
        Err(GameError::NotAuthenticated)
    ));
}

#[test]
fn airship_levels_between_sky_and_ground() {
    let game = empty_game(1);
    let airship = spawn(&game, UnitType::Airship, 1, sky(1, 1));
    let ctx = login(&game, 1);

    let down = airship.leveling(&game, &ctx, LevelType::Ground).expect("owned");
    assert!(down.is_possible());
    assert_eq!(down.cost(), 2.0);
    down.execute(&game, &ctx).expect("ground tile is free");
    assert_eq!(airship.current_location(), ground(1, 1));
    assert_eq!(
        game.tile(sky(1, 1)).expect("tile").is_accessible(&game, &ctx).expect("authenticated"),
        Maybool::True
    );

    let space = airship.leveling(&game, &ctx, LevelType::Space).expect("owned");
    assert!(!space.is_possible());
    assert!(matches!(space.execute(&game, &ctx), Err(GameError::Impossible)));
}

#[test]
fn failed_commit_keeps_the_remaining_speed() {
    let game = empty_game(2);
    let scout = spawn(&game, UnitType::Scout, 1, ground(1, 1));
    let airship = spawn(&game, UnitType::Airship, 1, sky(5, 5));
    let ctx = login(&game, 1);

    let movement = scout.movement(&game, &ctx, ground(3, 1)).expect("owned");
    let leveling = airship.leveling(&game, &ctx, LevelType::Ground).expect("owned");
    assert!(movement.is_possible());
    assert!(leveling.is_possible());
    // Occupied after validation, before the commit.
    let blocker = spawn(&game, UnitType::Engineer, 2, ground(3, 1));
    spawn(&game, UnitType::Engineer, 2, ground(5, 5));

    assert!(matches!(
        movement.commit(&game),
        Err(GameError::TileOccupied { occupant, .. }) if occupant == blocker.id()
    ));
    assert_eq!(scout.current_location(), ground(1, 1));
    assert_eq!(scout.mobility().map(|mobility| mobility.remaining_speed()), Some(5.0));
    assert!(game
        .tile(ground(1, 1))
        .expect("tile")
        .occupant()
        .is_some_and(|occupant| occupant.id() == scout.id()));

    assert!(matches!(
        leveling.commit(&game),
        Err(GameError::TileOccupied { .. })
    ));
    assert_eq!(airship.current_location(), sky(5, 5));
    assert_eq!(airship.mobility().map(|mobility| mobility.remaining_speed()), Some(4.0));
}
