//! Firing, damage, death and victory.

use std::sync::Arc;

use fogwar_domain::LevelType;

use super::{empty_builder, ground, login, next_turn, pid, spawn, spawn_with, RecordingListener};
use crate::content::UnitType;
use crate::error::GameError;
use crate::modules::{Base, Weapon};
use crate::ports::MockRandomPort;
use crate::security::RequestContext;

fn low_rolls() -> Arc<MockRandomPort> {
    let mut random = MockRandomPort::new();
    random.expect_gen_range().returning(|min, _| min);
    Arc::new(random)
}

#[test]
fn shot_damages_the_target_base_through_armor() {
    let game = empty_builder(10, 2)
        .random(low_rolls())
        .build()
        .expect("game builds");
    let scout = spawn(&game, UnitType::Scout, 1, ground(1, 1));
    let engineer = spawn(&game, UnitType::Engineer, 2, ground(2, 1));
    let ctx = login(&game, 1);

    scout.fire(&game, &ctx, ground(2, 1)).expect("in range");

    let weapon = scout.weapon().expect("scouts carry a weapon");
    assert_eq!(weapon.repeated(), 1);
    assert_eq!(weapon.ammunition(), 9);
    let base = engineer.bases().next().expect("engineers carry a base");
    // Fire power 3, armor 1.
    assert_eq!(base.damage(), 2);
    assert_eq!(base.remaining_health(), 8);

    assert!(matches!(
        scout.fire(&game, &ctx, ground(2, 1)),
        Err(GameError::OutOfRepeats { repeat: 1 })
    ));
}

#[test]
fn empty_weapon_is_out_of_ammunition() {
    let listener = Arc::new(RecordingListener::default());
    let game = empty_builder(10, 2)
        .add_listener(listener.clone())
        .build()
        .expect("game builds");
    let gunner = spawn_with(
        &game,
        1,
        ground(1, 1),
        vec![
            Base::new(5, 0, 3, &[LevelType::Ground]).into(),
            Weapon::new(3, 0, 3, 1, 0, &[LevelType::Ground]).into(),
        ],
    );
    spawn(&game, UnitType::Engineer, 2, ground(2, 1));

    let err = gunner
        .fire(&game, &login(&game, 1), ground(2, 1))
        .expect_err("no ammunition");
    assert!(matches!(err, GameError::OutOfAmmunition));
    assert!(err.is_recoverable());
    assert_eq!(gunner.weapon().map(|weapon| weapon.repeated()), Some(0));
    assert_eq!(listener.count("weapon_fired"), 0);
}

#[test]
fn targets_must_be_observed_and_in_range() {
    let game = empty_builder(10, 2)
        .random(low_rolls())
        .build()
        .expect("game builds");
    let scout = spawn(&game, UnitType::Scout, 1, ground(1, 1));
    let ctx = login(&game, 1);

    assert!(matches!(
        scout.fire(&game, &ctx, ground(1, 6)),
        Err(GameError::OutOfRange { distance: 5, range: 3 })
    ));
    assert!(matches!(
        scout.fire(&game, &ctx, ground(8, 8)),
        Err(GameError::NotObservable { .. })
    ));
    assert!(matches!(
        scout.fire(&game, &login(&game, 2), ground(2, 1)),
        Err(GameError::NotOwned { .. })
    ));
    assert!(matches!(
        scout.fire(&game, &RequestContext::anonymous(), ground(2, 1)),
        Err(GameError::NotAuthenticated)
    ));
    assert_eq!(scout.weapon().map(|weapon| weapon.ammunition()), Some(10));
}

#[test]
fn repeats_reset_on_new_turn() {
    let game = empty_builder(10, 1)
        .random(low_rolls())
        .build()
        .expect("game builds");
    let scout = spawn(&game, UnitType::Scout, 1, ground(1, 1));
    let ctx = login(&game, 1);

    scout.fire(&game, &ctx, ground(3, 1)).expect("empty tile in range");
    assert!(scout.fire(&game, &ctx, ground(3, 1)).is_err());

    next_turn(&game);
    scout.fire(&game, &ctx, ground(3, 1)).expect("repeats were reset");
    assert_eq!(scout.weapon().map(|weapon| weapon.ammunition()), Some(8));
}

#[test]
fn killing_the_last_enemy_unit_ends_the_game() {
    let listener = Arc::new(RecordingListener::default());
    let game = empty_builder(10, 2)
        .add_listener(listener.clone())
        .build()
        .expect("game builds");
    let gunner = spawn_with(
        &game,
        1,
        ground(1, 1),
        vec![
            Base::new(5, 0, 3, &[LevelType::Ground]).into(),
            Weapon::new(100, 0, 3, 1, 5, &[LevelType::Ground]).into(),
        ],
    );
    let victim = spawn(&game, UnitType::Engineer, 2, ground(2, 1));
    next_turn(&game);
    assert!(game.is_running());

    gunner.fire(&game, &login(&game, 1), ground(2, 1)).expect("in range");

    assert!(!victim.is_alive());
    assert!(game.tile(ground(2, 1)).expect("tile").occupant().is_none());
    assert_eq!(game.player(pid(1)).expect("player 1").score(), 1);
    assert!(game.has_ended());
    assert!(!game.is_running());
    assert_eq!(listener.count(&format!("died:{}", victim.id())), 1);
    assert_eq!(listener.count("player_score:1:1"), 1);
    assert_eq!(listener.count("game_ended:Some(PlayerId(1))"), 1);

    assert!(matches!(
        game.set_ready(&RequestContext::anonymous(), pid(1)),
        Err(GameError::GameNotRunning)
    ));
}
