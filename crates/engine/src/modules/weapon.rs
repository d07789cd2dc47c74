use std::sync::{Arc, Mutex};

use fogwar_domain::{ChangeInt, LevelType, TileRef};

use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::notifier::GameEvent;
use crate::object::GameObject;
use crate::security::RequestContext;
use crate::sync::lock;

#[derive(Debug)]
struct WeaponState {
    repeated: u32,
    ammunition: u32,
}

#[derive(Debug)]
pub struct Weapon {
    fire_power: u32,
    variance: u32,
    range: u32,
    repeat: u32,
    ammunition_load: u32,
    layers: Vec<LevelType>,
    state: Mutex<WeaponState>,
}

impl Weapon {
    pub fn new(
        fire_power: u32,
        variance: u32,
        range: u32,
        repeat: u32,
        ammunition_load: u32,
        layers: &[LevelType],
    ) -> Self {
        Self {
            fire_power,
            variance,
            range,
            repeat,
            ammunition_load,
            layers: layers.to_vec(),
            state: Mutex::new(WeaponState {
                repeated: 0,
                ammunition: ammunition_load,
            }),
        }
    }

    pub fn fire_power(&self) -> u32 {
        self.fire_power
    }

    pub fn variance(&self) -> u32 {
        self.variance
    }

    pub fn range(&self) -> u32 {
        self.range
    }

    /// Shots allowed per turn.
    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    pub fn ammunition_load(&self) -> u32 {
        self.ammunition_load
    }

    /// Levels this weapon can hit.
    pub fn layers(&self) -> &[LevelType] {
        &self.layers
    }

    /// Shots already fired this turn.
    pub fn repeated(&self) -> u32 {
        lock(&self.state).repeated
    }

    pub fn ammunition(&self) -> u32 {
        lock(&self.state).ammunition
    }

    pub(crate) fn on_reset(&self) {
        lock(&self.state).repeated = 0;
    }

    /// Fire at `target`, damaging the first base of whatever occupies it.
    pub(crate) fn fire(
        &self,
        game: &Game,
        ctx: &RequestContext,
        object: &Arc<GameObject>,
        target: TileRef,
    ) -> GameResult<()> {
        ctx.assert_owned(object)?;
        ctx.assert_observable_tile(game, target)?;
        let tile = game.tile(target)?;
        if !object.is_alive() || !self.layers.contains(&target.level) {
            return Err(GameError::Impossible);
        }
        let distance = object.current_location().distance_to(target);
        if distance > self.range {
            return Err(GameError::OutOfRange {
                distance,
                range: self.range,
            });
        }

        let ammunition = {
            let mut state = lock(&self.state);
            if state.repeated >= self.repeat {
                return Err(GameError::OutOfRepeats {
                    repeat: state.repeated,
                });
            }
            if state.ammunition == 0 {
                return Err(GameError::OutOfAmmunition);
            }
            let old = state.ammunition;
            state.ammunition -= 1;
            state.repeated += 1;
            ChangeInt::of_counts(old, state.ammunition)
        };

        game.notifier().fire_if_observable_any(
            game,
            &[object.current_location(), target],
            GameEvent::WeaponFired {
                object: Arc::clone(object),
                target,
                ammunition,
            },
        );

        let damage = self.fire_power + self.roll_variance(game);
        tracing::debug!(object_id = %object.id(), target = %target, damage, "Weapon fired");

        let Some(victim) = tile.occupant() else {
            return Ok(());
        };
        let Some(base) = victim.bases().next() else {
            return Ok(());
        };
        let victim_owner = victim.owner_id();
        let killed = base.add_damage(game, &victim, damage)?;

        if killed {
            if let Some(shooter_owner) = object.owner_id() {
                if victim_owner != Some(shooter_owner) {
                    game.player(shooter_owner)?.add_score(game, 1);
                }
            }
        }
        Ok(())
    }

    /// Uniform in `[0, variance)`.
    fn roll_variance(&self, game: &Game) -> u32 {
        if self.variance == 0 {
            return 0;
        }
        let max = i32::try_from(self.variance - 1).unwrap_or(i32::MAX);
        u32::try_from(game.random().gen_range(0, max)).unwrap_or(0)
    }
}
