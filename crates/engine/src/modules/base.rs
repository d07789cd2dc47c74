use std::sync::{Arc, Mutex};

use fogwar_domain::{ChangeInt, LevelType};

use crate::error::GameResult;
use crate::game::Game;
use crate::notifier::GameEvent;
use crate::object::GameObject;
use crate::sync::lock;

/// Structural integrity and sensors. An object dies once every base it carries is destroyed.
#[derive(Debug)]
pub struct Base {
    max_health: u32,
    armor: u32,
    view_range: u32,
    layers: Vec<LevelType>,
    damage: Mutex<u32>,
}

impl Base {
    pub fn new(max_health: u32, armor: u32, view_range: u32, layers: &[LevelType]) -> Self {
        Self {
            max_health,
            armor,
            view_range,
            layers: layers.to_vec(),
            damage: Mutex::new(0),
        }
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn armor(&self) -> u32 {
        self.armor
    }

    pub fn view_range(&self) -> u32 {
        self.view_range
    }

    /// Levels this base observes.
    pub fn layers(&self) -> &[LevelType] {
        &self.layers
    }

    pub fn damage(&self) -> u32 {
        *lock(&self.damage)
    }

    pub fn remaining_health(&self) -> u32 {
        self.max_health.saturating_sub(self.damage())
    }

    /// Apply `damage` minus armor. Returns true if this killed `object`.
    pub(crate) fn add_damage(
        &self,
        game: &Game,
        object: &Arc<GameObject>,
        damage: u32,
    ) -> GameResult<bool> {
        let applied = damage.saturating_sub(self.armor);
        let change = {
            let mut current = lock(&self.damage);
            let old = *current;
            *current = old.saturating_add(applied).min(self.max_health);
            ChangeInt::of_counts(old, *current)
        };

        if !change.is_unchanged() {
            game.notifier().fire_if_observable(
                game,
                object.current_location(),
                GameEvent::BaseDamaged {
                    object: Arc::clone(object),
                    damage: change,
                },
            );
        }

        if object.is_alive() && object.bases().all(|base| base.remaining_health() == 0) {
            object.die(game)?;
            return Ok(true);
        }
        Ok(false)
    }
}
