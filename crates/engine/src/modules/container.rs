use std::sync::{Arc, Mutex};

use fogwar_domain::{ChangeInt, ResourceType};

use crate::game::Game;
use crate::notifier::GameEvent;
use crate::object::GameObject;
use crate::sync::lock;

/// Storage for one resource type.
#[derive(Debug)]
pub struct Container {
    resource_type: ResourceType,
    capacity: u32,
    stock: Mutex<u32>,
}

impl Container {
    pub fn new(resource_type: ResourceType, capacity: u32) -> Self {
        Self {
            resource_type,
            capacity,
            stock: Mutex::new(0),
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn stock(&self) -> u32 {
        *lock(&self.stock)
    }

    pub fn free_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.stock())
    }

    /// Store up to `amount`, clamped to free capacity. Returns the amount stored.
    pub(crate) fn add_stock(&self, game: &Game, object: &Arc<GameObject>, amount: u32) -> u32 {
        self.update_stock(game, object, |stock| {
            let stored = amount.min(self.capacity.saturating_sub(stock));
            (stock + stored, stored)
        })
    }

    /// Remove up to `amount`, clamped to the current stock. Returns the amount taken.
    pub(crate) fn take_stock(&self, game: &Game, object: &Arc<GameObject>, amount: u32) -> u32 {
        self.update_stock(game, object, |stock| {
            let taken = amount.min(stock);
            (stock - taken, taken)
        })
    }

    fn update_stock(
        &self,
        game: &Game,
        object: &Arc<GameObject>,
        update: impl FnOnce(u32) -> (u32, u32),
    ) -> u32 {
        let (change, moved) = {
            let mut stock = lock(&self.stock);
            let old = *stock;
            let (new, moved) = update(old);
            *stock = new;
            (ChangeInt::of_counts(old, new), moved)
        };

        if moved > 0 {
            game.notifier().fire_if_observable(
                game,
                object.current_location(),
                GameEvent::ContainerStockChanged {
                    object: Arc::clone(object),
                    resource: self.resource_type,
                    stock: change,
                },
            );
        }
        moved
    }
}
