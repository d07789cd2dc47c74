use std::sync::Arc;

use fogwar_domain::ResourceType;

use crate::error::GameResult;
use crate::game::Game;
use crate::object::GameObject;

/// Mines one resource type from the tile its object stands on.
#[derive(Debug)]
pub struct Extractor {
    resource_type: ResourceType,
    speed: u32,
}

impl Extractor {
    pub fn new(resource_type: ResourceType, speed: u32) -> Self {
        Self {
            resource_type,
            speed,
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Maximum units extracted per turn.
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Move up to `speed` units from the tile into the owner's containers,
    /// filling the extracting object's own containers first.
    pub(crate) fn on_new_turn(&self, game: &Game, object: &Arc<GameObject>) -> GameResult<()> {
        let Some(owner) = object.owner_id() else {
            return Ok(());
        };
        let player = game.player(owner)?;
        let tile = game.tile(object.current_location())?;
        let available = tile.quantity(self.resource_type);
        let budget = self.speed.min(available);
        if budget == 0 {
            return Ok(());
        }

        let others = player
            .owned_objects()
            .into_iter()
            .filter(|other| other.id() != object.id());
        let mut deposited = 0;
        for holder in std::iter::once(Arc::clone(object)).chain(others) {
            for container in holder
                .containers()
                .filter(|container| container.resource_type() == self.resource_type)
            {
                deposited += container.add_stock(game, &holder, budget - deposited);
                if deposited == budget {
                    break;
                }
            }
            if deposited == budget {
                break;
            }
        }

        if deposited > 0 {
            tile.set_resource_quantity(
                game,
                self.resource_type,
                i64::from(available) - i64::from(deposited),
            )?;
            tracing::debug!(
                object_id = %object.id(),
                resource = %self.resource_type,
                amount = deposited,
                "Extracted resources"
            );
        }
        Ok(())
    }
}
