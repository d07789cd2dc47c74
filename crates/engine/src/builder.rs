//! Validating game builder and world generation.
//!
//! `build()` validates the roster and configuration, then populates the world
//! under bootstrap privileges: resource puddles first, starting units second.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use fogwar_domain::{
    path, Color, LevelType, Maybool, PlayerId, PlayerKey, Position, ResourceType, Size, TileRef,
};

use crate::config::{GameConfig, ResourceConfig, ResourcePreset, UnitPreset};
use crate::content::UnitType;
use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::notifier::GameListener;
use crate::object::GameObject;
use crate::player::Player;
use crate::ports::{ClockPort, RandomPort, SystemClock, SystemRandom};
use crate::security::RequestContext;
use crate::victory::VictoryCondition;

const MAX_PUDDLES: usize = 10_000;
const PLACEMENT_ATTEMPTS: usize = 1_000;
const PLACEMENT_RADIUS: u32 = 2;

const GENERATED_NAMES: [&str; 8] = [
    "Aurora", "Bastion", "Cinder", "Drift", "Ember", "Fathom", "Gale", "Helix",
];

/// A player to seat in a new game.
#[derive(Debug, Clone)]
pub struct PlayerSpec {
    pub id: Option<PlayerId>,
    pub key: Option<PlayerKey>,
    pub name: String,
    pub primary_color: Color,
    pub secondary_color: Color,
}

impl PlayerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            key: None,
            name: name.into(),
            primary_color: Color::TEMPLATES[0],
            secondary_color: Color::TEMPLATES[1],
        }
    }

    pub fn with_id(mut self, id: PlayerId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_key(mut self, key: PlayerKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_colors(mut self, primary: Color, secondary: Color) -> Self {
        self.primary_color = primary;
        self.secondary_color = secondary;
        self
    }
}

pub struct GameBuilder {
    level_width: u32,
    level_height: u32,
    total_players: usize,
    players: Vec<PlayerSpec>,
    listeners: Vec<Arc<dyn GameListener>>,
    victory_conditions: Vec<VictoryCondition>,
    resource_preset: ResourcePreset,
    resource_overrides: BTreeMap<ResourceType, ResourceConfig>,
    units: UnitPreset,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
}

impl GameBuilder {
    pub fn new() -> Self {
        Self::from_config(&GameConfig::default())
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            level_width: config.level_width,
            level_height: config.level_height,
            total_players: config.total_players,
            players: Vec::new(),
            listeners: Vec::new(),
            victory_conditions: config.victory_conditions.clone(),
            resource_preset: config.resources,
            resource_overrides: BTreeMap::new(),
            units: config.units,
            random: Arc::new(SystemRandom::new()),
            clock: Arc::new(SystemClock::new()),
        }
    }

    pub fn level_size(mut self, width: u32, height: u32) -> Self {
        self.level_width = width;
        self.level_height = height;
        self
    }

    /// Seats to fill; missing players are generated key-less.
    pub fn total_players(mut self, total: usize) -> Self {
        self.total_players = total;
        self
    }

    pub fn add_player(mut self, player: PlayerSpec) -> Self {
        self.players.push(player);
        self
    }

    /// Replace the player with the same id, or add it if there is none.
    pub fn set_player(mut self, player: PlayerSpec) -> Self {
        match self
            .players
            .iter_mut()
            .find(|existing| existing.id.is_some() && existing.id == player.id)
        {
            Some(existing) => *existing = player,
            None => self.players.push(player),
        }
        self
    }

    /// Register an internal listener that receives every event.
    pub fn add_listener(mut self, listener: Arc<dyn GameListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn victory_conditions(mut self, conditions: Vec<VictoryCondition>) -> Self {
        self.victory_conditions = conditions;
        self
    }

    pub fn resource_preset(mut self, preset: ResourcePreset) -> Self {
        self.resource_preset = preset;
        self
    }

    /// Override the preset for one resource type.
    pub fn resource_config(mut self, resource: ResourceType, config: ResourceConfig) -> Self {
        self.resource_overrides.insert(resource, config);
        self
    }

    pub fn unit_preset(mut self, units: UnitPreset) -> Self {
        self.units = units;
        self
    }

    pub fn random(mut self, random: Arc<dyn RandomPort>) -> Self {
        self.random = random;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn ClockPort>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> GameResult<Arc<Game>> {
        let size = Size::new(self.level_width, self.level_height)?;
        if self.total_players == 0 {
            return Err(GameError::config("a game needs at least one player"));
        }
        if self.players.len() > self.total_players {
            return Err(GameError::config(format!(
                "{} players added but only {} seats",
                self.players.len(),
                self.total_players
            )));
        }

        let players = self.seat_players()?;
        let mut resources = self.resource_preset.resources(size);
        resources.extend(self.resource_overrides);

        let game = Arc::new(Game::new(
            size,
            players,
            self.victory_conditions,
            self.random,
            self.clock,
        ));
        for listener in self.listeners {
            game.add_internal_listener(listener);
        }

        let ctx = RequestContext::god();
        distribute_resources(&game, &resources)?;
        place_units(&game, &ctx, self.units.units())?;

        tracing::info!(
            size = %size,
            players = game.players().len(),
            "Game built"
        );
        Ok(game)
    }

    fn seat_players(&self) -> GameResult<Vec<Arc<Player>>> {
        let mut taken = BTreeSet::new();
        for id in self.players.iter().filter_map(|spec| spec.id) {
            if !taken.insert(id) {
                return Err(GameError::DuplicatePlayer { player: id });
            }
        }

        let mut next_id = 1u32;
        let mut fresh_id = |taken: &mut BTreeSet<PlayerId>| {
            while taken.contains(&PlayerId::new(next_id)) {
                next_id += 1;
            }
            let id = PlayerId::new(next_id);
            taken.insert(id);
            id
        };

        let mut players = Vec::with_capacity(self.total_players);
        for spec in &self.players {
            let id = match spec.id {
                Some(id) => id,
                None => fresh_id(&mut taken),
            };
            players.push(Arc::new(Player::new(
                id,
                spec.key,
                spec.name.clone(),
                spec.primary_color,
                spec.secondary_color,
            )));
        }
        while players.len() < self.total_players {
            let id = fresh_id(&mut taken);
            let name = GENERATED_NAMES[roll_index(self.random.as_ref(), GENERATED_NAMES.len())];
            let primary = Color::TEMPLATES[roll_index(self.random.as_ref(), Color::TEMPLATES.len())];
            let secondary =
                Color::TEMPLATES[roll_index(self.random.as_ref(), Color::TEMPLATES.len())];
            players.push(Arc::new(Player::new(id, None, name, primary, secondary)));
        }
        Ok(players)
    }
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GameBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameBuilder")
            .field("level_width", &self.level_width)
            .field("level_height", &self.level_height)
            .field("total_players", &self.total_players)
            .field("players", &self.players)
            .field("listeners", &self.listeners.len())
            .field("resource_preset", &self.resource_preset)
            .field("units", &self.units)
            .finish()
    }
}

fn roll(random: &dyn RandomPort, min: u32, max: u32) -> u32 {
    let low = i32::try_from(min).unwrap_or(i32::MAX);
    let high = i32::try_from(max).unwrap_or(i32::MAX);
    u32::try_from(random.gen_range(low, high)).unwrap_or(min)
}

fn roll_index(random: &dyn RandomPort, len: usize) -> usize {
    let max = u32::try_from(len.saturating_sub(1)).unwrap_or(u32::MAX);
    (roll(random, 0, max) as usize).min(len.saturating_sub(1))
}

fn random_position(game: &Game) -> Position {
    let size = game.size();
    let x = roll(game.random(), 0, size.width() - 1);
    let y = roll(game.random(), 0, size.height() - 1);
    Position::new(
        i32::try_from(x).unwrap_or(0),
        i32::try_from(y).unwrap_or(0),
    )
}

/// Scatter each resource in puddles on the levels that support it.
fn distribute_resources(
    game: &Game,
    resources: &BTreeMap<ResourceType, ResourceConfig>,
) -> GameResult<()> {
    for (&resource, config) in resources {
        let levels: Vec<LevelType> = LevelType::ALL
            .into_iter()
            .filter(|level| level.supported_resources().contains(&resource))
            .collect();
        if levels.is_empty() || config.max_per_tile == 0 {
            continue;
        }

        let mut remaining = config.quantity;
        let mut puddles = 0;
        while remaining > 0 && puddles < MAX_PUDDLES {
            puddles += 1;
            let level = levels[roll_index(game.random(), levels.len())];
            let centre = TileRef::new(level, random_position(game));
            let mut area: Vec<TileRef> =
                path::neighbours(centre, config.puddle_radius, |tile| game.tile_neighbours(*tile))
                    .into_iter()
                    .collect();
            area.sort();

            for tile_ref in area {
                if remaining == 0 {
                    break;
                }
                let amount = roll(game.random(), 1, config.max_per_tile).min(remaining);
                let tile = game.tile(tile_ref)?;
                let total = i64::from(tile.quantity(resource)) + i64::from(amount);
                tile.set_resource_quantity(game, resource, total)?;
                remaining -= amount;
                tracing::trace!(tile = %tile_ref, resource = %resource, amount, "Deposited resource");
            }
        }
        if remaining > 0 {
            tracing::warn!(resource = %resource, remaining, "Could not distribute all resources");
        }
    }
    Ok(())
}

/// Give every player its starting units around a free ground tile.
fn place_units(game: &Game, ctx: &RequestContext, units: &[UnitType]) -> GameResult<()> {
    if units.is_empty() {
        return Ok(());
    }
    for player in game.players() {
        let anchor = find_anchor(game, ctx)?;
        for &unit_type in units {
            let tile = free_tile_near(game, ctx, anchor.on_level(unit_type.home_level()))?;
            GameObject::spawn_unit(game, unit_type, Some(player.id()), tile)?;
        }
    }
    Ok(())
}

/// A free ground tile, preferably one carrying metals for the engineer to mine.
fn find_anchor(game: &Game, ctx: &RequestContext) -> GameResult<TileRef> {
    for attempt in 0..PLACEMENT_ATTEMPTS {
        let tile_ref = TileRef::new(LevelType::Ground, random_position(game));
        let tile = game.tile(tile_ref)?;
        let wants_metals = attempt < PLACEMENT_ATTEMPTS / 2;
        if wants_metals && tile.quantity(ResourceType::Metals) == 0 {
            continue;
        }
        if tile.is_accessible(game, ctx)? == Maybool::True {
            return Ok(tile_ref);
        }
    }
    Err(GameError::PlacementExhausted)
}

fn free_tile_near(game: &Game, ctx: &RequestContext, centre: TileRef) -> GameResult<TileRef> {
    let mut candidates: Vec<TileRef> =
        path::neighbours(centre, PLACEMENT_RADIUS, |tile| game.tile_neighbours(*tile))
            .into_iter()
            .collect();
    candidates.sort_by_key(|tile| (centre.distance_to(*tile), *tile));
    for candidate in candidates {
        if game.tile(candidate)?.is_accessible(game, ctx)? == Maybool::True {
            return Ok(candidate);
        }
    }
    Err(GameError::PlacementExhausted)
}
