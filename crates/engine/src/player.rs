//! Players and the objects they own.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use fogwar_domain::{ChangeInt, Color, Maybe, ObjectId, PlayerId, PlayerKey};

use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::notifier::GameEvent;
use crate::object::GameObject;
use crate::observation;
use crate::security::RequestContext;
use crate::sync::{read, write};

pub struct Player {
    id: PlayerId,
    key: Option<PlayerKey>,
    name: String,
    primary_color: Color,
    secondary_color: Color,
    score: AtomicU32,
    objects: RwLock<BTreeMap<ObjectId, Arc<GameObject>>>,
    next_sequence: AtomicU32,
}

impl Player {
    pub fn new(
        id: PlayerId,
        key: Option<PlayerKey>,
        name: impl Into<String>,
        primary_color: Color,
        secondary_color: Color,
    ) -> Self {
        Self {
            id,
            key,
            name: name.into(),
            primary_color,
            secondary_color,
            score: AtomicU32::new(0),
            objects: RwLock::new(BTreeMap::new()),
            next_sequence: AtomicU32::new(0),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn key(&self) -> Option<&PlayerKey> {
        self.key.as_ref()
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Key-less players are driven internally and need no authentication to mark ready.
    pub fn is_key_less(&self) -> bool {
        self.key.is_none()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_color(&self) -> Color {
        self.primary_color
    }

    pub fn secondary_color(&self) -> Color {
        self.secondary_color
    }

    pub fn score(&self) -> u32 {
        self.score.load(Ordering::SeqCst)
    }

    /// All owned objects. Only the player itself may list them.
    pub fn objects(&self, ctx: &RequestContext) -> GameResult<Maybe<Vec<Arc<GameObject>>>> {
        if !ctx.is_authenticated() {
            return Err(GameError::NotAuthenticated);
        }
        if !ctx.acts_as(self.id) {
            return Ok(Maybe::Unknown);
        }
        Ok(Maybe::Present(self.owned_objects()))
    }

    /// One owned object by id.
    ///
    /// The owner learns `Absent` for ids it does not own; anyone else can
    /// only see objects they currently observe and gets `Unknown` otherwise.
    pub fn object(
        &self,
        game: &Game,
        ctx: &RequestContext,
        id: ObjectId,
    ) -> GameResult<Maybe<Arc<GameObject>>> {
        if !ctx.is_authenticated() {
            return Err(GameError::NotAuthenticated);
        }
        let object = self.owned_object(id);
        if ctx.acts_as(self.id) {
            return Ok(Maybe::from_option(object));
        }
        match object {
            Some(object) if observation::is_object_visible(game, ctx, &object)? => {
                Ok(Maybe::Present(object))
            }
            _ => Ok(Maybe::Unknown),
        }
    }

    /// Owned objects the requester can currently see.
    pub fn observable_objects(
        &self,
        game: &Game,
        ctx: &RequestContext,
    ) -> GameResult<Vec<Arc<GameObject>>> {
        let mut visible = Vec::new();
        for object in self.owned_objects() {
            if observation::is_object_visible(game, ctx, &object)? {
                visible.push(object);
            }
        }
        Ok(visible)
    }

    /// Snapshot of the owned objects, safe to iterate while they mutate.
    pub(crate) fn owned_objects(&self) -> Vec<Arc<GameObject>> {
        read(&self.objects).values().cloned().collect()
    }

    pub(crate) fn owned_object(&self, id: ObjectId) -> Option<Arc<GameObject>> {
        read(&self.objects).get(&id).cloned()
    }

    pub(crate) fn owns_objects(&self) -> bool {
        !read(&self.objects).is_empty()
    }

    pub(crate) fn insert_object(&self, object: Arc<GameObject>) {
        write(&self.objects).insert(object.id(), object);
    }

    pub(crate) fn remove_object(&self, id: ObjectId) {
        write(&self.objects).remove(&id);
    }

    pub(crate) fn next_object_sequence(&self) -> u32 {
        self.next_sequence.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn add_score(self: &Arc<Self>, game: &Game, points: u32) {
        let old = self.score.fetch_add(points, Ordering::SeqCst);
        game.notifier().fire(GameEvent::PlayerScore {
            player: Arc::clone(self),
            score: ChangeInt::of_counts(old, old.saturating_add(points)),
        });
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("key", &self.key)
            .field("score", &self.score())
            .finish()
    }
}
