use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_numeric_id {
    ($name:ident, $repr:ty) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name($repr);

        impl $name {
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            pub const fn value(self) -> $repr {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_numeric_id!(PlayerId, u32);
define_numeric_id!(ObjectId, u64);

impl ObjectId {
    /// Compose an object id from its owner's id space and the owner's sequence number.
    ///
    /// Unowned objects (construction sites spawned without a player) use the zero space.
    pub const fn compose(owner: Option<PlayerId>, sequence: u32) -> Self {
        let space = match owner {
            Some(player) => player.0 as u64,
            None => 0,
        };
        Self((space << 32) | sequence as u64)
    }

    /// The player id space this object id was generated in.
    pub const fn space(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub const fn sequence(self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }
}

/// Secret credential a player authenticates with.
///
/// Debug output is redacted so keys never end up in logs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerKey(Uuid);

impl PlayerKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlayerKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlayerKey(..)")
    }
}

impl From<Uuid> for PlayerKey {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_ids_are_partitioned_by_owner() {
        let a = ObjectId::compose(Some(PlayerId::new(1)), 0);
        let b = ObjectId::compose(Some(PlayerId::new(2)), 0);
        assert_ne!(a, b);
        assert_eq!(a.space(), 1);
        assert_eq!(b.space(), 2);
        assert_eq!(b.sequence(), 0);
    }

    #[test]
    fn unowned_objects_use_zero_space() {
        let id = ObjectId::compose(None, 7);
        assert_eq!(id.space(), 0);
        assert_eq!(id.sequence(), 7);
        assert_eq!(id.value(), 7);
    }

    #[test]
    fn player_key_debug_is_redacted() {
        let key = PlayerKey::new();
        let rendered = format!("{key:?}");
        assert_eq!(rendered, "PlayerKey(..)");
        assert!(!rendered.contains(&key.as_uuid().to_string()));
    }
}
