//! Player colors

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Palette used when the builder generates filler players.
    pub const TEMPLATES: [Color; 8] = [
        Color::rgb(0xE6, 0x19, 0x4B),
        Color::rgb(0x3C, 0xB4, 0x4B),
        Color::rgb(0xFF, 0xE1, 0x19),
        Color::rgb(0x43, 0x63, 0xD8),
        Color::rgb(0xF5, 0x82, 0x31),
        Color::rgb(0x91, 0x1E, 0xB4),
        Color::rgb(0x46, 0xF0, 0xF0),
        Color::rgb(0xF0, 0x32, 0xE6),
    ];
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}
