use std::{
    hash::{Hash, Hasher},
    time::Instant,
};

use crate::error::{AppError, Result};

/// An 8-bit RGB triple with a canonical 6-hex-digit text form (§3). Input accepts
/// either case; output is always lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn from_hex(hex: &str) -> Result<Self> {
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AppError::InvalidParams(format!(
                "{hex:?} is not a valid color, please use the hexadecimal format RRGGBB"
            )));
        }
        let value = u32::from_str_radix(hex, 16)
            .map_err(|_| AppError::InvalidParams(format!("{hex:?} is not valid hex")))?;
        Ok(Self(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        ))
    }

    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// A pixel that still needs painting. Identity is `(x, y, rgb)` (§3) — two units with
/// identical coordinates and target color are the same unit regardless of which project
/// they came from, so equality and hashing deliberately ignore `project_name`.
#[derive(Debug, Clone)]
pub struct Unit {
    pub x: i32,
    pub y: i32,
    pub rgb: Rgb,
    pub project_name: String,
}

impl Unit {
    pub fn new(x: i32, y: i32, rgb: Rgb, project_name: impl Into<String>) -> Self {
        Self {
            x,
            y,
            rgb,
            project_name: project_name.into(),
        }
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.rgb == other.rgb
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
        self.rgb.hash(state);
    }
}

/// A project anchored at `(x, y)` with a decoded target image, ready for the diff
/// engine. Decoding happens once per refresh in the refresh loop (§4.F); the project's
/// immutability window is the refresh cycle, not the database row.
#[derive(Debug, Clone)]
pub struct DecodedProject {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub priority: i32,
    pub image: DecodedImage,
}

#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb>,
}

impl DecodedImage {
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

/// A point-in-time copy of the entire remote canvas.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb>,
    pub fetched_at: Instant,
}

impl Snapshot {
    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        self.pixels
            .get((y as u32 * self.width + x as u32) as usize)
            .copied()
    }
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub user_id: i64,
    pub unit: Unit,
    pub leased_at: Instant,
    pub expires_at: Instant,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn from_hex_accepts_either_case_and_emits_lowercase() {
        let upper = Rgb::from_hex("FF00AA").unwrap();
        let lower = Rgb::from_hex("ff00aa").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.to_hex(), "ff00aa");
    }

    #[test]
    fn from_hex_rejects_wrong_length_and_non_hex() {
        assert!(Rgb::from_hex("fff").is_err());
        assert!(Rgb::from_hex("gggggg").is_err());
        assert!(Rgb::from_hex("").is_err());
    }

    #[test]
    fn unit_identity_ignores_project_name() {
        let a = Unit::new(1, 2, Rgb(1, 2, 3), "project-a");
        let b = Unit::new(1, 2, Rgb(1, 2, 3), "project-b");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }
}
