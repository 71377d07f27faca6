use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of an entity inside a grid: its index in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Integer lattice coordinate of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LatticeCoord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl LatticeCoord {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// World position of this coordinate in a lattice of `size` cells per axis,
    /// centered on the origin: `size/2 - coord` on every axis.
    pub fn centered_position(self, size: u32) -> Vec3 {
        let half = size as f32 / 2.0;
        Vec3::new(
            half - self.x as f32,
            half - self.y as f32,
            half - self.z as f32,
        )
    }
}

impl fmt::Display for LatticeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// An sRGB color with components in `[0, 1]`.
///
/// Serialized as a `#rrggbb` string so configuration files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("expected `#rrggbb`, got {0:?}")]
    Malformed(String),
}

impl Color {
    pub const WHITE: Self = Self::from_hex(0xffffff);
    pub const BLACK: Self = Self::from_hex(0x000000);

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Convert to linear light, for writing into sRGB render targets.
    pub fn to_linear(self) -> Self {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        Self {
            r: decode(self.r),
            g: decode(self.g),
            b: decode(self.b),
        }
    }

    pub fn to_rgba(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(ColorParseError::Malformed(s.to_owned()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|_| ColorParseError::Malformed(s.to_owned()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A half-line in world space. `direction` is unit length, or zero when
/// built from a zero or non-finite vector; such a ray hits nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Logical size of the drawable area. Both sides are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    /// Degenerate sides are clamped to 1 so aspect and NDC math never divide by zero.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_position_matches_lattice_center() {
        assert_eq!(
            LatticeCoord::new(0, 0, 0).centered_position(10),
            Vec3::new(5.0, 5.0, 5.0)
        );
        assert_eq!(
            LatticeCoord::new(9, 5, 0).centered_position(10),
            Vec3::new(-4.0, 0.0, 5.0)
        );
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn color_parses_hex_strings() {
        let c: Color = "#FFB740".parse().unwrap();
        assert_eq!(c.to_hex(), 0xffb740);
        assert_eq!(c.to_string(), "#ffb740");
        assert_eq!("96ceb4".parse::<Color>().unwrap().to_hex(), 0x96ceb4);
    }

    #[test]
    fn color_rejects_malformed_strings() {
        assert!("#fff".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        assert!((Color::WHITE.to_linear().r - 1.0).abs() < 1e-5);
        assert_eq!(Color::BLACK.to_linear(), Color::BLACK);
        let mid = Color::from_hex(0x808080).to_linear();
        assert!(mid.r > 0.2 && mid.r < 0.23);
    }

    #[test]
    fn ray_direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(ray.direction, Vec3::NEG_Z);
        assert_eq!(ray.at(2.0), Vec3::new(0.0, 0.0, -2.0));
        assert!(!ray.is_degenerate());
    }

    #[test]
    fn zero_or_nan_direction_is_degenerate() {
        assert!(Ray::new(Vec3::ONE, Vec3::ZERO).is_degenerate());
        assert!(Ray::new(Vec3::ONE, Vec3::NAN).is_degenerate());
    }

    #[test]
    fn viewport_clamps_degenerate_sides() {
        let v = Viewport::new(0, 0);
        assert_eq!((v.width(), v.height()), (1, 1));
        assert_eq!(v.aspect(), 1.0);
        assert_eq!(Viewport::new(800, 400).aspect(), 2.0);
    }
}
