use crate::animation::{Animate, AnimateError};
use cubefield_common::{Color, EntityId, LatticeCoord, Transform};
use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Cells per axis of the default lattice.
pub const LATTICE_SIZE: u32 = 10;

/// Largest accepted lattice side; keeps `size³` well inside `u32`.
pub const MAX_LATTICE_SIZE: u32 = 64;

/// Edge length of one cube at scale 1.
pub const CUBE_EDGE: f32 = 0.5;

pub const DEFAULT_PALETTE: [Color; 5] = [
    Color::from_hex(0x96ceb4),
    Color::from_hex(0xffeead),
    Color::from_hex(0xffb740),
    Color::from_hex(0xff6f69),
    Color::from_hex(0x588c7e),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("palette must contain at least one color")]
    EmptyPalette,
    #[error("lattice size {0} is outside 1..={MAX_LATTICE_SIZE}")]
    InvalidSize(u32),
}

/// Non-empty ordered list of colors entities draw their base color from.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette(Vec<Color>);

impl Palette {
    pub fn new(colors: Vec<Color>) -> Result<Self, GridError> {
        if colors.is_empty() {
            return Err(GridError::EmptyPalette);
        }
        Ok(Self(colors))
    }

    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Uniform draw over all entries.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Color {
        self.0[rng.random_range(0..self.0.len())]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(DEFAULT_PALETTE.to_vec())
    }
}

/// Aggregate rotation of the whole grid: two slow independent oscillations.
pub fn group_rotation(elapsed: f64) -> Vec3 {
    Vec3::new((elapsed / 4.0).sin() as f32, (elapsed / 2.0).sin() as f32, 0.0)
}

/// Wave phase of a cube at `position` at time `elapsed` seconds.
///
/// Summed in f64 and narrowed once, so the wave keeps sub-frame resolution
/// over long runs.
pub fn phase(position: Vec3, elapsed: f64) -> f32 {
    let p = position.as_dvec3() / 4.0;
    ((p.x + elapsed).sin() + (p.y + elapsed).sin() + (p.z + elapsed).sin()) as f32
}

/// Euler XYZ rotation of a single cube. Pure in `(position, elapsed)`;
/// Z is locked to twice Y so every cube follows one wave parameter.
pub fn entity_rotation(position: Vec3, elapsed: f64) -> Vec3 {
    let phase = phase(position, elapsed);
    Vec3::new(0.0, phase, 2.0 * phase)
}

fn euler_quat(angles: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z)
}

/// One cube of the lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    coord: LatticeCoord,
    position: Vec3,
    base_color: Color,
    color: Color,
    scale: f32,
    highlighted: bool,
    rotation: Vec3,
}

impl Entity {
    fn new(id: EntityId, coord: LatticeCoord, position: Vec3, base_color: Color) -> Self {
        Self {
            id,
            coord,
            position,
            base_color,
            color: base_color,
            scale: 1.0,
            highlighted: false,
            rotation: Vec3::ZERO,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn coord(&self) -> LatticeCoord {
        self.coord
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn base_color(&self) -> Color {
        self.base_color
    }

    /// Color currently displayed; differs from `base_color` only while highlighted.
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Euler XYZ angles from the last update.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Back to base color, unit scale, not highlighted.
    pub fn reset_appearance(&mut self) {
        self.color = self.base_color;
        self.scale = 1.0;
        self.highlighted = false;
    }

    pub fn set_highlight(&mut self, color: Color, scale: f32) {
        self.color = color;
        self.scale = scale;
        self.highlighted = true;
    }

    /// Transform relative to the grid group.
    pub fn local_transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: euler_quat(self.rotation),
            scale: Vec3::splat(self.scale),
        }
    }
}

/// The full set of animated cubes plus the shared group rotation.
///
/// Entities are stored in generation order, so `EntityId(i)` is `entities[i]`
/// and the lattice coordinate maps to an index as `x*size² + y*size + z`.
#[derive(Debug, Clone)]
pub struct EntityGrid {
    size: u32,
    entities: Vec<Entity>,
    group_rotation: Vec3,
}

impl EntityGrid {
    /// Build a `size³` lattice, drawing each base color uniformly from `palette`.
    pub fn generate<R: Rng>(
        size: u32,
        palette: &Palette,
        rng: &mut R,
    ) -> Result<Self, GridError> {
        if size == 0 || size > MAX_LATTICE_SIZE {
            return Err(GridError::InvalidSize(size));
        }
        let mut entities = Vec::with_capacity((size * size * size) as usize);
        for x in 0..size {
            for y in 0..size {
                for z in 0..size {
                    let coord = LatticeCoord::new(x, y, z);
                    let id = EntityId(entities.len() as u32);
                    entities.push(Entity::new(
                        id,
                        coord,
                        coord.centered_position(size),
                        palette.pick(rng),
                    ));
                }
            }
        }
        tracing::debug!(size, count = entities.len(), "generated entity grid");
        Ok(Self {
            size,
            entities,
            group_rotation: Vec3::ZERO,
        })
    }

    /// Default lattice and palette from a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::generate(LATTICE_SIZE, &Palette::default(), &mut rng)
            .unwrap_or_else(|_| unreachable!("default lattice parameters are valid"))
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    pub fn entity_at(&self, coord: LatticeCoord) -> Option<&Entity> {
        if coord.x >= self.size || coord.y >= self.size || coord.z >= self.size {
            return None;
        }
        let index = (coord.x * self.size + coord.y) * self.size + coord.z;
        self.entities.get(index as usize)
    }

    pub fn highlighted(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_highlighted())
    }

    pub fn group_rotation(&self) -> Vec3 {
        self.group_rotation
    }

    pub fn group_matrix(&self) -> Mat4 {
        Mat4::from_quat(euler_quat(self.group_rotation))
    }

    /// Full world matrix of one entity: group rotation, then its local transform.
    pub fn world_matrix(&self, id: EntityId) -> Option<Mat4> {
        self.entity(id)
            .map(|e| self.group_matrix() * e.local_transform().to_matrix())
    }

    /// Recompute the group rotation and every entity rotation for `elapsed`.
    pub fn update(&mut self, elapsed: f64) {
        self.group_rotation = group_rotation(elapsed);
        for entity in &mut self.entities {
            entity.rotation = entity_rotation(entity.position, elapsed);
        }
    }
}

impl Animate for EntityGrid {
    fn update(&mut self, elapsed: f64) -> Result<(), AnimateError> {
        if !elapsed.is_finite() {
            return Err(AnimateError::NonFiniteTime(elapsed));
        }
        EntityGrid::update(self, elapsed);
        Ok(())
    }

    fn label(&self) -> &str {
        "entity-grid"
    }
}
