use cubefield_common::{EntityId, Ray, Viewport};
use cubefield_input::to_ndc;
use cubefield_kernel::{CUBE_EDGE, EntityGrid};
use cubefield_render::PerspectiveCamera;
use glam::{Mat4, Vec2, Vec3};

const PARALLEL_EPSILON: f32 = 1e-8;

/// One ray intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub entity: EntityId,
    /// Distance from the ray origin in world units.
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PickResult {
    #[default]
    Miss,
    Hit(Hit),
}

impl PickResult {
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            PickResult::Hit(hit) => Some(hit.entity),
            PickResult::Miss => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, PickResult::Hit(_))
    }
}

/// Something a ray can be tested against.
pub trait Raycast {
    /// Nearest hit along `ray`. Equal distances keep the earliest entity in
    /// traversal order.
    fn raycast(&self, ray: &Ray) -> Option<Hit>;
}

impl Raycast for EntityGrid {
    fn raycast(&self, ray: &Ray) -> Option<Hit> {
        let group = self.group_matrix();
        let half = CUBE_EDGE * 0.5;
        nearest_hit(self.entities().iter().filter_map(|entity| {
            let world = group * entity.local_transform().to_matrix();
            intersect_oriented_box(ray, world, half).map(|distance| Hit {
                entity: entity.id(),
                distance,
            })
        }))
    }
}

/// Nearest of `hits`; on equal distances the earliest one is kept.
pub fn nearest_hit(hits: impl IntoIterator<Item = Hit>) -> Option<Hit> {
    hits.into_iter().fold(None, |best, hit| match best {
        Some(b) if b.distance <= hit.distance => Some(b),
        _ => Some(hit),
    })
}

/// Distance to a box of half-extent `half` centered at the origin of
/// `world`'s local space, or `None` when missed or the matrix is singular.
pub fn intersect_oriented_box(ray: &Ray, world: Mat4, half: f32) -> Option<f32> {
    let inverse = world.inverse();
    if !inverse.is_finite() {
        return None;
    }
    // Local direction is left unnormalized so local `t` equals world distance.
    let origin = inverse.transform_point3(ray.origin);
    let direction = inverse.transform_vector3(ray.direction);
    intersect_aabb(origin, direction, Vec3::splat(-half), Vec3::splat(half))
}

/// Slab test. Returns the entry distance. A box that contains the origin is
/// not hit: only front faces are drawn, so it is invisible from inside.
pub fn intersect_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < PARALLEL_EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (t0, t1) = {
            let a = (min[axis] - o) * inv;
            let b = (max[axis] - o) * inv;
            if a <= b { (a, b) } else { (b, a) }
        };
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }
    (t_near >= 0.0).then_some(t_near)
}

/// Casts camera rays through screen points.
#[derive(Debug, Clone, Copy)]
pub struct Picker {
    /// Hits beyond this distance are ignored.
    pub max_distance: f32,
}

impl Default for Picker {
    fn default() -> Self {
        Self {
            max_distance: f32::INFINITY,
        }
    }
}

impl Picker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the nearest entity under `pointer` (client coordinates, logical
    /// pixels). O(total entities); a miss is a normal result.
    pub fn pick(
        &self,
        pointer: Vec2,
        viewport: Viewport,
        camera: &PerspectiveCamera,
        targets: &[&dyn Raycast],
    ) -> PickResult {
        let ray = camera.ray_from_ndc(to_ndc(pointer, viewport));
        self.pick_ray(&ray, targets)
    }

    pub fn pick_ray(&self, ray: &Ray, targets: &[&dyn Raycast]) -> PickResult {
        if ray.is_degenerate() {
            return PickResult::Miss;
        }
        let hits = targets
            .iter()
            .filter_map(|target| target.raycast(ray))
            .filter(|hit| hit.distance <= self.max_distance);
        nearest_hit(hits).map_or(PickResult::Miss, PickResult::Hit)
    }
}
