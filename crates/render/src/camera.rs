use cubefield_common::Ray;
use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Perspective camera looking at a target point.
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(20.0, 20.0, 20.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 50.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 300.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Projection with wgpu's `[0, 1]` depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(1e-6), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the camera through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let through = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(self.position, through - self.position)
    }
}

/// Orbit-around-target controls with damped rotation.
///
/// Pending rotation is applied a `damping` fraction per update and decays by
/// `1 - damping`, so the camera glides to a stop after a drag ends.
pub struct OrbitControls {
    pub target: Vec3,
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    theta_delta: f32,
    phi_delta: f32,
    zoom_scale: f32,
}

const POLAR_EPSILON: f32 = 1e-6;

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            damping: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 1.0,
            max_distance: 200.0,
            theta_delta: 0.0,
            phi_delta: 0.0,
            zoom_scale: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn with_damping(damping: f32) -> Self {
        Self {
            damping: damping.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    /// Queue a rotation from a drag of `delta` logical pixels; a drag across
    /// the full viewport height turns a full circle.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: u32) {
        let height = viewport_height.max(1) as f32;
        self.theta_delta -= TAU * delta.x / height * self.rotate_speed;
        self.phi_delta -= TAU * delta.y / height * self.rotate_speed;
    }

    /// Queue a zoom; positive steps move the camera closer.
    pub fn zoom(&mut self, steps: f32) {
        self.zoom_scale *= 0.95_f32.powf(steps * self.zoom_speed);
    }

    /// Whether rotation is still gliding.
    pub fn is_settling(&self) -> bool {
        self.theta_delta.abs() > POLAR_EPSILON || self.phi_delta.abs() > POLAR_EPSILON
    }

    /// Apply pending motion to `camera`. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return false;
        }

        let (theta_step, phi_step) = if self.damping > 0.0 {
            (self.theta_delta * self.damping, self.phi_delta * self.damping)
        } else {
            (self.theta_delta, self.phi_delta)
        };

        let theta = offset.x.atan2(offset.z) + theta_step;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + phi_step)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        let radius = (radius * self.zoom_scale).clamp(self.min_distance, self.max_distance);

        let new_offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let previous = camera.position;
        camera.position = self.target + new_offset;
        camera.target = self.target;

        if self.damping > 0.0 {
            self.theta_delta *= 1.0 - self.damping;
            self.phi_delta *= 1.0 - self.damping;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
        }
        self.zoom_scale = 1.0;

        previous.distance_squared(camera.position) > POLAR_EPSILON
    }
}
