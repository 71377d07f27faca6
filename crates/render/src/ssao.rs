use glam::Vec3;
use rand::Rng;
use thiserror::Error;

/// Hemisphere sample count the occlusion shader is compiled for.
pub const MAX_KERNEL_SIZE: usize = 32;

#[derive(Debug, Error, PartialEq)]
pub enum SsaoError {
    #[error("kernel radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    #[error("kernel size must be in 1..={MAX_KERNEL_SIZE}, got {0}")]
    InvalidKernelSize(usize),
    #[error("distance window is empty: min {min} >= max {max}")]
    InvalidDistances { min: f32, max: f32 },
}

/// Screen-space ambient occlusion tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SsaoParams {
    /// Sampling radius in world units.
    pub kernel_radius: f32,
    pub kernel_size: usize,
    /// Occluders closer than this (in linear depth fraction) are ignored.
    pub min_distance: f32,
    /// Occluders farther than this do not darken.
    pub max_distance: f32,
}

impl Default for SsaoParams {
    fn default() -> Self {
        Self {
            kernel_radius: 5.0,
            kernel_size: MAX_KERNEL_SIZE,
            min_distance: 0.005,
            max_distance: 0.1,
        }
    }
}

impl SsaoParams {
    pub fn with_radius(kernel_radius: f32) -> Result<Self, SsaoError> {
        let params = Self {
            kernel_radius,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), SsaoError> {
        if !self.kernel_radius.is_finite() || self.kernel_radius <= 0.0 {
            return Err(SsaoError::InvalidRadius(self.kernel_radius));
        }
        if self.kernel_size == 0 || self.kernel_size > MAX_KERNEL_SIZE {
            return Err(SsaoError::InvalidKernelSize(self.kernel_size));
        }
        if self.min_distance >= self.max_distance {
            return Err(SsaoError::InvalidDistances {
                min: self.min_distance,
                max: self.max_distance,
            });
        }
        Ok(())
    }
}

/// Sample offsets in the unit +Z hemisphere, denser near the origin.
pub fn hemisphere_kernel<R: Rng>(size: usize, rng: &mut R) -> Vec<Vec3> {
    (0..size)
        .map(|i| {
            let raw = Vec3::new(
                rng.random::<f32>() * 2.0 - 1.0,
                rng.random::<f32>() * 2.0 - 1.0,
                rng.random::<f32>(),
            );
            let sample = raw.try_normalize().unwrap_or(Vec3::Z);
            let t = i as f32 / size as f32;
            sample * (0.1 + 0.9 * t * t)
        })
        .collect()
}
