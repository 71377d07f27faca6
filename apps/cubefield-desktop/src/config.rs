use cubefield_common::Color;
use cubefield_kernel::{DEFAULT_PALETTE, LATTICE_SIZE, MAX_LATTICE_SIZE, Palette};
use cubefield_pick::HIGHLIGHT_SCALE;
use cubefield_render::SsaoParams;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scene config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("palette must not be empty")]
    EmptyPalette,
    #[error("lattice size must be in 1..={max}, got {size}")]
    LatticeSize { size: u32, max: u32 },
    #[error("kernel radius must be positive, got {0}")]
    KernelRadius(f32),
    #[error("highlight scale must be positive, got {0}")]
    HighlightScale(f32),
    #[error("field of view must be between 0 and 180 degrees, got {0}")]
    FieldOfView(f32),
    #[error("damping must be in [0, 1], got {0}")]
    Damping(f32),
    #[error("camera position {0:?} must be finite and away from the origin it orbits")]
    CameraPosition([f32; 3]),
}

/// Scene settings loaded from YAML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub lattice_size: u32,
    pub palette: Vec<Color>,
    pub highlight_color: Color,
    pub highlight_scale: f32,
    pub background: Color,
    pub kernel_radius: f32,
    pub camera_position: [f32; 3],
    pub fov_degrees: f32,
    pub damping: f32,
    /// Fixed seed for palette draws; random when absent.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            lattice_size: LATTICE_SIZE,
            palette: DEFAULT_PALETTE.to_vec(),
            highlight_color: Color::WHITE,
            highlight_scale: HIGHLIGHT_SCALE,
            background: Color::from_hex(0xa7d2f2),
            kernel_radius: 5.0,
            camera_position: [20.0, 20.0, 20.0],
            fov_degrees: 50.0,
            damping: 0.05,
            seed: None,
        }
    }
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        tracing::info!(path = %path.display(), "loaded scene config");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if self.lattice_size == 0 || self.lattice_size > MAX_LATTICE_SIZE {
            return Err(ConfigError::LatticeSize {
                size: self.lattice_size,
                max: MAX_LATTICE_SIZE,
            });
        }
        if !(self.kernel_radius > 0.0 && self.kernel_radius.is_finite()) {
            return Err(ConfigError::KernelRadius(self.kernel_radius));
        }
        if !(self.highlight_scale > 0.0 && self.highlight_scale.is_finite()) {
            return Err(ConfigError::HighlightScale(self.highlight_scale));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::FieldOfView(self.fov_degrees));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(ConfigError::Damping(self.damping));
        }
        let camera = Vec3::from_array(self.camera_position);
        if !camera.is_finite() || camera.length_squared() < f32::EPSILON {
            return Err(ConfigError::CameraPosition(self.camera_position));
        }
        Ok(())
    }

    pub fn palette(&self) -> Result<Palette, ConfigError> {
        Palette::new(self.palette.clone()).map_err(|_| ConfigError::EmptyPalette)
    }

    pub fn ssao_params(&self) -> SsaoParams {
        SsaoParams {
            kernel_radius: self.kernel_radius,
            ..SsaoParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.lattice_size, 10);
        assert_eq!(config.palette.len(), 5);
        assert_eq!(config.kernel_radius, 5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = SceneConfig::from_yaml("lattice_size: 4\nseed: 9\n").unwrap();
        assert_eq!(config.lattice_size, 4);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.palette, DEFAULT_PALETTE.to_vec());
    }

    #[test]
    fn colors_parse_from_hex_strings() {
        let yaml = "palette: ['#ff0000', '#00ff00']\nhighlight_color: '#000000'\n";
        let config = SceneConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.palette, vec![Color::from_hex(0xff0000), Color::from_hex(0x00ff00)]);
        assert_eq!(config.highlight_color, Color::BLACK);
    }

    #[test]
    fn malformed_color_is_a_parse_error() {
        let err = SceneConfig::from_yaml("background: blue\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            SceneConfig::from_yaml("lattice: 3\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let empty = SceneConfig {
            palette: vec![],
            ..SceneConfig::default()
        };
        assert!(matches!(empty.validate(), Err(ConfigError::EmptyPalette)));
        assert!(matches!(empty.palette(), Err(ConfigError::EmptyPalette)));

        let zero = SceneConfig {
            lattice_size: 0,
            ..SceneConfig::default()
        };
        assert!(matches!(zero.validate(), Err(ConfigError::LatticeSize { size: 0, .. })));

        let radius = SceneConfig {
            kernel_radius: 0.0,
            ..SceneConfig::default()
        };
        assert!(matches!(radius.validate(), Err(ConfigError::KernelRadius(_))));

        let damping = SceneConfig {
            damping: 1.5,
            ..SceneConfig::default()
        };
        assert!(matches!(damping.validate(), Err(ConfigError::Damping(_))));
    }

    #[test]
    fn camera_on_its_target_is_rejected() {
        let config = SceneConfig::from_yaml("camera_position: [0.0, 0.0, 0.0]\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CameraPosition([0.0, 0.0, 0.0]))
        ));
        let moved = SceneConfig {
            camera_position: [0.0, 0.0, 3.0],
            ..SceneConfig::default()
        };
        assert!(moved.validate().is_ok());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "kernel_radius: 2.5").unwrap();
        writeln!(file, "camera_position: [0.0, 10.0, 30.0]").unwrap();
        let config = SceneConfig::load(file.path()).unwrap();
        assert_eq!(config.kernel_radius, 2.5);
        assert_eq!(config.camera_position, [0.0, 10.0, 30.0]);
        assert_eq!(config.ssao_params().kernel_radius, 2.5);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("nope.yaml"));
    }

    #[test]
    fn round_trips_through_yaml() {
        let config = SceneConfig {
            seed: Some(3),
            ..SceneConfig::default()
        };
        let text = serde_yaml::to_string(&config).unwrap();
        assert_eq!(SceneConfig::from_yaml(&text).unwrap(), config);
    }
}
