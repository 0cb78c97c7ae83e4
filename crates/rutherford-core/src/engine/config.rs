use crate::core::constants::{
    DEFAULT_ALPHA_ENERGY, DEFAULT_NEUTRON_COUNT, DEFAULT_PROTON_COUNT, DEFAULT_SPACE_WIDTH,
    MAX_ALPHA_ENERGY, MAX_NEUTRON_COUNT, MAX_PROTON_COUNT, MIN_ALPHA_ENERGY, MIN_NEUTRON_COUNT,
    MIN_PROTON_COUNT,
};
use crate::core::geometry::Rect;
use crate::core::models::atom::AtomKind;
use nalgebra::Point2;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Space must be square, got {width} x {height}")]
    NonSquareSpace { width: f64, height: f64 },

    #[error("Parameter '{name}' must be positive, got {value}")]
    NonPositiveDimension { name: &'static str, value: f64 },

    #[error("Parameter '{name}' = {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("At least one scene is required")]
    NoScenes,

    #[error("Visible scene index {index} is out of range ({count} scenes)")]
    InvalidVisibleScene { index: usize, count: usize },

    #[error("Invalid layout for scene '{scene}': {reason}")]
    InvalidLayout { scene: String, reason: String },
}

/// What happens to a particle whose deflection hits a numerical singularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// The particle leaves the atom undeflected and continues through open space.
    #[default]
    ReturnToSpace,
    /// The particle is disposed of.
    Discard,
}

impl FromStr for FailurePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "return-to-space" | "return_to_space" | "return" => Ok(FailurePolicy::ReturnToSpace),
            "discard" => Ok(FailurePolicy::Discard),
            _ => Err(()),
        }
    }
}

/// Arrangement of the atoms inside a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomLayout {
    /// One atom centred on the origin. Without a width the atom fills the whole space.
    Single { width: Option<f64> },
    /// A centred grid of atoms whose bounding squares tile the space.
    Lattice { rows: usize, columns: usize },
}

impl Default for AtomLayout {
    fn default() -> Self {
        AtomLayout::Single { width: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub name: String,
    pub atom_kind: AtomKind,
    pub layout: AtomLayout,
}

impl SceneConfig {
    pub fn new(name: &str, atom_kind: AtomKind, layout: AtomLayout) -> Self {
        Self {
            name: name.to_string(),
            atom_kind,
            layout,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidLayout {
            scene: self.name.clone(),
            reason: reason.to_string(),
        };
        match self.layout {
            AtomLayout::Single { width: Some(width) } if !(width > 0.0) => {
                Err(invalid("atom width must be positive"))
            }
            AtomLayout::Lattice { rows, columns } if rows == 0 || columns == 0 => {
                Err(invalid("lattice needs at least one row and one column"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceDimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NucleusConfig {
    pub proton_count: u32,
    pub neutron_count: u32,
}

/// Everything needed to build a [`ScatteringModel`](super::model::ScatteringModel).
///
/// The proton count, neutron count and alpha energy are the values the model starts with and
/// returns to on reset.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub space: SpaceDimensions,
    pub nucleus: NucleusConfig,
    pub alpha_energy: f64,
    pub scenes: Vec<SceneConfig>,
    pub visible_scene: usize,
    pub seed: Option<u64>,
    pub failure_policy: FailurePolicy,
}

impl SimulationConfig {
    /// Model bounds: the space centred on the origin.
    pub fn bounds(&self) -> Rect {
        Rect::centered(Point2::origin(), self.space.width, self.space.height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let SpaceDimensions { width, height } = self.space;
        if !(width > 0.0) {
            return Err(ConfigError::NonPositiveDimension {
                name: "space_width",
                value: width,
            });
        }
        if !(height > 0.0) {
            return Err(ConfigError::NonPositiveDimension {
                name: "space_height",
                value: height,
            });
        }
        // The deflection frame rotation assumes a square space.
        if width != height {
            return Err(ConfigError::NonSquareSpace { width, height });
        }

        check_range(
            "proton_count",
            self.nucleus.proton_count as f64,
            MIN_PROTON_COUNT as f64,
            MAX_PROTON_COUNT as f64,
        )?;
        check_range(
            "neutron_count",
            self.nucleus.neutron_count as f64,
            MIN_NEUTRON_COUNT as f64,
            MAX_NEUTRON_COUNT as f64,
        )?;
        check_range(
            "alpha_energy",
            self.alpha_energy,
            MIN_ALPHA_ENERGY,
            MAX_ALPHA_ENERGY,
        )?;

        if self.scenes.is_empty() {
            return Err(ConfigError::NoScenes);
        }
        if self.visible_scene >= self.scenes.len() {
            return Err(ConfigError::InvalidVisibleScene {
                index: self.visible_scene,
                count: self.scenes.len(),
            });
        }
        self.scenes.iter().try_for_each(SceneConfig::validate)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            space: SpaceDimensions {
                width: DEFAULT_SPACE_WIDTH,
                height: DEFAULT_SPACE_WIDTH,
            },
            nucleus: NucleusConfig {
                proton_count: DEFAULT_PROTON_COUNT,
                neutron_count: DEFAULT_NEUTRON_COUNT,
            },
            alpha_energy: DEFAULT_ALPHA_ENERGY,
            scenes: vec![SceneConfig::new(
                "nucleus",
                AtomKind::Rutherford,
                AtomLayout::default(),
            )],
            visible_scene: 0,
            seed: None,
            failure_policy: FailurePolicy::default(),
        }
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value < min || value > max || value.is_nan() {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    space_width: Option<f64>,
    space_height: Option<f64>,
    proton_count: Option<u32>,
    neutron_count: Option<u32>,
    alpha_energy: Option<f64>,
    scenes: Vec<SceneConfig>,
    visible_scene: Option<usize>,
    seed: Option<u64>,
    failure_policy: Option<FailurePolicy>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn space_width(mut self, width: f64) -> Self {
        self.space_width = Some(width);
        self
    }
    pub fn space_height(mut self, height: f64) -> Self {
        self.space_height = Some(height);
        self
    }
    pub fn proton_count(mut self, count: u32) -> Self {
        self.proton_count = Some(count);
        self
    }
    pub fn neutron_count(mut self, count: u32) -> Self {
        self.neutron_count = Some(count);
        self
    }
    pub fn alpha_energy(mut self, energy: f64) -> Self {
        self.alpha_energy = Some(energy);
        self
    }
    pub fn scene(mut self, scene: SceneConfig) -> Self {
        self.scenes.push(scene);
        self
    }
    pub fn visible_scene(mut self, index: usize) -> Self {
        self.visible_scene = Some(index);
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let config = SimulationConfig {
            space: SpaceDimensions {
                width: self
                    .space_width
                    .ok_or(ConfigError::MissingParameter("space_width"))?,
                height: self
                    .space_height
                    .ok_or(ConfigError::MissingParameter("space_height"))?,
            },
            nucleus: NucleusConfig {
                proton_count: self.proton_count.unwrap_or(DEFAULT_PROTON_COUNT),
                neutron_count: self.neutron_count.unwrap_or(DEFAULT_NEUTRON_COUNT),
            },
            alpha_energy: self.alpha_energy.unwrap_or(DEFAULT_ALPHA_ENERGY),
            scenes: self.scenes,
            visible_scene: self.visible_scene.unwrap_or(0),
            seed: self.seed,
            failure_policy: self.failure_policy.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
