use super::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Atoms {first} and {second} in scene '{scene}' have overlapping bounding boxes")]
    OverlappingAtoms {
        scene: String,
        first: usize,
        second: usize,
    },

    #[error("Scene '{0}' contains no atoms")]
    EmptyScene(String),

    #[error("Scene index {index} is out of range ({count} scenes available)")]
    SceneNotFound { index: usize, count: usize },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

/// Numerical failures of the nucleus deflection algorithm.
///
/// None of these is fatal: the atom releases the particle and the simulation keeps running.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum DeflectionError {
    #[error("Default proton count must be positive")]
    NonPositiveDefaultProtonCount,

    #[error("Particle has zero initial speed")]
    ZeroInitialSpeed,

    #[error("Entry distance from the nucleus is degenerate: {0}")]
    DegenerateEntryDistance(f64),

    #[error("Negative radicand {0} while computing the asymptote distance")]
    NegativeImpactRadicand(f64),

    #[error("Non-positive asymptote distance {0}")]
    NonPositiveImpactParameter(f64),

    #[error("Particle sits on the nucleus")]
    ZeroRadius,

    #[error("Negative radicand {0} while advancing the polar angle")]
    NegativeAngularRadicand(f64),

    #[error("Negative radial denominator {0}")]
    NegativeRadialDenominator(f64),

    #[error("New radius is zero or undefined")]
    ZeroNewRadius,

    #[error("Non-positive speed radicand {0}")]
    NonPositiveSpeedRadicand(f64),

    #[error("Trajectory update produced a non-finite value")]
    NonFiniteResult,
}
