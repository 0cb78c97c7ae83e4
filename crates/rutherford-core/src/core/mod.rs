//! # Core Module
//!
//! Stateless building blocks of the scattering engine.
//!
//! - **Constants** ([`constants`]) - Calibration constants of the deflection algorithm and the
//!   default settings of the simulation
//! - **Geometry** ([`geometry`]) - Rectangles, rotated rectangles, circles and rotations about a point
//! - **Elements** ([`elements`]) - Compile-time table of target-foil element presets
//! - **Models** ([`models`]) - Alpha particles, atoms and their identifiers
//! - **I/O** ([`io`]) - Export of particle traces

pub mod constants;
pub mod elements;
pub mod geometry;
pub mod io;
pub mod models;
