//! # Rutherford Core Library
//!
//! The trajectory and space-transition engine behind an interactive Rutherford scattering
//! simulation: alpha particles are fired at a field of atoms, deflected by their nuclei (or
//! passed straight through, for the plum pudding model) and handed between open space and
//! the atoms they cross.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless building blocks: physical constants, 2D geometry,
//!   element presets, the `AlphaParticle` and `Atom` data models, and trace export.
//!
//! - **[`engine`]: The Logic Core.** The stateful simulation. It contains the deflection
//!   algorithm, the `Gun`, the `AtomSpace` transition protocol and the `ScatteringModel`
//!   clock that drives everything one frame at a time.
//!
//! - **[`workflows`]: The Public API.** Headless procedures that build a model from a
//!   configuration, run it and summarise the result.
//!
//! The engine is single-threaded and frame-driven: an external render loop calls
//! [`engine::model::ScatteringModel::step`] and reads particle and atom state back for drawing.

pub mod core;
pub mod engine;
pub mod workflows;
