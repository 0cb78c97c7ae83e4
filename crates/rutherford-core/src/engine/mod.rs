//! # Engine Module
//!
//! The stateful scattering simulation, driven one frame at a time.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Space dimensions, starting parameters, scenes and policies
//! - **Error Handling** ([`error`]) - Construction errors and the deflection failure taxonomy
//! - **Events** ([`events`]) - Diagnostic notifications for view code and tooling
//! - **Progress** ([`progress`]) - Progress reporting for long headless runs
//! - **Trajectories** ([`trajectory`]) - Nucleus deflection and straight-line motion
//! - **Gun** ([`gun`]) - Periodic emission of alpha particles
//! - **Atom Spaces** ([`space`]) - Hand-over of particles between open space and atoms
//! - **Layouts** ([`layout`]) - Placement of atoms inside a space
//! - **Model** ([`model`]) - The clock owning the gun, the spaces and every live particle
//!
//! ## Frame Flow
//!
//! `ScatteringModel::step` fires the gun into the visible space, lets that space transition
//! and move its particles, then culls particles that left the model bounds.

pub mod config;
pub mod error;
pub mod events;
pub mod gun;
pub mod layout;
pub mod model;
pub mod progress;
pub mod space;
pub mod trajectory;
