//! # Core Models Module
//!
//! Data structures for the particles and atoms of the scattering simulation.
//!
//! - [`particle`] - An alpha particle's trajectory state, trace and transition bookkeeping
//! - [`atom`] - An atom: a fixed bounding square that owns the particles currently inside it
//! - [`ids`] - Arena keys for particles and atoms
//!
//! Ownership runs one way: the model's particle arena owns every `AlphaParticle`, while atoms
//! and spaces refer to particles only through [`ids::ParticleId`]. A particle's links back to
//! atoms are likewise plain [`ids::AtomId`] handles, never owning references.

pub mod atom;
pub mod ids;
pub mod particle;
