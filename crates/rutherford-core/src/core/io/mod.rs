//! Export of simulation output.

pub mod trace;
