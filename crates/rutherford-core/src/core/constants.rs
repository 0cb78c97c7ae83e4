//! Calibration constants and simulation defaults.
//!
//! The deflection algorithm is empirically calibrated against the default proton count and
//! default alpha energy below; changing them changes the shape of every trajectory.

/// Proton count the deflection algorithm is calibrated against (gold).
pub const DEFAULT_PROTON_COUNT: u32 = 79;
pub const MIN_PROTON_COUNT: u32 = 20;
pub const MAX_PROTON_COUNT: u32 = 100;

/// Neutron count of the default gold nucleus. Not used by the trajectory math.
pub const DEFAULT_NEUTRON_COUNT: u32 = 118;
pub const MIN_NEUTRON_COUNT: u32 = 20;
pub const MAX_NEUTRON_COUNT: u32 = 150;

/// Alpha energy the deflection algorithm is calibrated against. A particle's initial speed
/// equals the energy setting at the moment it leaves the gun.
pub const DEFAULT_ALPHA_ENERGY: f64 = 80.0;
pub const MIN_ALPHA_ENERGY: f64 = 40.0;
pub const MAX_ALPHA_ENERGY: f64 = 120.0;

/// Side length of the square model space.
pub const DEFAULT_SPACE_WIDTH: f64 = 255.0;

/// Nominal frame duration used by manual stepping, in seconds.
pub const NOMINAL_DT: f64 = 1.0 / 60.0;

/// Steps at least this long are rejected by the clock (e.g. after a backgrounded tab).
pub const MAX_STEP_DT: f64 = 1.0;

/// The deflection algorithm is undefined at an impact parameter of exactly zero.
pub const X0_MIN: f64 = 1e-5;

/// Divisor applied to the atom's bounding width when computing the deflection strength.
pub const L_DIVISOR: f64 = 8.0;

/// Number of particles the gun aims to keep in flight at any energy.
pub const MAX_PARTICLES: f64 = 20.0;

pub const GUN_INTENSITY: f64 = 1.0;

/// Fraction of the space width around an atom's centre that the gun refuses to fire into.
pub const X0_MIN_FRACTION: f64 = 0.04;

/// Atom bounding widths over which the gun's nudge away from a nucleus is interpolated.
pub const GUN_CORRECTION_WIDTH_RANGE: (f64, f64) = (25.0, 255.0);

/// Nudge distances matching [`GUN_CORRECTION_WIDTH_RANGE`].
pub const GUN_CORRECTION_SHIFT_RANGE: (f64, f64) = (0.5, 5.0);
