//! Per-step particle motion inside atoms and through open space.
//!
//! The nucleus deflection is a closed-form polar recurrence, calibrated against the default
//! proton count and alpha energy. It is only valid for a particle travelling straight up (+y)
//! towards the nucleus, so every update first un-rotates the particle into the atom's frame
//! using the rotation angle recorded when the particle entered the atom, and rotates the
//! resulting displacement back afterwards. The recurrence has several singular inputs; each
//! one is reported as a [`DeflectionError`] and never produces a NaN position.

use super::error::DeflectionError;
use crate::core::constants::{DEFAULT_ALPHA_ENERGY, DEFAULT_PROTON_COUNT, L_DIVISOR, X0_MIN};
use crate::core::geometry::{rotated_about_point, unit_from_angle};
use crate::core::models::atom::{Atom, AtomKind};
use crate::core::models::ids::ParticleId;
use crate::core::models::particle::AlphaParticle;
use nalgebra::{Point2, Rotation2, Vector2};
use slotmap::SlotMap;
use tracing::trace;

/// Nucleus parameters read from the model on every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NucleusEnvironment {
    pub proton_count: u32,
    pub default_proton_count: u32,
    pub default_alpha_energy: f64,
}

impl NucleusEnvironment {
    pub fn new(proton_count: u32) -> Self {
        Self {
            proton_count,
            default_proton_count: DEFAULT_PROTON_COUNT,
            default_alpha_energy: DEFAULT_ALPHA_ENERGY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryUpdate {
    pub position: Point2<f64>,
    pub speed: f64,
    pub orientation: f64,
}

/// The per-atom motion rule applied to every particle an atom owns.
pub trait TrajectoryModel {
    fn move_particle(
        &self,
        atom: &Atom,
        particle: &mut AlphaParticle,
        environment: &NucleusEnvironment,
        dt: f64,
    ) -> Result<(), DeflectionError>;
}

/// Deflection by a compact nucleus.
#[derive(Debug, Clone, Copy, Default)]
pub struct NucleusDeflection;

/// Undeflected motion through a plum pudding atom.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightThrough;

impl TrajectoryModel for NucleusDeflection {
    fn move_particle(
        &self,
        atom: &Atom,
        particle: &mut AlphaParticle,
        environment: &NucleusEnvironment,
        dt: f64,
    ) -> Result<(), DeflectionError> {
        let update = deflect(atom, particle, environment, dt)?;
        particle.set_speed(update.speed);
        particle.set_position(update.position);
        particle.set_orientation(update.orientation);
        Ok(())
    }
}

impl TrajectoryModel for StraightThrough {
    fn move_particle(
        &self,
        _atom: &Atom,
        particle: &mut AlphaParticle,
        _environment: &NucleusEnvironment,
        dt: f64,
    ) -> Result<(), DeflectionError> {
        advance_straight(particle, dt);
        Ok(())
    }
}

pub fn trajectory_for(kind: AtomKind) -> &'static dyn TrajectoryModel {
    match kind {
        AtomKind::Rutherford => &NucleusDeflection,
        AtomKind::PlumPudding => &StraightThrough,
    }
}

/// Constant-velocity motion along the particle's orientation.
pub fn advance_straight(particle: &mut AlphaParticle, dt: f64) {
    let displacement = unit_from_angle(particle.orientation()) * (particle.speed() * dt);
    particle.set_position(particle.position() + displacement);
}

/// Computes one step of the nucleus deflection without modifying the particle.
pub fn deflect(
    atom: &Atom,
    particle: &AlphaParticle,
    environment: &NucleusEnvironment,
    dt: f64,
) -> Result<TrajectoryUpdate, DeflectionError> {
    let center = atom.position();
    let rotation_angle = particle.rotation_angle();

    let corrected_initial = rotated_about_point(&particle.initial_position(), &center, -rotation_angle);
    let corrected_position = rotated_about_point(&particle.position(), &center, -rotation_angle);

    // Entry point relative to the nucleus. x0 = 0 is singular.
    let x0 = (corrected_initial.x - center.x).abs().max(X0_MIN);
    let y0 = corrected_initial.y - center.y;

    // The recurrence assumes x >= 0; the result is mirrored back at the end.
    let signed_x = corrected_position.x - center.x;
    let y = corrected_position.y - center.y;
    let x_was_negative = signed_x < 0.0;
    let x = signed_x.abs();

    let l = atom.bounding_rect().width();
    let p = environment.proton_count as f64;
    let pd = environment.default_proton_count as f64;
    let s = particle.speed();
    let s0 = particle.initial_speed();
    let sd = environment.default_alpha_energy;

    if pd <= 0.0 {
        return Err(DeflectionError::NonPositiveDefaultProtonCount);
    }
    if s0 == 0.0 {
        return Err(DeflectionError::ZeroInitialSpeed);
    }
    let d = (l / L_DIVISOR) * (p / pd) * ((sd * sd) / (s0 * s0));

    let b = impact_parameter(x0, y0, d)?;

    // Polar form, angle measured counterclockwise from the -y axis.
    let r = (x * x + y * y).sqrt();
    if r == 0.0 {
        return Err(DeflectionError::ZeroRadius);
    }
    let phi = x.atan2(-y);

    let t1 = b * phi.cos() - (d / 2.0) * phi.sin();
    let phi_radicand = b.powi(4) + r * r * t1 * t1;
    if !(phi_radicand > 0.0) {
        return Err(DeflectionError::NegativeAngularRadicand(phi_radicand));
    }
    let phi_new = phi + (b * b * s * dt) / (r * phi_radicand.sqrt());

    let t2 = b * phi_new.sin() + (d / 2.0) * (phi_new.cos() - 1.0);
    if t2 < 0.0 {
        return Err(DeflectionError::NegativeRadialDenominator(t2));
    }
    let r_new = ((b * b) / t2).abs();
    if r_new == 0.0 || !r_new.is_finite() {
        return Err(DeflectionError::ZeroNewRadius);
    }

    let s_new = speed_at(s0, d, r_new)?;

    let mut x_new = r_new * phi_new.sin();
    if x_was_negative {
        x_new = -x_new;
    }
    let y_new = -r_new * phi_new.cos();

    let local_delta = Vector2::new(x_new - signed_x, y_new - y);
    let delta = Rotation2::new(rotation_angle) * local_delta;
    checked_update(TrajectoryUpdate {
        position: particle.position() + delta,
        speed: s_new,
        orientation: phi_new,
    })
}

/// Distance `b` between the nucleus and the incoming asymptote of a particle that entered at
/// `(x0, y0)` relative to the nucleus.
fn impact_parameter(x0: f64, y0: f64, d: f64) -> Result<f64, DeflectionError> {
    let b1 = (x0 * x0 + y0 * y0).sqrt();
    if !(b1 > 0.0) {
        return Err(DeflectionError::DegenerateEntryDistance(b1));
    }
    let b_radicand = -2.0 * d * b1 - 2.0 * d * y0 + x0 * x0;
    if !(b_radicand >= 0.0) {
        return Err(DeflectionError::NegativeImpactRadicand(b_radicand));
    }
    let b = 0.5 * (x0 + b_radicand.sqrt());
    if !(b > 0.0) {
        return Err(DeflectionError::NonPositiveImpactParameter(b));
    }
    Ok(b)
}

/// Speed at distance `r_new` from the nucleus for a particle launched at `s0`.
fn speed_at(s0: f64, d: f64, r_new: f64) -> Result<f64, DeflectionError> {
    let speed_radicand = 1.0 - d / r_new;
    if !(speed_radicand > 0.0) {
        return Err(DeflectionError::NonPositiveSpeedRadicand(speed_radicand));
    }
    Ok(s0 * speed_radicand.sqrt())
}

fn checked_update(update: TrajectoryUpdate) -> Result<TrajectoryUpdate, DeflectionError> {
    let finite = update.position.x.is_finite()
        && update.position.y.is_finite()
        && update.speed.is_finite()
        && update.orientation.is_finite();
    if !finite {
        return Err(DeflectionError::NonFiniteResult);
    }
    Ok(update)
}

/// Moves every particle owned by `atom` one step.
///
/// Particles whose update fails are released from the atom and returned with the reason; the
/// caller decides what becomes of them. Iterates over a snapshot of the owned set, so releasing
/// a particle never skips another.
pub fn move_atom_particles(
    atom: &mut Atom,
    particles: &mut SlotMap<ParticleId, AlphaParticle>,
    environment: &NucleusEnvironment,
    dt: f64,
) -> Vec<(ParticleId, DeflectionError)> {
    let model = trajectory_for(atom.kind());
    let owned = atom.particles().to_vec();
    let mut failures = Vec::new();

    for id in owned {
        let Some(particle) = particles.get_mut(id) else {
            atom.forget_particle(id);
            continue;
        };
        if let Err(reason) = model.move_particle(atom, particle, environment, dt) {
            trace!(particle = ?id, atom = ?atom.id(), %reason, "Releasing particle from atom.");
            atom.remove_particle(id, particle);
            failures.push((id, reason));
        }
    }
    failures
}
