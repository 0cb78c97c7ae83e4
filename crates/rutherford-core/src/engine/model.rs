use super::config::SimulationConfig;
use super::error::EngineError;
use super::events::{EventReporter, SimulationEvent};
use super::gun::Gun;
use super::space::AtomSpace;
use super::trajectory::NucleusEnvironment;
use crate::core::constants::{
    MAX_ALPHA_ENERGY, MAX_NEUTRON_COUNT, MAX_PROTON_COUNT, MAX_STEP_DT, MIN_ALPHA_ENERGY,
    MIN_NEUTRON_COUNT, MIN_PROTON_COUNT, NOMINAL_DT,
};
use crate::core::geometry::Rect;
use crate::core::models::atom::{Atom, AtomSnapshot};
use crate::core::models::ids::{AtomId, ParticleId};
use crate::core::models::particle::{AlphaParticle, ParticleSnapshot};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use slotmap::SlotMap;
use tracing::{debug, info, instrument, warn};

/// Running totals kept by a [`ScatteringModel`]. Reset does not clear them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulationStats {
    pub frames_advanced: u64,
    pub steps_rejected: u64,
    pub model_time: f64,
    pub particles_emitted: u64,
    pub particles_culled: u64,
    pub particles_cleared: u64,
    pub particles_discarded: u64,
    pub deflection_failures: u64,
}

/// The simulation clock.
///
/// Owns every live particle, the gun and one [`AtomSpace`] per configured scene. Exactly one
/// space is visible at a time and only that space receives and moves particles. Proton count,
/// neutron count, alpha energy, `running` and `user_interaction` are external inputs read on
/// every step.
#[derive(Debug)]
pub struct ScatteringModel {
    config: SimulationConfig,
    bounds: Rect,
    particles: SlotMap<ParticleId, AlphaParticle>,
    atom_spaces: Vec<AtomSpace>,
    visible_space: usize,
    gun: Gun,
    rng: StdRng,
    running: bool,
    user_interaction: bool,
    proton_count: u32,
    neutron_count: u32,
    alpha_particle_energy: f64,
    stats: SimulationStats,
    reporter: EventReporter,
}

impl ScatteringModel {
    /// Builds the model and every scene described by `config`.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration or when a scene's atoms overlap.
    #[instrument(skip_all, name = "scattering_model_new")]
    pub fn new(config: SimulationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let bounds = config.bounds();

        let mut atom_spaces = config
            .scenes
            .iter()
            .map(|scene| AtomSpace::from_scene(scene, bounds))
            .collect::<Result<Vec<_>, _>>()?;
        atom_spaces[config.visible_scene].set_visible(true);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            scenes = atom_spaces.len(),
            visible = %atom_spaces[config.visible_scene].name(),
            width = bounds.width(),
            "Scattering model ready."
        );

        Ok(Self {
            bounds,
            particles: SlotMap::with_key(),
            atom_spaces,
            visible_space: config.visible_scene,
            gun: Gun::new(),
            rng,
            running: true,
            user_interaction: false,
            proton_count: config.nucleus.proton_count,
            neutron_count: config.nucleus.neutron_count,
            alpha_particle_energy: config.alpha_energy,
            stats: SimulationStats::default(),
            reporter: EventReporter::new(),
            config,
        })
    }

    pub fn with_event_reporter(mut self, reporter: EventReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn set_event_reporter(&mut self, reporter: EventReporter) {
        self.reporter = reporter;
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Physics runs only while running, outside user interaction and for `0 <= dt < 1`.
    /// A [`SimulationEvent::Stepped`] is emitted either way.
    pub fn step(&mut self, dt: f64) {
        if self.running && !self.user_interaction {
            if (0.0..MAX_STEP_DT).contains(&dt) {
                self.advance(dt);
            } else {
                warn!(dt, "Rejecting step outside the accepted range.");
                self.stats.steps_rejected += 1;
            }
        }
        self.reporter.report(SimulationEvent::Stepped);
    }

    /// Advances one nominal frame, even while paused.
    pub fn manual_step(&mut self) {
        if !self.user_interaction {
            self.advance(NOMINAL_DT);
        }
        self.reporter.report(SimulationEvent::Stepped);
    }

    fn advance(&mut self, dt: f64) {
        let space = &mut self.atom_spaces[self.visible_space];

        let fired = self.gun.step(
            dt,
            &self.bounds,
            self.alpha_particle_energy,
            space.atoms(),
            &mut self.rng,
        );
        if let Some(particle) = fired {
            let id = self.particles.insert(particle);
            let particle = &mut self.particles[id];
            space.add_particle(id, particle);
            debug!(particle = ?id, x = particle.position().x, "Gun fired.");
            self.stats.particles_emitted += 1;
            self.reporter.report(SimulationEvent::ParticleEmitted { particle: id });
        }

        let environment = NucleusEnvironment::new(self.proton_count);
        let outcome = space.move_particles(
            &mut self.particles,
            &environment,
            dt,
            self.config.failure_policy,
            &self.reporter,
        );
        self.stats.deflection_failures += outcome.released as u64;
        for id in outcome.discarded {
            if self.particles.remove(id).is_some() {
                self.stats.particles_discarded += 1;
            }
        }

        self.cull_particles();
        self.stats.frames_advanced += 1;
        self.stats.model_time += dt;
    }

    /// Disposes of every particle outside the model bounds. Returns how many were removed.
    pub fn cull_particles(&mut self) -> usize {
        let outside: Vec<ParticleId> = self
            .particles
            .iter()
            .filter(|(_, particle)| !self.bounds.contains_point(&particle.position()))
            .map(|(id, _)| id)
            .collect();

        for &id in &outside {
            if let Some(mut particle) = self.particles.remove(id) {
                for space in &mut self.atom_spaces {
                    if space.contains_particle(id) {
                        space.remove_particle(id, &mut particle);
                    }
                }
                debug!(particle = ?id, "Particle left the model bounds.");
                self.reporter.report(SimulationEvent::ParticleCulled { particle: id });
            }
        }
        self.stats.particles_culled += outside.len() as u64;
        outside.len()
    }

    /// Disposes of every particle in every space.
    pub fn remove_all_particles(&mut self) {
        let count = self.particles.len();
        for space in &mut self.atom_spaces {
            space.clear_particles();
        }
        self.particles.clear();

        if count > 0 {
            debug!(count, "Cleared all particles.");
            self.stats.particles_cleared += count as u64;
            self.reporter.report(SimulationEvent::ParticlesCleared { count });
        }
    }

    /// Turns the gun off, disposes of all particles and restores the starting parameters.
    pub fn reset(&mut self) {
        info!("Resetting scattering model.");
        self.gun.reset();
        self.remove_all_particles();
        self.proton_count = self.config.nucleus.proton_count;
        self.neutron_count = self.config.nucleus.neutron_count;
        self.alpha_particle_energy = self.config.alpha_energy;
        self.running = true;
    }

    /// Starting user interaction clears every particle immediately.
    pub fn set_user_interaction(&mut self, active: bool) {
        self.user_interaction = active;
        if active {
            self.remove_all_particles();
        }
    }

    pub fn set_proton_count(&mut self, count: u32) {
        let count = count.clamp(MIN_PROTON_COUNT, MAX_PROTON_COUNT);
        if count != self.proton_count {
            self.proton_count = count;
            self.remove_all_particles();
        }
    }

    pub fn set_neutron_count(&mut self, count: u32) {
        let count = count.clamp(MIN_NEUTRON_COUNT, MAX_NEUTRON_COUNT);
        if count != self.neutron_count {
            self.neutron_count = count;
            self.remove_all_particles();
        }
    }

    /// Non-finite energies are ignored.
    pub fn set_alpha_particle_energy(&mut self, energy: f64) {
        if !energy.is_finite() {
            return;
        }
        let energy = energy.clamp(MIN_ALPHA_ENERGY, MAX_ALPHA_ENERGY);
        if energy != self.alpha_particle_energy {
            self.alpha_particle_energy = energy;
            self.remove_all_particles();
        }
    }

    /// Makes the scene at `index` the only visible one, disposing of all particles.
    pub fn set_visible_scene(&mut self, index: usize) -> Result<(), EngineError> {
        if index >= self.atom_spaces.len() {
            return Err(EngineError::SceneNotFound {
                index,
                count: self.atom_spaces.len(),
            });
        }
        if index == self.visible_space {
            return Ok(());
        }

        self.remove_all_particles();
        self.atom_spaces[self.visible_space].set_visible(false);
        self.atom_spaces[index].set_visible(true);
        self.visible_space = index;
        info!(scene = %self.atom_spaces[index].name(), "Switched visible scene.");
        Ok(())
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn set_gun_on(&mut self, on: bool) {
        self.gun.set_on(on);
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    pub fn gun(&self) -> &Gun {
        &self.gun
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn user_interaction(&self) -> bool {
        self.user_interaction
    }

    pub fn proton_count(&self) -> u32 {
        self.proton_count
    }

    pub fn neutron_count(&self) -> u32 {
        self.neutron_count
    }

    pub fn alpha_particle_energy(&self) -> f64 {
        self.alpha_particle_energy
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn particle(&self, id: ParticleId) -> Option<&AlphaParticle> {
        self.particles.get(id)
    }

    pub fn particles(&self) -> impl Iterator<Item = (ParticleId, &AlphaParticle)> {
        self.particles.iter()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn atom_spaces(&self) -> &[AtomSpace] {
        &self.atom_spaces
    }

    pub fn visible_scene_index(&self) -> usize {
        self.visible_space
    }

    pub fn visible_space(&self) -> &AtomSpace {
        &self.atom_spaces[self.visible_space]
    }

    pub fn particle_snapshots(&self) -> Vec<ParticleSnapshot> {
        self.particles
            .iter()
            .map(|(id, particle)| particle.snapshot(id))
            .collect()
    }

    pub fn atom_snapshots(&self) -> Vec<AtomSnapshot> {
        self.visible_space().atoms().map(Atom::snapshot).collect()
    }

    /// Verifies the ownership bookkeeping between the model, its spaces and their atoms.
    ///
    /// Every live particle must be listed by exactly one space and owned by at most one atom,
    /// and that atom must be the one the particle points at. Spaces must not list particles
    /// that no longer exist.
    pub fn check_invariants(&self) -> Result<(), EngineError> {
        for (id, particle) in &self.particles {
            let listed_by = self
                .atom_spaces
                .iter()
                .filter(|space| space.contains_particle(id))
                .count();
            if listed_by != 1 {
                return Err(EngineError::Internal(format!(
                    "particle {id:?} is listed by {listed_by} spaces"
                )));
            }

            let owners: Vec<AtomId> = self
                .atom_spaces
                .iter()
                .flat_map(|space| space.atoms())
                .filter(|atom| atom.owns(id))
                .map(Atom::id)
                .collect();
            if owners.len() > 1 {
                return Err(EngineError::Internal(format!(
                    "particle {id:?} is owned by {} atoms",
                    owners.len()
                )));
            }
            if particle.atom() != owners.first().copied() {
                return Err(EngineError::Internal(format!(
                    "particle {id:?} points at {:?} but is owned by {:?}",
                    particle.atom(),
                    owners.first()
                )));
            }
        }

        for space in &self.atom_spaces {
            if let Some(id) = space
                .particles()
                .iter()
                .find(|&&id| !self.particles.contains_key(id))
            {
                return Err(EngineError::Internal(format!(
                    "space '{}' lists disposed particle {id:?}",
                    space.name()
                )));
            }
        }
        Ok(())
    }
}
