use super::config::{FailurePolicy, SceneConfig};
use super::error::EngineError;
use super::events::{EventReporter, SimulationEvent};
use super::layout;
use super::trajectory::{NucleusEnvironment, advance_straight, move_atom_particles};
use crate::core::geometry::{Rect, angle_of};
use crate::core::models::atom::Atom;
use crate::core::models::ids::{AtomId, ParticleId};
use crate::core::models::particle::AlphaParticle;
use slotmap::SlotMap;
use tracing::{trace, warn};

/// What a call to [`AtomSpace::move_particles`] left for the caller to do.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MoveOutcome {
    /// Number of particles released by their atom because of a deflection failure.
    pub released: usize,
    /// Particles dropped from the space that the caller must dispose of.
    pub discarded: Vec<ParticleId>,
}

/// A scene: a fixed set of non-overlapping atoms plus the particles travelling through it.
///
/// The space lists every particle it contains. The subset that is currently outside the
/// bounding circle of its atom (or never entered one) forms the free list; only those are
/// candidates for entering an atom.
#[derive(Debug, Clone)]
pub struct AtomSpace {
    name: String,
    bounds: Rect,
    atoms: SlotMap<AtomId, Atom>,
    particles: Vec<ParticleId>,
    particles_in_empty_space: Vec<ParticleId>,
    is_visible: bool,
}

impl AtomSpace {
    /// Builds a space from already placed atoms.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyScene`] without atoms and [`EngineError::OverlappingAtoms`]
    /// when two bounding rectangles share interior area.
    pub fn new(name: &str, bounds: Rect, atoms: Vec<Atom>) -> Result<Self, EngineError> {
        if atoms.is_empty() {
            return Err(EngineError::EmptyScene(name.to_string()));
        }
        for (i, first) in atoms.iter().enumerate() {
            for (j, second) in atoms.iter().enumerate().skip(i + 1) {
                if first.bounding_rect().intersects(second.bounding_rect()) {
                    return Err(EngineError::OverlappingAtoms {
                        scene: name.to_string(),
                        first: i,
                        second: j,
                    });
                }
            }
        }

        let mut arena = SlotMap::with_capacity_and_key(atoms.len());
        for atom in atoms {
            arena.insert_with_key(|id| atom.with_id(id));
        }

        Ok(Self {
            name: name.to_string(),
            bounds,
            atoms: arena,
            particles: Vec::new(),
            particles_in_empty_space: Vec::new(),
            is_visible: false,
        })
    }

    pub fn from_scene(scene: &SceneConfig, bounds: Rect) -> Result<Self, EngineError> {
        Self::new(&scene.name, bounds, layout::build_atoms(scene, &bounds))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.values()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn particles(&self) -> &[ParticleId] {
        &self.particles
    }

    pub fn particles_in_empty_space(&self) -> &[ParticleId] {
        &self.particles_in_empty_space
    }

    pub fn contains_particle(&self, id: ParticleId) -> bool {
        self.particles.contains(&id)
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.is_visible = visible;
    }

    /// Adds a newly fired particle to the free list.
    pub fn add_particle(&mut self, id: ParticleId, particle: &mut AlphaParticle) {
        if !self.contains_particle(id) {
            self.particles.push(id);
        }
        self.mark_free(id, particle);
    }

    /// Removes a particle from the space and from whichever atom owns it.
    pub fn remove_particle(&mut self, id: ParticleId, particle: &mut AlphaParticle) {
        self.forget_particle(id);
        if let Some(atom) = particle.atom().and_then(|atom_id| self.atoms.get_mut(atom_id)) {
            atom.remove_particle(id, particle);
        }
        particle.set_in_space(false);
    }

    /// Empties the space and every atom. Returns the removed ids for disposal.
    pub fn clear_particles(&mut self) -> Vec<ParticleId> {
        self.particles_in_empty_space.clear();
        for atom in self.atoms.values_mut() {
            atom.clear_particles();
        }
        std::mem::take(&mut self.particles)
    }

    /// Runs one step of the transition protocol and moves every particle.
    ///
    /// Order: free particles entering atoms, owned particles leaving their atom's circle,
    /// straight-line motion of unowned particles, then each atom moves the particles it owns.
    pub fn move_particles(
        &mut self,
        particles: &mut SlotMap<ParticleId, AlphaParticle>,
        environment: &NucleusEnvironment,
        dt: f64,
        policy: FailurePolicy,
        reporter: &EventReporter,
    ) -> MoveOutcome {
        self.transition_particles_to_atoms(particles, reporter);
        self.transition_particles_to_space(particles);

        for &id in &self.particles_in_empty_space {
            if let Some(particle) = particles.get_mut(id) {
                if particle.atom().is_none() {
                    advance_straight(particle, dt);
                }
            }
        }

        let mut released = Vec::new();
        for (atom_id, atom) in self.atoms.iter_mut() {
            for (id, reason) in move_atom_particles(atom, particles, environment, dt) {
                released.push((atom_id, id, reason));
            }
        }

        let mut outcome = MoveOutcome {
            released: released.len(),
            discarded: Vec::new(),
        };
        for (atom_id, id, reason) in released {
            warn!(particle = ?id, atom = ?atom_id, %reason, "Deflection failed, releasing particle.");
            reporter.report(SimulationEvent::ParticleRemovedFromAtom {
                particle: id,
                atom: atom_id,
                reason,
            });
            match policy {
                FailurePolicy::ReturnToSpace => {
                    if let Some(particle) = particles.get_mut(id) {
                        particle.abandon_prepared_box(atom_id);
                        let heading = angle_of(&particle.direction());
                        particle.set_orientation(heading);
                        self.mark_free(id, particle);
                    }
                }
                FailurePolicy::Discard => {
                    self.forget_particle(id);
                    outcome.discarded.push(id);
                }
            }
        }
        outcome
    }

    fn transition_particles_to_atoms(
        &mut self,
        particles: &mut SlotMap<ParticleId, AlphaParticle>,
        reporter: &EventReporter,
    ) {
        let candidates = self.particles_in_empty_space.clone();
        for id in candidates {
            let Some(particle) = particles.get_mut(id) else {
                continue;
            };

            for (atom_id, atom) in &self.atoms {
                if particle.prepared_atom() != Some(atom_id)
                    && atom.bounding_circle().contains_point(&particle.position())
                {
                    particle.prepare_bounding_box(atom_id, atom);
                    if let Some(bounding_box) = particle.prepared_bounding_box() {
                        reporter.report(SimulationEvent::ParticleTransitioned {
                            particle: id,
                            atom: atom_id,
                            bounding_box: *bounding_box,
                        });
                    }
                }
            }

            let Some(prepared) = particle.prepared_atom() else {
                continue;
            };
            let inside_box = particle
                .prepared_bounding_box()
                .is_some_and(|bounding_box| bounding_box.contains_point(&particle.position()));
            if !inside_box || particle.atom() == Some(prepared) {
                continue;
            }

            if let Some(previous) = particle.atom().and_then(|atom_id| self.atoms.get_mut(atom_id)) {
                previous.remove_particle(id, particle);
            }
            if let Some(atom) = self.atoms.get_mut(prepared) {
                atom.add_particle(id, particle);
                particle.commit_prepared_box();
                particle.set_in_space(false);
                self.particles_in_empty_space.retain(|&free| free != id);
                trace!(particle = ?id, atom = ?prepared, "Particle entered atom.");
            }
        }
    }

    fn transition_particles_to_space(&mut self, particles: &mut SlotMap<ParticleId, AlphaParticle>) {
        for atom in self.atoms.values() {
            for &id in atom.particles() {
                let Some(particle) = particles.get_mut(id) else {
                    continue;
                };
                if !particle.is_in_space() && !atom.bounding_circle().contains_point(&particle.position()) {
                    particle.set_in_space(true);
                    if !self.particles_in_empty_space.contains(&id) {
                        self.particles_in_empty_space.push(id);
                    }
                    trace!(particle = ?id, atom = ?atom.id(), "Particle left atom's bounding circle.");
                }
            }
        }
    }

    fn mark_free(&mut self, id: ParticleId, particle: &mut AlphaParticle) {
        particle.set_in_space(true);
        if !self.particles_in_empty_space.contains(&id) {
            self.particles_in_empty_space.push(id);
        }
    }

    fn forget_particle(&mut self, id: ParticleId) {
        self.particles.retain(|&owned| owned != id);
        self.particles_in_empty_space.retain(|&free| free != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::AtomKind;
    use crate::engine::config::AtomLayout;
    use crate::engine::error::DeflectionError;
    use nalgebra::Point2;
    use std::f64::consts::{FRAC_PI_2, PI};
    use std::sync::{Arc, Mutex};

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn bounds() -> Rect {
        Rect::centered(Point2::origin(), 255.0, 255.0)
    }

    fn single_atom_space(kind: AtomKind, width: f64) -> AtomSpace {
        AtomSpace::new("test", bounds(), vec![Atom::new(kind, Point2::origin(), width)]).unwrap()
    }

    fn recording_reporter() -> (EventReporter, Arc<Mutex<Vec<SimulationEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let reporter = EventReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));
        (reporter, events)
    }

    fn fire(
        space: &mut AtomSpace,
        particles: &mut SlotMap<ParticleId, AlphaParticle>,
        position: Point2<f64>,
        speed: f64,
    ) -> ParticleId {
        let id = particles.insert(AlphaParticle::new(position, speed, FRAC_PI_2));
        space.add_particle(id, &mut particles[id]);
        id
    }

    fn advance(
        space: &mut AtomSpace,
        particles: &mut SlotMap<ParticleId, AlphaParticle>,
        dt: f64,
        policy: FailurePolicy,
        reporter: &EventReporter,
    ) -> MoveOutcome {
        space.move_particles(particles, &NucleusEnvironment::new(79), dt, policy, reporter)
    }

    fn only_atom(space: &AtomSpace) -> &Atom {
        space.atoms().next().unwrap()
    }

    #[test]
    fn overlapping_atoms_fail_construction() {
        let atoms = vec![
            Atom::new(AtomKind::Rutherford, Point2::new(-20.0, 0.0), 60.0),
            Atom::new(AtomKind::Rutherford, Point2::new(20.0, 0.0), 60.0),
        ];
        let result = AtomSpace::new("crowded", bounds(), atoms);
        assert!(matches!(
            result,
            Err(EngineError::OverlappingAtoms { first: 0, second: 1, .. })
        ));
    }

    #[test]
    fn touching_atoms_are_allowed() {
        let atoms = vec![
            Atom::new(AtomKind::Rutherford, Point2::new(-30.0, 0.0), 60.0),
            Atom::new(AtomKind::Rutherford, Point2::new(30.0, 0.0), 60.0),
        ];
        let space = AtomSpace::new("neighbours", bounds(), atoms).unwrap();
        assert_eq!(space.atom_count(), 2);
    }

    #[test]
    fn space_without_atoms_is_rejected() {
        let result = AtomSpace::new("void", bounds(), Vec::new());
        assert!(matches!(result, Err(EngineError::EmptyScene(name)) if name == "void"));
    }

    #[test]
    fn atoms_receive_their_arena_ids() {
        let space = single_atom_space(AtomKind::Rutherford, 100.0);
        let atom = only_atom(&space);
        assert!(space.atom(atom.id()).is_some());
    }

    #[test]
    fn new_particles_start_in_the_free_list() {
        let mut space = single_atom_space(AtomKind::Rutherford, 100.0);
        let mut particles = SlotMap::with_key();
        let id = fire(&mut space, &mut particles, Point2::new(0.0, -120.0), 80.0);

        assert_eq!(space.particles(), &[id]);
        assert_eq!(space.particles_in_empty_space(), &[id]);
        assert!(particles[id].is_in_space());
    }

    #[test]
    fn free_particles_far_from_atoms_move_in_a_straight_line() {
        let mut space = single_atom_space(AtomKind::Rutherford, 100.0);
        let mut particles = SlotMap::with_key();
        let id = fire(&mut space, &mut particles, Point2::new(0.0, -120.0), 60.0);

        space.move_particles(
            &mut particles,
            &NucleusEnvironment::new(79),
            0.1,
            FailurePolicy::ReturnToSpace,
            &EventReporter::new(),
        );

        let position = particles[id].position();
        assert!(f64_approx_equal(position.x, 0.0));
        assert!(f64_approx_equal(position.y, -114.0));
        assert!(particles[id].prepared_atom().is_none());
    }

    #[test]
    fn particle_is_prepared_in_the_circle_and_claimed_in_the_box() {
        let mut space = single_atom_space(AtomKind::Rutherford, 100.0);
        let atom_id = only_atom(&space).id();
        let mut particles = SlotMap::with_key();
        let (reporter, events) = recording_reporter();
        let id = fire(&mut space, &mut particles, Point2::new(10.0, -55.0), 60.0);

        advance(&mut space, &mut particles, 0.1, FailurePolicy::ReturnToSpace, &reporter);

        assert_eq!(particles[id].prepared_atom(), Some(atom_id));
        assert!(particles[id].atom().is_none());
        assert!(matches!(
            events.lock().unwrap().as_slice(),
            [SimulationEvent::ParticleTransitioned { particle, atom, .. }] if *particle == id && *atom == atom_id
        ));
        assert!(f64_approx_equal(particles[id].position().y, -49.0));

        advance(&mut space, &mut particles, 0.1, FailurePolicy::ReturnToSpace, &reporter);

        let particle = &particles[id];
        assert_eq!(particle.atom(), Some(atom_id));
        assert!(!particle.is_in_space());
        assert!(space.particles_in_empty_space().is_empty());
        assert!(space.atom(atom_id).unwrap().owns(id));
        assert!(f64_approx_equal(particle.initial_position().x, 10.0));
        assert!(f64_approx_equal(particle.initial_position().y, -49.0));
        assert_eq!(particle.bounding_box(), particle.prepared_bounding_box());
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn owned_particle_rejoins_the_free_list_after_leaving_the_circle() {
        let mut space = single_atom_space(AtomKind::PlumPudding, 100.0);
        let atom_id = only_atom(&space).id();
        let circle = *only_atom(&space).bounding_circle();
        let mut particles = SlotMap::with_key();
        let quiet = EventReporter::new();
        let id = fire(&mut space, &mut particles, Point2::new(10.0, -55.0), 60.0);

        let mut exited = false;
        for _ in 0..60 {
            advance(&mut space, &mut particles, 0.1, FailurePolicy::ReturnToSpace, &quiet);
            let particle = &particles[id];
            if particle.atom().is_some() && !circle.contains_point(&particle.position()) {
                advance(&mut space, &mut particles, 0.1, FailurePolicy::ReturnToSpace, &quiet);
                exited = true;
                break;
            }
        }

        assert!(exited);
        let particle = &particles[id];
        assert!(particle.is_in_space());
        assert_eq!(particle.atom(), Some(atom_id));
        assert!(space.particles_in_empty_space().contains(&id));
        assert!(space.atom(atom_id).unwrap().owns(id));
    }

    #[test]
    fn failed_deflection_returns_particle_to_space_without_recapture() {
        let mut space = single_atom_space(AtomKind::Rutherford, 100.0);
        let atom_id = only_atom(&space).id();
        let mut particles = SlotMap::with_key();
        let (reporter, events) = recording_reporter();
        // A particle at rest inside the box trips the zero-speed guard on its first update.
        let id = fire(&mut space, &mut particles, Point2::new(10.0, -20.0), 0.0);

        let outcome = advance(&mut space, &mut particles, 0.1, FailurePolicy::ReturnToSpace, &reporter);

        assert_eq!(outcome.released, 1);
        assert!(outcome.discarded.is_empty());
        assert!(particles[id].atom().is_none());
        assert!(particles[id].is_in_space());
        assert!(space.particles_in_empty_space().contains(&id));
        assert!(space.atom(atom_id).unwrap().particles().is_empty());
        assert!(events.lock().unwrap().iter().any(|event| matches!(
            event,
            SimulationEvent::ParticleRemovedFromAtom { particle, reason: DeflectionError::ZeroInitialSpeed, .. } if *particle == id
        )));

        let outcome = advance(&mut space, &mut particles, 0.1, FailurePolicy::ReturnToSpace, &reporter);

        assert_eq!(outcome.released, 0);
        assert!(particles[id].atom().is_none());
        assert!(space.atom(atom_id).unwrap().particles().is_empty());
    }

    #[test]
    fn particle_released_on_the_way_into_another_atom_can_still_enter_it() {
        let scene = SceneConfig::new(
            "column",
            AtomKind::Rutherford,
            AtomLayout::Lattice { rows: 2, columns: 1 },
        );
        let mut space = AtomSpace::from_scene(&scene, bounds()).unwrap();
        let below = space.atoms().find(|atom| atom.position().y < 0.0).unwrap().id();
        let above = space.atoms().find(|atom| atom.position().y > 0.0).unwrap().id();
        let mut particles = SlotMap::with_key();
        let (reporter, events) = recording_reporter();

        // Heading left, already outside the lower atom's circle and prepared for the upper one.
        let id = particles.insert(AlphaParticle::new(Point2::new(71.0, 40.0), 60.0, PI));
        space.add_particle(id, &mut particles[id]);
        particles[id].set_position(Point2::new(70.0, 40.0));
        space.atoms.get_mut(below).unwrap().add_particle(id, &mut particles[id]);
        particles[id].prepare_bounding_box(above, space.atom(above).unwrap());

        let broken = NucleusEnvironment {
            default_proton_count: 0,
            ..NucleusEnvironment::new(79)
        };
        let outcome = space.move_particles(&mut particles, &broken, 0.1, FailurePolicy::ReturnToSpace, &reporter);

        assert_eq!(outcome.released, 1);
        assert!(particles[id].atom().is_none());
        assert_eq!(particles[id].prepared_atom(), Some(below));
        assert!(particles[id].prepared_bounding_box().is_none());
        assert!(events.lock().unwrap().iter().any(|event| matches!(
            event,
            SimulationEvent::ParticleRemovedFromAtom { atom, .. } if *atom == below
        )));

        let mut claimed = false;
        for _ in 0..10 {
            advance(&mut space, &mut particles, 0.1, FailurePolicy::ReturnToSpace, &reporter);
            if space.atom(above).unwrap().owns(id) {
                claimed = true;
                break;
            }
        }

        assert!(claimed, "particle at {:?} never entered the upper atom", particles[id].position());
        assert_eq!(particles[id].atom(), Some(above));
        assert!(!space.atom(below).unwrap().owns(id));
    }

    #[test]
    fn failed_deflection_with_discard_policy_drops_the_particle() {
        let mut space = single_atom_space(AtomKind::Rutherford, 100.0);
        let mut particles = SlotMap::with_key();
        let id = fire(&mut space, &mut particles, Point2::new(10.0, -20.0), 0.0);

        let outcome = space.move_particles(
            &mut particles,
            &NucleusEnvironment::new(79),
            0.1,
            FailurePolicy::Discard,
            &EventReporter::new(),
        );

        assert_eq!(outcome.discarded, vec![id]);
        assert!(!space.contains_particle(id));
        assert!(space.particles_in_empty_space().is_empty());
    }

    #[test]
    fn removing_a_particle_detaches_it_from_its_atom() {
        let mut space = single_atom_space(AtomKind::PlumPudding, 100.0);
        let atom_id = only_atom(&space).id();
        let mut particles = SlotMap::with_key();
        let quiet = EventReporter::new();
        let id = fire(&mut space, &mut particles, Point2::new(10.0, -20.0), 60.0);
        advance(&mut space, &mut particles, 0.01, FailurePolicy::ReturnToSpace, &quiet);
        assert_eq!(particles[id].atom(), Some(atom_id));

        space.remove_particle(id, &mut particles[id]);

        assert!(!space.contains_particle(id));
        assert!(particles[id].atom().is_none());
        assert!(space.atom(atom_id).unwrap().particles().is_empty());
    }

    #[test]
    fn clearing_returns_every_particle_and_empties_the_atoms() {
        let mut space = single_atom_space(AtomKind::PlumPudding, 100.0);
        let atom_id = only_atom(&space).id();
        let mut particles = SlotMap::with_key();
        let quiet = EventReporter::new();
        let inside = fire(&mut space, &mut particles, Point2::new(10.0, -20.0), 60.0);
        let outside = fire(&mut space, &mut particles, Point2::new(100.0, -120.0), 60.0);
        advance(&mut space, &mut particles, 0.01, FailurePolicy::ReturnToSpace, &quiet);

        let removed = space.clear_particles();

        assert_eq!(removed, vec![inside, outside]);
        assert!(space.particles().is_empty());
        assert!(space.particles_in_empty_space().is_empty());
        assert!(space.atom(atom_id).unwrap().particles().is_empty());
    }

    #[test]
    fn particle_crosses_a_lattice_owned_by_at_most_one_atom() {
        let scene = SceneConfig::new(
            "column",
            AtomKind::Rutherford,
            AtomLayout::Lattice { rows: 3, columns: 1 },
        );
        let mut space = AtomSpace::from_scene(&scene, bounds()).unwrap();
        let mut particles = SlotMap::with_key();
        let quiet = EventReporter::new();
        let id = fire(&mut space, &mut particles, Point2::new(30.0, -127.0), 80.0);

        let mut owners_seen = Vec::new();
        for _ in 0..240 {
            advance(&mut space, &mut particles, 1.0 / 60.0, FailurePolicy::ReturnToSpace, &quiet);
            let owners: Vec<AtomId> = space.atoms().filter(|atom| atom.owns(id)).map(Atom::id).collect();
            assert!(owners.len() <= 1);
            assert_eq!(particles[id].atom(), owners.first().copied());
            if let Some(owner) = owners.first() {
                if owners_seen.last() != Some(owner) {
                    owners_seen.push(*owner);
                }
            }
            if !bounds().contains_point(&particles[id].position()) {
                break;
            }
        }
        assert!(!owners_seen.is_empty());
    }
}
