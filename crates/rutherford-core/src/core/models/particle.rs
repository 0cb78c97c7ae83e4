use super::atom::Atom;
use super::ids::{AtomId, ParticleId, key_to_u64};
use crate::core::geometry::{OrientedRect, angle_of, unit_from_angle};
use nalgebra::{Point2, Vector2};
use serde::Serialize;

/// The mutable trajectory state of one alpha particle.
///
/// Besides its kinematic state a particle carries the bookkeeping the atom space needs to hand
/// it between open space and atoms: the atom that currently owns it, the atom it is about to
/// enter, and the rotated bounding boxes that align its direction of travel with the "straight
/// up" frame of the deflection algorithm.
#[derive(Debug, Clone)]
pub struct AlphaParticle {
    speed: f64,
    initial_speed: f64,
    position: Point2<f64>,
    orientation: f64,
    /// Every position the particle has occupied, oldest first. Never shrinks.
    positions: Vec<Point2<f64>>,
    /// Position at the moment the particle entered its current atom.
    initial_position: Point2<f64>,
    atom: Option<AtomId>,
    prepared_atom: Option<AtomId>,
    bounding_box: Option<OrientedRect>,
    prepared_bounding_box: Option<OrientedRect>,
    rotation_angle: f64,
    prepared_rotation_angle: f64,
    is_in_space: bool,
}

impl AlphaParticle {
    /// Creates a particle travelling at `speed` along `orientation` (radians, counterclockwise
    /// from +x). The starting position is the first entry of the trace.
    pub fn new(position: Point2<f64>, speed: f64, orientation: f64) -> Self {
        Self {
            speed,
            initial_speed: speed,
            position,
            orientation,
            positions: vec![position],
            initial_position: position,
            atom: None,
            prepared_atom: None,
            bounding_box: None,
            prepared_bounding_box: None,
            rotation_angle: 0.0,
            prepared_rotation_angle: 0.0,
            is_in_space: false,
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Speed when the particle left the gun.
    pub fn initial_speed(&self) -> f64 {
        self.initial_speed
    }

    pub fn position(&self) -> Point2<f64> {
        self.position
    }

    /// Moves the particle and appends the new position to its trace.
    pub fn set_position(&mut self, position: Point2<f64>) {
        self.position = position;
        self.positions.push(position);
    }

    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: f64) {
        self.orientation = orientation;
    }

    pub fn positions(&self) -> &[Point2<f64>] {
        &self.positions
    }

    pub fn initial_position(&self) -> Point2<f64> {
        self.initial_position
    }

    pub fn atom(&self) -> Option<AtomId> {
        self.atom
    }

    pub fn prepared_atom(&self) -> Option<AtomId> {
        self.prepared_atom
    }

    pub fn bounding_box(&self) -> Option<&OrientedRect> {
        self.bounding_box.as_ref()
    }

    pub fn prepared_bounding_box(&self) -> Option<&OrientedRect> {
        self.prepared_bounding_box.as_ref()
    }

    pub fn rotation_angle(&self) -> f64 {
        self.rotation_angle
    }

    pub fn prepared_rotation_angle(&self) -> f64 {
        self.prepared_rotation_angle
    }

    pub fn is_in_space(&self) -> bool {
        self.is_in_space
    }

    pub(crate) fn set_in_space(&mut self, in_space: bool) {
        self.is_in_space = in_space;
    }

    /// Unit vector of the current direction of travel.
    ///
    /// Derived from the last two trace points when there are at least two, otherwise from the
    /// orientation.
    pub fn direction(&self) -> Vector2<f64> {
        match self.positions.as_slice() {
            [.., previous, last] => {
                let delta = last - previous;
                let norm = delta.norm();
                if norm > 0.0 {
                    delta / norm
                } else {
                    unit_from_angle(self.orientation)
                }
            }
            _ => unit_from_angle(self.orientation),
        }
    }

    /// Prepares the transition into `atom`.
    ///
    /// Stores the angle of the vector perpendicular to the direction of travel and the atom's
    /// bounding square rotated by that angle around the atom's center. Un-rotating by this
    /// angle turns the direction of travel into "straight up" (+y) in the atom's frame.
    pub fn prepare_bounding_box(&mut self, atom_id: AtomId, atom: &Atom) {
        let direction = self.direction();
        let perpendicular = Vector2::new(direction.y, -direction.x);
        let angle = angle_of(&perpendicular);
        self.prepared_rotation_angle = angle;
        self.prepared_bounding_box = Some(atom.bounding_rect().rotated_about(&atom.position(), angle));
        self.prepared_atom = Some(atom_id);
    }

    /// Commits the prepared transition: the prepared box and rotation become the active ones.
    pub(crate) fn commit_prepared_box(&mut self) {
        self.bounding_box = self.prepared_bounding_box;
        self.rotation_angle = self.prepared_rotation_angle;
    }

    /// Drops any pending transition after `atom` released the particle. Only the releasing
    /// atom is barred from preparing or claiming it again.
    pub(crate) fn abandon_prepared_box(&mut self, released_by: AtomId) {
        self.prepared_bounding_box = None;
        self.prepared_atom = Some(released_by);
    }

    /// Called by the owning atom only.
    pub(crate) fn attach_to(&mut self, atom: AtomId) {
        self.atom = Some(atom);
        self.initial_position = self.position;
    }

    /// Called by the owning atom only.
    pub(crate) fn detach(&mut self) {
        self.atom = None;
    }

    pub fn snapshot(&self, id: ParticleId) -> ParticleSnapshot {
        ParticleSnapshot {
            id: key_to_u64(id),
            position: [self.position.x, self.position.y],
            speed: self.speed,
            orientation: self.orientation,
            trace_length: self.positions.len(),
            atom: self.atom.map(key_to_u64),
        }
    }
}

/// A read-only, serialisable view of a particle for drawing and reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleSnapshot {
    pub id: u64,
    pub position: [f64; 2],
    pub speed: f64,
    pub orientation: f64,
    pub trace_length: usize,
    pub atom: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::AtomKind;
    use slotmap::SlotMap;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn new_particle_records_starting_position_in_trace() {
        let particle = AlphaParticle::new(Point2::new(1.0, -2.0), 80.0, FRAC_PI_2);
        assert_eq!(particle.positions(), &[Point2::new(1.0, -2.0)]);
        assert_eq!(particle.initial_speed(), 80.0);
        assert_eq!(particle.initial_position(), Point2::new(1.0, -2.0));
        assert!(particle.atom().is_none());
        assert!(!particle.is_in_space());
    }

    #[test]
    fn each_position_update_appends_exactly_one_trace_point() {
        let mut particle = AlphaParticle::new(Point2::origin(), 80.0, FRAC_PI_2);
        for i in 1..=25 {
            let before = particle.positions().len();
            particle.set_position(Point2::new(0.0, i as f64));
            assert_eq!(particle.positions().len(), before + 1);
        }
        assert_eq!(particle.positions().len(), 26);
        assert_eq!(particle.positions()[0], Point2::origin());
    }

    #[test]
    fn direction_uses_orientation_until_two_positions_exist() {
        let mut particle = AlphaParticle::new(Point2::origin(), 80.0, PI);
        let direction = particle.direction();
        assert!(f64_approx_equal(direction.x, -1.0));
        assert!(f64_approx_equal(direction.y, 0.0));

        particle.set_position(Point2::new(3.0, 4.0));
        let direction = particle.direction();
        assert!(f64_approx_equal(direction.x, 0.6));
        assert!(f64_approx_equal(direction.y, 0.8));
    }

    #[test]
    fn direction_falls_back_to_orientation_when_particle_did_not_move() {
        let mut particle = AlphaParticle::new(Point2::origin(), 80.0, FRAC_PI_2);
        particle.set_position(Point2::origin());
        let direction = particle.direction();
        assert!(f64_approx_equal(direction.y, 1.0));
    }

    #[test]
    fn upward_travel_prepares_an_unrotated_box() {
        let mut atoms: SlotMap<AtomId, ()> = SlotMap::with_key();
        let atom_id = atoms.insert(());
        let atom = Atom::new(AtomKind::Rutherford, Point2::new(0.0, 0.0), 20.0);
        let mut particle = AlphaParticle::new(Point2::new(1.0, -30.0), 80.0, FRAC_PI_2);

        particle.prepare_bounding_box(atom_id, &atom);

        assert_eq!(particle.prepared_atom(), Some(atom_id));
        assert!(f64_approx_equal(particle.prepared_rotation_angle(), 0.0));
        let prepared = particle.prepared_bounding_box().unwrap();
        assert!(prepared.contains_point(&Point2::new(9.9, 9.9)));
    }

    #[test]
    fn sideways_travel_prepares_a_rotated_box() {
        let mut atoms: SlotMap<AtomId, ()> = SlotMap::with_key();
        let atom_id = atoms.insert(());
        let atom = Atom::new(AtomKind::Rutherford, Point2::new(5.0, 5.0), 20.0);
        let mut particle = AlphaParticle::new(Point2::new(-30.0, 5.0), 80.0, 0.0);

        particle.prepare_bounding_box(atom_id, &atom);

        // Travel along +x is perpendicular (1, 0) -> (0, -1), i.e. -pi/2.
        assert!(f64_approx_equal(particle.prepared_rotation_angle(), -FRAC_PI_2));
        let prepared = particle.prepared_bounding_box().unwrap();
        assert_eq!(prepared.center, Point2::new(5.0, 5.0));
    }

    #[test]
    fn commit_copies_prepared_state() {
        let mut atoms: SlotMap<AtomId, ()> = SlotMap::with_key();
        let atom_id = atoms.insert(());
        let atom = Atom::new(AtomKind::PlumPudding, Point2::origin(), 20.0);
        let mut particle = AlphaParticle::new(Point2::new(-30.0, 0.0), 80.0, 0.0);
        particle.prepare_bounding_box(atom_id, &atom);
        particle.commit_prepared_box();

        assert_eq!(particle.bounding_box(), particle.prepared_bounding_box());
        assert_eq!(particle.rotation_angle(), particle.prepared_rotation_angle());
    }

    #[test]
    fn snapshot_reflects_particle_state() {
        let mut particles: SlotMap<ParticleId, ()> = SlotMap::with_key();
        let id = particles.insert(());
        let mut particle = AlphaParticle::new(Point2::new(1.0, 2.0), 60.0, 0.5);
        particle.set_position(Point2::new(2.0, 3.0));

        let snapshot = particle.snapshot(id);
        assert_eq!(snapshot.id, key_to_u64(id));
        assert_eq!(snapshot.position, [2.0, 3.0]);
        assert_eq!(snapshot.speed, 60.0);
        assert_eq!(snapshot.trace_length, 2);
        assert!(snapshot.atom.is_none());
    }
}
