use super::ids::{AtomId, ParticleId, key_to_u64};
use super::particle::AlphaParticle;
use crate::core::geometry::{Circle, Rect};
use nalgebra::Point2;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How an atom moves the particles it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AtomKind {
    /// A compact, positively charged nucleus that deflects passing particles.
    #[default]
    Rutherford,
    /// Charge spread evenly through the atom; particles pass straight through.
    PlumPudding,
}

impl fmt::Display for AtomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomKind::Rutherford => write!(f, "rutherford"),
            AtomKind::PlumPudding => write!(f, "plum-pudding"),
        }
    }
}

impl FromStr for AtomKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rutherford" | "nucleus" => Ok(AtomKind::Rutherford),
            "plum-pudding" | "plum_pudding" | "plumpudding" => Ok(AtomKind::PlumPudding),
            _ => Err(()),
        }
    }
}

/// An atom: a fixed bounding square and the particles currently owned by it.
///
/// Every particle listed in `particles` has its `atom` handle pointing back at this atom. The
/// bounding circle circumscribes the bounding square and serves as the cheap pre-check for
/// particles approaching the atom.
#[derive(Debug, Clone)]
pub struct Atom {
    id: AtomId,
    kind: AtomKind,
    position: Point2<f64>,
    bounding_rect: Rect,
    bounding_circle: Circle,
    particles: Vec<ParticleId>,
}

impl Atom {
    /// Creates an atom centred on `position` with a square bounding box of side `width`.
    ///
    /// The atom receives its id when it is inserted into an atom space.
    pub fn new(kind: AtomKind, position: Point2<f64>, width: f64) -> Self {
        let bounding_rect = Rect::centered(position, width, width);
        Self {
            id: AtomId::default(),
            kind,
            position,
            bounding_circle: Circle::circumscribing(&bounding_rect),
            bounding_rect,
            particles: Vec::new(),
        }
    }

    pub(crate) fn with_id(mut self, id: AtomId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> AtomId {
        self.id
    }

    pub fn kind(&self) -> AtomKind {
        self.kind
    }

    pub fn position(&self) -> Point2<f64> {
        self.position
    }

    pub fn bounding_rect(&self) -> &Rect {
        &self.bounding_rect
    }

    pub fn bounding_circle(&self) -> &Circle {
        &self.bounding_circle
    }

    pub fn particles(&self) -> &[ParticleId] {
        &self.particles
    }

    pub fn owns(&self, id: ParticleId) -> bool {
        self.particles.contains(&id)
    }

    /// Takes ownership of a particle and anchors its entry position to where it is now.
    pub fn add_particle(&mut self, id: ParticleId, particle: &mut AlphaParticle) {
        if !self.owns(id) {
            self.particles.push(id);
        }
        particle.attach_to(self.id);
    }

    /// Releases a particle. Clears the particle's atom handle.
    pub fn remove_particle(&mut self, id: ParticleId, particle: &mut AlphaParticle) {
        self.particles.retain(|&owned| owned != id);
        if particle.atom() == Some(self.id) {
            particle.detach();
        }
    }

    /// Forgets a particle that is being disposed of without touching the particle itself.
    pub(crate) fn forget_particle(&mut self, id: ParticleId) {
        self.particles.retain(|&owned| owned != id);
    }

    pub(crate) fn clear_particles(&mut self) {
        self.particles.clear();
    }

    pub fn snapshot(&self) -> AtomSnapshot {
        AtomSnapshot {
            id: key_to_u64(self.id),
            kind: self.kind,
            position: [self.position.x, self.position.y],
            width: self.bounding_rect.width(),
            bounding_radius: self.bounding_circle.radius,
            particle_count: self.particles.len(),
        }
    }
}

/// A read-only, serialisable view of an atom for drawing and reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomSnapshot {
    pub id: u64,
    pub kind: AtomKind,
    pub position: [f64; 2],
    pub width: f64,
    pub bounding_radius: f64,
    pub particle_count: usize,
}
