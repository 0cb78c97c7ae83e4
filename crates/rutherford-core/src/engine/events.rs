use super::error::DeflectionError;
use crate::core::geometry::OrientedRect;
use crate::core::models::ids::{AtomId, ParticleId};

/// Diagnostic notifications emitted while the model runs.
///
/// None of these is needed for the physics; they let view code redraw, visualise prepared
/// bounding boxes and count trajectories that had to be abandoned.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    ParticleEmitted {
        particle: ParticleId,
    },
    /// A particle entered an atom's bounding circle and had a rotated box prepared for it.
    ParticleTransitioned {
        particle: ParticleId,
        atom: AtomId,
        bounding_box: OrientedRect,
    },
    ParticleRemovedFromAtom {
        particle: ParticleId,
        atom: AtomId,
        reason: DeflectionError,
    },
    ParticleCulled {
        particle: ParticleId,
    },
    ParticlesCleared {
        count: usize,
    },
    /// Emitted after every `step`, whether or not physics ran.
    Stepped,
}

pub type EventCallback = Box<dyn Fn(SimulationEvent) + Send + Sync>;

#[derive(Default)]
pub struct EventReporter {
    callback: Option<EventCallback>,
}

impl EventReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: EventCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: SimulationEvent) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

impl std::fmt::Debug for EventReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReporter")
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
