use crate::core::constants::{MAX_STEP_DT, NOMINAL_DT};
use crate::core::models::atom::{AtomKind, AtomSnapshot};
use crate::core::models::particle::ParticleSnapshot;
use crate::engine::config::{ConfigError, SimulationConfig};
use crate::engine::error::EngineError;
use crate::engine::model::{ScatteringModel, SimulationStats};
use crate::engine::progress::{Progress, ProgressReporter};
use serde::Serialize;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub frames: u64,
    pub dt: f64,
    pub gun_on: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frames: 600,
            dt: NOMINAL_DT,
            gun_on: true,
        }
    }
}

/// Summary of a finished run: the parameters it used, running totals and the final state of
/// the visible scene.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulationReport {
    pub scene: String,
    pub atom_kind: AtomKind,
    pub proton_count: u32,
    pub neutron_count: u32,
    pub alpha_energy: f64,
    pub frames: u64,
    pub dt: f64,
    pub stats: SimulationStats,
    pub atoms: Vec<AtomSnapshot>,
    pub particles: Vec<ParticleSnapshot>,
}

#[derive(Debug)]
pub struct SimulationResult {
    pub report: SimulationReport,
    /// The model in its final state, for callers that export traces.
    pub model: ScatteringModel,
}

#[instrument(skip_all, name = "simulation_workflow")]
pub fn run(
    config: SimulationConfig,
    options: &RunOptions,
    reporter: &ProgressReporter,
) -> Result<SimulationResult, EngineError> {
    validate_options(options)?;

    let mut model = ScatteringModel::new(config)?;
    model.set_gun_on(options.gun_on);
    info!(
        frames = options.frames,
        dt = options.dt,
        gun_on = options.gun_on,
        "Starting headless simulation."
    );

    reporter.report(Progress::RunStart {
        total_frames: options.frames,
    });
    for _ in 0..options.frames {
        model.step(options.dt);
        reporter.report(Progress::FrameAdvanced {
            live_particles: model.particle_count(),
        });
    }
    reporter.report(Progress::RunFinish);

    let failures = model.stats().deflection_failures;
    if failures > 0 {
        reporter.report(Progress::Message(format!(
            "{failures} trajectories were released after a deflection failure"
        )));
    }

    let report = build_report(&model, options);
    info!(
        emitted = report.stats.particles_emitted,
        live = report.particles.len(),
        "Simulation finished."
    );
    Ok(SimulationResult { report, model })
}

fn validate_options(options: &RunOptions) -> Result<(), ConfigError> {
    if !(options.dt > 0.0 && options.dt < MAX_STEP_DT) {
        return Err(ConfigError::OutOfRange {
            name: "dt",
            value: options.dt,
            min: 0.0,
            max: MAX_STEP_DT,
        });
    }
    Ok(())
}

fn build_report(model: &ScatteringModel, options: &RunOptions) -> SimulationReport {
    let scene = &model.config().scenes[model.visible_scene_index()];
    SimulationReport {
        scene: scene.name.clone(),
        atom_kind: scene.atom_kind,
        proton_count: model.proton_count(),
        neutron_count: model.neutron_count(),
        alpha_energy: model.alpha_particle_energy(),
        frames: options.frames,
        dt: options.dt,
        stats: model.stats().clone(),
        atoms: model.atom_snapshots(),
        particles: model.particle_snapshots(),
    }
}
