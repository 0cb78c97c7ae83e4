use crate::cli::RunArgs;
use crate::config::{AppConfig, PartialSimulationConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use rutherford::core::elements;
use rutherford::core::io::trace::write_traces_to_path;
use rutherford::engine::progress::ProgressReporter;
use rutherford::workflows::simulate::{self, SimulationReport};
use std::path::Path;
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    let partial_config = PartialSimulationConfig::load(&args)?;
    info!("Merging configuration from file and CLI arguments...");
    let AppConfig {
        simulation,
        options,
    } = partial_config.merge_with_cli(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Firing alpha particles (energy {}) at {} for {} frames...",
        simulation.alpha_energy,
        nucleus_label(simulation.nucleus.proton_count),
        options.frames
    );
    info!("Invoking the core simulation workflow...");
    let result = simulate::run(simulation, &options, &reporter)?;

    print_summary(&result.report);

    if let Some(path) = &args.report {
        write_report(&result.report, path)?;
        println!("✓ Report written to: {}", path.display());
    }
    if let Some(path) = &args.traces {
        let rows = write_traces_to_path(result.model.particles(), path)?;
        info!(rows, "Wrote particle traces to {:?}", path);
        println!("✓ {} trace points written to: {}", rows, path.display());
    }

    Ok(())
}

/// `Z = 79 (Gold)` for counts with a preset, plain `Z = 64` otherwise.
fn nucleus_label(protons: u32) -> String {
    match elements::by_proton_count(protons) {
        Some(element) => format!("Z = {} ({})", protons, element.name),
        None => format!("Z = {}", protons),
    }
}

fn print_summary(report: &SimulationReport) {
    let stats = &report.stats;
    println!(
        "Scene '{}' ({}): {} frames, {:.2}s of model time",
        report.scene, report.atom_kind, stats.frames_advanced, stats.model_time
    );
    println!(
        "  emitted {}, left the space {}, still in flight {}",
        stats.particles_emitted,
        stats.particles_culled,
        report.particles.len()
    );
    if stats.deflection_failures > 0 {
        println!(
            "  {} deflection failure(s), {} particle(s) discarded",
            stats.deflection_failures, stats.particles_discarded
        );
    }
}

fn write_report(report: &SimulationReport, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(report)
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to serialise report: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}
