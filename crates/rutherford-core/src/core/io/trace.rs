use crate::core::models::ids::{ParticleId, key_to_u64};
use crate::core::models::particle::AlphaParticle;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct TraceRow {
    particle: u64,
    index: usize,
    x: f64,
    y: f64,
}

/// Writes the trace of every particle as CSV rows `particle,index,x,y`.
///
/// Returns the number of rows written, excluding the header.
pub fn write_traces<'a, W, I>(particles: I, writer: W) -> Result<usize, TraceError>
where
    W: Write,
    I: IntoIterator<Item = (ParticleId, &'a AlphaParticle)>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut rows = 0;
    for (id, particle) in particles {
        let particle_key = key_to_u64(id);
        for (index, point) in particle.positions().iter().enumerate() {
            csv_writer.serialize(TraceRow {
                particle: particle_key,
                index,
                x: point.x,
                y: point.y,
            })?;
            rows += 1;
        }
    }
    csv_writer.flush()?;
    Ok(rows)
}

pub fn write_traces_to_path<'a, I>(particles: I, path: &Path) -> Result<usize, TraceError>
where
    I: IntoIterator<Item = (ParticleId, &'a AlphaParticle)>,
{
    let file = File::create(path)?;
    write_traces(particles, file)
}
