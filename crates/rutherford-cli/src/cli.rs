use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Rutherford CLI - Fire alpha particles at atomic nuclei and record how they scatter.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scattering simulation headlessly and summarise the result.
    Run(RunArgs),
    /// List the element presets available for the target nucleus.
    Elements(ElementsArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to a configuration file in TOML format. Built-in defaults are used without one.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Output ---
    /// Write the full run report (stats, atoms, particles) to this TOML file.
    #[arg(short, long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Write every particle trace to this CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub traces: Option<PathBuf>,

    // --- Nucleus Overrides ---
    /// Target element by symbol (e.g., 'Au', 'Pb'). Sets both proton and neutron counts.
    #[arg(short, long, value_name = "SYMBOL")]
    pub element: Option<String>,

    /// Override the proton count of the nucleus.
    #[arg(long, value_name = "INT")]
    pub protons: Option<u32>,

    /// Override the neutron count of the nucleus.
    #[arg(long, value_name = "INT")]
    pub neutrons: Option<u32>,

    // --- Gun Overrides ---
    /// Override the alpha particle energy.
    #[arg(long, value_name = "FLOAT")]
    pub energy: Option<f64>,

    /// Leave the gun off for the whole run.
    #[arg(long)]
    pub no_gun: bool,

    // --- Run Overrides ---
    /// Number of frames to simulate.
    #[arg(short = 'n', long, value_name = "INT")]
    pub frames: Option<u64>,

    /// Duration of a single frame in seconds.
    #[arg(long, value_name = "FLOAT")]
    pub dt: Option<f64>,

    /// Seed for the gun's random number generator.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Index of the scene to run.
    #[arg(long, value_name = "INDEX")]
    pub scene: Option<usize>,

    /// What to do with particles whose deflection fails ('return-to-space' or 'discard').
    #[arg(long, value_name = "POLICY")]
    pub failure_policy: Option<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S nucleus.proton-count=82
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `elements` subcommand.
#[derive(Args, Debug)]
pub struct ElementsArgs {
    /// Show a single element instead of the full table.
    #[arg(value_name = "SYMBOL")]
    pub symbol: Option<String>,
}
