pub mod defaults;

use self::defaults::DefaultsConfig;
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use rutherford::engine::config::{self as core_config, AtomLayout, SceneConfig};
use rutherford::workflows::simulate::RunOptions;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSpaceConfig {
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialNucleusConfig {
    element: Option<String>,
    #[serde(rename = "proton-count")]
    proton_count: Option<u32>,
    #[serde(rename = "neutron-count")]
    neutron_count: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialAlphaConfig {
    energy: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialRunConfig {
    frames: Option<u64>,
    dt: Option<f64>,
    gun: Option<bool>,
    seed: Option<u64>,
    #[serde(rename = "visible-scene")]
    visible_scene: Option<usize>,
    #[serde(rename = "failure-policy")]
    failure_policy: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", tag = "type")]
enum PartialAtomLayout {
    Single { width: Option<f64> },
    Lattice { rows: usize, columns: usize },
}

impl From<PartialAtomLayout> for AtomLayout {
    fn from(p: PartialAtomLayout) -> Self {
        match p {
            PartialAtomLayout::Single { width } => AtomLayout::Single { width },
            PartialAtomLayout::Lattice { rows, columns } => AtomLayout::Lattice { rows, columns },
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialSceneConfig {
    name: Option<String>,
    #[serde(rename = "atom-kind")]
    atom_kind: Option<String>,
    layout: Option<PartialAtomLayout>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialSimulationConfig {
    space: Option<PartialSpaceConfig>,
    nucleus: Option<PartialNucleusConfig>,
    alpha: Option<PartialAlphaConfig>,
    run: Option<PartialRunConfig>,
    scenes: Option<Vec<PartialSceneConfig>>,
}

/// Fully resolved settings for one `run` invocation.
#[derive(Debug)]
pub struct AppConfig {
    pub simulation: core_config::SimulationConfig,
    pub options: RunOptions,
}

impl PartialSimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the file named by `--config`, or starts empty without one.
    pub fn load(args: &RunArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolves every setting. Command-line flags win over `--set` values, which win over
    /// the file, which wins over the defaults.
    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;
        let defaults = DefaultsConfig::default();

        let space = self.space.take().unwrap_or_default();
        let nucleus = self.nucleus.take().unwrap_or_default();
        let alpha = self.alpha.take().unwrap_or_default();
        let run = self.run.take().unwrap_or_default();

        let width = space.width.unwrap_or(defaults.space_width);
        let height = space.height.unwrap_or(width);

        // Explicit counts are more specific than an element preset.
        let element = args
            .element
            .as_deref()
            .or(nucleus.element.as_deref())
            .map(parser::parse_element)
            .transpose()
            .map_err(|e| CliError::Argument(e.to_string()))?;
        let proton_count = args
            .protons
            .or(nucleus.proton_count)
            .or(element.map(|e| e.protons))
            .unwrap_or(defaults.proton_count);
        let neutron_count = args
            .neutrons
            .or(nucleus.neutron_count)
            .or(element.map(|e| e.neutrons))
            .unwrap_or(defaults.neutron_count);

        let failure_policy = match args
            .failure_policy
            .as_deref()
            .or(run.failure_policy.as_deref())
        {
            Some(value) => parser::parse_failure_policy(value)
                .map_err(|e| CliError::Argument(e.to_string()))?,
            None => defaults.failure_policy,
        };

        let mut builder = core_config::SimulationConfigBuilder::new()
            .space_width(width)
            .space_height(height)
            .proton_count(proton_count)
            .neutron_count(neutron_count)
            .alpha_energy(args.energy.or(alpha.energy).unwrap_or(defaults.alpha_energy))
            .visible_scene(args.scene.or(run.visible_scene).unwrap_or(0))
            .seed(args.seed.or(run.seed))
            .failure_policy(failure_policy);
        for scene in Self::merge_scenes(self.scenes.take(), &defaults)? {
            builder = builder.scene(scene);
        }
        let simulation = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let options = RunOptions {
            frames: args.frames.or(run.frames).unwrap_or(defaults.frames),
            dt: args.dt.or(run.dt).unwrap_or(defaults.dt),
            gun_on: !args.no_gun && run.gun.unwrap_or(defaults.gun_on),
        };

        Ok(AppConfig {
            simulation,
            options,
        })
    }

    fn merge_scenes(
        partial: Option<Vec<PartialSceneConfig>>,
        defaults: &DefaultsConfig,
    ) -> Result<Vec<SceneConfig>> {
        let partial = partial.unwrap_or_else(|| vec![PartialSceneConfig::default()]);
        partial
            .into_iter()
            .enumerate()
            .map(|(index, scene)| {
                let atom_kind = match scene.atom_kind.as_deref() {
                    Some(value) => parser::parse_atom_kind(value)
                        .map_err(|e| CliError::Config(format!("scene {index}: {e}")))?,
                    None => defaults.atom_kind,
                };
                let name = scene.name.unwrap_or_else(|| match index {
                    0 => defaults.scene_name.clone(),
                    _ => format!("{}-{}", defaults.scene_name, index),
                });
                let layout = scene.layout.map(Into::into).unwrap_or_default();
                Ok(SceneConfig::new(&name, atom_kind, layout))
            })
            .collect()
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for pair in set_values {
            let (key, value) =
                parser::parse_assignment(pair).map_err(|e| CliError::Config(e.to_string()))?;

            match key {
                "space.width" => {
                    self.space.get_or_insert_with(Default::default).width =
                        Some(parse_value(key, value)?);
                }
                "space.height" => {
                    self.space.get_or_insert_with(Default::default).height =
                        Some(parse_value(key, value)?);
                }
                "nucleus.element" => {
                    self.nucleus.get_or_insert_with(Default::default).element =
                        Some(value.to_string());
                }
                "nucleus.proton-count" => {
                    self.nucleus
                        .get_or_insert_with(Default::default)
                        .proton_count = Some(parse_value(key, value)?);
                }
                "nucleus.neutron-count" => {
                    self.nucleus
                        .get_or_insert_with(Default::default)
                        .neutron_count = Some(parse_value(key, value)?);
                }
                "alpha.energy" => {
                    self.alpha.get_or_insert_with(Default::default).energy =
                        Some(parse_value(key, value)?);
                }
                "run.frames" => {
                    self.run.get_or_insert_with(Default::default).frames =
                        Some(parse_value(key, value)?);
                }
                "run.dt" => {
                    self.run.get_or_insert_with(Default::default).dt =
                        Some(parse_value(key, value)?);
                }
                "run.gun" => {
                    self.run.get_or_insert_with(Default::default).gun =
                        Some(parse_value(key, value)?);
                }
                "run.seed" => {
                    self.run.get_or_insert_with(Default::default).seed =
                        Some(parse_value(key, value)?);
                }
                "run.visible-scene" => {
                    self.run
                        .get_or_insert_with(Default::default)
                        .visible_scene = Some(parse_value(key, value)?);
                }
                "run.failure-policy" => {
                    self.run
                        .get_or_insert_with(Default::default)
                        .failure_policy = Some(value.to_string());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value
        ))
    })
}
