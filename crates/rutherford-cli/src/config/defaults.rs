use rutherford::core::constants::{
    DEFAULT_ALPHA_ENERGY, DEFAULT_NEUTRON_COUNT, DEFAULT_PROTON_COUNT, DEFAULT_SPACE_WIDTH,
    NOMINAL_DT,
};
use rutherford::core::models::atom::AtomKind;
use rutherford::engine::config::FailurePolicy;

/// Values used for anything neither the config file nor the command line sets.
pub struct DefaultsConfig {
    pub space_width: f64,
    pub proton_count: u32,
    pub neutron_count: u32,
    pub alpha_energy: f64,
    pub scene_name: String,
    pub atom_kind: AtomKind,
    pub frames: u64,
    pub dt: f64,
    pub gun_on: bool,
    pub failure_policy: FailurePolicy,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            space_width: DEFAULT_SPACE_WIDTH,
            proton_count: DEFAULT_PROTON_COUNT,
            neutron_count: DEFAULT_NEUTRON_COUNT,
            alpha_energy: DEFAULT_ALPHA_ENERGY,
            scene_name: "nucleus".to_string(),
            atom_kind: AtomKind::Rutherford,
            frames: 600,
            dt: NOMINAL_DT,
            gun_on: true,
            failure_policy: FailurePolicy::ReturnToSpace,
        }
    }
}
