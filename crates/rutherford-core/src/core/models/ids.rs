use slotmap::{Key, new_key_type};

new_key_type! {
    pub struct ParticleId;
    pub struct AtomId;
}

/// Stable numeric form of an arena key, for reports and exported traces.
pub fn key_to_u64<K: Key>(key: K) -> u64 {
    key.data().as_ffi()
}
