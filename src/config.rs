//! Build-time configuration threaded through compressor constructors.
//!
//! No global state exists anywhere in the core (construction writes to the
//! forest, queries are read-only); the few compile-time-ish knobs that the
//! original implementation exposed — assertion level, hash seed — live here
//! instead, as an explicit struct rather than module statics.

/// How aggressively internal invariants are checked.
///
/// `Light` checks are always worth paying for (cheap, catch real bugs
/// early); `Heavy` checks (e.g. re-deriving `roots()`/`leaves()` uniqueness
/// by rebuilding a hash set on every call) are reserved for debug builds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum AssertionLevel {
    Light,
    #[default]
    Normal,
    Heavy,
}

impl AssertionLevel {
    pub fn checks_heavy(self) -> bool {
        matches!(self, AssertionLevel::Heavy)
    }

    pub fn checks_normal(self) -> bool {
        matches!(self, AssertionLevel::Normal | AssertionLevel::Heavy)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct BuildConfig {
    pub assertion_level: AssertionLevel,
    pub hash_seed: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig { assertion_level: AssertionLevel::Normal, hash_seed: 0x5f31_1234_abcd_ef00 }
    }
}
