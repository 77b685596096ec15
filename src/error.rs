//! Crate-wide error taxonomy.
//!
//! Matches the kinds (not concrete types) laid out for the core: a fatal
//! input-contract violation, a finalized-data invariant violation, an IO
//! framing error, or an algorithmic precondition failure. Every fallible
//! core operation returns `Result<_, SfkitError>`; nothing here is ever
//! recovered locally — construction is transactional, a partially-built
//! forest is simply dropped on `Err`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SfkitError {
    #[error("input violates contract: {detail}")]
    InputViolatesContract { detail: String },

    #[error("invariant violation in finalized data: {detail}")]
    InvariantViolation { detail: String },

    #[error("io error reading/writing {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("bad magic in {path}: expected {expected:#018x}, found {found:#018x}")]
    BadMagic { path: String, expected: u64, found: u64 },

    #[error("unsupported version in {path}: expected {expected}, found {found}")]
    UnsupportedVersion { path: String, expected: u64, found: u64 },

    #[error("short read in {path}: expected field `{field}`")]
    ShortRead { path: String, field: &'static str },

    #[error("algorithmic precondition violated: {detail}")]
    AlgorithmicPrecondition { detail: String },
}

pub type Result<T> = std::result::Result<T, SfkitError>;
