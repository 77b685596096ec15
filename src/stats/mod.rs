//! Population-genetics statistics kernels, one module per statistic
//! rather than folded into one monolithic module.
//!
//! Every kernel here is a thin free function over an already-built
//! [`crate::frequencies::AlleleFrequencies`] stream plus plain sample-set
//! sizes: none of them own a forest or a sequence, so the same kernel works
//! unmodified whether the frequencies came from a DAG or a BP encoding.

pub mod afs;
pub mod diversity;
pub mod divergence;
pub mod fst;
pub mod lca;
pub mod patterson;
pub mod segregating_sites;
pub mod tajimas_d;

pub use afs::allele_frequency_spectrum;
pub use diversity::diversity;
pub use divergence::divergence;
pub use fst::fst;
pub use lca::lca;
pub use patterson::{f2, f3, f4};
pub use segregating_sites::num_segregating_sites;
pub use tajimas_d::tajimas_d;
