//! Succinct forest: a compressor and query engine for tree sequences
//! (ancestral recombination graphs), built around subtree fingerprinting
//! to share structurally identical subtrees — whether as an explicit DAG
//! of postordered edges or as a balanced-parenthesis string with rank
//! support.
//!
//! Modules:
//! - `ids`: primitive identifiers and the `SampleSet` bitmap.
//! - `error`: crate-wide error taxonomy.
//! - `config`: build-time configuration (assertion level, hash seed).
//! - `hash`: order-sensitive 128-bit subtree fingerprinting.
//! - `nodemap`: fingerprint → dense node id map.
//! - `graph`: postordered edge-list graph.
//! - `dag`: DAG-compressed forest.
//! - `bp`: balanced-parenthesis compressed forest, bit vectors, rank support.
//! - `sequence`: genomic sequence store (ancestral states + mutations).
//! - `reader`: the external tree-sequence reader interface.
//! - `seqfactory`: sequence-factory build pass, driven per tree.
//! - `compress`: the DAG and BP forest compressors.
//! - `samples`: number-of-samples-below queries.
//! - `frequencies`: allele-frequency iteration.
//! - `stats`: population-genetics statistics kernels.
//! - `io`: magic + version framed binary serialization.
//! - `forest`: the `SuccinctForest` facade tying everything together.
//! - `util`: ambient logging/timing helpers.
//! - `fileformat`: a small text format for `TreeSequenceReader`, standing in
//!   for the out-of-scope tskit binding so the CLI has something to compress.

pub mod ids;
pub mod error;
pub mod config;
pub mod hash;
pub mod nodemap;
pub mod graph;
pub mod dag;
pub mod bp;
pub mod sequence;
pub mod reader;
pub mod seqfactory;
pub mod compress;
pub mod samples;
pub mod frequencies;
pub mod stats;
pub mod io;
pub mod forest;
pub mod util;
pub mod fileformat;

pub use config::{AssertionLevel, BuildConfig};
pub use error::{Result, SfkitError};
pub use forest::SuccinctForest;
pub use ids::{NodeId, SampleId, SampleSet};
