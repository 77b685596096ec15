//! Magic + version framed binary IO: save/load for both compressed
//! encodings.
//!
//! Framing is magic-then-version-then-payload; the payload itself is
//! `bincode`-encoded rather than hand-rolled, since the rest of the crate's
//! data types already derive `serde::{Serialize, Deserialize}` for exactly
//! this purpose.

use crate::bp::BPCompressedForest;
use crate::dag::DAGCompressedForest;
use crate::error::{Result, SfkitError};
use crate::sequence::GenomicSequence;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const DAG_MAGIC: u64 = 0x1227_BF3D_F7C5_2E1C;
const DAG_VERSION: u32 = 3;
const BP_MAGIC: u64 = 0x69B7_F5CF_81D0_1D43;
const BP_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct DagPayload {
    forest: DAGCompressedForest,
    sequence: GenomicSequence,
}

#[derive(Serialize, Deserialize)]
struct BpPayload {
    forest: BPCompressedForest,
    sequence: GenomicSequence,
}

fn write_framed<T: Serialize>(path: &Path, magic: u64, version: u32, payload: &T) -> Result<()> {
    let file = File::create(path).map_err(|source| SfkitError::Io { path: path.display().to_string(), source })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&magic.to_le_bytes())
        .and_then(|_| writer.write_all(&version.to_le_bytes()))
        .map_err(|source| SfkitError::Io { path: path.display().to_string(), source })?;
    let body = bincode::serialize(payload).map_err(|e| SfkitError::InvariantViolation { detail: e.to_string() })?;
    writer
        .write_all(&body)
        .map_err(|source| SfkitError::Io { path: path.display().to_string(), source })?;
    Ok(())
}

fn read_framed<T: for<'de> Deserialize<'de>>(path: &Path, expected_magic: u64, expected_version: u32) -> Result<T> {
    let path_str = path.display().to_string();
    let file = File::open(path).map_err(|source| SfkitError::Io { path: path_str.clone(), source })?;
    let mut reader = BufReader::new(file);

    let mut magic_bytes = [0u8; 8];
    reader
        .read_exact(&mut magic_bytes)
        .map_err(|_| SfkitError::ShortRead { path: path_str.clone(), field: "magic" })?;
    let magic = u64::from_le_bytes(magic_bytes);
    if magic != expected_magic {
        return Err(SfkitError::BadMagic { path: path_str, expected: expected_magic, found: magic });
    }

    let mut version_bytes = [0u8; 4];
    reader
        .read_exact(&mut version_bytes)
        .map_err(|_| SfkitError::ShortRead { path: path_str.clone(), field: "version" })?;
    let version = u32::from_le_bytes(version_bytes);
    if version != expected_version {
        return Err(SfkitError::UnsupportedVersion {
            path: path_str,
            expected: expected_version as u64,
            found: version as u64,
        });
    }

    let mut rest = Vec::new();
    reader
        .read_to_end(&mut rest)
        .map_err(|source| SfkitError::Io { path: path_str.clone(), source })?;
    bincode::deserialize(&rest).map_err(|_| SfkitError::ShortRead { path: path_str, field: "payload" })
}

pub fn save_dag(path: impl AsRef<Path>, forest: &DAGCompressedForest, sequence: &GenomicSequence) -> Result<()> {
    let payload = DagPayload { forest: forest.clone(), sequence: sequence.clone() };
    write_framed(path.as_ref(), DAG_MAGIC, DAG_VERSION, &payload)
}

pub fn load_dag(path: impl AsRef<Path>) -> Result<(DAGCompressedForest, GenomicSequence)> {
    let payload: DagPayload = read_framed(path.as_ref(), DAG_MAGIC, DAG_VERSION)?;
    Ok((payload.forest, payload.sequence))
}

pub fn save_bp(path: impl AsRef<Path>, forest: &BPCompressedForest, sequence: &GenomicSequence) -> Result<()> {
    let payload = BpPayload { forest: forest.clone(), sequence: sequence.clone() };
    write_framed(path.as_ref(), BP_MAGIC, BP_VERSION, &payload)
}

pub fn load_bp(path: impl AsRef<Path>) -> Result<(BPCompressedForest, GenomicSequence)> {
    let payload: BpPayload = read_framed(path.as_ref(), BP_MAGIC, BP_VERSION)?;
    Ok((payload.forest, payload.sequence))
}
