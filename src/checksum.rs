//! Checksum computation over packed frames.
//!
//! `digest` is a pure function over a byte slice. `plane_digests` applies it to
//! each plane sub-range of a `ContiguousBuffer`, labelling every result with
//! the semantic plane it covers rather than its storage index.

use std::fmt;
use std::str::FromStr;

use md5::Md5;
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest as _, Sha256};

use crate::error::{ChecksumError, Result};
use crate::frame::{PlaneId, PLANE_COUNT};
use crate::plane::ContiguousBuffer;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    Md5,
    #[default]
    Sha1,
    Sha256,
}

impl ChecksumAlgorithm {
    pub const ALL: [ChecksumAlgorithm; 3] = [
        ChecksumAlgorithm::Md5,
        ChecksumAlgorithm::Sha1,
        ChecksumAlgorithm::Sha256,
    ];

    /// Digest length in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            ChecksumAlgorithm::Md5 => 16,
            ChecksumAlgorithm::Sha1 => 20,
            ChecksumAlgorithm::Sha256 => 32,
        }
    }

    /// Length of the lowercase hex rendering.
    pub fn hex_len(self) -> usize {
        self.digest_len() * 2
    }

    pub fn name(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "md5",
            ChecksumAlgorithm::Sha1 => "sha1",
            ChecksumAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(ChecksumAlgorithm::Md5),
            "sha1" | "sha-1" => Ok(ChecksumAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(ChecksumAlgorithm::Sha256),
            _ => Err(ChecksumError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ChecksumAlgorithm {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Immutable digest value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: ChecksumAlgorithm,
    bytes: Vec<u8>,
}

impl Digest {
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash `bytes` with `algorithm`.
pub fn digest(bytes: &[u8], algorithm: ChecksumAlgorithm) -> Digest {
    let bytes = match algorithm {
        ChecksumAlgorithm::Md5 => Md5::digest(bytes).to_vec(),
        ChecksumAlgorithm::Sha1 => Sha1::digest(bytes).to_vec(),
        ChecksumAlgorithm::Sha256 => Sha256::digest(bytes).to_vec(),
    };
    Digest { algorithm, bytes }
}

/// Hex digest of `bytes`.
pub fn digest_hex(bytes: &[u8], algorithm: ChecksumAlgorithm) -> String {
    digest(bytes, algorithm).to_hex()
}

/// Digest of one plane of a packed frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaneDigest {
    pub plane: PlaneId,
    pub storage_index: usize,
    pub digest: Digest,
}

/// Digest over the whole packed frame.
pub fn frame_digest(buffer: &ContiguousBuffer, algorithm: ChecksumAlgorithm) -> Digest {
    digest(buffer.as_bytes(), algorithm)
}

/// Per-plane digests in storage order.
///
/// The plane at storage index 1 is U for I420 and V for YV12; index 2 holds
/// the other chroma plane, starting right after index 1.
pub fn plane_digests(
    buffer: &ContiguousBuffer,
    algorithm: ChecksumAlgorithm,
) -> Result<Vec<PlaneDigest>> {
    let order = buffer.format().plane_order()?;
    let mut digests = Vec::with_capacity(PLANE_COUNT);
    for (storage_index, plane) in order.into_iter().enumerate() {
        let bytes = buffer.plane_bytes(storage_index)?;
        digests.push(PlaneDigest {
            plane,
            storage_index,
            digest: digest(bytes, algorithm),
        });
    }
    Ok(digests)
}
