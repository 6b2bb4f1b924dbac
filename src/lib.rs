//! Frame checksum sink
//!
//! Deterministic content checksums for planar video frames, used by
//! validation harnesses to catch silent corruption from upstream stages.
//!
//! # Pipeline
//!
//! For each frame the sink:
//!
//! 1. Resolves the effective size (a crop region overrides the frame size).
//! 2. Packs the planes into one stride-free buffer (`plane::extract`).
//! 3. Hashes the whole buffer, or each plane sub-range (`checksum`).
//! 4. Hands a structured `FrameReport` to a `Reporter` that owns the output.
//!
//! Only planar 4:2:0 I420 and YV12 are packed. They differ in chroma storage
//! order (U,V vs V,U), so per-plane results are labelled by semantic plane,
//! never by storage index alone.
//!
//! # Module Structure
//!
//! - `frame`: pixel formats, plane identities, frame geometry
//! - `plane`: mapped-buffer trait and the packing extractor
//! - `checksum`: digest algorithms and per-plane digests
//! - `report`: output contract and reporters
//! - `sink`: configure/process state machine
//! - `config`: file + environment configuration
//! - `ingest`: frame sources (raw files, synthetic, GStreamer)

pub mod checksum;
pub mod config;
pub mod error;
pub mod frame;
pub mod ingest;
pub mod plane;
pub mod report;
pub mod sink;

pub use checksum::{digest, digest_hex, plane_digests, ChecksumAlgorithm, Digest, PlaneDigest};
pub use config::{ChecksumConfig, StrideSettings};
pub use error::{ChecksumError, Result};
pub use frame::{CropRegion, FrameGeometry, PixelFormat, PlaneId, PlaneSize, PLANE_COUNT};
pub use ingest::{FileConfig, FileSource, PlaneBuffer};
pub use plane::{extract, ContiguousBuffer, PlaneView, VideoBuffer};
pub use report::{
    format_report, CollectingReporter, FrameReport, LabelledReporter, LineReporter, Reporter,
};
pub use sink::{ChecksumSink, SinkSettings, SinkState, SinkStats};
