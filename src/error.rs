//! Error types for frame extraction, checksumming and reporting.
//!
//! Only `FrameMap` is fatal: once the collaborator fails to hand over mapped
//! plane memory the session is terminated. Every other error fails the
//! current frame and leaves the sink configured.

use std::io;

use thiserror::Error;

use crate::frame::PixelFormat;

/// Result type for checksum operations
pub type Result<T> = std::result::Result<T, ChecksumError>;

#[derive(Debug, Error)]
pub enum ChecksumError {
    /// Format outside {I420, YV12}, or a plane index the format does not have.
    #[error("unsupported raw video format {format}, only I420 and YV12 are supported")]
    UnsupportedFormat { format: PixelFormat },

    /// Geometry that 4:2:0 packing cannot represent (odd, zero, oversize crop).
    #[error("invalid frame geometry: {0}")]
    InvalidGeometry(String),

    /// Collaborator could not supply mapped plane data.
    #[error("failed to map frame: {0}")]
    FrameMap(String),

    /// Packed buffer allocation could not be satisfied.
    #[error("failed to allocate {size} byte packed frame buffer")]
    Allocation { size: usize },

    #[error("unknown checksum type '{0}' (expected md5, sha1 or sha256)")]
    UnknownAlgorithm(String),

    #[error("unknown pixel format '{0}'")]
    UnknownFormat(String),

    #[error("sink is not configured, call configure() before processing frames")]
    NotConfigured,

    #[error("checksum session terminated after a fatal error")]
    SessionTerminated,

    #[error("failed to write report: {0}")]
    Report(#[from] io::Error),
}

impl ChecksumError {
    /// Fatal errors end the processing session instead of just the frame.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ChecksumError::FrameMap(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_frame_map_is_fatal() {
        assert!(ChecksumError::FrameMap("gone".into()).is_fatal());
        assert!(!ChecksumError::UnsupportedFormat {
            format: PixelFormat::Nv12
        }
        .is_fatal());
        assert!(!ChecksumError::Allocation { size: 24 }.is_fatal());
        assert!(!ChecksumError::InvalidGeometry("odd".into()).is_fatal());
    }

    #[test]
    fn unsupported_format_names_the_format() {
        let err = ChecksumError::UnsupportedFormat {
            format: PixelFormat::Nv12,
        };
        assert!(err.to_string().contains("NV12"));
    }
}
