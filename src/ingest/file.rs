//! Local raw-frame source.
//!
//! `FileSource` reads consecutive planar 4:2:0 frames from a local file. Each
//! frame is stored plane after plane (storage order of the format), every row
//! occupying `stride` bytes. `stub://` paths produce a deterministic test
//! pattern instead, with padding bytes in every row so strides matter.
//!
//! The file source MUST NOT:
//! - Fetch remote URLs
//! - Retain frames after handing them over

use anyhow::{anyhow, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};

use super::PlaneBuffer;
use crate::config::StrideSettings;
use crate::frame::{FrameGeometry, PLANE_COUNT};

/// Byte used for row padding in synthetic frames.
const SYNTHETIC_PAD: u8 = 0xEE;

/// Configuration for a raw frame file source.
#[derive(Clone, Debug)]
pub struct FileConfig {
    /// Local file path, or `stub://<name>` for synthetic frames.
    pub path: String,
    /// Full (uncropped) frame geometry of the stored frames.
    pub geometry: FrameGeometry,
    pub strides: StrideSettings,
    /// Number of frames a synthetic source produces before it ends.
    pub synthetic_frames: u64,
}

impl FileConfig {
    pub fn new(path: impl Into<String>, geometry: FrameGeometry) -> Self {
        Self {
            path: path.into(),
            geometry,
            strides: StrideSettings::default(),
            synthetic_frames: 10,
        }
    }

    /// Row strides per storage index, defaulting to tight rows.
    pub fn plane_strides(&self) -> [usize; PLANE_COUNT] {
        let width = self.geometry.width as usize;
        let luma = self.strides.y.unwrap_or(width);
        let chroma = self.strides.uv.unwrap_or(width / 2);
        [luma, chroma, chroma]
    }

    /// Bytes occupied by one stored frame.
    pub fn frame_len(&self) -> usize {
        let height = self.geometry.height as usize;
        let [y, u, v] = self.plane_strides();
        y * height + (u + v) * (height / 2)
    }
}

/// Raw frame source.
pub struct FileSource {
    backend: FileBackend,
}

enum FileBackend {
    Raw(RawFileSource),
    Synthetic(SyntheticFileSource),
}

impl FileSource {
    pub fn new(config: FileConfig) -> Result<Self> {
        if !is_local_file_path(&config.path) {
            return Err(anyhow!(
                "file ingestion only supports local paths (no URL schemes)"
            ));
        }
        if !config.geometry.format.is_supported() {
            return Err(anyhow!(
                "file ingestion reads planar 4:2:0 frames only (got {})",
                config.geometry.format
            ));
        }
        config
            .geometry
            .validate()
            .map_err(|e| anyhow!("file source geometry: {}", e))?;
        let [y, u, _] = config.plane_strides();
        if y < config.geometry.width as usize || u < (config.geometry.width / 2) as usize {
            return Err(anyhow!("file source strides are narrower than the frame"));
        }

        if config.path.starts_with("stub://") {
            Ok(Self {
                backend: FileBackend::Synthetic(SyntheticFileSource::new(config)),
            })
        } else {
            Ok(Self {
                backend: FileBackend::Raw(RawFileSource::open(config)?),
            })
        }
    }

    /// Next frame, or `None` once the source is exhausted.
    pub fn next_frame(&mut self) -> Result<Option<PlaneBuffer>> {
        match &mut self.backend {
            FileBackend::Raw(source) => source.next_frame(),
            FileBackend::Synthetic(source) => Ok(source.next_frame()),
        }
    }

    pub fn stats(&self) -> FileStats {
        match &self.backend {
            FileBackend::Raw(source) => FileStats {
                frames_read: source.frame_count,
                path: source.config.path.clone(),
            },
            FileBackend::Synthetic(source) => FileStats {
                frames_read: source.frame_count,
                path: source.config.path.clone(),
            },
        }
    }
}

/// Statistics for a file source.
#[derive(Clone, Debug)]
pub struct FileStats {
    pub frames_read: u64,
    pub path: String,
}

// ----------------------------------------------------------------------------
// Raw planar file
// ----------------------------------------------------------------------------

struct RawFileSource {
    config: FileConfig,
    reader: BufReader<File>,
    frame_count: u64,
}

impl RawFileSource {
    fn open(config: FileConfig) -> Result<Self> {
        let file = File::open(&config.path)
            .map_err(|e| anyhow!("failed to open raw frame file {}: {}", config.path, e))?;
        log::info!(
            "FileSource: reading {} ({} bytes per frame)",
            config.path,
            config.frame_len()
        );
        Ok(Self {
            config,
            reader: BufReader::new(file),
            frame_count: 0,
        })
    }

    fn next_frame(&mut self) -> Result<Option<PlaneBuffer>> {
        let height = self.config.geometry.height as usize;
        let strides = self.config.plane_strides();
        let rows = [height, height / 2, height / 2];

        // End of input is only clean on a frame boundary.
        let pending = self
            .reader
            .fill_buf()
            .map_err(|e| anyhow!("failed to read {}: {}", self.config.path, e))?;
        if pending.is_empty() {
            return Ok(None);
        }

        let mut planes: [Vec<u8>; PLANE_COUNT] = Default::default();
        for (index, plane) in planes.iter_mut().enumerate() {
            let mut data = vec![0u8; strides[index] * rows[index]];
            match self.reader.read_exact(&mut data) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Err(anyhow!(
                        "truncated frame {} in {}",
                        self.frame_count + 1,
                        self.config.path
                    ));
                }
                Err(e) => {
                    return Err(anyhow!("failed to read {}: {}", self.config.path, e));
                }
            }
            *plane = data;
        }

        self.frame_count += 1;
        Ok(Some(PlaneBuffer::new(planes, strides)))
    }
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for tests
// ----------------------------------------------------------------------------

struct SyntheticFileSource {
    config: FileConfig,
    frame_count: u64,
}

impl SyntheticFileSource {
    fn new(config: FileConfig) -> Self {
        log::info!("FileSource: connected to {} (synthetic)", config.path);
        Self {
            config,
            frame_count: 0,
        }
    }

    fn next_frame(&mut self) -> Option<PlaneBuffer> {
        if self.frame_count >= self.config.synthetic_frames {
            return None;
        }
        self.frame_count += 1;

        let geometry = self.config.geometry;
        let seed = self.frame_count as u8;
        let mut frame = PlaneBuffer::filled(
            &geometry,
            self.config.plane_strides(),
            [0, 0x80u8.wrapping_add(seed), 0x40u8.wrapping_sub(seed)],
            SYNTHETIC_PAD,
        );

        // Luma ramp that moves one step per frame.
        let width = geometry.width as usize;
        let stride = frame.strides()[0];
        if let Some(luma) = frame.plane_data_mut(0) {
            for (row_index, row) in luma.chunks_mut(stride).enumerate() {
                for (col, pixel) in row[..width].iter_mut().enumerate() {
                    *pixel = ((row_index + col) as u64 + self.frame_count) as u8;
                }
            }
        }
        Some(frame)
    }
}

fn is_local_file_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    if path.starts_with("stub://") {
        return true;
    }
    !path.contains("://")
}
