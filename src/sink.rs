//! Checksum sink: configure once, then process frames one at a time.
//!
//! States: `Unconfigured -> Configured -> (processing) -> Configured`.
//! A `FrameMap` failure moves the sink to `Terminated`; nothing is processed
//! after that. Any other failure only drops the current frame.

use crate::checksum::{frame_digest, plane_digests, ChecksumAlgorithm};
use crate::error::{ChecksumError, Result};
use crate::frame::FrameGeometry;
use crate::plane::{extract, VideoBuffer};
use crate::report::{FrameReport, Reporter};

/// Per-sink checksum settings. May change between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkSettings {
    pub algorithm: ChecksumAlgorithm,
    /// Emit one digest per plane instead of one per frame.
    pub plane_checksum: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkState {
    Unconfigured,
    Configured,
    Terminated,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub frames_processed: u64,
    pub frames_failed: u64,
}

pub struct ChecksumSink<R: Reporter> {
    settings: SinkSettings,
    geometry: Option<FrameGeometry>,
    terminated: bool,
    reporter: R,
    stats: SinkStats,
}

impl<R: Reporter> ChecksumSink<R> {
    pub fn new(settings: SinkSettings, reporter: R) -> Self {
        Self {
            settings,
            geometry: None,
            terminated: false,
            reporter,
            stats: SinkStats::default(),
        }
    }

    /// Set or replace the stream geometry.
    ///
    /// Shape is validated here; format support is checked per frame so that
    /// an unsupported stream fails on its first buffer, not at negotiation.
    pub fn configure(&mut self, geometry: FrameGeometry) -> Result<()> {
        if self.terminated {
            return Err(ChecksumError::SessionTerminated);
        }
        geometry.validate()?;
        log::info!(
            "checksum sink configured: {} {}x{} crop={:?}",
            geometry.format,
            geometry.width,
            geometry.height,
            geometry.crop
        );
        self.geometry = Some(geometry);
        Ok(())
    }

    pub fn set_settings(&mut self, settings: SinkSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> SinkSettings {
        self.settings
    }

    pub fn geometry(&self) -> Option<&FrameGeometry> {
        self.geometry.as_ref()
    }

    pub fn state(&self) -> SinkState {
        if self.terminated {
            SinkState::Terminated
        } else if self.geometry.is_some() {
            SinkState::Configured
        } else {
            SinkState::Unconfigured
        }
    }

    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Checksum one frame and hand the result to the reporter.
    pub fn process_frame<B: VideoBuffer + ?Sized>(&mut self, buffer: &B) -> Result<FrameReport> {
        if self.terminated {
            return Err(ChecksumError::SessionTerminated);
        }
        let configured = self.geometry.ok_or(ChecksumError::NotConfigured)?;

        match self.checksum(buffer, configured) {
            Ok(report) => {
                self.stats.frames_processed += 1;
                Ok(report)
            }
            Err(err) => {
                self.stats.frames_failed += 1;
                if err.is_fatal() {
                    self.terminated = true;
                    log::error!("checksum session terminated: {}", err);
                } else {
                    log::warn!("frame dropped: {}", err);
                }
                Err(err)
            }
        }
    }

    fn checksum<B: VideoBuffer + ?Sized>(
        &mut self,
        buffer: &B,
        configured: FrameGeometry,
    ) -> Result<FrameReport> {
        let geometry = match buffer.crop() {
            Some(crop) => configured.with_crop(Some(crop)),
            None => configured,
        };

        let packed = extract(buffer, &geometry)?;
        let report = if self.settings.plane_checksum {
            FrameReport::Planes(plane_digests(&packed, self.settings.algorithm)?)
        } else {
            FrameReport::Frame(frame_digest(&packed, self.settings.algorithm))
        };
        log::debug!(
            "frame {}: {} packed bytes, {}",
            self.stats.frames_processed + 1,
            packed.len(),
            self.settings.algorithm
        );
        drop(packed);

        self.reporter.report(&report)?;
        Ok(report)
    }
}
