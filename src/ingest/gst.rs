//! GStreamer adapter.
//!
//! Maps a `gstreamer::BufferRef` readable with its negotiated `VideoInfo` and
//! exposes the planes through `VideoBuffer`. A `VideoCropMeta` attached to the
//! buffer becomes the per-buffer crop region.

use gstreamer as gst;
use gstreamer_video as gst_video;
use gstreamer_video::prelude::*;

use crate::error::{ChecksumError, Result};
use crate::frame::{CropRegion, FrameGeometry, PixelFormat};
use crate::plane::{PlaneView, VideoBuffer};

/// Geometry for negotiated caps (set-caps time).
///
/// Every raw format is accepted here; formats that cannot be packed are
/// rejected per frame by `extract`.
pub fn geometry_from_info(info: &gst_video::VideoInfo) -> FrameGeometry {
    let format = match info.format() {
        gst_video::VideoFormat::I420 => PixelFormat::I420,
        gst_video::VideoFormat::Yv12 => PixelFormat::Yv12,
        gst_video::VideoFormat::Nv12 => PixelFormat::Nv12,
        gst_video::VideoFormat::Yuy2 => PixelFormat::Yuy2,
        gst_video::VideoFormat::Rgb => PixelFormat::Rgb,
        gst_video::VideoFormat::Bgra => PixelFormat::Bgra,
        other => PixelFormat::Other(other.to_str().as_str()),
    };
    FrameGeometry::new(format, info.width(), info.height())
}

/// Readable mapping of one GStreamer video buffer.
pub struct GstVideoBuffer<'a> {
    frame: gst_video::VideoFrameRef<&'a gst::BufferRef>,
    crop: Option<CropRegion>,
}

impl<'a> GstVideoBuffer<'a> {
    pub fn map(buffer: &'a gst::BufferRef, info: &gst_video::VideoInfo) -> Result<Self> {
        let crop = buffer.meta::<gst_video::VideoCropMeta>().map(|meta| {
            let (_, _, width, height) = meta.rect();
            CropRegion::new(width, height)
        });
        let frame = gst_video::VideoFrameRef::from_buffer_ref_readable(buffer, info)
            .map_err(|e| ChecksumError::FrameMap(e.to_string()))?;
        Ok(Self { frame, crop })
    }
}

impl VideoBuffer for GstVideoBuffer<'_> {
    fn plane(&self, index: usize) -> Option<PlaneView<'_>> {
        let stride = *self.frame.plane_stride().get(index)?;
        let data = self.frame.plane_data(u32::try_from(index).ok()?).ok()?;
        Some(PlaneView::new(data, usize::try_from(stride).ok()?))
    }

    fn crop(&self) -> Option<CropRegion> {
        self.crop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{digest, ChecksumAlgorithm};
    use crate::report::{CollectingReporter, FrameReport};
    use crate::sink::{ChecksumSink, SinkSettings};

    fn sink() -> ChecksumSink<CollectingReporter> {
        ChecksumSink::new(SinkSettings::default(), CollectingReporter::default())
    }

    #[test]
    fn mapped_i420_buffer_matches_tight_digest() -> Result<()> {
        gst::init().expect("gstreamer init");
        // 8x8 I420 has no row padding: strides 8/4/4.
        let info = gst_video::VideoInfo::builder(gst_video::VideoFormat::I420, 8, 8)
            .build()
            .expect("video info");
        let mut bytes = vec![0x00u8; 64];
        bytes.extend([0x01; 16]);
        bytes.extend([0x02; 16]);
        assert_eq!(info.size(), bytes.len());
        let buffer = gst::Buffer::from_slice(bytes.clone());

        let geometry = geometry_from_info(&info);
        assert_eq!(geometry, FrameGeometry::new(PixelFormat::I420, 8, 8));

        let mapped = GstVideoBuffer::map(buffer.as_ref(), &info)?;
        let mut sink = sink();
        sink.configure(geometry)?;
        let report = sink.process_frame(&mapped)?;
        assert_eq!(
            report,
            FrameReport::Frame(digest(&bytes, ChecksumAlgorithm::Sha1))
        );
        Ok(())
    }

    #[test]
    fn unlisted_formats_fail_per_frame() -> Result<()> {
        gst::init().expect("gstreamer init");
        let info = gst_video::VideoInfo::builder(gst_video::VideoFormat::Gray8, 4, 4)
            .build()
            .expect("video info");
        let geometry = geometry_from_info(&info);
        assert!(!geometry.format.is_supported());

        let buffer = gst::Buffer::from_slice(vec![0u8; info.size()]);
        let mapped = GstVideoBuffer::map(buffer.as_ref(), &info)?;
        let mut sink = sink();
        sink.configure(geometry)?;
        assert!(matches!(
            sink.process_frame(&mapped),
            Err(ChecksumError::UnsupportedFormat { .. })
        ));
        assert!(sink.reporter().reports.is_empty());
        Ok(())
    }
}
