//! Plane extraction.
//!
//! `extract` copies each plane of a mapped frame into one tightly-packed
//! `ContiguousBuffer`, dropping row padding. Source memory is borrowed
//! read-only through `VideoBuffer` and never retained.

use std::ops::Range;

use crate::error::{ChecksumError, Result};
use crate::frame::{CropRegion, FrameGeometry, PixelFormat, PlaneId, PlaneSize, PLANE_COUNT};

/// One mapped source plane.
#[derive(Clone, Copy, Debug)]
pub struct PlaneView<'a> {
    pub data: &'a [u8],
    /// Byte distance between the starts of consecutive rows.
    pub stride: usize,
}

impl<'a> PlaneView<'a> {
    pub fn new(data: &'a [u8], stride: usize) -> Self {
        Self { data, stride }
    }
}

/// Read-only mapped access to a frame handed over by the pipeline.
pub trait VideoBuffer {
    /// Mapped plane at storage `index`, or `None` if it cannot be mapped.
    fn plane(&self, index: usize) -> Option<PlaneView<'_>>;

    /// Per-buffer crop region. Overrides the crop in the configured geometry.
    fn crop(&self) -> Option<CropRegion> {
        None
    }
}

/// Stride-free copy of a frame: planes back to back in storage order.
#[derive(Debug)]
pub struct ContiguousBuffer {
    data: Vec<u8>,
    format: PixelFormat,
    planes: [Range<usize>; PLANE_COUNT],
}

impl ContiguousBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Byte range of the plane at storage `index`.
    pub fn plane_range(&self, index: usize) -> Result<Range<usize>> {
        self.planes
            .get(index)
            .cloned()
            .ok_or(ChecksumError::UnsupportedFormat {
                format: self.format,
            })
    }

    /// Bytes of the plane at storage `index`.
    pub fn plane_bytes(&self, index: usize) -> Result<&[u8]> {
        let range = self.plane_range(index)?;
        Ok(&self.data[range])
    }

    /// Bytes of a plane looked up by semantic identity.
    pub fn plane_by_id(&self, id: PlaneId) -> Result<&[u8]> {
        let order = self.format.plane_order()?;
        let index = order
            .iter()
            .position(|p| *p == id)
            .ok_or(ChecksumError::UnsupportedFormat {
                format: self.format,
            })?;
        self.plane_bytes(index)
    }
}

/// Pack `frame` into a `ContiguousBuffer` sized for `geometry`.
///
/// Format and geometry are checked before anything is allocated, and the
/// packed buffer is reserved before any plane is mapped. All planes are
/// bounds-checked before the copy starts, so a failure never leaves a
/// partially filled buffer behind.
pub fn extract<B: VideoBuffer + ?Sized>(
    frame: &B,
    geometry: &FrameGeometry,
) -> Result<ContiguousBuffer> {
    if !geometry.format.is_supported() {
        return Err(ChecksumError::UnsupportedFormat {
            format: geometry.format,
        });
    }
    geometry.validate()?;

    let total = geometry.packed_len()?;
    let mut data = Vec::new();
    data.try_reserve_exact(total)
        .map_err(|_| ChecksumError::Allocation { size: total })?;

    let mut sources = Vec::with_capacity(PLANE_COUNT);
    for index in 0..PLANE_COUNT {
        let size = geometry.plane_size(index)?;
        let view = frame.plane(index).ok_or_else(|| {
            ChecksumError::FrameMap(format!("plane {} could not be mapped", index))
        })?;
        check_plane(index, &view, size)?;
        sources.push((view, size));
    }

    let mut planes: [Range<usize>; PLANE_COUNT] = [0..0, 0..0, 0..0];
    for (index, (view, size)) in sources.into_iter().enumerate() {
        let start = data.len();
        for row in 0..size.height {
            let offset = row * view.stride;
            data.extend_from_slice(&view.data[offset..offset + size.width]);
        }
        planes[index] = start..data.len();
    }
    debug_assert_eq!(data.len(), total);

    Ok(ContiguousBuffer {
        data,
        format: geometry.format,
        planes,
    })
}

fn check_plane(index: usize, view: &PlaneView<'_>, size: PlaneSize) -> Result<()> {
    if size.is_empty() {
        return Ok(());
    }
    if view.stride < size.width {
        return Err(ChecksumError::FrameMap(format!(
            "plane {} stride {} is smaller than row width {}",
            index, view.stride, size.width
        )));
    }
    let needed = (size.height - 1)
        .checked_mul(view.stride)
        .and_then(|v| v.checked_add(size.width))
        .ok_or_else(|| ChecksumError::FrameMap(format!("plane {} extent overflows", index)))?;
    if view.data.len() < needed {
        return Err(ChecksumError::FrameMap(format!(
            "plane {} maps {} bytes, need {}",
            index,
            view.data.len(),
            needed
        )));
    }
    Ok(())
}
