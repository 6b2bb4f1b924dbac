//! Owned planar frame.
//!
//! `PlaneBuffer` holds one `Vec<u8>` per stored plane plus its row stride and
//! an optional per-buffer crop. Sources hand these to the sink, which reads
//! them through `VideoBuffer` and never keeps them.

use crate::frame::{CropRegion, FrameGeometry, PLANE_COUNT};
use crate::plane::{PlaneView, VideoBuffer};

/// Owned planar frame: three planes, each with its own row stride.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaneBuffer {
    planes: [Vec<u8>; PLANE_COUNT],
    strides: [usize; PLANE_COUNT],
    crop: Option<CropRegion>,
}

impl PlaneBuffer {
    pub fn new(planes: [Vec<u8>; PLANE_COUNT], strides: [usize; PLANE_COUNT]) -> Self {
        Self {
            planes,
            strides,
            crop: None,
        }
    }

    /// Frame for `geometry` with every plane filled by its `values` entry
    /// (storage order). Row padding beyond the plane width is set to `pad`.
    pub fn filled(
        geometry: &FrameGeometry,
        strides: [usize; PLANE_COUNT],
        values: [u8; PLANE_COUNT],
        pad: u8,
    ) -> Self {
        let (w, h) = (geometry.width as usize, geometry.height as usize);
        let dims = [(w, h), (w / 2, h / 2), (w / 2, h / 2)];
        let strides: [usize; PLANE_COUNT] =
            std::array::from_fn(|i| strides[i].max(dims[i].0).max(1));
        let planes = std::array::from_fn(|i| {
            let (width, height) = dims[i];
            let stride = strides[i];
            let mut data = vec![pad; stride * height];
            for row in data.chunks_mut(stride) {
                row[..width].fill(values[i]);
            }
            data
        });
        Self::new(planes, strides)
    }

    /// Attach a per-buffer crop region.
    pub fn with_crop(mut self, crop: Option<CropRegion>) -> Self {
        self.crop = crop;
        self
    }

    pub fn plane_data(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index).map(Vec::as_slice)
    }

    pub fn plane_data_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        self.planes.get_mut(index).map(Vec::as_mut_slice)
    }

    pub fn strides(&self) -> [usize; PLANE_COUNT] {
        self.strides
    }

    pub fn byte_len(&self) -> usize {
        self.planes.iter().map(Vec::len).sum()
    }
}

impl VideoBuffer for PlaneBuffer {
    fn plane(&self, index: usize) -> Option<PlaneView<'_>> {
        let data = self.planes.get(index)?;
        Some(PlaneView::new(data, self.strides[index]))
    }

    fn crop(&self) -> Option<CropRegion> {
        self.crop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelFormat;

    #[test]
    fn filled_frame_pads_rows() {
        let geometry = FrameGeometry::new(PixelFormat::I420, 4, 2);
        let frame = PlaneBuffer::filled(&geometry, [6, 2, 2], [1, 2, 3], 0xEE);
        assert_eq!(
            frame.plane_data(0),
            Some(&[1, 1, 1, 1, 0xEE, 0xEE, 1, 1, 1, 1, 0xEE, 0xEE][..])
        );
        assert_eq!(frame.plane_data(1), Some(&[2, 2][..]));
        assert_eq!(frame.byte_len(), 16);
    }

    #[test]
    fn exposes_planes_and_crop() {
        let geometry = FrameGeometry::new(PixelFormat::I420, 4, 4);
        let frame = PlaneBuffer::filled(&geometry, [4, 2, 2], [0, 1, 2], 0)
            .with_crop(Some(CropRegion::new(2, 2)));
        let view = frame.plane(2).expect("plane 2");
        assert_eq!(view.stride, 2);
        assert!(frame.plane(3).is_none());
        assert_eq!(frame.crop(), Some(CropRegion::new(2, 2)));
    }
}
