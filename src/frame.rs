//! Frame geometry.
//!
//! - `PixelFormat`: negotiated raw video format. Only I420 and YV12 are packed;
//!   the rest exist so they can be named and rejected.
//! - `PlaneId`: semantic plane identity (Y, U, V), independent of storage order.
//! - `FrameGeometry`: format, full size and optional crop, set at configure time.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ChecksumError, Result};

/// Number of planes in a planar 4:2:0 frame.
pub const PLANE_COUNT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    I420,
    Yv12,
    Nv12,
    Yuy2,
    Rgb,
    Bgra,
    /// Any other negotiated format, by its pipeline name.
    Other(&'static str),
}

impl PixelFormat {
    /// True for the planar 4:2:0 layouts this crate can pack.
    pub fn is_supported(self) -> bool {
        matches!(self, PixelFormat::I420 | PixelFormat::Yv12)
    }

    /// Semantic identity of each plane in storage order.
    pub fn plane_order(self) -> Result<[PlaneId; PLANE_COUNT]> {
        match self {
            PixelFormat::I420 => Ok([PlaneId::Y, PlaneId::U, PlaneId::V]),
            PixelFormat::Yv12 => Ok([PlaneId::Y, PlaneId::V, PlaneId::U]),
            format => Err(ChecksumError::UnsupportedFormat { format }),
        }
    }

    /// Semantic plane stored at `index`. Indices past the last plane are unsupported.
    pub fn plane_at(self, index: usize) -> Result<PlaneId> {
        let order = self.plane_order()?;
        order
            .get(index)
            .copied()
            .ok_or(ChecksumError::UnsupportedFormat { format: self })
    }

    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::I420 => "I420",
            PixelFormat::Yv12 => "YV12",
            PixelFormat::Nv12 => "NV12",
            PixelFormat::Yuy2 => "YUY2",
            PixelFormat::Rgb => "RGB",
            PixelFormat::Bgra => "BGRA",
            PixelFormat::Other(name) => name,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I420" => Ok(PixelFormat::I420),
            "YV12" => Ok(PixelFormat::Yv12),
            "NV12" => Ok(PixelFormat::Nv12),
            "YUY2" => Ok(PixelFormat::Yuy2),
            "RGB" => Ok(PixelFormat::Rgb),
            "BGRA" => Ok(PixelFormat::Bgra),
            _ => Err(ChecksumError::UnknownFormat(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for PixelFormat {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Semantic plane label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaneId {
    Y,
    U,
    V,
}

impl PlaneId {
    pub fn label(self) -> &'static str {
        match self {
            PlaneId::Y => "Y",
            PlaneId::U => "U",
            PlaneId::V => "V",
        }
    }

    pub fn is_chroma(self) -> bool {
        !matches!(self, PlaneId::Y)
    }
}

impl fmt::Display for PlaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct CropRegion {
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl FromStr for CropRegion {
    type Err = ChecksumError;

    /// Parses `WIDTHxHEIGHT`, e.g. `320x240`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ChecksumError::InvalidGeometry(format!("crop '{}' is not WxH", s));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse().map_err(|_| invalid())?;
        let height = h.trim().parse().map_err(|_| invalid())?;
        Ok(Self { width, height })
    }
}

/// Width and height of one plane in bytes/rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneSize {
    pub width: usize,
    pub height: usize,
}

impl PlaneSize {
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Geometry negotiated for the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGeometry {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub crop: Option<CropRegion>,
}

impl FrameGeometry {
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
            crop: None,
        }
    }

    pub fn with_crop(mut self, crop: Option<CropRegion>) -> Self {
        self.crop = crop;
        self
    }

    /// Crop region if present, else the full frame size.
    pub fn effective_size(&self) -> (u32, u32) {
        match self.crop {
            Some(crop) => (crop.width, crop.height),
            None => (self.width, self.height),
        }
    }

    /// Rejects dimensions 4:2:0 packing cannot represent. Odd sizes fail closed.
    pub fn validate(&self) -> Result<()> {
        check_dimensions("frame", self.width, self.height)?;
        if let Some(crop) = self.crop {
            check_dimensions("crop", crop.width, crop.height)?;
            if crop.width > self.width || crop.height > self.height {
                return Err(ChecksumError::InvalidGeometry(format!(
                    "crop {}x{} exceeds frame {}x{}",
                    crop.width, crop.height, self.width, self.height
                )));
            }
        }
        Ok(())
    }

    /// Dimensions of the plane stored at `index` after crop resolution.
    pub fn plane_size(&self, index: usize) -> Result<PlaneSize> {
        let plane = self.format.plane_at(index)?;
        let (w, h) = self.effective_size();
        let (w, h) = (w as usize, h as usize);
        if plane.is_chroma() {
            Ok(PlaneSize {
                width: w / 2,
                height: h / 2,
            })
        } else {
            Ok(PlaneSize {
                width: w,
                height: h,
            })
        }
    }

    /// Packed size in bytes: `Ysize + Usize + Vsize`.
    pub fn packed_len(&self) -> Result<usize> {
        let (w, h) = self.effective_size();
        let (w, h) = (w as usize, h as usize);
        let luma = w
            .checked_mul(h)
            .ok_or_else(|| ChecksumError::InvalidGeometry("frame dimensions overflow".into()))?;
        let chroma = (w / 2) * (h / 2);
        luma.checked_add(chroma * 2)
            .ok_or_else(|| ChecksumError::InvalidGeometry("frame dimensions overflow".into()))
    }
}

fn check_dimensions(what: &str, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ChecksumError::InvalidGeometry(format!(
            "{} dimensions {}x{} must be non-zero",
            what, width, height
        )));
    }
    if width % 2 != 0 || height % 2 != 0 {
        return Err(ChecksumError::InvalidGeometry(format!(
            "{} dimensions {}x{} must be even for 4:2:0 subsampling",
            what, width, height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_order_differs_between_i420_and_yv12() -> Result<()> {
        assert_eq!(
            PixelFormat::I420.plane_order()?,
            [PlaneId::Y, PlaneId::U, PlaneId::V]
        );
        assert_eq!(
            PixelFormat::Yv12.plane_order()?,
            [PlaneId::Y, PlaneId::V, PlaneId::U]
        );
        Ok(())
    }

    #[test]
    fn plane_index_past_last_is_unsupported() {
        let err = PixelFormat::I420.plane_at(3).unwrap_err();
        assert!(matches!(
            err,
            ChecksumError::UnsupportedFormat {
                format: PixelFormat::I420
            }
        ));
    }

    #[test]
    fn non_planar_formats_have_no_plane_order() {
        for format in [
            PixelFormat::Nv12,
            PixelFormat::Yuy2,
            PixelFormat::Rgb,
            PixelFormat::Other("GRAY8"),
        ] {
            assert!(format.plane_order().is_err());
            assert!(!format.is_supported());
        }
        assert_eq!(PixelFormat::Other("I420_10LE").to_string(), "I420_10LE");
    }

    #[test]
    fn chroma_planes_are_subsampled() -> Result<()> {
        let geometry = FrameGeometry::new(PixelFormat::Yv12, 8, 6);
        assert!(!PixelFormat::Yv12.plane_at(0)?.is_chroma());
        assert!(PixelFormat::Yv12.plane_at(1)?.is_chroma());
        assert_eq!(geometry.plane_size(0)?.len(), 48);
        assert_eq!(geometry.plane_size(2)?.len(), 12);
        Ok(())
    }

    #[test]
    fn parses_formats_case_insensitively() -> Result<()> {
        assert_eq!("i420".parse::<PixelFormat>()?, PixelFormat::I420);
        assert_eq!("YV12".parse::<PixelFormat>()?, PixelFormat::Yv12);
        assert_eq!(" nv12 ".parse::<PixelFormat>()?, PixelFormat::Nv12);
        assert!("P010".parse::<PixelFormat>().is_err());
        Ok(())
    }

    #[test]
    fn crop_overrides_frame_size() -> Result<()> {
        let geometry =
            FrameGeometry::new(PixelFormat::I420, 8, 8).with_crop(Some(CropRegion::new(4, 4)));
        assert_eq!(geometry.effective_size(), (4, 4));
        assert_eq!(geometry.packed_len()?, 24);
        assert_eq!(
            geometry.plane_size(2)?,
            PlaneSize {
                width: 2,
                height: 2
            }
        );
        Ok(())
    }

    #[test]
    fn odd_and_zero_dimensions_fail_closed() {
        assert!(FrameGeometry::new(PixelFormat::I420, 5, 4).validate().is_err());
        assert!(FrameGeometry::new(PixelFormat::I420, 4, 0).validate().is_err());
        let odd_crop =
            FrameGeometry::new(PixelFormat::I420, 8, 8).with_crop(Some(CropRegion::new(3, 4)));
        assert!(odd_crop.validate().is_err());
    }

    #[test]
    fn oversize_crop_is_rejected() {
        let geometry =
            FrameGeometry::new(PixelFormat::Yv12, 8, 8).with_crop(Some(CropRegion::new(10, 8)));
        assert!(matches!(
            geometry.validate(),
            Err(ChecksumError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn parses_crop_region() -> Result<()> {
        assert_eq!("320x240".parse::<CropRegion>()?, CropRegion::new(320, 240));
        assert!("320".parse::<CropRegion>().is_err());
        Ok(())
    }
}
