use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

use crate::checksum::ChecksumAlgorithm;
use crate::frame::{CropRegion, FrameGeometry, PixelFormat};
use crate::sink::SinkSettings;

const DEFAULT_FORMAT: PixelFormat = PixelFormat::I420;
const DEFAULT_WIDTH: u32 = 320;
const DEFAULT_HEIGHT: u32 = 240;

#[derive(Debug, Deserialize, Default)]
struct ChecksumConfigFile {
    checksum_type: Option<ChecksumAlgorithm>,
    plane_checksum: Option<bool>,
    frame: Option<FrameConfigFile>,
    strides: Option<StrideConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct FrameConfigFile {
    format: Option<PixelFormat>,
    width: Option<u32>,
    height: Option<u32>,
    crop: Option<CropRegion>,
}

#[derive(Debug, Deserialize, Default)]
struct StrideConfigFile {
    y: Option<usize>,
    uv: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ChecksumConfig {
    pub settings: SinkSettings,
    pub geometry: FrameGeometry,
    pub strides: StrideSettings,
}

/// Source row strides. `None` means tightly packed rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrideSettings {
    pub y: Option<usize>,
    pub uv: Option<usize>,
}

impl ChecksumConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("CHECKSUM_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ChecksumConfigFile) -> Self {
        let settings = SinkSettings {
            algorithm: file.checksum_type.unwrap_or_default(),
            plane_checksum: file.plane_checksum.unwrap_or(false),
        };
        let frame = file.frame.unwrap_or_default();
        let geometry = FrameGeometry {
            format: frame.format.unwrap_or(DEFAULT_FORMAT),
            width: frame.width.unwrap_or(DEFAULT_WIDTH),
            height: frame.height.unwrap_or(DEFAULT_HEIGHT),
            crop: frame.crop,
        };
        let strides = file
            .strides
            .map(|s| StrideSettings { y: s.y, uv: s.uv })
            .unwrap_or_default();
        Self {
            settings,
            geometry,
            strides,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(kind) = std::env::var("CHECKSUM_TYPE") {
            if !kind.trim().is_empty() {
                self.settings.algorithm = kind
                    .parse()
                    .map_err(|e| anyhow!("CHECKSUM_TYPE: {}", e))?;
            }
        }
        if let Ok(planes) = std::env::var("CHECKSUM_PLANES") {
            self.settings.plane_checksum = parse_bool(&planes)
                .ok_or_else(|| anyhow!("CHECKSUM_PLANES must be true/false (got '{}')", planes))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.geometry
            .validate()
            .map_err(|e| anyhow!("invalid frame config: {}", e))?;
        if let Some(y) = self.strides.y {
            if y < self.geometry.width as usize {
                return Err(anyhow!(
                    "luma stride {} is smaller than frame width {}",
                    y,
                    self.geometry.width
                ));
            }
        }
        if let Some(uv) = self.strides.uv {
            if uv < (self.geometry.width / 2) as usize {
                return Err(anyhow!(
                    "chroma stride {} is smaller than chroma width {}",
                    uv,
                    self.geometry.width / 2
                ));
            }
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ChecksumConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
