//! checksumsink - print a checksum for every frame of a raw planar video
//!
//! Frames come from a raw I420/YV12 file (or a `stub://` synthetic pattern).
//! Output goes to stdout, one line per frame:
//! - `FrameChecksum <hex>` by default
//! - `<y> <chroma-a> <chroma-b>` with `--plane-checksum` (storage order)
//!
//! Settings resolve as: defaults < CHECKSUM_CONFIG file < CHECKSUM_TYPE /
//! CHECKSUM_PLANES env < command line flags.

use anyhow::{anyhow, Result};
use clap::Parser;

use frame_checksum::{
    ChecksumAlgorithm, ChecksumConfig, ChecksumSink, CropRegion, FileConfig, FileSource,
    LabelledReporter, LineReporter, PixelFormat, Reporter,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Raw frame file, or stub://<name> for a synthetic pattern.
    #[arg(long, short)]
    input: String,
    /// Pixel format of the stored frames (i420|yv12).
    #[arg(long)]
    format: Option<PixelFormat>,
    /// Frame width in pixels.
    #[arg(long)]
    width: Option<u32>,
    /// Frame height in pixels.
    #[arg(long)]
    height: Option<u32>,
    /// Crop region applied before checksumming, e.g. 320x240.
    #[arg(long, value_name = "WxH")]
    crop: Option<CropRegion>,
    /// Luma row stride in bytes (defaults to width).
    #[arg(long)]
    stride_y: Option<usize>,
    /// Chroma row stride in bytes (defaults to width / 2).
    #[arg(long)]
    stride_uv: Option<usize>,
    /// Checksum algorithm (md5|sha1|sha256).
    #[arg(long, value_name = "TYPE")]
    checksum_type: Option<ChecksumAlgorithm>,
    /// Emit one checksum per plane instead of per frame (`=false` forces frame mode).
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    plane_checksum: Option<bool>,
    /// Prefix plane checksums with their plane name (Y=, U=, V=).
    #[arg(long)]
    labels: bool,
    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = ChecksumConfig::load()?;

    if let Some(format) = args.format {
        cfg.geometry.format = format;
    }
    if let Some(width) = args.width {
        cfg.geometry.width = width;
    }
    if let Some(height) = args.height {
        cfg.geometry.height = height;
    }
    if args.crop.is_some() {
        cfg.geometry.crop = args.crop;
    }
    if let Some(algorithm) = args.checksum_type {
        cfg.settings.algorithm = algorithm;
    }
    if let Some(plane_checksum) = args.plane_checksum {
        cfg.settings.plane_checksum = plane_checksum;
    }
    if args.stride_y.is_some() {
        cfg.strides.y = args.stride_y;
    }
    if args.stride_uv.is_some() {
        cfg.strides.uv = args.stride_uv;
    }

    let mut file_config = FileConfig::new(args.input.clone(), cfg.geometry.with_crop(None));
    file_config.strides = cfg.strides;
    if let Some(frames) = args.frames {
        file_config.synthetic_frames = frames;
    }
    let mut source = FileSource::new(file_config)?;

    let reporter: Box<dyn Reporter> = if args.labels {
        Box::new(LabelledReporter::new(std::io::stdout()))
    } else {
        Box::new(LineReporter::stdout())
    };
    let mut sink = ChecksumSink::new(cfg.settings, reporter);
    sink.configure(cfg.geometry)?;

    log::info!(
        "checksumsink: {} with {}{}",
        args.input,
        cfg.settings.algorithm,
        if cfg.settings.plane_checksum {
            " per plane"
        } else {
            ""
        }
    );

    let limit = args.frames.unwrap_or(u64::MAX);
    let mut frame_index = 0u64;
    while frame_index < limit {
        let Some(frame) = source.next_frame()? else {
            break;
        };
        frame_index += 1;
        if let Err(e) = sink.process_frame(&frame) {
            if e.is_fatal() {
                return Err(anyhow!("frame {}: {}", frame_index, e));
            }
            log::warn!("frame {} skipped: {}", frame_index, e);
        }
    }

    let stats = sink.stats();
    log::info!(
        "processed {} frames ({} failed) from {}",
        stats.frames_processed,
        stats.frames_failed,
        source.stats().path
    );
    if stats.frames_failed > 0 && stats.frames_processed == 0 {
        return Err(anyhow!("no frame could be checksummed"));
    }
    Ok(())
}
