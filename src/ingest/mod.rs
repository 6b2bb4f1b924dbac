//! Frame sources feeding the checksum sink.
//!
//! - `PlaneBuffer`: owned in-memory planar frame
//! - `FileSource`: raw planar frames from a local file, or a synthetic
//!   `stub://` pattern
//! - `gst` (feature: gstreamer): mapped GStreamer video frames
//!
//! Sources only hand frames over. They never retain a frame once the sink
//! has processed it.

pub mod buffer;
pub mod file;
#[cfg(feature = "gstreamer")]
pub mod gst;

pub use buffer::PlaneBuffer;
pub use file::{FileConfig, FileSource, FileStats};
