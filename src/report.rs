//! Reporting of frame checksums.
//!
//! The engine hands back structured `FrameReport`s; a `Reporter` owns the
//! actual write. Output contract:
//! - whole frame: `FrameChecksum <hex>\n`
//! - per plane: plane digests in storage order, space separated, `\n` terminated

use std::io::{self, Write};

use crate::checksum::{Digest, PlaneDigest};

pub const FRAME_CHECKSUM_PREFIX: &str = "FrameChecksum";

/// Checksum result for one frame. Exactly one mode per frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameReport {
    Frame(Digest),
    Planes(Vec<PlaneDigest>),
}

/// Render a report as its output line, including the trailing newline.
pub fn format_report(report: &FrameReport) -> String {
    match report {
        FrameReport::Frame(digest) => format!("{} {}\n", FRAME_CHECKSUM_PREFIX, digest),
        FrameReport::Planes(planes) => {
            let hexes: Vec<String> = planes.iter().map(|p| p.digest.to_hex()).collect();
            format!("{}\n", hexes.join(" "))
        }
    }
}

/// Same as `format_report`, with plane digests prefixed by their semantic label.
pub fn format_labelled_report(report: &FrameReport) -> String {
    match report {
        FrameReport::Frame(_) => format_report(report),
        FrameReport::Planes(planes) => {
            let fields: Vec<String> = planes
                .iter()
                .map(|p| format!("{}={}", p.plane, p.digest))
                .collect();
            format!("{}\n", fields.join(" "))
        }
    }
}

pub trait Reporter {
    fn report(&mut self, report: &FrameReport) -> io::Result<()>;
}

/// Writes one contract line per frame.
pub struct LineReporter<W: Write> {
    out: W,
}

impl<W: Write> LineReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl LineReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter for LineReporter<W> {
    fn report(&mut self, report: &FrameReport) -> io::Result<()> {
        self.out.write_all(format_report(report).as_bytes())?;
        self.out.flush()
    }
}

/// Human oriented variant of `LineReporter` (`Y=<hex> U=<hex> V=<hex>`).
pub struct LabelledReporter<W: Write> {
    out: W,
}

impl<W: Write> LabelledReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Reporter for LabelledReporter<W> {
    fn report(&mut self, report: &FrameReport) -> io::Result<()> {
        self.out
            .write_all(format_labelled_report(report).as_bytes())?;
        self.out.flush()
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub reports: Vec<FrameReport>,
}

impl Reporter for CollectingReporter {
    fn report(&mut self, report: &FrameReport) -> io::Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&mut self, report: &FrameReport) -> io::Result<()> {
        (**self).report(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{digest, ChecksumAlgorithm};
    use crate::frame::PlaneId;

    fn planes() -> FrameReport {
        let mk = |plane, storage_index, byte: u8| PlaneDigest {
            plane,
            storage_index,
            digest: digest(&[byte; 4], ChecksumAlgorithm::Md5),
        };
        FrameReport::Planes(vec![
            mk(PlaneId::Y, 0, 0),
            mk(PlaneId::V, 1, 2),
            mk(PlaneId::U, 2, 1),
        ])
    }

    #[test]
    fn frame_mode_is_a_single_prefixed_line() {
        let d = digest(b"frame", ChecksumAlgorithm::Sha1);
        let line = format_report(&FrameReport::Frame(d.clone()));
        assert_eq!(line, format!("FrameChecksum {}\n", d.to_hex()));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn plane_mode_is_space_separated_in_storage_order() {
        let line = format_report(&planes());
        let fields: Vec<&str> = line.trim_end_matches('\n').split(' ').collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[1], digest(&[2; 4], ChecksumAlgorithm::Md5).to_hex());
        assert!(line.ends_with('\n') && !line.ends_with(" \n"));
        assert!(!line.contains(FRAME_CHECKSUM_PREFIX));
    }

    #[test]
    fn labelled_output_names_semantic_planes() {
        let line = format_labelled_report(&planes());
        assert!(line.starts_with("Y="));
        assert!(line.contains(" V="));
        assert!(line.contains(" U="));
    }

    #[test]
    fn line_reporter_writes_to_sink() -> io::Result<()> {
        let mut reporter = LineReporter::new(Vec::new());
        let d = digest(b"x", ChecksumAlgorithm::Md5);
        reporter.report(&FrameReport::Frame(d.clone()))?;
        let out = String::from_utf8(reporter.into_inner()).expect("utf8 output");
        assert_eq!(out, format!("FrameChecksum {}\n", d));
        Ok(())
    }
}
