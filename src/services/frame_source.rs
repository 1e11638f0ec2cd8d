/// Pose frame sources
///
/// The pose-estimation model is external; these sources replay its output
/// in capture order, one `PoseFrame` at a time.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::AnalysisError;
use crate::models::PoseFrame;

/// Supplier of pose frames in capture order
pub trait PoseFrameSource {
    /// Next frame, or `None` at end of stream
    ///
    /// # Errors
    /// `UpstreamDecodeFailure` when no further frames can be produced.
    fn next_frame(&mut self) -> Result<Option<PoseFrame>, AnalysisError>;
}

impl<S: PoseFrameSource + ?Sized> PoseFrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<PoseFrame>, AnalysisError> {
        (**self).next_frame()
    }
}

/// Frames already held in memory
#[derive(Debug, Clone)]
pub struct InMemorySource {
    frames: std::vec::IntoIter<PoseFrame>,
}

impl InMemorySource {
    pub fn new(frames: Vec<PoseFrame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl From<Vec<PoseFrame>> for InMemorySource {
    fn from(frames: Vec<PoseFrame>) -> Self {
        Self::new(frames)
    }
}

impl PoseFrameSource for InMemorySource {
    fn next_frame(&mut self) -> Result<Option<PoseFrame>, AnalysisError> {
        Ok(self.frames.next())
    }
}

/// JSON Lines stream with one `PoseFrame` per line; blank lines are skipped
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    reader: R,
    line_number: usize,
    buffer: String,
}

impl JsonLinesSource<BufReader<File>> {
    /// Open a landmarks file exported by the pose model
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AnalysisError> {
        let file = File::open(path.as_ref()).map_err(|e| {
            AnalysisError::UpstreamDecodeFailure(format!(
                "cannot open {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: String::new(),
        }
    }
}

impl<R: BufRead> PoseFrameSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<PoseFrame>, AnalysisError> {
        loop {
            self.buffer.clear();
            let read = self.reader.read_line(&mut self.buffer).map_err(|e| {
                AnalysisError::UpstreamDecodeFailure(format!(
                    "read failed after line {}: {}",
                    self.line_number, e
                ))
            })?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim();
            if line.is_empty() {
                continue;
            }

            let frame = serde_json::from_str(line).map_err(|e| {
                AnalysisError::UpstreamDecodeFailure(format!("line {}: {}", self.line_number, e))
            })?;
            return Ok(Some(frame));
        }
    }
}
