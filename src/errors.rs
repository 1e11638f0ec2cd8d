use thiserror::Error;

/// Errors raised while turning pose frames into gait metrics.
///
/// Per-frame conditions (`MissingLandmark`, `DegenerateGeometry`,
/// `OutOfOrderFrame`) are absorbed by the scoring pipeline and only skip or
/// patch a single frame. Stream-level conditions fail the whole video.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Landmark not resolved for this frame: {0}")]
    MissingLandmark(String),
    #[error("Degenerate geometry: points coincide")]
    DegenerateGeometry,
    #[error("Frame {frame} arrived after frame {last}")]
    OutOfOrderFrame { frame: u32, last: u32 },
    #[error("No scorable frames in video")]
    NoScorableFrames,
    #[error("Frame source failed: {0}")]
    UpstreamDecodeFailure(String),
    #[error("Metrics sink failed: {0}")]
    Sink(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::MissingLandmark("right_knee".to_string());
        assert_eq!(err.to_string(), "Landmark not resolved for this frame: right_knee");

        let err = AnalysisError::OutOfOrderFrame { frame: 7, last: 9 };
        assert_eq!(err.to_string(), "Frame 7 arrived after frame 9");
    }
}
