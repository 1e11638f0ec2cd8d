/// Landmark models for pose-estimation output
///
/// A pose frame carries the named body landmarks reported by the external
/// pose model for one captured video frame. Coordinates are normalized image
/// coordinates (x to the right, y downwards).

use serde::{Deserialize, Serialize};

/// A single named body landmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Landmark name (e.g., "left_hip")
    pub name: String,
    /// X coordinate (normalized 0-1)
    pub x: f64,
    /// Y coordinate (normalized 0-1, growing downwards)
    pub y: f64,
    /// Relative depth, when the model reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Visibility confidence (0-1), when the model reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    /// Create a landmark without depth or visibility
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Check if the landmark can be used for measurements.
    ///
    /// A landmark without a visibility score is trusted.
    pub fn is_valid(&self, min_visibility: f64) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.visibility.map_or(true, |v| v >= min_visibility)
    }

    /// Euclidean distance to another landmark in the image plane
    pub fn distance_to(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between two landmarks
    pub fn midpoint(&self, other: &Landmark, name: impl Into<String>) -> Landmark {
        Landmark::new(name, (self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Body landmarks used by the running analysis (BlazePose naming)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyLandmark {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl BodyLandmark {
    /// Get landmark name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }

}

/// Pose-model output for one captured frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Capture frame number (1-based, counts frames without detection too)
    pub frame_number: u32,
    /// Frame timestamp in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    /// Landmarks reported for the frame; empty when nobody was detected
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl PoseFrame {
    /// Create a new pose frame
    pub fn new(frame_number: u32, landmarks: Vec<Landmark>) -> Self {
        Self {
            frame_number,
            timestamp_ms: None,
            landmarks,
        }
    }

    /// A frame in which the pose model detected nobody
    pub fn undetected(frame_number: u32) -> Self {
        Self::new(frame_number, Vec::new())
    }

    pub fn has_detection(&self) -> bool {
        !self.landmarks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_validation() {
        let lm = Landmark::new("left_hip", 0.4, 0.5).with_visibility(0.9);
        assert!(lm.is_valid(0.5));
        assert!(!lm.is_valid(0.95));

        let unscored = Landmark::new("left_hip", 0.4, 0.5);
        assert!(unscored.is_valid(0.99));

        let broken = Landmark::new("left_hip", f64::NAN, 0.5);
        assert!(!broken.is_valid(0.0));
    }

    #[test]
    fn test_landmark_distance_and_midpoint() {
        let a = Landmark::new("a", 0.0, 0.0);
        let b = Landmark::new("b", 3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);

        let mid = a.midpoint(&b, "mid");
        assert_eq!(mid.name, "mid");
        assert!((mid.x - 1.5).abs() < 1e-9);
        assert!((mid.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_body_landmark_names() {
        assert_eq!(BodyLandmark::Nose.name(), "nose");
        assert_eq!(BodyLandmark::RightFootIndex.name(), "right_foot_index");
    }

    #[test]
    fn test_pose_frame_deserializes_without_landmarks() {
        let frame: PoseFrame = serde_json::from_str(r#"{"frame_number": 12}"#).unwrap();
        assert_eq!(frame.frame_number, 12);
        assert!(!frame.has_detection());
        assert_eq!(frame.timestamp_ms, None);
    }
}
