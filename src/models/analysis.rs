use serde::{Deserialize, Serialize};

use crate::models::gait::SubPhase;

/// Categorical quality label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Evaluation {
    Good,
    Satisfactory,
    #[serde(rename = "Should Improve")]
    ShouldImprove,
}

impl Evaluation {
    /// Contribution of one labelled frame to the accumulated metric
    pub fn points(&self) -> f64 {
        match self {
            Evaluation::Good => 1.0,
            Evaluation::Satisfactory => 0.5,
            Evaluation::ShouldImprove => 0.0,
        }
    }
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Evaluation::Good => write!(f, "Good"),
            Evaluation::Satisfactory => write!(f, "Satisfactory"),
            Evaluation::ShouldImprove => write!(f, "Should Improve"),
        }
    }
}

/// Acceptable band for a metric, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub low: f64,
    pub high: f64,
    /// Width of the Satisfactory margin outside the band
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    10.0
}

impl ThresholdBand {
    pub fn new(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
            tolerance: default_tolerance(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// A measured value with its label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    pub value: f64,
    pub label: Evaluation,
}

impl MetricReading {
    pub fn new(value: f64, label: Evaluation) -> Self {
        Self { value, label }
    }

    pub fn points(&self) -> f64 {
        self.label.points()
    }
}

/// Derived metrics for one scored frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameMetrics {
    /// Signed trunk lean from vertical; the label rates the torso posture angle
    pub trunk_lean: MetricReading,
    pub front_knee: MetricReading,
    pub back_knee: MetricReading,
    pub front_hip: MetricReading,
    /// Weighted "angle each body" score, 0-100
    pub composite_percent: f64,
    /// Overall label for the frame
    pub result: Evaluation,
}

/// One emitted row of the per-frame report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRow {
    pub frame_number: u32,
    pub cycle_count: u32,
    pub sub_phase: SubPhase,
    pub cycle_percent: f64,
    pub trunk_lean: MetricReading,
    pub front_knee: MetricReading,
    pub back_knee: MetricReading,
    pub front_hip: MetricReading,
    pub composite_percent: f64,
    pub result: Evaluation,
}

/// Running category counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionTally {
    pub good: u32,
    pub satisfactory: u32,
    pub should_improve: u32,
}

impl ConditionTally {
    pub fn record(&mut self, evaluation: Evaluation) {
        match evaluation {
            Evaluation::Good => self.good += 1,
            Evaluation::Satisfactory => self.satisfactory += 1,
            Evaluation::ShouldImprove => self.should_improve += 1,
        }
    }

    pub fn merge(&mut self, other: &ConditionTally) {
        self.good += other.good;
        self.satisfactory += other.satisfactory;
        self.should_improve += other.should_improve;
    }

    pub fn total(&self) -> u32 {
        self.good + self.satisfactory + self.should_improve
    }

    pub fn count(&self, evaluation: Evaluation) -> u32 {
        match evaluation {
            Evaluation::Good => self.good,
            Evaluation::Satisfactory => self.satisfactory,
            Evaluation::ShouldImprove => self.should_improve,
        }
    }
}

/// Finalized whole-video summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    #[serde(rename = "cycleCount")]
    pub cycle_count: u32,
    #[serde(rename = "totalFrames")]
    pub total_frames: u32,

    #[serde(rename = "trunkLeanValue")]
    pub trunk_lean_value: f64,
    #[serde(rename = "trunkLeanPercentage")]
    pub trunk_lean_percentage: f64,
    #[serde(rename = "trunkLeanRes")]
    pub trunk_lean_res: Evaluation,

    #[serde(rename = "frontKneeValue")]
    pub front_knee_value: f64,
    #[serde(rename = "frontKneePercentage")]
    pub front_knee_percentage: f64,
    #[serde(rename = "frontKneeRes")]
    pub front_knee_res: Evaluation,

    #[serde(rename = "backKneeValue")]
    pub back_knee_value: f64,
    #[serde(rename = "backKneePercentage")]
    pub back_knee_percentage: f64,
    #[serde(rename = "backKneeRes")]
    pub back_knee_res: Evaluation,

    #[serde(rename = "hipValue")]
    pub hip_value: f64,
    #[serde(rename = "hipPercentage")]
    pub hip_percentage: f64,
    #[serde(rename = "hipRes")]
    pub hip_res: Evaluation,

    #[serde(rename = "angleScore")]
    pub angle_score: f64,
    #[serde(rename = "angleRes")]
    pub angle_res: Evaluation,

    #[serde(rename = "overallScore")]
    pub overall_score: f64,
    #[serde(rename = "overallRes")]
    pub overall_res: Evaluation,

    #[serde(rename = "GoodScore")]
    pub good_score: u32,
    #[serde(rename = "GoodPercentage")]
    pub good_percentage: f64,
    #[serde(rename = "SatisfactoryScore")]
    pub satisfactory_score: u32,
    #[serde(rename = "SatisfactoryPercentage")]
    pub satisfactory_percentage: f64,
    #[serde(rename = "Should_ImproveScore")]
    pub should_improve_score: u32,
    #[serde(rename = "Should_ImprovePercentage")]
    pub should_improve_percentage: f64,
}
