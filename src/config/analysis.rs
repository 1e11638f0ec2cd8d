use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::errors::AnalysisError;
use crate::models::ThresholdBand;

/// Tunables for frame scoring and gait segmentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Landmarks below this visibility count as missing
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f64,

    #[serde(default)]
    pub bands: MetricBands,

    #[serde(default)]
    pub composite_weights: CompositeWeights,

    #[serde(default)]
    pub gait: GaitConfig,
}

/// Acceptable bands per metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBands {
    /// Evaluated against the torso posture angle (upright = 90)
    #[serde(default = "default_joint_band")]
    pub trunk: ThresholdBand,
    #[serde(default = "default_joint_band")]
    pub front_knee: ThresholdBand,
    #[serde(default = "default_joint_band")]
    pub back_knee: ThresholdBand,
    #[serde(default = "default_joint_band")]
    pub front_hip: ThresholdBand,
    /// Per-frame result label and summary angle score
    #[serde(default = "default_composite_band")]
    pub composite: ThresholdBand,
    /// Per-frame condition tally
    #[serde(default = "default_joint_band")]
    pub tally: ThresholdBand,
    /// Accumulated percentages and overall score
    #[serde(default = "default_joint_band")]
    pub summary: ThresholdBand,
}

/// Weights of the four joint metrics in the composite score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    #[serde(default = "default_weight")]
    pub trunk: f64,
    #[serde(default = "default_weight")]
    pub front_knee: f64,
    #[serde(default = "default_weight")]
    pub back_knee: f64,
    #[serde(default = "default_weight")]
    pub front_hip: f64,
}

/// Gait sub-phase classification thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaitConfig {
    /// Reference knee angles below this are classified as swing
    #[serde(default = "default_swing_knee_max")]
    pub swing_knee_max: f64,
    /// Ankle offset (leg lengths) separating contact, mid stance and toe off
    #[serde(default = "default_contact_offset")]
    pub contact_offset: f64,
    /// Cycle length in frames used until a full cycle has been observed
    #[serde(default = "default_cycle_length")]
    pub default_cycle_length: u32,
}

// Default value functions
fn default_min_visibility() -> f64 {
    0.5
}

fn default_joint_band() -> ThresholdBand {
    ThresholdBand::new(70.0, 100.0)
}

fn default_composite_band() -> ThresholdBand {
    ThresholdBand::new(60.0, 100.0)
}

fn default_weight() -> f64 {
    1.0
}

fn default_swing_knee_max() -> f64 {
    120.0
}

fn default_contact_offset() -> f64 {
    0.1
}

fn default_cycle_length() -> u32 {
    22
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_visibility: default_min_visibility(),
            bands: MetricBands::default(),
            composite_weights: CompositeWeights::default(),
            gait: GaitConfig::default(),
        }
    }
}

impl Default for MetricBands {
    fn default() -> Self {
        Self {
            trunk: default_joint_band(),
            front_knee: default_joint_band(),
            back_knee: default_joint_band(),
            front_hip: default_joint_band(),
            composite: default_composite_band(),
            tally: default_joint_band(),
            summary: default_joint_band(),
        }
    }
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            trunk: default_weight(),
            front_knee: default_weight(),
            back_knee: default_weight(),
            front_hip: default_weight(),
        }
    }
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            swing_knee_max: default_swing_knee_max(),
            contact_offset: default_contact_offset(),
            default_cycle_length: default_cycle_length(),
        }
    }
}

impl MetricBands {
    fn all_mut(&mut self) -> [&mut ThresholdBand; 7] {
        [
            &mut self.trunk,
            &mut self.front_knee,
            &mut self.back_knee,
            &mut self.front_hip,
            &mut self.composite,
            &mut self.tally,
            &mut self.summary,
        ]
    }

    fn all(&self) -> [(&'static str, &ThresholdBand); 7] {
        [
            ("trunk", &self.trunk),
            ("front_knee", &self.front_knee),
            ("back_knee", &self.back_knee),
            ("front_hip", &self.front_hip),
            ("composite", &self.composite),
            ("tally", &self.tally),
            ("summary", &self.summary),
        ]
    }

    /// Apply one tolerance to every band
    pub fn set_tolerance(&mut self, tolerance: f64) {
        for band in self.all_mut() {
            band.tolerance = tolerance;
        }
    }
}

impl CompositeWeights {
    pub fn total(&self) -> f64 {
        self.trunk + self.front_knee + self.back_knee + self.front_hip
    }

    /// Weighted mean of per-metric points, as a percentage.
    ///
    /// Point order: trunk, front knee, back knee, front hip.
    pub fn combine(&self, points: [f64; 4]) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        let weighted = self.trunk * points[0]
            + self.front_knee * points[1]
            + self.back_knee * points[2]
            + self.front_hip * points[3];
        weighted / total * 100.0
    }
}

impl AnalysisConfig {
    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().overlay_env()
    }

    /// Apply `GAIT_MIN_VISIBILITY`, `GAIT_CYCLE_LENGTH` and `GAIT_TOLERANCE`
    /// on top of already loaded settings
    pub fn overlay_env(self) -> Result<Self> {
        let mut config = self;

        if let Ok(value) = env::var("GAIT_MIN_VISIBILITY") {
            config.min_visibility = value
                .parse()
                .context("GAIT_MIN_VISIBILITY must be a number")?;
        }
        if let Ok(value) = env::var("GAIT_CYCLE_LENGTH") {
            config.gait.default_cycle_length = value
                .parse()
                .context("GAIT_CYCLE_LENGTH must be a frame count")?;
        }
        if let Ok(value) = env::var("GAIT_TOLERANCE") {
            let tolerance: f64 = value.parse().context("GAIT_TOLERANCE must be a number")?;
            config.bands.set_tolerance(tolerance);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot score with
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_visibility must be within [0, 1], got {}",
                self.min_visibility
            )));
        }

        for (name, band) in self.bands.all() {
            if band.low > band.high {
                return Err(AnalysisError::InvalidConfig(format!(
                    "band {} is inverted ({} > {})",
                    name, band.low, band.high
                )));
            }
            if band.tolerance < 0.0 {
                return Err(AnalysisError::InvalidConfig(format!(
                    "band {} has a negative tolerance",
                    name
                )));
            }
        }

        let weights = &self.composite_weights;
        if [weights.trunk, weights.front_knee, weights.back_knee, weights.front_hip]
            .iter()
            .any(|w| *w < 0.0)
            || weights.total() <= 0.0
        {
            return Err(AnalysisError::InvalidConfig(
                "composite weights must be non-negative with a positive sum".to_string(),
            ));
        }

        if self.gait.default_cycle_length == 0 {
            return Err(AnalysisError::InvalidConfig(
                "default_cycle_length must be at least one frame".to_string(),
            ));
        }

        Ok(())
    }
}
