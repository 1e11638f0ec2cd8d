use crate::config::MetricBands;
use crate::models::{ConditionTally, FrameMetrics, SummaryRecord};
use crate::services::threshold_evaluator::evaluate_each_body;

/// Running totals for one video
#[derive(Debug, Clone)]
pub struct Aggregator {
    bands: MetricBands,
    total_frames: u32,
    cycle_count: u32,
    trunk_lean_points: f64,
    front_knee_points: f64,
    back_knee_points: f64,
    front_hip_points: f64,
    composite_sum: f64,
    tally: ConditionTally,
}

impl Aggregator {
    pub fn new(bands: MetricBands) -> Self {
        Self {
            bands,
            total_frames: 0,
            cycle_count: 0,
            trunk_lean_points: 0.0,
            front_knee_points: 0.0,
            back_knee_points: 0.0,
            front_hip_points: 0.0,
            composite_sum: 0.0,
            tally: ConditionTally::default(),
        }
    }

    /// Add one scored frame
    ///
    /// `tally` is the frame's condition count; it must hold exactly one
    /// entry to keep the category totals equal to the frame total.
    pub fn record(&mut self, metrics: &FrameMetrics, tally: &ConditionTally, cycle_count: u32) {
        self.total_frames += 1;
        self.cycle_count = self.cycle_count.max(cycle_count);
        self.trunk_lean_points += metrics.trunk_lean.points();
        self.front_knee_points += metrics.front_knee.points();
        self.back_knee_points += metrics.back_knee.points();
        self.front_hip_points += metrics.front_hip.points();
        self.composite_sum += metrics.composite_percent;
        self.tally.merge(tally);
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn tally(&self) -> &ConditionTally {
        &self.tally
    }

    fn percentage_of_frames(&self, value: f64) -> f64 {
        value / self.total_frames as f64 * 100.0
    }

    /// Produce the summary, or `None` when no frame was scored
    pub fn finalize(&self) -> Option<SummaryRecord> {
        if self.total_frames == 0 {
            return None;
        }

        let trunk_lean_percentage = self.percentage_of_frames(self.trunk_lean_points);
        let front_knee_percentage = self.percentage_of_frames(self.front_knee_points);
        let back_knee_percentage = self.percentage_of_frames(self.back_knee_points);
        let hip_percentage = self.percentage_of_frames(self.front_hip_points);
        let angle_score = self.composite_sum / self.total_frames as f64;

        let net = (self.tally.good + self.tally.satisfactory) as f64
            - self.tally.should_improve as f64;
        let overall_score = self.percentage_of_frames(net).clamp(0.0, 100.0);

        let summary_band = &self.bands.summary;

        Some(SummaryRecord {
            cycle_count: self.cycle_count,
            total_frames: self.total_frames,
            trunk_lean_value: self.trunk_lean_points,
            trunk_lean_percentage,
            trunk_lean_res: evaluate_each_body(trunk_lean_percentage, summary_band),
            front_knee_value: self.front_knee_points,
            front_knee_percentage,
            front_knee_res: evaluate_each_body(front_knee_percentage, summary_band),
            back_knee_value: self.back_knee_points,
            back_knee_percentage,
            back_knee_res: evaluate_each_body(back_knee_percentage, summary_band),
            hip_value: self.front_hip_points,
            hip_percentage,
            hip_res: evaluate_each_body(hip_percentage, summary_band),
            angle_score,
            angle_res: evaluate_each_body(angle_score, &self.bands.composite),
            overall_score,
            overall_res: evaluate_each_body(overall_score, summary_band),
            good_score: self.tally.good,
            good_percentage: self.percentage_of_frames(self.tally.good as f64),
            satisfactory_score: self.tally.satisfactory,
            satisfactory_percentage: self.percentage_of_frames(self.tally.satisfactory as f64),
            should_improve_score: self.tally.should_improve,
            should_improve_percentage: self.percentage_of_frames(self.tally.should_improve as f64),
        })
    }
}
