/// Frame Scoring Pipeline
///
/// Turns each pose frame of one video into a scored `FrameRow`:
/// - Landmark resolution and joint geometry
/// - Gait cycle segmentation of the front (right) leg
/// - Band evaluation of every metric and the composite score
/// - Condition tally and aggregation into the video summary
///
/// Frames without a detection, with unresolved landmarks or arriving out of
/// order are skipped; they never reach the counter or the totals.

use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::models::{
    BodyLandmark, FrameMetrics, FrameRow, GaitSignal, Landmark, MetricReading, PoseFrame,
    SummaryRecord,
};
use crate::services::aggregator::Aggregator;
use crate::services::frame_source::PoseFrameSource;
use crate::services::gait_cycle_counter::GaitCycleCounter;
use crate::services::geometry::{
    ankle_offset, calculate_angle, calculate_trunk_lean, facing_direction, get_point,
    trunk_posture_angle,
};
use crate::services::metrics_sink::MetricsSink;
use crate::services::threshold_evaluator::{count_conditions, evaluate_angle, evaluate_each_body};

/// Angle reported when the geometry of a joint collapses
pub const DEGENERATE_ANGLE_FALLBACK: f64 = 0.0;

/// Lean reported when shoulders and hips collapse onto one point; a
/// horizontal trunk sits outside every posture band
pub const DEGENERATE_TRUNK_LEAN_FALLBACK: f64 = 90.0;

/// Raw measurements of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngles {
    /// Signed lean from vertical, positive toward the facing direction
    pub trunk_lean: f64,
    /// Right hip-knee-ankle
    pub front_knee: f64,
    /// Left hip-knee-ankle
    pub back_knee: f64,
    /// Right shoulder-hip-knee
    pub front_hip: f64,
}

/// Why a frame produced no row
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoDetection,
    MissingLandmark(String),
    OutOfOrder { last: u32 },
}

/// Result of feeding one frame to the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Scored(FrameRow),
    Skipped(SkipReason),
}

/// Totals of one finished video
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub summary: Option<SummaryRecord>,
    pub frames_seen: u32,
    pub frames_skipped: u32,
}

impl AnalysisOutcome {
    /// The summary, or `NoScorableFrames` when nothing was analyzable
    pub fn require_summary(&self) -> Result<&SummaryRecord, AnalysisError> {
        self.summary.as_ref().ok_or(AnalysisError::NoScorableFrames)
    }
}

/// Resolved landmarks of a scorable frame
struct Skeleton<'a> {
    left_shoulder: &'a Landmark,
    right_shoulder: &'a Landmark,
    left_hip: &'a Landmark,
    right_hip: &'a Landmark,
    left_knee: &'a Landmark,
    right_knee: &'a Landmark,
    left_ankle: &'a Landmark,
    right_ankle: &'a Landmark,
}

/// Per-video scoring state
pub struct FrameScoringPipeline {
    config: AnalysisConfig,
    counter: GaitCycleCounter,
    aggregator: Aggregator,
    last_frame_number: Option<u32>,
    frames_seen: u32,
    frames_skipped: u32,
}

impl FrameScoringPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        let counter = GaitCycleCounter::new(config.gait.clone());
        let aggregator = Aggregator::new(config.bands.clone());
        Self {
            config,
            counter,
            aggregator,
            last_frame_number: None,
            frames_seen: 0,
            frames_skipped: 0,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn counter(&self) -> &GaitCycleCounter {
        &self.counter
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Score one frame, emitting its row to `sink`
    ///
    /// # Errors
    /// Only sink failures; per-frame conditions become `FrameOutcome::Skipped`.
    pub fn process_frame(
        &mut self,
        frame: &PoseFrame,
        sink: &mut dyn MetricsSink,
    ) -> Result<FrameOutcome, AnalysisError> {
        self.frames_seen += 1;

        if let Some(last) = self.last_frame_number {
            if frame.frame_number <= last {
                let error = AnalysisError::OutOfOrderFrame {
                    frame: frame.frame_number,
                    last,
                };
                warn!(%error, "Skipping frame");
                return Ok(self.skip(SkipReason::OutOfOrder { last }));
            }
        }
        self.last_frame_number = Some(frame.frame_number);

        if !frame.has_detection() {
            debug!(frame = frame.frame_number, "No pose detected");
            return Ok(self.skip(SkipReason::NoDetection));
        }

        let (angles, signal) = match self.measure(&frame.landmarks) {
            Ok(measured) => measured,
            Err(AnalysisError::MissingLandmark(name)) => {
                debug!(frame = frame.frame_number, landmark = %name, "Landmark missing");
                return Ok(self.skip(SkipReason::MissingLandmark(name)));
            }
            Err(e) => return Err(e),
        };

        let gait = self.counter.advance(&signal);
        let metrics = self.evaluate(&angles);
        let tally = count_conditions(&[metrics.composite_percent], &self.config.bands.tally);

        let row = FrameRow {
            frame_number: frame.frame_number,
            cycle_count: gait.cycle_count,
            sub_phase: gait.sub_phase,
            cycle_percent: gait.cycle_percent,
            trunk_lean: metrics.trunk_lean,
            front_knee: metrics.front_knee,
            back_knee: metrics.back_knee,
            front_hip: metrics.front_hip,
            composite_percent: metrics.composite_percent,
            result: metrics.result,
        };

        sink.emit_row(&row)?;
        self.aggregator.record(&metrics, &tally, gait.cycle_count);

        Ok(FrameOutcome::Scored(row))
    }

    fn skip(&mut self, reason: SkipReason) -> FrameOutcome {
        self.frames_skipped += 1;
        FrameOutcome::Skipped(reason)
    }

    fn resolve<'a>(&self, landmarks: &'a [Landmark]) -> Result<Skeleton<'a>, AnalysisError> {
        let min_visibility = self.config.min_visibility;
        let point = |lm: BodyLandmark| get_point(landmarks, lm.name(), min_visibility);

        Ok(Skeleton {
            left_shoulder: point(BodyLandmark::LeftShoulder)?,
            right_shoulder: point(BodyLandmark::RightShoulder)?,
            left_hip: point(BodyLandmark::LeftHip)?,
            right_hip: point(BodyLandmark::RightHip)?,
            left_knee: point(BodyLandmark::LeftKnee)?,
            right_knee: point(BodyLandmark::RightKnee)?,
            left_ankle: point(BodyLandmark::LeftAnkle)?,
            right_ankle: point(BodyLandmark::RightAnkle)?,
        })
    }

    /// Measure the joint angles and gait signal of one frame
    ///
    /// # Errors
    /// `MissingLandmark` when a required landmark is absent or not visible.
    pub fn measure(&self, landmarks: &[Landmark]) -> Result<(JointAngles, GaitSignal), AnalysisError> {
        let s = self.resolve(landmarks)?;
        let facing = facing_direction(landmarks, self.config.min_visibility);

        let trunk_lean = calculate_trunk_lean(
            s.left_shoulder,
            s.right_shoulder,
            s.left_hip,
            s.right_hip,
            facing,
        );
        let front_knee = calculate_angle(s.right_hip, s.right_knee, s.right_ankle);
        let back_knee = calculate_angle(s.left_hip, s.left_knee, s.left_ankle);
        let front_hip = calculate_angle(s.right_shoulder, s.right_hip, s.right_knee);

        let signal = GaitSignal {
            knee_angle: front_knee.as_ref().copied().unwrap_or(f64::NAN),
            ankle_offset: ankle_offset(s.right_hip, s.right_knee, s.right_ankle, facing)
                .unwrap_or(f64::NAN),
        };

        let angles = JointAngles {
            trunk_lean: with_fallback("trunk_lean", trunk_lean, DEGENERATE_TRUNK_LEAN_FALLBACK),
            front_knee: with_fallback("front_knee", front_knee, DEGENERATE_ANGLE_FALLBACK),
            back_knee: with_fallback("back_knee", back_knee, DEGENERATE_ANGLE_FALLBACK),
            front_hip: with_fallback("front_hip", front_hip, DEGENERATE_ANGLE_FALLBACK),
        };

        Ok((angles, signal))
    }

    /// Label every metric of a frame and compute its composite score
    pub fn evaluate(&self, angles: &JointAngles) -> FrameMetrics {
        let bands = &self.config.bands;

        let trunk_lean = MetricReading::new(
            angles.trunk_lean,
            evaluate_angle(trunk_posture_angle(angles.trunk_lean), &bands.trunk),
        );
        let front_knee = MetricReading::new(
            angles.front_knee,
            evaluate_angle(angles.front_knee, &bands.front_knee),
        );
        let back_knee = MetricReading::new(
            angles.back_knee,
            evaluate_angle(angles.back_knee, &bands.back_knee),
        );
        let front_hip = MetricReading::new(
            angles.front_hip,
            evaluate_angle(angles.front_hip, &bands.front_hip),
        );

        let composite_percent = self.config.composite_weights.combine([
            trunk_lean.points(),
            front_knee.points(),
            back_knee.points(),
            front_hip.points(),
        ]);

        FrameMetrics {
            trunk_lean,
            front_knee,
            back_knee,
            front_hip,
            composite_percent,
            result: evaluate_each_body(composite_percent, &bands.composite),
        }
    }

    /// Close the video and build its summary
    pub fn finish(self) -> AnalysisOutcome {
        AnalysisOutcome {
            summary: self.aggregator.finalize(),
            frames_seen: self.frames_seen,
            frames_skipped: self.frames_skipped,
        }
    }
}

fn with_fallback(metric: &str, angle: Result<f64, AnalysisError>, fallback: f64) -> f64 {
    match angle {
        Ok(value) => value,
        Err(e) => {
            warn!(metric, error = %e, fallback, "Using fallback angle");
            fallback
        }
    }
}

/// Score every frame of one video in capture order
///
/// # Errors
/// `UpstreamDecodeFailure` from the source and sink failures end the video;
/// everything else is absorbed per frame.
pub fn analyze_video<S>(
    source: &mut S,
    config: AnalysisConfig,
    sink: &mut dyn MetricsSink,
) -> Result<AnalysisOutcome, AnalysisError>
where
    S: PoseFrameSource + ?Sized,
{
    let mut pipeline = FrameScoringPipeline::new(config);

    while let Some(frame) = source.next_frame()? {
        pipeline.process_frame(&frame, sink)?;
    }

    let outcome = pipeline.finish();
    match &outcome.summary {
        Some(summary) => info!(
            total_frames = summary.total_frames,
            cycles = summary.cycle_count,
            skipped = outcome.frames_skipped,
            "Video analysis finished"
        ),
        None => info!(
            frames_seen = outcome.frames_seen,
            "Video analysis finished without scorable frames"
        ),
    }

    Ok(outcome)
}
