// Analysis services

pub mod aggregator;
pub mod analysis_task_service;
pub mod frame_scoring;
pub mod frame_source;
pub mod gait_cycle_counter;
pub mod geometry;
pub mod metrics_sink;
pub mod threshold_evaluator;

pub use aggregator::Aggregator;
pub use analysis_task_service::{AnalysisTaskService, BoxedFrameSource};
pub use frame_scoring::{analyze_video, AnalysisOutcome, FrameOutcome, FrameScoringPipeline, JointAngles, SkipReason};
pub use frame_source::{InMemorySource, JsonLinesSource, PoseFrameSource};
pub use gait_cycle_counter::GaitCycleCounter;
pub use metrics_sink::{JsonLinesSink, MetricsSink, RowCollector};
