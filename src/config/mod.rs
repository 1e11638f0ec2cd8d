pub mod analysis;

pub use analysis::{AnalysisConfig, CompositeWeights, GaitConfig, MetricBands};
