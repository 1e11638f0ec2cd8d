use crate::models::{ConditionTally, Evaluation, ThresholdBand};

/// Evaluate a joint angle against a two-sided band
///
/// Inside `[low, high]` is Good, within `tolerance` outside either bound is
/// Satisfactory, anything further away should improve.
pub fn evaluate_angle(value: f64, band: &ThresholdBand) -> Evaluation {
    if band.contains(value) {
        Evaluation::Good
    } else if value >= band.low - band.tolerance && value <= band.high + band.tolerance {
        Evaluation::Satisfactory
    } else {
        Evaluation::ShouldImprove
    }
}

/// Evaluate a percentage score against the lower bound of a band
///
/// Scores at or above `low` are Good, including anything above `high`.
pub fn evaluate_each_body(value: f64, band: &ThresholdBand) -> Evaluation {
    if value >= band.low {
        Evaluation::Good
    } else if value >= band.low - band.tolerance {
        Evaluation::Satisfactory
    } else {
        Evaluation::ShouldImprove
    }
}

/// Count how many values fall into each category
pub fn count_conditions(values: &[f64], band: &ThresholdBand) -> ConditionTally {
    let mut tally = ConditionTally::default();
    for value in values {
        tally.record(evaluate_each_body(*value, band));
    }
    tally
}
