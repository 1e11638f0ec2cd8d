// Shared fixtures: synthetic side-view running poses, runner facing image right
#![allow(dead_code)]

use gait_coach::models::{Landmark, PoseFrame, SubPhase};
use once_cell::sync::Lazy;

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
});

pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// Right (front) knee and ankle positions for each sub-phase
fn front_leg(phase: SubPhase) -> ((f64, f64), (f64, f64)) {
    match phase {
        SubPhase::InitialContact => ((0.56, 0.62), (0.62, 0.74)),
        SubPhase::MidStance => ((0.52, 0.62), (0.50, 0.75)),
        SubPhase::ToeOff => ((0.45, 0.62), (0.38, 0.73)),
        SubPhase::Swing | SubPhase::Unknown => ((0.55, 0.60), (0.45, 0.62)),
    }
}

fn pose(frame_number: u32, knee: (f64, f64), ankle: (f64, f64)) -> PoseFrame {
    PoseFrame::new(
        frame_number,
        vec![
            Landmark::new("nose", 0.55, 0.2).with_visibility(0.99),
            Landmark::new("left_shoulder", 0.45, 0.3).with_visibility(0.95),
            Landmark::new("right_shoulder", 0.55, 0.3).with_visibility(0.95),
            Landmark::new("left_hip", 0.5, 0.5).with_visibility(0.9),
            Landmark::new("right_hip", 0.5, 0.5).with_visibility(0.9),
            Landmark::new("left_knee", 0.45, 0.62).with_visibility(0.9),
            Landmark::new("right_knee", knee.0, knee.1).with_visibility(0.9),
            Landmark::new("left_ankle", 0.40, 0.74).with_visibility(0.9),
            Landmark::new("right_ankle", ankle.0, ankle.1).with_visibility(0.9),
        ],
    )
}

/// Pose whose front leg sits in `phase`
pub fn running_pose(frame_number: u32, phase: SubPhase) -> PoseFrame {
    let (knee, ankle) = front_leg(phase);
    pose(frame_number, knee, ankle)
}

/// Pose with the front knee flexed to 95 degrees
pub fn bent_knee_pose(frame_number: u32) -> PoseFrame {
    pose(frame_number, (0.5, 0.6), (0.59962, 0.60872))
}

/// Consecutive frames, numbered from `first`, following `phases`
pub fn stride(first: u32, phases: &[SubPhase]) -> Vec<PoseFrame> {
    phases
        .iter()
        .enumerate()
        .map(|(i, phase)| running_pose(first + i as u32, *phase))
        .collect()
}

/// `cycles` full cycles of `frames_per_phase` frames each, closed by one contact frame
pub fn running_video(cycles: usize, frames_per_phase: usize) -> Vec<PoseFrame> {
    let mut phases = Vec::new();
    for _ in 0..cycles {
        for phase in SubPhase::CYCLE {
            phases.extend(std::iter::repeat(phase).take(frames_per_phase));
        }
    }
    phases.push(SubPhase::InitialContact);
    stride(1, &phases)
}

/// Drop one landmark from a frame
pub fn without(mut frame: PoseFrame, name: &str) -> PoseFrame {
    frame.landmarks.retain(|lm| lm.name != name);
    frame
}
