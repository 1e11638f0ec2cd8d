/// Gait Cycle Counter
///
/// Per-video state machine segmenting the reference limb's running cycle:
///
/// `InitialContact -> MidStance -> ToeOff -> Swing -> InitialContact`
///
/// - Each processed frame is classified from its `GaitSignal`
/// - Observing the successor of the current phase is a transition
/// - `InitialContact` observed out of order re-synchronizes the cycle start
/// - Other out-of-order observations are ignored
/// - Entering `InitialContact` from `Swing` after a started cycle counts one
///   full cycle and resets the frame-within-cycle counter

use tracing::debug;

use crate::config::GaitConfig;
use crate::models::{GaitSignal, GaitState, GaitUpdate, SubPhase};

/// Cycle counter owning one video's `GaitState`
#[derive(Debug, Clone)]
pub struct GaitCycleCounter {
    config: GaitConfig,
    state: GaitState,
}

impl GaitCycleCounter {
    pub fn new(config: GaitConfig) -> Self {
        Self {
            config,
            state: GaitState::default(),
        }
    }

    pub fn state(&self) -> &GaitState {
        &self.state
    }

    pub fn cycle_count(&self) -> u32 {
        self.state.cycle_count
    }

    pub fn current_phase(&self) -> SubPhase {
        self.state.current_phase
    }

    /// Classify one frame's signal, `None` when it cannot be trusted
    pub fn classify(&self, signal: &GaitSignal) -> Option<SubPhase> {
        if !signal.knee_angle.is_finite() || !signal.ankle_offset.is_finite() {
            return None;
        }

        let phase = if signal.knee_angle < self.config.swing_knee_max {
            SubPhase::Swing
        } else if signal.ankle_offset > self.config.contact_offset {
            SubPhase::InitialContact
        } else if signal.ankle_offset < -self.config.contact_offset {
            SubPhase::ToeOff
        } else {
            SubPhase::MidStance
        };

        Some(phase)
    }

    /// Consume one scored frame
    pub fn advance(&mut self, signal: &GaitSignal) -> GaitUpdate {
        self.state.frame_in_cycle += 1;

        let cycle_completed = match self.classify(signal) {
            Some(observed) => self.transition(observed),
            None => false,
        };

        if cycle_completed {
            self.state.cycle_count += 1;
            self.state
                .completed_cycle_lengths
                .push(self.state.frame_in_cycle);
            self.state.frame_in_cycle = 0;
            debug!(
                cycle_count = self.state.cycle_count,
                estimated_length = self.estimated_cycle_length(),
                "Gait cycle completed"
            );
        }

        GaitUpdate {
            sub_phase: self.state.current_phase,
            cycle_count: self.state.cycle_count,
            cycle_percent: self.cycle_percent(),
            cycle_completed,
        }
    }

    /// Apply an observed phase, returning true when it completes a cycle
    fn transition(&mut self, observed: SubPhase) -> bool {
        let current = self.state.current_phase;
        if observed == current {
            return false;
        }

        if current == SubPhase::Unknown {
            self.enter(observed);
            if observed == SubPhase::InitialContact {
                self.start_cycle();
            }
            return false;
        }

        if current.successor() == Some(observed) {
            self.enter(observed);
            if observed == SubPhase::InitialContact {
                if self.state.cycle_started {
                    return true;
                }
                self.start_cycle();
            }
            return false;
        }

        if observed == SubPhase::InitialContact {
            debug!(from = %current, "Out-of-order contact, restarting cycle");
            self.enter(observed);
            self.start_cycle();
        } else {
            debug!(from = %current, to = %observed, "Ignoring out-of-order phase");
        }

        false
    }

    fn enter(&mut self, phase: SubPhase) {
        debug!(from = %self.state.current_phase, to = %phase, "Sub-phase transition");
        self.state.previous_phase = self.state.current_phase;
        self.state.current_phase = phase;
    }

    fn start_cycle(&mut self) {
        self.state.cycle_started = true;
        self.state.frame_in_cycle = 0;
    }

    /// Mean completed cycle length, or the configured default
    pub fn estimated_cycle_length(&self) -> f64 {
        let lengths = &self.state.completed_cycle_lengths;
        if lengths.is_empty() {
            return self.config.default_cycle_length.max(1) as f64;
        }
        lengths.iter().map(|l| *l as f64).sum::<f64>() / lengths.len() as f64
    }

    /// Position within the current cycle, 0-100
    pub fn cycle_percent(&self) -> f64 {
        let percent = self.state.frame_in_cycle as f64 / self.estimated_cycle_length() * 100.0;
        percent.clamp(0.0, 100.0)
    }

    /// Forget everything, ready for another video
    pub fn reset(&mut self) {
        self.state = GaitState::default();
    }
}

impl Default for GaitCycleCounter {
    fn default() -> Self {
        Self::new(GaitConfig::default())
    }
}
