use serde::{Deserialize, Serialize};

/// Sub-phase of the reference limb's gait cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubPhase {
    /// No confident classification yet
    Unknown,
    #[serde(rename = "Initial Contact")]
    InitialContact,
    #[serde(rename = "Mid Stance")]
    MidStance,
    #[serde(rename = "Toe Off")]
    ToeOff,
    Swing,
}

impl SubPhase {
    /// Phases in cycle order, starting at the cycle's start state
    pub const CYCLE: [SubPhase; 4] = [
        SubPhase::InitialContact,
        SubPhase::MidStance,
        SubPhase::ToeOff,
        SubPhase::Swing,
    ];

    /// The phase that follows this one in a running cycle
    pub fn successor(&self) -> Option<SubPhase> {
        match self {
            SubPhase::Unknown => None,
            SubPhase::InitialContact => Some(SubPhase::MidStance),
            SubPhase::MidStance => Some(SubPhase::ToeOff),
            SubPhase::ToeOff => Some(SubPhase::Swing),
            SubPhase::Swing => Some(SubPhase::InitialContact),
        }
    }
}

impl std::fmt::Display for SubPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubPhase::Unknown => write!(f, "Unknown"),
            SubPhase::InitialContact => write!(f, "Initial Contact"),
            SubPhase::MidStance => write!(f, "Mid Stance"),
            SubPhase::ToeOff => write!(f, "Toe Off"),
            SubPhase::Swing => write!(f, "Swing"),
        }
    }
}

/// Per-frame input to the gait cycle counter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaitSignal {
    /// Reference knee angle in degrees (180 = straight leg)
    pub knee_angle: f64,
    /// Horizontal ankle position ahead of the hip, in leg lengths
    pub ankle_offset: f64,
}

/// Mutable state of one video's gait cycle counter
#[derive(Debug, Clone, PartialEq)]
pub struct GaitState {
    pub current_phase: SubPhase,
    pub previous_phase: SubPhase,
    pub cycle_count: u32,
    pub frame_in_cycle: u32,
    /// Set once the counter has entered `InitialContact`
    pub cycle_started: bool,
    /// Frame lengths of completed cycles
    pub completed_cycle_lengths: Vec<u32>,
}

impl Default for GaitState {
    fn default() -> Self {
        Self {
            current_phase: SubPhase::Unknown,
            previous_phase: SubPhase::Unknown,
            cycle_count: 0,
            frame_in_cycle: 0,
            cycle_started: false,
            completed_cycle_lengths: Vec::new(),
        }
    }
}

/// What the counter reports for one processed frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitUpdate {
    pub sub_phase: SubPhase,
    pub cycle_count: u32,
    pub cycle_percent: f64,
    /// True on the frame that completed a cycle
    pub cycle_completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successor_closes_the_cycle() {
        let mut phase = SubPhase::InitialContact;
        for expected in SubPhase::CYCLE.iter().skip(1) {
            phase = phase.successor().unwrap();
            assert_eq!(phase, *expected);
        }
        assert_eq!(phase.successor(), Some(SubPhase::InitialContact));
        assert_eq!(SubPhase::Unknown.successor(), None);
    }

    #[test]
    fn test_sub_phase_display() {
        assert_eq!(SubPhase::InitialContact.to_string(), "Initial Contact");
        assert_eq!(SubPhase::ToeOff.to_string(), "Toe Off");
    }

    #[test]
    fn test_sub_phase_serializes_as_display_label() {
        for phase in SubPhase::CYCLE {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase));
            assert_eq!(serde_json::from_str::<SubPhase>(&json).unwrap(), phase);
        }
    }

    #[test]
    fn test_initial_state() {
        let state = GaitState::default();
        assert_eq!(state.current_phase, SubPhase::Unknown);
        assert_eq!(state.cycle_count, 0);
        assert!(!state.cycle_started);
    }
}
