//! Cognitive analysis
//!
//! Pure rules deriving labels, flags, interventions and human-readable reasons
//! from the smoothed score and the current activity signals.
//!
//! Two checks compare idle time against thresholds the simulator never reaches
//! (idle is capped at 30): the DRIFTING branch (`idle > 30`) and the boredom flag
//! (`idle > 40`). Both are kept as written and only fire for externally supplied
//! signals.

use crate::types::{ActivitySignals, CognitiveState, LockState, Recovery};
use std::collections::VecDeque;

/// Reason emitted when no signal crosses its threshold
pub const STABLE_REASON: &str = "Stable behavior detected";

/// Output of the analyzer for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct CognitiveAssessment {
    pub state: CognitiveState,
    pub boredom: bool,
    pub drift: bool,
    pub recovery: Option<Recovery>,
    pub intervention: &'static str,
    pub reasons: Vec<String>,
}

/// Rule-based analyzer over score and signals
pub struct CognitiveAnalyzer;

impl CognitiveAnalyzer {
    /// Run every rule. `history` must already include `score` as its last entry.
    pub fn evaluate(
        score: u32,
        signals: &ActivitySignals,
        history: &VecDeque<u32>,
    ) -> CognitiveAssessment {
        let state = Self::classify(score, signals);

        CognitiveAssessment {
            state,
            boredom: Self::boredom(score, signals),
            drift: Self::drift(signals),
            recovery: Self::recovery(score, history),
            intervention: Self::intervention(state),
            reasons: Self::explain(signals),
        }
    }

    /// Primary label, first matching rule wins
    pub fn classify(score: u32, signals: &ActivitySignals) -> CognitiveState {
        if score < 30 {
            return CognitiveState::Calm;
        }
        if score < 50 && signals.idle < 15.0 {
            return CognitiveState::Focused;
        }
        if score < 40 && signals.idle > 30.0 {
            return CognitiveState::Drifting;
        }
        if score < 75 {
            return CognitiveState::Overloaded;
        }
        CognitiveState::Critical
    }

    pub fn boredom(score: u32, signals: &ActivitySignals) -> bool {
        score < 35 && signals.idle > 40.0
    }

    pub fn drift(signals: &ActivitySignals) -> bool {
        signals.idle > 20.0 && signals.typing < 40.0 && signals.mouse > 70.0
    }

    /// FAST when the previous score was above 70 and the current one is below 50
    pub fn recovery(score: u32, history: &VecDeque<u32>) -> Option<Recovery> {
        if history.len() < 2 {
            return None;
        }
        let previous = history[history.len() - 2];
        (previous > 70 && score < 50).then_some(Recovery::Fast)
    }

    pub fn intervention(state: CognitiveState) -> &'static str {
        match state {
            CognitiveState::Drifting => "Try switching tasks to regain engagement.",
            CognitiveState::Overloaded => "Take a short 2-minute micro-break.",
            CognitiveState::Critical => "Pause the session and reset cognitive load.",
            CognitiveState::Calm | CognitiveState::Focused => {
                "You are in a healthy cognitive zone."
            }
        }
    }

    /// Human-readable reasons in fixed order: idle, apps, typing, mouse
    pub fn explain(signals: &ActivitySignals) -> Vec<String> {
        let mut reasons = Vec::new();
        if signals.idle > 12.0 {
            reasons.push("Idle time spike → fatigue detected".to_string());
        }
        if signals.apps > 7.0 {
            reasons.push("Frequent app switching → focus loss".to_string());
        }
        if signals.typing < 45.0 {
            reasons.push("Typing slowdown → cognitive load".to_string());
        }
        if signals.mouse < 50.0 {
            reasons.push("Unstable mouse movement → stress signal".to_string());
        }
        if reasons.is_empty() {
            reasons.push(STABLE_REASON.to_string());
        }
        reasons
    }

    pub fn lock_state(score: u32) -> LockState {
        if score > 70 {
            LockState::Locked
        } else if score > 40 {
            LockState::Unlocking
        } else {
            LockState::Unlocked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn signals(typing: f64, idle: f64, apps: f64, mouse: f64) -> ActivitySignals {
        ActivitySignals {
            typing,
            idle,
            apps,
            mouse,
        }
    }

    #[test]
    fn test_lock_boundaries() {
        assert_eq!(CognitiveAnalyzer::lock_state(70), LockState::Unlocking);
        assert_eq!(CognitiveAnalyzer::lock_state(71), LockState::Locked);
        assert_eq!(CognitiveAnalyzer::lock_state(40), LockState::Unlocked);
        assert_eq!(CognitiveAnalyzer::lock_state(41), LockState::Unlocking);
        assert_eq!(CognitiveAnalyzer::lock_state(0), LockState::Unlocked);
        assert_eq!(CognitiveAnalyzer::lock_state(100), LockState::Locked);
    }

    #[test]
    fn test_classify_priority() {
        let quiet = signals(70.0, 5.0, 3.0, 85.0);
        let idle = signals(70.0, 20.0, 3.0, 85.0);

        assert_eq!(CognitiveAnalyzer::classify(29, &quiet), CognitiveState::Calm);
        assert_eq!(CognitiveAnalyzer::classify(29, &idle), CognitiveState::Calm);
        assert_eq!(CognitiveAnalyzer::classify(30, &quiet), CognitiveState::Focused);
        assert_eq!(CognitiveAnalyzer::classify(49, &quiet), CognitiveState::Focused);
        // Idle at or above 15 skips FOCUSED and lands on OVERLOADED
        assert_eq!(CognitiveAnalyzer::classify(35, &idle), CognitiveState::Overloaded);
        assert_eq!(CognitiveAnalyzer::classify(50, &quiet), CognitiveState::Overloaded);
        assert_eq!(CognitiveAnalyzer::classify(74, &quiet), CognitiveState::Overloaded);
        assert_eq!(CognitiveAnalyzer::classify(75, &quiet), CognitiveState::Critical);
    }

    #[test]
    fn test_drifting_needs_idle_beyond_simulator_ceiling() {
        // idle == 30 is the simulator maximum and never satisfies idle > 30
        let capped = signals(40.0, 30.0, 5.0, 80.0);
        assert_eq!(CognitiveAnalyzer::classify(35, &capped), CognitiveState::Overloaded);

        let external = signals(40.0, 31.0, 5.0, 80.0);
        assert_eq!(CognitiveAnalyzer::classify(35, &external), CognitiveState::Drifting);
        assert_eq!(CognitiveAnalyzer::classify(29, &external), CognitiveState::Calm);
    }

    #[test]
    fn test_boredom_unreachable_within_simulator_range() {
        assert!(!CognitiveAnalyzer::boredom(10, &signals(70.0, 30.0, 3.0, 85.0)));
        assert!(CognitiveAnalyzer::boredom(10, &signals(70.0, 41.0, 3.0, 85.0)));
        assert!(!CognitiveAnalyzer::boredom(35, &signals(70.0, 41.0, 3.0, 85.0)));
    }

    #[test]
    fn test_drift_flag() {
        assert!(CognitiveAnalyzer::drift(&signals(39.0, 21.0, 3.0, 71.0)));
        assert!(!CognitiveAnalyzer::drift(&signals(40.0, 21.0, 3.0, 71.0)));
        assert!(!CognitiveAnalyzer::drift(&signals(39.0, 20.0, 3.0, 71.0)));
        assert!(!CognitiveAnalyzer::drift(&signals(39.0, 21.0, 3.0, 70.0)));
    }

    #[test]
    fn test_recovery() {
        let short: VecDeque<u32> = VecDeque::from(vec![45]);
        assert_eq!(CognitiveAnalyzer::recovery(45, &short), None);

        let recovered: VecDeque<u32> = VecDeque::from(vec![80, 71, 49]);
        assert_eq!(CognitiveAnalyzer::recovery(49, &recovered), Some(Recovery::Fast));

        let borderline: VecDeque<u32> = VecDeque::from(vec![70, 49]);
        assert_eq!(CognitiveAnalyzer::recovery(49, &borderline), None);

        let still_high: VecDeque<u32> = VecDeque::from(vec![80, 50]);
        assert_eq!(CognitiveAnalyzer::recovery(50, &still_high), None);
    }

    #[test]
    fn test_interventions() {
        assert_eq!(
            CognitiveAnalyzer::intervention(CognitiveState::Drifting),
            "Try switching tasks to regain engagement."
        );
        assert_eq!(
            CognitiveAnalyzer::intervention(CognitiveState::Overloaded),
            "Take a short 2-minute micro-break."
        );
        assert_eq!(
            CognitiveAnalyzer::intervention(CognitiveState::Critical),
            "Pause the session and reset cognitive load."
        );
        for calm in [CognitiveState::Calm, CognitiveState::Focused] {
            assert_eq!(
                CognitiveAnalyzer::intervention(calm),
                "You are in a healthy cognitive zone."
            );
        }
    }

    #[test]
    fn test_explain_stable() {
        let reasons = CognitiveAnalyzer::explain(&signals(45.0, 12.0, 7.0, 50.0));
        assert_eq!(reasons, vec![STABLE_REASON.to_string()]);
    }

    #[test]
    fn test_explain_all_reasons_in_order() {
        let reasons = CognitiveAnalyzer::explain(&signals(30.0, 25.0, 12.0, 30.0));
        assert_eq!(
            reasons,
            vec![
                "Idle time spike → fatigue detected".to_string(),
                "Frequent app switching → focus loss".to_string(),
                "Typing slowdown → cognitive load".to_string(),
                "Unstable mouse movement → stress signal".to_string(),
            ]
        );
    }

    #[test]
    fn test_explain_partial() {
        let reasons = CognitiveAnalyzer::explain(&signals(44.0, 5.0, 3.0, 85.0));
        assert_eq!(reasons, vec!["Typing slowdown → cognitive load".to_string()]);
    }

    #[test]
    fn test_evaluate_combines_rules() {
        let state = signals(70.0, 5.0, 3.0, 85.0);
        let history: VecDeque<u32> = VecDeque::from(vec![72, 25]);
        let assessment = CognitiveAnalyzer::evaluate(25, &state, &history);

        assert_eq!(assessment.state, CognitiveState::Calm);
        assert!(!assessment.boredom);
        assert!(!assessment.drift);
        assert_eq!(assessment.recovery, Some(Recovery::Fast));
        assert_eq!(assessment.intervention, "You are in a healthy cognitive zone.");
        assert_eq!(assessment.reasons, vec![STABLE_REASON.to_string()]);
    }
}
