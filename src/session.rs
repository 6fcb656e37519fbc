//! Session orchestration
//!
//! This module provides the public API for running a scoring session. It owns
//! the session state, the smoothed score and the archive, and drives the tick
//! pipeline: simulate → classify → smooth → record → analyze.

use crate::analyzer::CognitiveAnalyzer;
use crate::archive::SessionArchive;
use crate::classifier::{RandomForest, StressClassifier, TrainingSet};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::simulator::BehaviorSimulator;
use crate::smoother::{to_score, ScoreSmoother};
use crate::types::{Mode, SessionState, SessionSummary, StartAck, TickReport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Status string acknowledging a session start
pub const SESSION_STARTED: &str = "session started";

/// Stateful controller for a single logical session.
///
/// A study session is active from construction, so `tick` is valid before the
/// first explicit `start`.
pub struct SessionController {
    classifier: Arc<dyn StressClassifier>,
    rng: StdRng,
    state: SessionState,
    smoother: ScoreSmoother,
    archive: SessionArchive,
    archive_view_limit: usize,
}

impl SessionController {
    /// Create a controller around an already-trained classifier
    pub fn new(classifier: Arc<dyn StressClassifier>, config: &EngineConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            classifier,
            rng,
            state: SessionState::new(Mode::default()),
            smoother: ScoreSmoother::default(),
            archive: SessionArchive::new(),
            archive_view_limit: config.archive_view_limit,
        }
    }

    /// Train the reference forest described by `config` and wrap it in a controller
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let forest = RandomForest::train(&TrainingSet::reference(), config.forest)?;
        info!(
            estimators = forest.tree_count(),
            seed = config.forest.seed,
            "stress classifier trained"
        );
        Ok(Self::new(Arc::new(forest), config))
    }

    /// Start a new session from an optional mode key.
    ///
    /// Missing or unknown keys fall back to study; starting never fails.
    pub fn start(&mut self, mode: Option<&str>) -> StartAck {
        let mode = match mode.map(str::parse::<Mode>) {
            None => Mode::default(),
            Some(Ok(mode)) => mode,
            Some(Err(e)) => {
                warn!(error = %e, "falling back to study mode");
                Mode::default()
            }
        };
        self.start_mode(mode)
    }

    /// Archive the current session if it scored anything, then reset
    pub fn start_mode(&mut self, mode: Mode) -> StartAck {
        if let Some(summary) = self.state.summarize() {
            info!(
                session_id = %summary.session_id,
                mode = %summary.mode,
                avg = summary.avg,
                peak = summary.peak,
                length = summary.length,
                "session archived"
            );
            self.archive.push(summary);
        }

        self.state = SessionState::new(mode);
        self.smoother.reset();
        info!(session_id = %self.state.session_id, %mode, "session started");

        StartAck {
            status: SESSION_STARTED.to_string(),
            mode,
        }
    }

    /// Advance the session by one tick.
    ///
    /// Every fallible step runs before anything is committed, so an error leaves
    /// the session exactly as it was.
    pub fn tick(&mut self) -> Result<TickReport, EngineError> {
        let mut next = self.state.clone();
        next.signals = BehaviorSimulator::step(&self.state.signals, next.mode, &mut self.rng);

        let probability = self.classifier.predict_proba(&next.signals.features())?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(EngineError::Classifier(format!(
                "probability {probability} outside [0, 1]"
            )));
        }
        let smoothed = self.smoother.peek(probability * 100.0);
        let score = to_score(smoothed);

        next.push_score(score);
        next.ticks += 1;

        let lock = CognitiveAnalyzer::lock_state(score);
        let assessment = CognitiveAnalyzer::evaluate(score, &next.signals, &next.history);

        let report = TickReport {
            score,
            lock,
            history: next.history.iter().copied().collect(),
            reasons: assessment.reasons,
            cognitive_state: assessment.state,
            boredom: assessment.boredom,
            drift: assessment.drift,
            recovery: assessment.recovery,
            intervention: assessment.intervention.to_string(),
        };

        debug!(
            session_id = %next.session_id,
            tick = next.ticks,
            probability,
            score,
            lock = ?report.lock,
            state = ?report.cognitive_state,
            "tick"
        );

        self.smoother.set(smoothed);
        self.state = next;
        Ok(report)
    }

    /// Most recent archived sessions, most recent last
    pub fn sessions(&self) -> Vec<SessionSummary> {
        self.archive.recent(self.archive_view_limit).to_vec()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn smoothed_score(&self) -> f64 {
        self.smoother.value()
    }

    pub fn archive(&self) -> &SessionArchive {
        &self.archive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoother::BASELINE_SCORE;
    use crate::types::{ActivitySignals, CognitiveState, LockState, Recovery};
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    struct FixedClassifier(f64);

    impl StressClassifier for FixedClassifier {
        fn predict_proba(&self, _features: &[f64; 4]) -> Result<f64, EngineError> {
            Ok(self.0)
        }
    }

    struct FailingClassifier;

    impl StressClassifier for FailingClassifier {
        fn predict_proba(&self, _features: &[f64; 4]) -> Result<f64, EngineError> {
            Err(EngineError::Classifier("model unavailable".to_string()))
        }
    }

    fn seeded_config() -> EngineConfig {
        EngineConfig {
            rng_seed: Some(17),
            ..EngineConfig::default()
        }
    }

    fn controller_with(probability: f64) -> SessionController {
        SessionController::new(Arc::new(FixedClassifier(probability)), &seeded_config())
    }

    #[test]
    fn test_first_tick_from_baseline() {
        let mut controller = controller_with(0.0);
        let report = controller.tick().unwrap();

        // floor(0.15 * 0 + 0.85 * 30) = floor(25.5)
        assert_eq!(report.score, 25);
        assert_eq!(report.lock, LockState::Unlocked);
        assert_eq!(report.history, vec![25]);
        assert_eq!(report.cognitive_state, CognitiveState::Calm);
        assert_eq!(report.recovery, None);
        assert_eq!(report.intervention, "You are in a healthy cognitive zone.");
        assert_eq!(report.reasons, vec!["Stable behavior detected".to_string()]);
        assert!((controller.smoothed_score() - 25.5).abs() < 1e-9);
    }

    #[test]
    fn test_tick_without_explicit_start_uses_study_defaults() {
        let controller = controller_with(0.0);
        assert_eq!(controller.state().mode, Mode::Study);
        assert_eq!(controller.state().signals, ActivitySignals::default());
        assert!(controller.state().history.is_empty());
        assert_eq!(controller.smoothed_score(), BASELINE_SCORE);
    }

    #[test]
    fn test_history_keeps_last_ten_scores() {
        let mut controller = controller_with(1.0);
        let scores: Vec<u32> = (0..15).map(|_| controller.tick().unwrap().score).collect();

        let history: Vec<u32> = controller.state().history.iter().copied().collect();
        assert_eq!(history, scores[5..].to_vec());
        assert_eq!(controller.state().ticks, 15);
    }

    #[test]
    fn test_constant_stress_climbs_to_locked() {
        let mut controller = controller_with(1.0);
        let mut last = 0;
        let mut report = controller.tick().unwrap();
        for _ in 0..30 {
            assert!(report.score >= last);
            last = report.score;
            report = controller.tick().unwrap();
        }
        assert_eq!(report.lock, LockState::Locked);
        assert_eq!(report.cognitive_state, CognitiveState::Critical);
        assert_eq!(
            report.intervention,
            "Pause the session and reset cognitive load."
        );
    }

    #[test]
    fn test_start_archives_previous_session() {
        let mut controller = controller_with(0.0);
        controller.state.history = VecDeque::from(vec![80, 20]);
        let previous_mode = controller.state().mode;
        let previous_id = controller.state().session_id;

        let ack = controller.start(Some("work"));
        assert_eq!(ack.status, "session started");
        assert_eq!(ack.mode, Mode::Work);

        let sessions = controller.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, previous_id);
        assert_eq!(sessions[0].mode, previous_mode);
        assert_eq!(sessions[0].avg, 50);
        assert_eq!(sessions[0].peak, 80);
        assert_eq!(sessions[0].length, 2);

        assert!(controller.state().history.is_empty());
        assert_eq!(controller.state().mode, Mode::Work);
        assert_eq!(controller.smoothed_score(), 30.0);
        assert_ne!(controller.state().session_id, previous_id);
    }

    #[test]
    fn test_start_resets_signals_and_smoothing() {
        let mut controller = controller_with(1.0);
        for _ in 0..5 {
            controller.tick().unwrap();
        }
        assert!(controller.smoothed_score() > BASELINE_SCORE);

        controller.start(Some("creative"));
        assert_eq!(controller.state().signals, ActivitySignals::default());
        assert_eq!(controller.smoothed_score(), BASELINE_SCORE);
        assert_eq!(controller.state().ticks, 0);
    }

    #[test]
    fn test_empty_session_is_not_archived() {
        let mut controller = controller_with(0.0);
        controller.start(Some("work"));
        controller.start(None);
        assert!(controller.archive().is_empty());
    }

    #[test]
    fn test_unknown_or_missing_mode_defaults_to_study() {
        let mut controller = controller_with(0.0);
        assert_eq!(controller.start(Some("gaming")).mode, Mode::Study);
        assert_eq!(controller.start(Some("work")).mode, Mode::Work);
        assert_eq!(controller.start(None).mode, Mode::Study);
    }

    #[test]
    fn test_sessions_view_is_limited() {
        let mut controller = controller_with(0.0);
        for _ in 0..7 {
            controller.tick().unwrap();
            controller.start(Some("study"));
        }
        assert_eq!(controller.archive().len(), 7);
        assert_eq!(controller.sessions().len(), 5);
    }

    #[test]
    fn test_failed_tick_leaves_session_untouched() {
        let mut controller =
            SessionController::new(Arc::new(FailingClassifier), &seeded_config());
        let before = controller.state().clone();

        let err = controller.tick().unwrap_err();
        assert!(matches!(err, EngineError::Classifier(_)));
        assert_eq!(controller.state().signals, before.signals);
        assert_eq!(controller.state().history, before.history);
        assert_eq!(controller.state().ticks, 0);
        assert_eq!(controller.smoothed_score(), BASELINE_SCORE);
    }

    #[test]
    fn test_rejects_probability_outside_unit_range() {
        for probability in [f64::NAN, f64::INFINITY, 5.0, -0.1] {
            let mut controller = controller_with(probability);
            let before = controller.state().clone();

            let err = controller.tick().unwrap_err();
            assert!(matches!(err, EngineError::Classifier(_)));
            assert_eq!(controller.smoothed_score(), BASELINE_SCORE);
            assert_eq!(controller.state().signals, before.signals);
            assert!(controller.state().history.is_empty());
            assert_eq!(controller.state().ticks, 0);
        }
    }

    #[test]
    fn test_accepts_probability_bounds() {
        let mut low = controller_with(0.0);
        assert!(low.tick().is_ok());
        let mut high = controller_with(1.0);
        assert_eq!(high.tick().unwrap().score, 40);
    }

    #[test]
    fn test_fast_recovery_after_drop() {
        let mut controller = controller_with(0.0);
        controller.state.history = VecDeque::from(vec![75]);
        controller.smoother.set(40.0);

        let report = controller.tick().unwrap();
        // floor(0.85 * 40) = 34
        assert_eq!(report.score, 34);
        assert_eq!(report.history, vec![75, 34]);
        assert_eq!(report.recovery, Some(Recovery::Fast));
    }

    #[test]
    fn test_signals_stay_in_range_across_long_session() {
        let mut controller = controller_with(0.5);
        controller.start(Some("work"));
        for _ in 0..500 {
            controller.tick().unwrap();
            assert!(controller.state().signals.in_range());
            assert!(controller.state().history.len() <= 10);
        }
    }

    #[test]
    fn test_reference_forest_controller() {
        let mut controller = SessionController::from_config(&seeded_config()).unwrap();
        let report = controller.tick().unwrap();
        // The default profile is a normal example, so the score falls from the baseline
        assert!(report.score <= 30);
        assert_eq!(report.lock, LockState::Unlocked);
    }
}
