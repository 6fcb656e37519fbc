//! Behavior simulation
//!
//! Advances the synthetic activity signals by one tick. Typing and mouse activity
//! drift down towards their floors, idle time and app switching drift up towards
//! their ceilings. The random source is injected so sessions can be replayed.

use crate::types::{ActivitySignals, Mode, APPS_CEILING, IDLE_CEILING, MOUSE_FLOOR, TYPING_FLOOR};
use rand::Rng;

/// Stateless simulator for activity signals
pub struct BehaviorSimulator;

impl BehaviorSimulator {
    /// Produce the next signals for `mode`, drawing one uniform sample in
    /// `[0, drift)` per field. The input is left untouched.
    pub fn step<R: Rng + ?Sized>(
        signals: &ActivitySignals,
        mode: Mode,
        rng: &mut R,
    ) -> ActivitySignals {
        let drift = mode.drift();

        ActivitySignals {
            typing: (signals.typing - rng.gen_range(0.0..drift)).max(TYPING_FLOOR),
            idle: (signals.idle + rng.gen_range(0.0..drift)).min(IDLE_CEILING),
            apps: (signals.apps + rng.gen_range(0.0..drift)).min(APPS_CEILING),
            mouse: (signals.mouse - rng.gen_range(0.0..drift)).max(MOUSE_FLOOR),
        }
    }
}
