//! Difficulty-mix resolution and per-bucket targeting.
//!
//! Two small pure pieces live here:
//!   - resolving a named preset (or explicit weights) into `MixWeights`
//!   - splitting a subject's allocation into Easy/Medium/Hard integer
//!     targets that sum exactly to the allocation
//!
//! The reconciliation after rounding is deliberately asymmetric: a deficit
//! lands on MEDIUM, an excess is trimmed from HARD first (down to 0) and
//! then from MEDIUM. Simulations must not come out harder than requested.

use tracing::warn;

use crate::config::EngineConfig;
use crate::domain::{Difficulty, DifficultyMix, MixWeights};

/// Equal thirds. Also the silent fallback for unrecognized preset names —
/// the engine degrades instead of rejecting (see the fallback test below).
pub const BALANCED_MIX: MixWeights = MixWeights {
    easy: 1.0 / 3.0,
    medium: 1.0 / 3.0,
    hard: 1.0 / 3.0,
};

/// Built-in named presets. Config-file presets take precedence over these,
/// see `EngineConfig::preset_weights`.
pub fn builtin_preset(name: &str) -> Option<MixWeights> {
    match name {
        "balanced" => Some(BALANCED_MIX),
        "easy_leaning" => Some(MixWeights { easy: 0.5, medium: 0.3, hard: 0.2 }),
        "hard_leaning" => Some(MixWeights { easy: 0.2, medium: 0.3, hard: 0.5 }),
        "exam_like" => Some(MixWeights { easy: 0.3, medium: 0.5, hard: 0.2 }),
        _ => None,
    }
}

/// Resolve the requested mix to concrete weights. Explicit weights are used
/// as given — no renormalization. An unknown preset name falls back to
/// `BALANCED_MIX` with a warning.
pub fn resolve_mix(mix: &DifficultyMix, config: &EngineConfig) -> MixWeights {
    match mix {
        DifficultyMix::Explicit { easy, medium, hard } => MixWeights {
            easy: *easy,
            medium: *medium,
            hard: *hard,
        },
        DifficultyMix::Preset(name) => config.preset_weights(name).unwrap_or_else(|| {
            warn!(
                target: "selection",
                preset = %name,
                "unknown difficulty-mix preset, falling back to equal thirds"
            );
            BALANCED_MIX
        }),
    }
}

/// Integer Easy/Medium/Hard targets for one subject allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyTargets {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultyTargets {
    pub fn get(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    pub fn total(&self) -> u32 {
        self.easy + self.medium + self.hard
    }
}

/// Split `n` into per-difficulty targets using the resolved weights.
///
/// Each weight × n is rounded independently (half away from zero). A rounded
/// sum below `n` adds the deficit to MEDIUM; above `n`, the excess comes out
/// of HARD first, then MEDIUM.
pub fn difficulty_targets(n: u32, weights: &MixWeights) -> DifficultyTargets {
    let n = i64::from(n);
    let easy = (weights.easy * n as f64).round() as i64;
    let mut medium = (weights.medium * n as f64).round() as i64;
    let mut hard = (weights.hard * n as f64).round() as i64;

    let sum = easy + medium + hard;
    if sum < n {
        medium += n - sum;
    } else if sum > n {
        let mut excess = sum - n;
        let trimmed = excess.min(hard);
        hard -= trimmed;
        excess -= trimmed;
        medium -= excess;
    }

    // Degenerate explicit weights (negative, or summing far above 1) are the
    // caller's responsibility; the clamp only guards the cast.
    DifficultyTargets {
        easy: easy.max(0) as u32,
        medium: medium.max(0) as u32,
        hard: hard.max(0) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mix(easy: f64, medium: f64, hard: f64) -> MixWeights {
        MixWeights { easy, medium, hard }
    }

    #[test]
    fn explicit_weights_pass_through_unchanged() {
        let resolved = resolve_mix(
            &DifficultyMix::Explicit { easy: 0.7, medium: 0.2, hard: 0.1 },
            &EngineConfig::default(),
        );
        assert_eq!(resolved, mix(0.7, 0.2, 0.1));
    }

    #[test]
    fn named_presets_resolve() {
        let resolved = resolve_mix(
            &DifficultyMix::Preset("easy_leaning".into()),
            &EngineConfig::default(),
        );
        assert_eq!(resolved, mix(0.5, 0.3, 0.2));
    }

    #[test]
    fn unknown_preset_falls_back_to_equal_thirds() {
        // Silent fallback, not an error. Flagged for product review but the
        // behavior is load-bearing for callers with stale preset names.
        let resolved = resolve_mix(
            &DifficultyMix::Preset("no_such_preset".into()),
            &EngineConfig::default(),
        );
        assert_eq!(resolved, BALANCED_MIX);
    }

    #[test]
    fn config_presets_override_builtins() {
        let mut config = EngineConfig::default();
        config.mix_presets.insert(
            "balanced".into(),
            crate::config::MixPresetCfg { easy: 0.4, medium: 0.4, hard: 0.2 },
        );
        let resolved = resolve_mix(&DifficultyMix::Preset("balanced".into()), &config);
        assert_eq!(resolved, mix(0.4, 0.4, 0.2));
    }

    #[test]
    fn rounding_without_drift_needs_no_reconciliation() {
        // 3.5 -> 4, 2.1 -> 2, 1.4 -> 1 already sums to 7.
        let t = difficulty_targets(7, &mix(0.5, 0.3, 0.2));
        assert_eq!(t, DifficultyTargets { easy: 4, medium: 2, hard: 1 });
    }

    #[test]
    fn excess_is_trimmed_from_hard_first() {
        // 1.5 -> 2, 0.9 -> 1, 0.6 -> 1 sums to 4; the excess 1 comes out of
        // HARD.
        let t = difficulty_targets(3, &mix(0.5, 0.3, 0.2));
        assert_eq!(t, DifficultyTargets { easy: 2, medium: 1, hard: 0 });
    }

    #[test]
    fn deficit_lands_on_medium() {
        // 2.4 -> 2, 2.4 -> 2, 1.2 -> 1 sums to 5; MEDIUM absorbs the gap.
        let t = difficulty_targets(6, &mix(0.4, 0.4, 0.2));
        assert_eq!(t, DifficultyTargets { easy: 2, medium: 3, hard: 1 });
    }

    #[test]
    fn deep_excess_reaches_medium_after_hard_hits_zero() {
        // 0.9 -> 1, 0.9 -> 1, 0.2 -> 0 over n=2: sum 2, fine. Force a case
        // where HARD alone cannot absorb: 1.5 -> 2, 1.5 -> 2, 0 -> 0 over
        // n=3 leaves excess 1 with HARD already 0, so MEDIUM pays.
        let t = difficulty_targets(3, &mix(0.5, 0.5, 0.0));
        assert_eq!(t, DifficultyTargets { easy: 2, medium: 1, hard: 0 });
    }

    #[test]
    fn targets_always_sum_to_allocation() {
        let mixes = [
            BALANCED_MIX,
            mix(0.5, 0.3, 0.2),
            mix(0.2, 0.3, 0.5),
            mix(1.0, 0.0, 0.0),
            mix(0.0, 0.0, 1.0),
            mix(0.45, 0.1, 0.45),
        ];
        for weights in &mixes {
            for n in 0..=60 {
                let t = difficulty_targets(n, weights);
                assert_eq!(t.total(), n, "weights {weights:?} n {n}");
            }
        }
    }
}
