//! Thompson sampling over a Beta posterior per option.

use crate::random::RandomSource;
use banditry_core::{BanditError, BanditResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pseudo-count added to both Beta shape parameters. Keeps options with no
/// observations sampleable and centred on 0.5.
pub const PRIOR_SMOOTHING: f64 = 2.0;

/// Observed counters for one option of a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmStats {
    pub option: String,
    pub spins: i64,
    pub wins: i64,
}

impl ArmStats {
    pub fn new(option: impl Into<String>, spins: i64, wins: i64) -> Self {
        Self {
            option: option.into(),
            spins,
            wins,
        }
    }
}

pub struct BanditEngine {
    random: Arc<dyn RandomSource>,
}

impl BanditEngine {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Sample a plausible success rate for an option.
    ///
    /// Negative win tallies and wins above spins are clamped so both shape
    /// parameters stay at or above the prior.
    pub fn arm_guess(&self, spins: i64, wins: i64) -> f64 {
        let alpha = wins.max(0) as f64 + PRIOR_SMOOTHING;
        let beta = spins.saturating_sub(wins).max(0) as f64 + PRIOR_SMOOTHING;
        self.random.beta(alpha, beta)
    }

    /// Pick the option with the highest sampled rate; exact ties are broken
    /// uniformly at random.
    pub fn best_guess(&self, arms: &[ArmStats]) -> BanditResult<String> {
        if arms.is_empty() {
            return Err(BanditError::InvalidInput(
                "cannot choose among zero options".to_string(),
            ));
        }

        let guesses: Vec<f64> = arms
            .iter()
            .map(|arm| self.arm_guess(arm.spins, arm.wins))
            .collect();
        let best = guesses.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let tied: Vec<&ArmStats> = arms
            .iter()
            .zip(&guesses)
            .filter(|(_, guess)| **guess == best)
            .map(|(arm, _)| arm)
            .collect();

        let pick = if tied.len() == 1 {
            tied[0]
        } else {
            tied[self.random.index(tied.len())]
        };
        Ok(pick.option.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SeededRandom, ThreadRandom};

    /// Same sample for every arm, fixed tie-break index.
    struct ConstantRandom {
        value: f64,
        pick: usize,
    }

    impl RandomSource for ConstantRandom {
        fn beta(&self, _alpha: f64, _beta: f64) -> f64 {
            self.value
        }
        fn index(&self, len: usize) -> usize {
            self.pick.min(len - 1)
        }
        fn unit(&self) -> f64 {
            0.0
        }
    }

    fn thread_engine() -> BanditEngine {
        BanditEngine::new(Arc::new(ThreadRandom))
    }

    #[test]
    fn test_arm_guess_strictly_inside_unit_interval() {
        let engine = thread_engine();
        for spins in [0i64, 1, 2, 10, 100, 10_000] {
            for wins in [0, spins / 3, spins / 2, spins] {
                for _ in 0..20 {
                    let g = engine.arm_guess(spins, wins);
                    assert!(g > 0.0 && g < 1.0, "spins={spins} wins={wins} got {g}");
                }
            }
        }
    }

    #[test]
    fn test_arm_guess_tolerates_negative_wins() {
        let engine = thread_engine();
        let g = engine.arm_guess(5, -3);
        assert!(g > 0.0 && g < 1.0);
    }

    #[test]
    fn test_strong_arm_dominates() {
        let engine = BanditEngine::new(Arc::new(SeededRandom::new(42)));
        let arms = vec![ArmStats::new("good", 1000, 990), ArmStats::new("bad", 1000, 10)];
        let good = (0..1000)
            .filter(|_| engine.best_guess(&arms).unwrap() == "good")
            .count();
        assert!(good >= 950, "good arm picked only {good} times");
    }

    #[test]
    fn test_fresh_arms_split_evenly() {
        let engine = BanditEngine::new(Arc::new(SeededRandom::new(1234)));
        let arms = vec![ArmStats::new("a", 0, 0), ArmStats::new("b", 0, 0)];
        let a = (0..4000)
            .filter(|_| engine.best_guess(&arms).unwrap() == "a")
            .count();
        assert!((1700..=2300).contains(&a), "a picked {a} of 4000");
    }

    #[test]
    fn test_exact_tie_uses_random_pick() {
        let arms = vec![
            ArmStats::new("x", 0, 0),
            ArmStats::new("y", 0, 0),
            ArmStats::new("z", 0, 0),
        ];
        for pick in 0..3 {
            let engine = BanditEngine::new(Arc::new(ConstantRandom { value: 0.5, pick }));
            assert_eq!(engine.best_guess(&arms).unwrap(), arms[pick].option);
        }
    }

    #[test]
    fn test_single_arm_and_empty_input() {
        let engine = thread_engine();
        let arms = vec![ArmStats::new("only", 3, 1)];
        assert_eq!(engine.best_guess(&arms).unwrap(), "only");
        assert!(matches!(
            engine.best_guess(&[]),
            Err(BanditError::InvalidInput(_))
        ));
    }
}
