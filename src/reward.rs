//! Multi-objective reward over metric deltas.
//!
//! Given the metrics before and after an edit:
//!
//! ```text
//! reward = -alpha * (power_before - power_after)
//!          + beta  * (delay_before - delay_after)
//!          - gamma * (area_after  - area_before)
//! ```
//!
//! No normalisation is applied, so the reward scale follows the absolute magnitude of
//! the netlist's metrics. Rewards from differently sized netlists are not comparable.

use crate::EnvError;
use crate::metrics::Metrics;

/// Weights of the power, delay and area terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardWeights {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
            gamma: 1.0,
        }
    }
}

impl RewardWeights {
    /// Build a weight set, rejecting negative or non-finite weights.
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self, EnvError> {
        for (name, value) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !value.is_finite() || value < 0.0 {
                return Err(EnvError::InvalidWeight { name, value });
            }
        }
        Ok(Self { alpha, beta, gamma })
    }

    /// Signed contribution of each objective.
    pub fn components(&self, before: &Metrics, after: &Metrics) -> RewardComponents {
        RewardComponents {
            power: -self.alpha * (before.power - after.power),
            delay: self.beta * (before.delay - after.delay),
            area: -self.gamma * (after.area - before.area),
        }
    }

    pub fn reward(&self, before: &Metrics, after: &Metrics) -> f64 {
        self.components(before, after).total()
    }
}

/// The three weighted terms of one reward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RewardComponents {
    pub power: f64,
    pub delay: f64,
    pub area: f64,
}

impl RewardComponents {
    pub fn total(&self) -> f64 {
        self.power + self.delay + self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(power: f64, delay: f64, area: f64) -> Metrics {
        Metrics { power, delay, area }
    }

    #[test]
    fn test_power_increase_delay_drop_area_growth() {
        // Power term is negated on the reduction: a power rise of 2.0 contributes +2.0
        let before = metrics(10.0, 3.0, 5.0);
        let after = metrics(12.0, 2.5, 6.0);

        let reward = RewardWeights::default().reward(&before, &after);
        assert!((reward - 1.5).abs() < 1e-12, "reward was {}", reward);
    }

    #[test]
    fn test_power_drop_is_charged_by_the_power_term() {
        let before = metrics(10.0, 3.0, 5.0);
        let after = metrics(8.0, 2.5, 6.0);

        let reward = RewardWeights::default().reward(&before, &after);
        assert!((reward - -2.5).abs() < 1e-12, "reward was {}", reward);
    }

    #[test]
    fn test_components_are_weighted() {
        let weights = RewardWeights::new(2.0, 0.5, 3.0).unwrap();
        let c = weights.components(&metrics(4.0, 2.0, 1.0), &metrics(3.0, 1.0, 2.0));

        assert_eq!(c.power, -2.0);
        assert_eq!(c.delay, 0.5);
        assert_eq!(c.area, -3.0);
        assert_eq!(c.total(), -4.5);
    }

    #[test]
    fn test_unchanged_metrics_give_zero_reward() {
        let m = metrics(1.0, 2.0, 3.0);
        assert_eq!(RewardWeights::default().reward(&m, &m), 0.0);
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        assert_eq!(
            RewardWeights::new(1.0, -0.1, 1.0),
            Err(EnvError::InvalidWeight {
                name: "beta",
                value: -0.1
            })
        );
        assert!(RewardWeights::new(f64::NAN, 1.0, 1.0).is_err());
        assert!(RewardWeights::new(0.0, 0.0, 0.0).is_ok());
    }
}
