//! Built-in action policies used by the rollout harness.
//!
//! Real agents live outside this crate and talk to [`super::NetlistEnv`] directly. These
//! policies exist to drive the environment from the command line and in benchmarks.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::actions::Action;

/// Maps an observation to the next action.
pub trait Policy: Send {
    fn act(&mut self, observation: &[f32]) -> Action;
}

/// Uniformly random actions.
pub struct RandomPolicy {
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &[f32]) -> Action {
        Action::ALL[self.rng.gen_range(0..Action::ALL.len())]
    }
}

/// The same action every step.
pub struct ConstantPolicy(pub Action);

impl Policy for ConstantPolicy {
    fn act(&mut self, _observation: &[f32]) -> Action {
        self.0
    }
}

/// Round-robin over the three actions.
#[derive(Default)]
pub struct CyclePolicy {
    next: usize,
}

impl Policy for CyclePolicy {
    fn act(&mut self, _observation: &[f32]) -> Action {
        let action = Action::ALL[self.next % Action::ALL.len()];
        self.next += 1;
        action
    }
}

/// Command-line selectable policy: `random`, `cycle`, or `constant:<0|1|2>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Random,
    Cycle,
    Constant(Action),
}

impl PolicyKind {
    pub fn build(self, seed: u64) -> Box<dyn Policy> {
        match self {
            PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
            PolicyKind::Cycle => Box::new(CyclePolicy::default()),
            PolicyKind::Constant(action) => Box::new(ConstantPolicy(action)),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(PolicyKind::Random),
            "cycle" => Ok(PolicyKind::Cycle),
            _ => {
                let code = s
                    .strip_prefix("constant:")
                    .ok_or_else(|| format!("Unknown policy \"{}\"", s))?;
                let code: i64 = code
                    .parse()
                    .map_err(|_| format!("Invalid action code \"{}\"", code))?;
                Action::try_from(code)
                    .map(PolicyKind::Constant)
                    .map_err(|e| e.to_string())
            }
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Random => write!(f, "random"),
            PolicyKind::Cycle => write!(f, "cycle"),
            PolicyKind::Constant(action) => write!(f, "constant:{}", action.index()),
        }
    }
}
