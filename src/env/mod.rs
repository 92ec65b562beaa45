//! Episode controller exposing the `reset()` / `step(action)` contract.
//!
//! [`NetlistEnv`] owns a private copy of the netlist table and walks a cursor over its
//! rows, one row per step. Each step applies an [`Action`] to the row under the cursor,
//! scores it with [`RewardWeights`], and returns the next row's observation.
//!
//! # Episode State Machine
//!
//! ```text
//!   reset()            step()                 step() with step >= num_gates
//! ---------> Ready ------------> Running ----------------------------> Done
//!              ^                                                        |
//!              +------------------------ reset() -----------------------+
//! ```
//!
//! The terminal step runs the `reset()` transition itself and returns the fresh row-0
//! observation with `done == true`.
//!
//! # Example
//!
//! ```
//! use lgo::env::{EnvConfig, NetlistEnv};
//! use lgo::netlist::Instance;
//!
//! let table = vec![
//!     Instance::new("INV_X1", 1.0, "n1", "u1", 2.0, 3.0),
//!     Instance::new("NAND2_X1", 2.0, "n2", "u1", 1.0, 1.0),
//! ];
//! let mut env = NetlistEnv::from_instances(&table, EnvConfig::default()).unwrap();
//!
//! let first = env.step(1).unwrap();
//! assert!(!first.done);
//! let last = env.step(0).unwrap();
//! assert!(last.done);
//! assert_eq!(env.current_step(), 0);
//! ```

pub mod batch;
pub mod policy;
#[cfg(test)]
pub mod test_helpers;

use std::collections::BTreeMap;
use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::EnvError;
use crate::actions::{Action, Edit, EditSampler, apply_action};
use crate::metrics::Metrics;
use crate::netlist::{Instance, NetlistState};
use crate::reward::RewardWeights;

/// What `reset()` does to the netlist table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMode {
    /// Keep the edited table; episodes build on each other.
    #[default]
    Cumulative,
    /// Restore the table as it was when the environment was built.
    Restore,
}

/// Environment configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    /// Steps per episode, clamped to the table length.
    pub num_gates: usize,
    pub weights: RewardWeights,
    /// Seed of the default edit sampler.
    pub seed: u64,
    pub reset_mode: ResetMode,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            num_gates: 100_000,
            weights: RewardWeights::default(),
            seed: 0,
            reset_mode: ResetMode::Cumulative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    /// Just reset, step counter at zero.
    Ready,
    /// At least one step taken, episode not finished.
    Running,
    /// Step counter reached the episode length.
    Done,
}

impl fmt::Display for EpisodePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodePhase::Ready => write!(f, "ready"),
            EpisodePhase::Running => write!(f, "running"),
            EpisodePhase::Done => write!(f, "done"),
        }
    }
}

/// Box bounds of the observation vectors.
///
/// A single global bound taken over every value of the initial table, applied to every
/// dimension alike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationSpace {
    pub low: f32,
    pub high: f32,
    pub shape: usize,
}

impl ObservationSpace {
    pub fn from_netlist(netlist: &NetlistState) -> Self {
        let (low, high) = netlist.value_bounds();
        Self {
            low,
            high,
            shape: netlist.schema().len(),
        }
    }

    pub fn contains(&self, observation: &[f32]) -> bool {
        observation.len() == self.shape
            && observation
                .iter()
                .all(|v| (self.low..=self.high).contains(v))
    }
}

/// Result of one `step()`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Vec<f32>,
    pub reward: f64,
    pub done: bool,
    /// Always empty.
    pub info: BTreeMap<String, f64>,
}

/// Summary of a finished episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f64,
    pub final_metrics: Metrics,
}

/// Netlist editing environment.
pub struct NetlistEnv<S: EditSampler = ChaCha8Rng> {
    netlist: NetlistState,
    initial: NetlistState,
    config: EnvConfig,
    num_gates: usize,
    observation_space: ObservationSpace,
    sampler: S,

    phase: EpisodePhase,
    episode: usize,
    current_step: usize,
    current_metrics: Metrics,
    episode_rewards: Vec<f64>,
    last_edit: Option<Edit>,
    last_episode: Option<EpisodeSummary>,
}

impl NetlistEnv<ChaCha8Rng> {
    /// Build an environment over a copy of `netlist`, sampling edits from a
    /// [`ChaCha8Rng`] seeded with `config.seed`.
    pub fn new(netlist: &NetlistState, config: EnvConfig) -> Self {
        let sampler = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_sampler(netlist, config, sampler)
    }

    /// Build an environment from raw rows. Fails on an empty table.
    pub fn from_instances(instances: &[Instance], config: EnvConfig) -> Result<Self, EnvError> {
        let netlist = NetlistState::new(instances.to_vec())?;
        Ok(Self::new(&netlist, config))
    }

    /// Reseed the edit sampler.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.sampler = ChaCha8Rng::seed_from_u64(seed);
    }
}

impl<S: EditSampler> NetlistEnv<S> {
    /// Build an environment over a copy of `netlist` with a custom edit sampler.
    pub fn with_sampler(netlist: &NetlistState, config: EnvConfig, sampler: S) -> Self {
        let num_gates = config.num_gates.min(netlist.len());
        let observation_space = ObservationSpace::from_netlist(netlist);

        let mut env = Self {
            netlist: netlist.clone(),
            initial: netlist.clone(),
            config,
            num_gates,
            observation_space,
            sampler,
            phase: EpisodePhase::Ready,
            episode: 0,
            current_step: 0,
            current_metrics: Metrics::default(),
            episode_rewards: Vec::new(),
            last_edit: None,
            last_episode: None,
        };
        env.reset();
        env
    }

    /// Start a new episode and return the observation of row 0.
    pub fn reset(&mut self) -> Vec<f32> {
        if self.config.reset_mode == ResetMode::Restore {
            self.netlist = self.initial.clone();
        }

        self.episode += 1;
        self.current_step = 0;
        self.current_metrics = Metrics::measure(&self.netlist);
        self.episode_rewards.clear();
        self.transition(EpisodePhase::Ready);

        info!(
            episode = self.episode,
            num_gates = self.num_gates,
            metrics = %self.current_metrics,
            "episode start"
        );

        self.netlist.observation(0)
    }

    /// Apply an integer-coded action. Fails fast on values outside `0..=2`.
    pub fn step(&mut self, action: i64) -> Result<StepResult, EnvError> {
        let action = Action::try_from(action)?;
        Ok(self.step_action(action))
    }

    /// Apply `action` to the row under the cursor and advance.
    pub fn step_action(&mut self, action: Action) -> StepResult {
        let row = self.current_step % self.netlist.len();
        let edit = apply_action(&mut self.netlist, row, action, &mut self.sampler);

        let after = Metrics::measure(&self.netlist);
        let reward = self.config.weights.reward(&self.current_metrics, &after);
        self.current_metrics = after;
        self.episode_rewards.push(reward);
        self.current_step += 1;

        debug!(
            episode = self.episode,
            step = self.current_step,
            row,
            %action,
            %edit,
            reward,
            "step"
        );
        self.last_edit = Some(edit);

        let done = self.current_step >= self.num_gates;
        let observation = if done {
            self.transition(EpisodePhase::Done);
            self.finish_episode();
            self.reset()
        } else {
            self.transition(EpisodePhase::Running);
            self.netlist
                .observation(self.current_step % self.netlist.len())
        };

        StepResult {
            observation,
            reward,
            done,
            info: BTreeMap::new(),
        }
    }

    fn transition(&mut self, next: EpisodePhase) {
        if self.phase != next {
            trace!(from = %self.phase, to = %next, "episode phase");
        }
        self.phase = next;
    }

    fn finish_episode(&mut self) {
        let summary = EpisodeSummary {
            episode: self.episode,
            steps: self.current_step,
            total_reward: self.episode_rewards.iter().sum(),
            final_metrics: self.current_metrics,
        };
        info!(
            episode = summary.episode,
            steps = summary.steps,
            total_reward = summary.total_reward,
            metrics = %summary.final_metrics,
            "episode done"
        );
        self.last_episode = Some(summary);
    }

    /// Number of discrete actions.
    pub fn action_space(&self) -> usize {
        Action::ALL.len()
    }

    pub fn observation_space(&self) -> ObservationSpace {
        self.observation_space
    }

    pub fn netlist(&self) -> &NetlistState {
        &self.netlist
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn num_gates(&self) -> usize {
        self.num_gates
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Row the next step will edit.
    pub fn current_row(&self) -> usize {
        self.current_step % self.netlist.len()
    }

    pub fn current_metrics(&self) -> Metrics {
        self.current_metrics
    }

    pub fn episode_rewards(&self) -> &[f64] {
        &self.episode_rewards
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    /// One-based index of the running episode.
    pub fn episode(&self) -> usize {
        self.episode
    }

    /// Effect of the most recent step, kept across the implicit reset.
    pub fn last_edit(&self) -> Option<&Edit> {
        self.last_edit.as_ref()
    }

    pub fn last_episode(&self) -> Option<&EpisodeSummary> {
        self.last_episode.as_ref()
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }
}
