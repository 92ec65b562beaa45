//! Parallel rollouts over independent environment copies.
//!
//! Every episode gets its own [`NetlistEnv`] built from the same template table, so no
//! state is shared between workers. Episode `i` seeds its edit sampler and its policy
//! with `config.seed + i`, which keeps a batch reproducible regardless of scheduling.

use rayon::prelude::*;

use super::policy::Policy;
use super::{EnvConfig, EpisodeSummary, NetlistEnv};
use crate::netlist::NetlistState;

/// Run `episodes` single-episode rollouts in parallel.
///
/// `make_policy` receives the episode seed. Results are ordered by episode index.
pub fn run_batch<F>(
    template: &NetlistState,
    config: &EnvConfig,
    episodes: usize,
    make_policy: F,
) -> Vec<EpisodeSummary>
where
    F: Fn(u64) -> Box<dyn Policy> + Sync,
{
    (0..episodes)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed.wrapping_add(i as u64);
            let env_config = EnvConfig {
                seed,
                ..config.clone()
            };
            let mut env = NetlistEnv::new(template, env_config);
            let mut policy = make_policy(seed);
            let summary = run_episode(&mut env, policy.as_mut());
            EpisodeSummary {
                episode: i + 1,
                ..summary
            }
        })
        .collect()
}

/// Drive `env` until its current episode finishes.
pub fn run_episode(env: &mut NetlistEnv, policy: &mut dyn Policy) -> EpisodeSummary {
    let mut observation = env.netlist().observation(env.current_row());
    loop {
        let result = env.step_action(policy.act(&observation));
        if result.done {
            break;
        }
        observation = result.observation;
    }

    env.last_episode()
        .cloned()
        .unwrap_or_else(|| EpisodeSummary {
            episode: env.episode(),
            steps: 0,
            total_reward: 0.0,
            final_metrics: env.current_metrics(),
        })
}
