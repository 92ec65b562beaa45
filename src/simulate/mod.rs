//! Rollout harness driving the environment from the command line.
//!
//! This module runs a built-in [`PolicyKind`] against a netlist table and reports what
//! happened.
//!
//! # Outputs
//!
//! - **Report** (stdout or file): run parameters, per-episode summary, action usage
//! - **CSV** (optional): one line per step
//! - **VCD** (optional): power, delay, area and reward traces, one timestamp per step
//! - **Table** (optional): the netlist table after the last episode, as JSON
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use lgo::simulate::{SimulateArgs, simulate_main};
//!
//! let args = SimulateArgs {
//!     input: "netlist.json".into(),
//!     episodes: 2,
//!     num_gates: None,
//!     policy: "random".parse()?,
//!     alpha: 1.0,
//!     beta: 1.0,
//!     gamma: 1.0,
//!     seed: 0,
//!     restore: false,
//!     parallel: false,
//!     report: None,
//!     csv: Some("trace.csv".into()),
//!     vcd: None,
//!     output: None,
//! };
//!
//! simulate_main(args)?;
//! # Ok(())
//! # }
//! ```

pub mod vcd;

use std::{
    fs,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::*;
use clap::Parser;
use itertools::Itertools;
use prettytable::*;

use crate::{
    actions::{Action, Edit},
    env::{
        EnvConfig, EpisodeSummary, NetlistEnv, ResetMode, batch,
        policy::{Policy, PolicyKind},
    },
    metrics::Metrics,
    netlist::serialisation,
    read_file,
    reward::RewardWeights,
};

/// Command-line arguments for the simulate command.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Netlist table input file (JSON records)
    pub input: PathBuf,

    /// Number of episodes to run
    #[clap(long, short, default_value_t = 1)]
    pub episodes: usize,

    /// Steps per episode (clamped to the number of instances)
    #[clap(long, short)]
    pub num_gates: Option<usize>,

    /// Action policy: random, cycle or constant:<0|1|2>
    #[clap(long, short, default_value = "random")]
    pub policy: PolicyKind,

    /// Power weight
    #[clap(long, default_value_t = 1.0)]
    pub alpha: f64,

    /// Delay weight
    #[clap(long, default_value_t = 1.0)]
    pub beta: f64,

    /// Area weight
    #[clap(long, default_value_t = 1.0)]
    pub gamma: f64,

    /// Seed of the edit sampler and of the random policy
    #[clap(long, short, default_value_t = 0)]
    pub seed: u64,

    /// Restore the initial table at every reset instead of accumulating edits
    #[clap(long)]
    pub restore: bool,

    /// Run every episode on its own table copy in parallel
    #[clap(long)]
    pub parallel: bool,

    /// Report file (default: stdout)
    #[clap(long, short)]
    pub report: Option<PathBuf>,

    /// Per-step CSV trace
    #[clap(long)]
    pub csv: Option<PathBuf>,

    /// VCD waveform of the metric and reward traces
    #[clap(long)]
    pub vcd: Option<PathBuf>,

    /// Netlist table after the last episode (JSON records)
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

/// One step of a sequential rollout.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub episode: usize,
    pub step: usize,
    pub row: usize,
    pub action: Action,
    pub edit: Edit,
    pub reward: f64,
    /// Metrics right after the edit.
    pub metrics: Metrics,
}

/// Run `episodes` episodes in one environment, recording every step.
///
/// Episodes follow each other through the environment's implicit reset, so with
/// [`ResetMode::Cumulative`] each one starts from the table the previous one left.
pub fn rollout(
    env: &mut NetlistEnv,
    policy: &mut dyn Policy,
    episodes: usize,
) -> (Vec<StepRecord>, Vec<EpisodeSummary>) {
    let mut records = Vec::new();
    let mut summaries = Vec::with_capacity(episodes);
    let mut observation = env.netlist().observation(env.current_row());

    for _ in 0..episodes {
        loop {
            let episode = env.episode();
            let step = env.current_step();
            let row = env.current_row();
            let action = policy.act(&observation);
            let result = env.step_action(action);

            let metrics = match env.last_episode() {
                Some(summary) if result.done => summary.final_metrics,
                _ => env.current_metrics(),
            };
            let edit = env
                .last_edit()
                .cloned()
                .unwrap_or(Edit::NoOp { row, action });

            records.push(StepRecord {
                episode,
                step,
                row,
                action,
                edit,
                reward: result.reward,
                metrics,
            });

            observation = result.observation;
            if result.done {
                break;
            }
        }
        summaries.extend(env.last_episode().cloned());
    }

    (records, summaries)
}

/// Run a policy against a netlist table and write the requested reports.
pub fn simulate_main(args: SimulateArgs) -> Result<()> {
    let SimulateArgs {
        input,
        episodes,
        num_gates,
        policy,
        alpha,
        beta,
        gamma,
        seed,
        restore,
        parallel,
        report,
        ref csv,
        ref vcd,
        ref output,
    } = args;

    if parallel && (csv.is_some() || vcd.is_some() || output.is_some()) {
        bail!("--csv, --vcd and --output need sequential episodes, drop --parallel");
    }

    let netlist = read_file(&input)?;
    let config = EnvConfig {
        num_gates: num_gates.unwrap_or(EnvConfig::default().num_gates),
        weights: RewardWeights::new(alpha, beta, gamma)?,
        seed,
        reset_mode: if restore {
            ResetMode::Restore
        } else {
            ResetMode::Cumulative
        },
    };

    let mut writer: Box<dyn Write> = match report {
        Some(path) => Box::new(BufWriter::new(fs::File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };

    let initial = Metrics::measure(&netlist);
    writeln!(writer, "Instances: {}", netlist.len())?;
    writeln!(writer, "Policy: {}", policy)?;
    writeln!(
        writer,
        "Weights: alpha {} / beta {} / gamma {}",
        config.weights.alpha, config.weights.beta, config.weights.gamma
    )?;
    writeln!(writer, "Initial: {}", initial)?;

    if parallel {
        let summaries = batch::run_batch(&netlist, &config, episodes, |s| policy.build(s));
        writeln!(writer)?;
        episode_table(&summaries).print(&mut writer)?;
        return Ok(());
    }

    let mut env = NetlistEnv::new(&netlist, config);
    let mut agent = policy.build(seed);
    let (records, summaries) = rollout(&mut env, agent.as_mut(), episodes);

    writeln!(writer)?;
    episode_table(&summaries).print(&mut writer)?;
    writeln!(writer)?;
    action_table(&records).print(&mut writer)?;

    if let Some(path) = csv {
        let mut csv_file = BufWriter::new(fs::File::create(path)?);
        writeln!(
            csv_file,
            "episode,step,row,action,edit,reward,power,delay,area"
        )?;
        for r in &records {
            writeln!(
                csv_file,
                "{},{},{},{},{},{:.6},{:.6},{:.6},{:.6}",
                r.episode,
                r.step,
                r.row,
                r.action.index(),
                r.edit,
                r.reward,
                r.metrics.power,
                r.metrics.delay,
                r.metrics.area
            )?;
        }
    }

    if let Some(path) = vcd {
        let mut out_file = BufWriter::new(fs::File::create(path)?);
        vcd::write_vcd(&initial, &records, &mut out_file)?;
    }

    if let Some(path) = output {
        fs::write(path, serialisation::serialise_table(env.netlist())?)?;
    }

    Ok(())
}

fn episode_table(summaries: &[EpisodeSummary]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Episode", "Steps", "Reward", "Power", "Delay", "Area"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    for s in summaries {
        table.add_row(row![
            s.episode,
            s.steps,
            format!("{:.4}", s.total_reward),
            format!("{:.4}", s.final_metrics.power),
            format!("{:.4}", s.final_metrics.delay),
            format!("{:.4}", s.final_metrics.area),
        ]);
    }
    table
}

fn action_table(records: &[StepRecord]) -> Table {
    let taken = records.iter().map(|r| r.action).counts();
    let noops = records
        .iter()
        .filter(|r| r.edit.is_noop())
        .map(|r| r.action)
        .counts();

    let mut table = Table::new();
    table.set_titles(row!["Action", "Taken", "No-op", "Mean reward"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    for action in Action::ALL {
        let count = taken.get(&action).copied().unwrap_or(0);
        let mean = if count == 0 {
            0.0
        } else {
            records
                .iter()
                .filter(|r| r.action == action)
                .map(|r| r.reward)
                .sum::<f64>()
                / count as f64
        };
        table.add_row(row![
            format!("{} {}", action.index(), action),
            count,
            noops.get(&action).copied().unwrap_or(0),
            format!("{:.4}", mean),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::policy::{ConstantPolicy, CyclePolicy};
    use crate::env::test_helpers::*;

    #[test]
    fn test_rollout_records_every_step() {
        let table = wide_table();
        let mut env = NetlistEnv::new(&table, EnvConfig::default());

        let (records, summaries) = rollout(&mut env, &mut CyclePolicy::default(), 2);

        assert_eq!(records.len(), 2 * table.len());
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].episode, 1);
        assert_eq!(summaries[1].episode, 2);
        assert_eq!(records[0].action, Action::ChangeCell);
        assert_eq!(records[1].action, Action::ResizeGate);
        assert_eq!(records[5].episode, 2);
        assert_eq!(records[5].row, 0);

        let first_episode: f64 = records[..5].iter().map(|r| r.reward).sum();
        assert!((first_episode - summaries[0].total_reward).abs() < 1e-12);
    }

    #[test]
    fn test_rollout_final_metrics_survive_restore() {
        let table = wide_table();
        let config = EnvConfig {
            reset_mode: ResetMode::Restore,
            ..EnvConfig::default()
        };
        let mut env = NetlistEnv::new(&table, config);

        let (records, summaries) =
            rollout(&mut env, &mut ConstantPolicy(Action::ResizeGate), 1);

        let last = records.last().expect("Should record steps");
        assert_eq!(last.metrics, summaries[0].final_metrics);
        assert_ne!(last.metrics, Metrics::measure(&table));
        assert_eq!(env.netlist().instances(), table.instances());
    }

    #[test]
    fn test_action_table_counts_noops() {
        let table = single_libcell_table();
        let mut env = NetlistEnv::new(&table, EnvConfig::default());
        let (records, _) = rollout(&mut env, &mut ConstantPolicy(Action::RerouteNet), 1);

        assert!(records.iter().all(|r| r.edit.is_noop()));
        let mut out = Vec::new();
        action_table(&records).print(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("reroute-net"));
    }
}
