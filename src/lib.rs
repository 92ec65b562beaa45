//! Netlist edit simulation environment for logic gate optimisation.
//!
//! This library models incremental physical-design edits to a gate-level netlist and
//! scores every edit with a reward combining power, delay and area changes. It is meant
//! to be driven by an external decision loop, such as a reinforcement-learning agent,
//! through a `reset()` / `step(action)` interface.
//!
//! # Overview
//!
//! The netlist is a table with one row per placed instance. Three discrete actions edit
//! the instance under the episode cursor:
//!
//! | Action | Edit                                                        |
//! |--------|-------------------------------------------------------------|
//! | 0      | Change the libcell to another one used in the table          |
//! | 1      | Scale the input pin capacitance by a factor in `[0.8, 1.2]`  |
//! | 2      | Move the pin to a net already used by a sibling instance     |
//!
//! After each edit, derived power and delay parameters of the touched rows are
//! recomputed, the aggregate metrics are measured again, and the reward is the weighted
//! difference between the metrics before and after.
//!
//! # Usage Example
//!
//! ```
//! use lgo::env::{EnvConfig, NetlistEnv};
//! use lgo::netlist::{Instance, NetlistState};
//!
//! let netlist = NetlistState::new(vec![
//!     Instance::new("INV_X1", 1.2, "n1", "u1", 10.0, 4.0),
//!     Instance::new("NAND2_X1", 2.0, "n2", "u1", 8.0, 5.0),
//!     Instance::new("NOR2_X2", 1.5, "n3", "u2", 6.0, 6.0),
//! ])?;
//!
//! let mut env = NetlistEnv::new(&netlist, EnvConfig::default());
//! let observation = env.reset();
//! assert_eq!(observation.len(), 9);
//!
//! let result = env.step(1)?;
//! println!("reward {}", result.reward);
//! # Ok::<(), lgo::EnvError>(())
//! ```
//!
//! # Modules
//!
//! - **[`netlist`]**: Instance table, column schema and observation encoding
//! - **[`metrics`]**: Aggregate power, delay and area
//! - **[`actions`]**: The three edit actions and parameter recomputation
//! - **[`reward`]**: Weighted reward over metric deltas
//! - **[`env`]**: Episode controller, built-in policies and parallel rollouts
//! - **[`simulate`]**: Command-line rollout harness
//! - **[`inspect`]**: Command-line table summary

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::{error::Error, fmt, fs, path::Path};

pub mod actions;
pub mod env;
pub mod inspect;
pub mod metrics;
pub mod netlist;
pub mod reward;
pub mod simulate;

pub use actions::{Action, Edit, EditSampler};
pub use env::{EnvConfig, NetlistEnv, ResetMode, StepResult};
pub use inspect::{InspectArgs, inspect_main};
pub use metrics::Metrics;
pub use netlist::{Instance, NetlistState, Symbol};
pub use reward::RewardWeights;
pub use simulate::{SimulateArgs, simulate_main};

/// Errors raised by the environment core.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvError {
    /// The netlist table has no rows.
    EmptyTable,
    /// A row's extra columns differ from those of the first row.
    InconsistentColumns { row: usize },
    /// Action code outside `0..=2`.
    InvalidAction(i64),
    /// Reward weight that is negative or not finite.
    InvalidWeight { name: &'static str, value: f64 },
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvError::EmptyTable => write!(f, "Netlist table has no instances"),
            EnvError::InconsistentColumns { row } => {
                write!(f, "Row {} has a different column set than row 0", row)
            }
            EnvError::InvalidAction(action) => {
                write!(f, "Invalid action {}, expected 0, 1 or 2", action)
            }
            EnvError::InvalidWeight { name, value } => {
                write!(f, "Reward weight {} must be finite and non-negative, got {}", name, value)
            }
        }
    }
}

impl Error for EnvError {}

/// Reads and parses a JSON netlist table from a file.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use lgo::read_file;
/// use std::path::Path;
///
/// let netlist = read_file(Path::new("netlist.json"))?;
/// println!("{} instances", netlist.len());
/// # Ok(())
/// # }
/// ```
pub fn read_file(file_name: &Path) -> Result<NetlistState> {
    let file = fs::read_to_string(file_name)
        .with_context(|| format!("Failed to read {}", file_name.display()))?;
    netlist::serialisation::parse_table(&file)
        .with_context(|| format!("Failed to load netlist table {}", file_name.display()))
}

/// Command-line interface of the `lgo` tool.
#[derive(Debug, Parser)]
#[clap(
    name = "LGO",
    about = "Netlist edit simulation environment for logic gate optimisation"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: CLIArguments,
}

/// Subcommands of the `lgo` tool.
#[derive(Debug, Subcommand)]
pub enum CLIArguments {
    /// Run episodes of a built-in policy against a netlist table.
    Simulate(SimulateArgs),
    /// Print the metrics and libcell usage of a netlist table.
    Inspect(InspectArgs),
}
