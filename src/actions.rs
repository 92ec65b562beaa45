//! Netlist edit actions.
//!
//! Three discrete edits can be applied to the instance under the episode cursor:
//!
//! - **[`Action::ChangeCell`]** (0): swap the instance's library cell for a different one
//!   already used somewhere in the table.
//! - **[`Action::ResizeGate`]** (1): scale the input pin capacitance by a factor drawn
//!   from `[0.8, 1.2]`.
//! - **[`Action::RerouteNet`]** (2): move the pin onto another net already used by a
//!   sibling instance of the same logical cell. Every instance on the old and the new
//!   net is recomputed, since fan-out changes on both sides.
//!
//! After any mutation the derived parameters of the touched rows are recomputed with
//! [`recompute_parameters`]. All random draws go through an [`EditSampler`], so tests can
//! script them.

use std::fmt;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use crate::EnvError;
use crate::netlist::{Instance, NetlistState, Symbol};

pub const STATIC_POWER_COEFF: f64 = 0.1;
pub const DYNAMIC_POWER_COEFF: f64 = 0.05;
pub const DELAY_COEFF: f64 = 0.01;
pub const AREA_COEFF: f64 = 0.02;

/// Bounds of the capacitance scale factor drawn by [`Action::ResizeGate`].
pub const RESIZE_RANGE: (f64, f64) = (0.8, 1.2);

/// A discrete edit accepted by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    ChangeCell = 0,
    ResizeGate = 1,
    RerouteNet = 2,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::ChangeCell, Action::ResizeGate, Action::RerouteNet];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<i64> for Action {
    type Error = EnvError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Action::ChangeCell),
            1 => Ok(Action::ResizeGate),
            2 => Ok(Action::RerouteNet),
            other => Err(EnvError::InvalidAction(other)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ChangeCell => write!(f, "change-cell"),
            Action::ResizeGate => write!(f, "resize-gate"),
            Action::RerouteNet => write!(f, "reroute-net"),
        }
    }
}

/// Source of the random draws made while editing.
pub trait EditSampler {
    /// Uniform index in `0..len`. Never called with `len == 0`.
    fn pick(&mut self, len: usize) -> usize;

    /// Uniform value in `[low, high]`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

impl EditSampler for ChaCha8Rng {
    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.gen_range(low..=high)
    }
}

/// Outcome of one applied action.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    CellChanged {
        row: usize,
        from: Symbol,
        to: Symbol,
    },
    GateResized {
        row: usize,
        from: f64,
        to: f64,
    },
    NetRerouted {
        row: usize,
        from: Symbol,
        to: Symbol,
        /// Rows recomputed because they sit on either net.
        affected: Vec<usize>,
    },
    /// The action had no valid alternative and left the table untouched.
    NoOp { row: usize, action: Action },
}

impl Edit {
    pub fn row(&self) -> usize {
        match self {
            Edit::CellChanged { row, .. }
            | Edit::GateResized { row, .. }
            | Edit::NetRerouted { row, .. }
            | Edit::NoOp { row, .. } => *row,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Edit::NoOp { .. })
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::CellChanged { from, to, .. } => write!(f, "cell {} -> {}", from, to),
            Edit::GateResized { from, to, .. } => write!(f, "cap {:.4} -> {:.4}", from, to),
            Edit::NetRerouted {
                from, to, affected, ..
            } => write!(f, "net {} -> {} ({} affected)", from, to, affected.len()),
            Edit::NoOp { action, .. } => write!(f, "{} no-op", action),
        }
    }
}

/// Recompute the derived parameters of one instance.
///
/// Power and delay are rebuilt from the libcell name length and the input pin
/// capacitance. Placement is rescaled in place: `x` and `y` compound on every call and
/// are never restored to a baseline.
pub fn recompute_parameters(instance: &mut Instance) {
    let complexity = instance.libcell_name.chars().count() as f64;

    instance.cell_static_power = STATIC_POWER_COEFF * complexity;
    instance.cell_dynamic_power = DYNAMIC_POWER_COEFF * instance.input_pin_cap;
    instance.fo4_delay = DELAY_COEFF * complexity * instance.input_pin_cap;

    instance.x *= AREA_COEFF * complexity;
    instance.y *= AREA_COEFF * complexity;
}

/// Apply `action` to the instance at `row`.
///
/// Degenerate tables (a single libcell for [`Action::ChangeCell`], no sibling net for
/// [`Action::RerouteNet`]) produce [`Edit::NoOp`] and leave the table untouched.
pub fn apply_action<S: EditSampler + ?Sized>(
    netlist: &mut NetlistState,
    row: usize,
    action: Action,
    sampler: &mut S,
) -> Edit {
    match action {
        Action::ChangeCell => change_cell(netlist, row, sampler),
        Action::ResizeGate => resize_gate(netlist, row, sampler),
        Action::RerouteNet => reroute_net(netlist, row, sampler),
    }
}

fn change_cell<S: EditSampler + ?Sized>(
    netlist: &mut NetlistState,
    row: usize,
    sampler: &mut S,
) -> Edit {
    let current = netlist.instance(row).libcell_name.clone();
    let candidates: Vec<Symbol> = netlist
        .distinct_libcells()
        .into_iter()
        .filter(|lib| *lib != current)
        .collect();

    if candidates.is_empty() {
        warn!(row, libcell = %current, "no alternative libcell, change-cell is a no-op");
        return Edit::NoOp {
            row,
            action: Action::ChangeCell,
        };
    }

    let to = candidates[sampler.pick(candidates.len())].clone();
    let instance = netlist.instance_mut(row);
    instance.libcell_name = to.clone();
    recompute_parameters(instance);

    Edit::CellChanged {
        row,
        from: current,
        to,
    }
}

fn resize_gate<S: EditSampler + ?Sized>(
    netlist: &mut NetlistState,
    row: usize,
    sampler: &mut S,
) -> Edit {
    let (low, high) = RESIZE_RANGE;
    let factor = sampler.uniform(low, high);

    let instance = netlist.instance_mut(row);
    let from = instance.input_pin_cap;
    instance.input_pin_cap = from * factor;
    recompute_parameters(instance);

    Edit::GateResized {
        row,
        from,
        to: instance.input_pin_cap,
    }
}

fn reroute_net<S: EditSampler + ?Sized>(
    netlist: &mut NetlistState,
    row: usize,
    sampler: &mut S,
) -> Edit {
    let current = netlist.instance(row).net_name.clone();
    let cell = netlist.instance(row).cell_name.clone();
    let alternatives: Vec<Symbol> = netlist
        .nets_of_cell(&cell)
        .into_iter()
        .filter(|net| *net != current)
        .collect();

    if alternatives.is_empty() {
        warn!(row, net = %current, cell = %cell, "no alternative net, reroute-net is a no-op");
        return Edit::NoOp {
            row,
            action: Action::RerouteNet,
        };
    }

    let to = alternatives[sampler.pick(alternatives.len())].clone();
    netlist.instance_mut(row).net_name = to.clone();

    let affected = netlist.rows_on_nets(&[current.clone(), to.clone()]);
    for &r in &affected {
        recompute_parameters(netlist.instance_mut(r));
    }

    Edit::NetRerouted {
        row,
        from: current,
        to,
        affected,
    }
}
