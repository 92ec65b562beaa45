//! Small netlist tables and a scripted sampler for tests.

use std::collections::VecDeque;

use crate::actions::EditSampler;
use crate::netlist::{Instance, NetlistState};

/// Edit sampler replaying fixed draws and recording what it was asked for.
///
/// `pick` returns the queued indices, then `0`. `uniform` returns the queued values,
/// then the midpoint of the requested range.
#[derive(Debug, Default)]
pub struct ScriptedSampler {
    pub picks: VecDeque<usize>,
    pub uniforms: VecDeque<f64>,
    pub pick_lens: Vec<usize>,
    pub uniform_ranges: Vec<(f64, f64)>,
}

impl ScriptedSampler {
    pub fn with_picks(picks: &[usize]) -> Self {
        Self {
            picks: picks.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn with_uniforms(uniforms: &[f64]) -> Self {
        Self {
            uniforms: uniforms.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl EditSampler for ScriptedSampler {
    fn pick(&mut self, len: usize) -> usize {
        self.pick_lens.push(len);
        self.picks.pop_front().unwrap_or(0).min(len - 1)
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.uniform_ranges.push((low, high));
        self.uniforms.pop_front().unwrap_or((low + high) / 2.0)
    }
}

/// Libcells `{A, A, B}`, cell `u1` spans nets `n1` and `n2`, cell `u2` has only `n3`.
pub fn three_row_table() -> NetlistState {
    NetlistState::new(vec![
        Instance::new("A", 1.0, "n1", "u1", 2.0, 2.0),
        Instance::new("A", 2.0, "n2", "u1", 1.0, 4.0),
        Instance::new("B", 3.0, "n3", "u2", 3.0, 1.0),
    ])
    .expect("Fixture table is not empty")
}

/// Like [`three_row_table`] plus a fourth row of cell `u2` sitting on `n1`.
pub fn reroute_table() -> NetlistState {
    NetlistState::new(vec![
        Instance::new("A", 1.0, "n1", "u1", 2.0, 2.0),
        Instance::new("A", 2.0, "n2", "u1", 1.0, 4.0),
        Instance::new("B", 3.0, "n3", "u2", 3.0, 1.0),
        Instance::new("B", 1.0, "n1", "u2", 5.0, 5.0),
    ])
    .expect("Fixture table is not empty")
}

/// Five rows over four libcells and two multi-net cells.
pub fn wide_table() -> NetlistState {
    NetlistState::new(vec![
        Instance::new("INV_X1", 1.2, "n1", "u1", 10.0, 4.0).with_metrics(0.6, 0.06, 0.072),
        Instance::new("NAND2_X1", 2.0, "n2", "u1", 8.0, 5.0).with_metrics(0.8, 0.1, 0.16),
        Instance::new("NOR2_X2", 1.5, "n3", "u2", 6.0, 6.0).with_metrics(0.7, 0.075, 0.105),
        Instance::new("BUF_X4", 0.8, "n1", "u2", 12.0, 3.0).with_metrics(0.6, 0.04, 0.048),
        Instance::new("INV_X1", 1.0, "n4", "u3", 9.0, 9.0).with_metrics(0.6, 0.05, 0.06),
    ])
    .expect("Fixture table is not empty")
}

/// One libcell everywhere and every cell on a single net: every edit but a resize is a
/// no-op.
pub fn single_libcell_table() -> NetlistState {
    NetlistState::new(vec![
        Instance::new("A", 1.0, "n1", "u1", 1.0, 1.0),
        Instance::new("A", 2.0, "n2", "u2", 1.0, 1.0),
        Instance::new("A", 3.0, "n3", "u3", 1.0, 1.0),
    ])
    .expect("Fixture table is not empty")
}
