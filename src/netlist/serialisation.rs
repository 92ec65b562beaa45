//! JSON table reading and writing.
//!
//! A netlist table is a JSON array with one object per instance, keyed by column name,
//! the layout `DataFrame.to_json(orient="records")` produces:
//!
//! ```text
//! [
//!   {"libcell_name": "INV_X1", "input_pin_cap": 1.2, "net_name": "n1",
//!    "cell_name": "u1", "x": 10.0, "y": 4.0, "cell_static_power": 0.6,
//!    "cell_dynamic_power": 0.06, "fo4_delay": 0.072}
//! ]
//! ```
//!
//! The three derived metric columns default to `0.0` when absent. Any other numeric
//! field becomes an extra column.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{Instance, NetlistState};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InstanceRecord {
    libcell_name: String,
    input_pin_cap: f64,
    net_name: String,
    cell_name: String,
    x: f64,
    y: f64,
    #[serde(default)]
    cell_static_power: f64,
    #[serde(default)]
    cell_dynamic_power: f64,
    #[serde(default)]
    fo4_delay: f64,
    #[serde(flatten)]
    extra: BTreeMap<String, f64>,
}

impl From<InstanceRecord> for Instance {
    fn from(r: InstanceRecord) -> Self {
        Instance {
            libcell_name: r.libcell_name.into(),
            input_pin_cap: r.input_pin_cap,
            net_name: r.net_name.into(),
            cell_name: r.cell_name.into(),
            x: r.x,
            y: r.y,
            cell_static_power: r.cell_static_power,
            cell_dynamic_power: r.cell_dynamic_power,
            fo4_delay: r.fo4_delay,
            extra: r.extra,
        }
    }
}

impl From<&Instance> for InstanceRecord {
    fn from(i: &Instance) -> Self {
        InstanceRecord {
            libcell_name: i.libcell_name.to_string(),
            input_pin_cap: i.input_pin_cap,
            net_name: i.net_name.to_string(),
            cell_name: i.cell_name.to_string(),
            x: i.x,
            y: i.y,
            cell_static_power: i.cell_static_power,
            cell_dynamic_power: i.cell_dynamic_power,
            fo4_delay: i.fo4_delay,
            extra: i.extra.clone(),
        }
    }
}

/// Parse a JSON table into its instance rows.
pub fn parse_instances(input: &str) -> Result<Vec<Instance>> {
    let records: Vec<InstanceRecord> =
        serde_json::from_str(input).context("Malformed netlist table")?;
    Ok(records.into_iter().map(Instance::from).collect())
}

/// Parse a JSON table into a [`NetlistState`].
pub fn parse_table(input: &str) -> Result<NetlistState> {
    Ok(NetlistState::new(parse_instances(input)?)?)
}

/// Serialise the current rows of `state` as a JSON table.
pub fn serialise_table(state: &NetlistState) -> Result<String> {
    let records: Vec<InstanceRecord> = state.iter().map(InstanceRecord::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}
