//! Mutable per-instance netlist table.
//!
//! A [`NetlistState`] owns one [`Instance`] record per placed gate. Row count and row
//! identity are fixed once the state is built; only field values change, either through
//! the edit actions in [`crate::actions`] or through direct field access.
//!
//! # Column Schema
//!
//! Observations are flat numeric vectors with one value per column, in the order given
//! by [`Column`]:
//!
//! | # | Column               | Encoding                       |
//! |---|----------------------|--------------------------------|
//! | 0 | `libcell_name`       | index in the libcell vocabulary |
//! | 1 | `input_pin_cap`      | value                          |
//! | 2 | `net_name`           | index in the net vocabulary    |
//! | 3 | `cell_name`          | index in the cell vocabulary   |
//! | 4 | `x`                  | value                          |
//! | 5 | `y`                  | value                          |
//! | 6 | `cell_static_power`  | value                          |
//! | 7 | `cell_dynamic_power` | value                          |
//! | 8 | `fo4_delay`          | value                          |
//!
//! Any extra numeric columns follow, sorted by name.
//!
//! # Example
//!
//! ```
//! use lgo::netlist::{Instance, NetlistState};
//!
//! let state = NetlistState::new(vec![
//!     Instance::new("INV_X1", 1.0, "n1", "u1", 2.0, 3.0),
//!     Instance::new("NAND2_X1", 2.0, "n2", "u1", 1.0, 1.0),
//! ])
//! .unwrap();
//!
//! assert_eq!(state.len(), 2);
//! assert_eq!(state.observation(0).len(), 9);
//! ```

pub mod serialisation;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use itertools::Itertools;
use string_cache::DefaultAtom;

use crate::EnvError;

pub type Symbol = DefaultAtom;

/// One row of the netlist table.
///
/// The derived fields (`cell_static_power`, `cell_dynamic_power`, `fo4_delay`) are kept
/// consistent with `libcell_name` and `input_pin_cap` by
/// [`crate::actions::recompute_parameters`]. No validation is applied to written values:
/// capacitances and coordinates may become degenerate and callers must tolerate that.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub libcell_name: Symbol,
    pub input_pin_cap: f64,
    pub net_name: Symbol,
    /// Logical cell this pin belongs to. Never written by the actions.
    pub cell_name: Symbol,
    pub x: f64,
    pub y: f64,
    pub cell_static_power: f64,
    pub cell_dynamic_power: f64,
    pub fo4_delay: f64,
    /// Additional numeric columns, carried through unchanged.
    pub extra: BTreeMap<String, f64>,
}

impl Instance {
    /// Build an instance whose derived metrics are all zero.
    pub fn new(
        libcell_name: &str,
        input_pin_cap: f64,
        net_name: &str,
        cell_name: &str,
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            libcell_name: libcell_name.into(),
            input_pin_cap,
            net_name: net_name.into(),
            cell_name: cell_name.into(),
            x,
            y,
            cell_static_power: 0.0,
            cell_dynamic_power: 0.0,
            fo4_delay: 0.0,
            extra: BTreeMap::new(),
        }
    }

    /// Set the three derived metrics, as read from an input table.
    pub fn with_metrics(mut self, static_power: f64, dynamic_power: f64, fo4_delay: f64) -> Self {
        self.cell_static_power = static_power;
        self.cell_dynamic_power = dynamic_power;
        self.fo4_delay = fo4_delay;
        self
    }

    /// Total power drawn by this instance.
    pub fn power(&self) -> f64 {
        self.cell_static_power + self.cell_dynamic_power
    }

    /// Placement area proxy of this instance.
    pub fn area(&self) -> f64 {
        self.x * self.y
    }
}

/// A column of the netlist table, in observation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    LibcellName,
    InputPinCap,
    NetName,
    CellName,
    X,
    Y,
    CellStaticPower,
    CellDynamicPower,
    Fo4Delay,
    Extra(String),
}

impl Column {
    /// The nine columns every table carries, in schema order.
    pub const REQUIRED: [Column; 9] = [
        Column::LibcellName,
        Column::InputPinCap,
        Column::NetName,
        Column::CellName,
        Column::X,
        Column::Y,
        Column::CellStaticPower,
        Column::CellDynamicPower,
        Column::Fo4Delay,
    ];

    pub fn name(&self) -> &str {
        match self {
            Column::LibcellName => "libcell_name",
            Column::InputPinCap => "input_pin_cap",
            Column::NetName => "net_name",
            Column::CellName => "cell_name",
            Column::X => "x",
            Column::Y => "y",
            Column::CellStaticPower => "cell_static_power",
            Column::CellDynamicPower => "cell_dynamic_power",
            Column::Fo4Delay => "fo4_delay",
            Column::Extra(name) => name,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Sorted set of the distinct values of one symbolic column.
///
/// A symbol encodes as its position in the vocabulary. Unknown symbols encode as `-1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    symbols: Vec<Symbol>,
}

impl Vocabulary {
    pub fn from_symbols<'a>(symbols: impl IntoIterator<Item = &'a Symbol>) -> Self {
        let set: BTreeSet<&Symbol> = symbols.into_iter().collect();
        Self {
            symbols: set.into_iter().cloned().collect(),
        }
    }

    pub fn encode(&self, symbol: &Symbol) -> f32 {
        self.symbols
            .binary_search(symbol)
            .map(|i| i as f32)
            .unwrap_or(-1.0)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

/// The netlist table owned by one environment.
#[derive(Debug, Clone)]
pub struct NetlistState {
    instances: Vec<Instance>,
    schema: Vec<Column>,
    libcells: Vocabulary,
    nets: Vocabulary,
    cells: Vocabulary,
}

impl NetlistState {
    /// Build a state from its rows.
    ///
    /// Fails with [`EnvError::EmptyTable`] when `instances` is empty, and with
    /// [`EnvError::InconsistentColumns`] when a row carries a different set of extra
    /// columns than the first row.
    pub fn new(instances: Vec<Instance>) -> Result<Self, EnvError> {
        let first = instances.first().ok_or(EnvError::EmptyTable)?;
        let extra_columns: Vec<String> = first.extra.keys().cloned().collect();

        if let Some(row) = instances
            .iter()
            .position(|inst| !inst.extra.keys().eq(extra_columns.iter()))
        {
            return Err(EnvError::InconsistentColumns { row });
        }

        let schema = Column::REQUIRED
            .iter()
            .cloned()
            .chain(extra_columns.into_iter().map(Column::Extra))
            .collect();

        let libcells = Vocabulary::from_symbols(instances.iter().map(|i| &i.libcell_name));
        let nets = Vocabulary::from_symbols(instances.iter().map(|i| &i.net_name));
        let cells = Vocabulary::from_symbols(instances.iter().map(|i| &i.cell_name));

        Ok(Self {
            instances,
            schema,
            libcells,
            nets,
            cells,
        })
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Always `false` for a successfully constructed state.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instance(&self, row: usize) -> &Instance {
        &self.instances[row]
    }

    pub fn instance_mut(&mut self, row: usize) -> &mut Instance {
        &mut self.instances[row]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn schema(&self) -> &[Column] {
        &self.schema
    }

    pub fn libcell_vocabulary(&self) -> &Vocabulary {
        &self.libcells
    }

    pub fn net_vocabulary(&self) -> &Vocabulary {
        &self.nets
    }

    pub fn cell_vocabulary(&self) -> &Vocabulary {
        &self.cells
    }

    /// Distinct libcell names currently in use, in order of first appearance.
    pub fn distinct_libcells(&self) -> Vec<Symbol> {
        self.instances
            .iter()
            .map(|i| &i.libcell_name)
            .unique()
            .cloned()
            .collect()
    }

    /// Distinct nets used by the instances of `cell`, in order of first appearance.
    pub fn nets_of_cell(&self, cell: &Symbol) -> Vec<Symbol> {
        self.instances
            .iter()
            .filter(|i| &i.cell_name == cell)
            .map(|i| &i.net_name)
            .unique()
            .cloned()
            .collect()
    }

    /// Rows whose net is any of `nets`, in ascending order.
    pub fn rows_on_nets(&self, nets: &[Symbol]) -> Vec<usize> {
        self.instances
            .iter()
            .enumerate()
            .filter(|(_, i)| nets.contains(&i.net_name))
            .map(|(row, _)| row)
            .collect()
    }

    /// Encode one column of one row as a number.
    pub fn encode(&self, row: usize, column: &Column) -> f32 {
        let inst = &self.instances[row];
        match column {
            Column::LibcellName => self.libcells.encode(&inst.libcell_name),
            Column::InputPinCap => inst.input_pin_cap as f32,
            Column::NetName => self.nets.encode(&inst.net_name),
            Column::CellName => self.cells.encode(&inst.cell_name),
            Column::X => inst.x as f32,
            Column::Y => inst.y as f32,
            Column::CellStaticPower => inst.cell_static_power as f32,
            Column::CellDynamicPower => inst.cell_dynamic_power as f32,
            Column::Fo4Delay => inst.fo4_delay as f32,
            Column::Extra(name) => inst.extra.get(name).copied().unwrap_or(f64::NAN) as f32,
        }
    }

    /// Raw field vector of `row`, one value per schema column.
    pub fn observation(&self, row: usize) -> Vec<f32> {
        self.schema.iter().map(|c| self.encode(row, c)).collect()
    }

    /// Smallest and largest encoded value over the whole table.
    pub fn value_bounds(&self) -> (f32, f32) {
        (0..self.len())
            .flat_map(|row| self.observation(row))
            .filter(|v| !v.is_nan())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }
}
