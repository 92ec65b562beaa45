//! Summary of a netlist table.
//!
//! Prints the aggregate metrics, the observation bounds an environment built on the
//! table would expose, and libcell usage.

use std::{
    fs,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::*;
use clap::Parser;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use prettytable::*;

use crate::{
    env::ObservationSpace,
    metrics::Metrics,
    netlist::{Instance, NetlistState},
    read_file,
};

/// Command-line arguments for the inspect command.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Netlist table input file (JSON records)
    pub input: PathBuf,

    /// Report file (default: stdout)
    #[clap(long, short)]
    pub report: Option<PathBuf>,
}

/// Usage of one libcell across the table.
#[derive(Debug, Clone, PartialEq)]
pub struct LibcellUsage {
    pub libcell: String,
    pub instances: usize,
    pub power: f64,
    pub worst_delay: f64,
}

/// Per-libcell usage, sorted by libcell name.
pub fn libcell_usage(netlist: &NetlistState) -> Vec<LibcellUsage> {
    netlist
        .iter()
        .sorted_by(|a, b| str::cmp(&a.libcell_name, &b.libcell_name))
        .group_by(|i| i.libcell_name.to_string())
        .into_iter()
        .map(|(libcell, group)| {
            let instances: Vec<&Instance> = group.collect();
            LibcellUsage {
                libcell,
                instances: instances.len(),
                power: instances.iter().map(|i| i.power()).sum(),
                worst_delay: instances
                    .iter()
                    .map(|i| OrderedFloat(i.fo4_delay))
                    .max()
                    .map_or(0.0, |d| d.into_inner()),
            }
        })
        .collect()
}

/// Print a summary of a netlist table.
pub fn inspect_main(args: InspectArgs) -> Result<()> {
    let InspectArgs { input, report } = args;

    let mut writer: Box<dyn Write> = match report {
        Some(path) => Box::new(BufWriter::new(fs::File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };

    let netlist = read_file(&input)?;
    write_summary(&netlist, &mut writer)
}

fn write_summary(netlist: &NetlistState, writer: &mut dyn Write) -> Result<()> {
    let metrics = Metrics::measure(netlist);
    let space = ObservationSpace::from_netlist(netlist);

    writeln!(writer, "Instances: {}", netlist.len())?;
    writeln!(
        writer,
        "Libcells: {} / Nets: {} / Cells: {}",
        netlist.libcell_vocabulary().len(),
        netlist.net_vocabulary().len(),
        netlist.cell_vocabulary().len()
    )?;
    writeln!(writer, "Power: {:.4}", metrics.power)?;
    writeln!(writer, "Delay: {:.4}", metrics.delay)?;
    writeln!(writer, "Area: {:.4}", metrics.area)?;
    writeln!(
        writer,
        "Observation: {} columns in [{}, {}]",
        space.shape, space.low, space.high
    )?;
    writeln!(
        writer,
        "Columns: {}",
        netlist.schema().iter().map(|c| c.name()).join(", ")
    )?;

    let mut table = Table::new();
    table.set_titles(row!["Libcell", "Instances", "Power", "Worst FO4"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    for usage in libcell_usage(netlist) {
        table.add_row(row![
            usage.libcell,
            usage.instances,
            format!("{:.4}", usage.power),
            format!("{:.4}", usage.worst_delay),
        ]);
    }
    writeln!(writer)?;
    table.print(writer)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::test_helpers::*;

    #[test]
    fn test_libcell_usage_groups_and_sorts() {
        let usage = libcell_usage(&wide_table());
        let names: Vec<&str> = usage.iter().map(|u| u.libcell.as_str()).collect();

        assert_eq!(names, vec!["BUF_X4", "INV_X1", "NAND2_X1", "NOR2_X2"]);
        let inv = &usage[1];
        assert_eq!(inv.instances, 2);
        assert!((inv.power - 1.31).abs() < 1e-12);
        assert_eq!(inv.worst_delay, 0.072);
    }

    #[test]
    fn test_summary_mentions_metrics_and_libcells() {
        let mut out = Vec::new();
        write_summary(&wide_table(), &mut out).expect("Should write summary");
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Instances: 5"));
        assert!(text.contains("Libcells: 4 / Nets: 4 / Cells: 3"));
        assert!(text.contains("NAND2_X1"));
        assert!(text.contains("Columns: libcell_name, input_pin_cap"));
    }
}
