//! VCD (Value Change Dump) traces of a rollout.
//!
//! Each step becomes one timestamp. The power, delay and area metrics, the step reward
//! and the running episode return are dumped as real-valued variables under a `lgo`
//! scope, so a waveform viewer like GTKWave can plot how an episode moved the metrics.
//! Timestamp 0 holds the metrics of the table before the first step.

use std::io;

use anyhow::Result;
use itertools::Itertools;

use super::StepRecord;
use crate::metrics::Metrics;

/// Write the metric and reward traces of `records` as VCD.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use lgo::metrics::Metrics;
/// use lgo::simulate::vcd::write_vcd;
/// use std::fs::File;
/// use std::io::BufWriter;
///
/// let mut file = BufWriter::new(File::create("rollout.vcd")?);
/// write_vcd(&Metrics::default(), &[], &mut file)?;
/// # Ok(())
/// # }
/// ```
pub fn write_vcd(initial: &Metrics, records: &[StepRecord], w: &mut dyn io::Write) -> Result<()> {
    let mut writer = vcd::Writer::new(w);

    writer.timescale(1, vcd::TimescaleUnit::NS)?;
    writer.add_module("lgo")?;
    let power = writer.add_var(vcd::VarType::Real, 64, "power", None)?;
    let delay = writer.add_var(vcd::VarType::Real, 64, "delay", None)?;
    let area = writer.add_var(vcd::VarType::Real, 64, "area", None)?;
    let reward = writer.add_var(vcd::VarType::Real, 64, "reward", None)?;
    let episode_return = writer.add_var(vcd::VarType::Real, 64, "episode_return", None)?;
    writer.upscope()?;
    writer.enddefinitions()?;

    writer.timestamp(0)?;
    writer.change_real(power, initial.power)?;
    writer.change_real(delay, initial.delay)?;
    writer.change_real(area, initial.area)?;
    writer.change_real(reward, 0.0)?;
    writer.change_real(episode_return, 0.0)?;

    let mut time = 0u64;
    for (_, steps) in records.iter().group_by(|r| r.episode).into_iter() {
        let mut total = 0.0;
        for record in steps {
            time += 1;
            total += record.reward;
            writer.timestamp(time)?;
            writer.change_real(power, record.metrics.power)?;
            writer.change_real(delay, record.metrics.delay)?;
            writer.change_real(area, record.metrics.area)?;
            writer.change_real(reward, record.reward)?;
            writer.change_real(episode_return, total)?;
        }
    }

    Ok(())
}
