//! Aggregate power, delay and area of a netlist table.
//!
//! All three functions are pure and linear in the number of instances.

use std::fmt;

use ordered_float::OrderedFloat;

use crate::netlist::NetlistState;

/// Sum of static and dynamic power over every instance.
pub fn power(netlist: &NetlistState) -> f64 {
    netlist.iter().map(|i| i.power()).sum()
}

/// Worst single-stage FO4 delay.
///
/// Stands in for a critical path: the delay of the slowest instance, not of any
/// topological path through the netlist.
pub fn delay(netlist: &NetlistState) -> f64 {
    netlist
        .iter()
        .map(|i| OrderedFloat(i.fo4_delay))
        .max()
        .map_or(0.0, |d| d.into_inner())
}

/// Sum of `x * y` over every instance.
pub fn area(netlist: &NetlistState) -> f64 {
    netlist.iter().map(|i| i.area()).sum()
}

/// Snapshot of the three aggregate metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    pub power: f64,
    pub delay: f64,
    pub area: f64,
}

impl Metrics {
    pub fn measure(netlist: &NetlistState) -> Self {
        Self {
            power: power(netlist),
            delay: delay(netlist),
            area: area(netlist),
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "power {:.4}, delay {:.4}, area {:.4}",
            self.power, self.delay, self.area
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::{Instance, NetlistState};

    fn table() -> NetlistState {
        NetlistState::new(vec![
            Instance::new("A", 1.0, "n1", "u1", 2.0, 3.0).with_metrics(0.1, 0.2, 0.5),
            Instance::new("B", 1.0, "n2", "u1", 1.0, 4.0).with_metrics(0.3, 0.4, 1.5),
            Instance::new("C", 1.0, "n3", "u2", 0.5, 2.0).with_metrics(0.0, 0.0, 0.25),
        ])
        .unwrap()
    }

    #[test]
    fn test_power_sums_static_and_dynamic() {
        assert!((power(&table()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_delay_is_worst_instance() {
        assert_eq!(delay(&table()), 1.5);
    }

    #[test]
    fn test_area_sums_xy_products() {
        assert_eq!(area(&table()), 11.0);
    }

    #[test]
    fn test_measure_is_repeatable() {
        let t = table();
        let a = Metrics::measure(&t);
        let b = Metrics::measure(&t);
        assert_eq!(a, b);
        assert_eq!(a.delay, delay(&t));
    }

    #[test]
    fn test_negative_delays_still_take_maximum() {
        let t = NetlistState::new(vec![
            Instance::new("A", -1.0, "n1", "u1", 1.0, 1.0).with_metrics(0.0, 0.0, -0.3),
            Instance::new("A", -2.0, "n1", "u1", 1.0, 1.0).with_metrics(0.0, 0.0, -0.1),
        ])
        .unwrap();
        assert_eq!(delay(&t), -0.1);
    }
}
