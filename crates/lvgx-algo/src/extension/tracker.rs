//! Worst-overload bookkeeping.
//!
//! A power-flow run may flag many sections and buses. The planner only ever
//! resolves the single worst one of each kind, so reports are folded into at
//! most two entries. A later report replaces an entry only when it is strictly
//! worse; ties keep the first one reported.

use lvgx_core::{BusId, PerUnit, SectionId, SpecificCurrent};
use serde::Serialize;

/// The most heavily loaded section reported so far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentOverload {
    pub section: SectionId,
    pub abs_specific_current: SpecificCurrent,
}

/// The bus with the largest voltage deviation reported so far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoltageOverload {
    pub bus: BusId,
    pub voltage_pu: PerUnit,
}

impl VoltageOverload {
    pub fn deviation(&self) -> f64 {
        self.voltage_pu.deviation_from_nominal()
    }
}

/// Holds at most one current overload and one voltage overload.
#[derive(Debug, Clone, Default)]
pub struct OverloadTracker {
    worst_current: Option<CurrentOverload>,
    worst_voltage: Option<VoltageOverload>,
}

impl OverloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a section overload. Returns true when it became the tracked one.
    pub fn report_current(&mut self, section: SectionId, current: SpecificCurrent) -> bool {
        let replace = match self.worst_current {
            None => true,
            Some(tracked) => current > tracked.abs_specific_current,
        };
        if replace {
            self.worst_current = Some(CurrentOverload {
                section,
                abs_specific_current: current,
            });
        }
        replace
    }

    /// Fold in a voltage violation. Returns true when it became the tracked one.
    pub fn report_voltage(&mut self, bus: BusId, voltage: PerUnit) -> bool {
        let replace = match self.worst_voltage {
            None => true,
            Some(tracked) => voltage.deviation_from_nominal() > tracked.deviation(),
        };
        if replace {
            self.worst_voltage = Some(VoltageOverload {
                bus,
                voltage_pu: voltage,
            });
        }
        replace
    }

    pub fn worst_current(&self) -> Option<CurrentOverload> {
        self.worst_current
    }

    pub fn worst_voltage(&self) -> Option<VoltageOverload> {
        self.worst_voltage
    }

    pub fn has_overloads(&self) -> bool {
        self.worst_current.is_some() || self.worst_voltage.is_some()
    }

    /// Forget both tracked overloads.
    pub fn reset(&mut self) {
        self.worst_current = None;
        self.worst_voltage = None;
    }
}
