//! Turning the tracked overloads into one cable to lay.

use std::fmt;

use lvgx_core::{BusId, GridTopology, LvgxResult, RouteFinder, SectionId};
use serde::Serialize;
use tracing::{debug, info};

use super::config::{check_relieve_factor, ExtensionConfig};
use super::tracker::{CurrentOverload, OverloadTracker, VoltageOverload};
use super::walker::FeederWalker;

/// Which violation an extension relieves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Thermal,
    Voltage,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Thermal => write!(f, "thermal"),
            ViolationKind::Voltage => write!(f, "voltage"),
        }
    }
}

/// The two buses a new cable should connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtensionPair {
    pub low_voltage_bus: BusId,
    pub high_voltage_bus: BusId,
    pub violation: ViolationKind,
}

impl ExtensionPair {
    /// Both ends collapse onto one bus, so no cable can be laid.
    pub fn is_degenerate(&self) -> bool {
        self.low_voltage_bus == self.high_voltage_bus
    }
}

impl fmt::Display for ExtensionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({} relief)",
            self.low_voltage_bus, self.high_voltage_bus, self.violation
        )
    }
}

/// Plans parallel cables for the worst overloads of one grid snapshot.
///
/// The caller reports every violation it found in a power-flow result, then
/// asks for the pair of buses to connect. A thermal overload is always
/// resolved before a voltage violation. Between runs call [`reset`](Self::reset)
/// or build a fresh planner.
///
/// ```
/// use lvgx_algo::extension::{GridExtension, ViolationKind};
/// use lvgx_core::{LvGrid, PerUnit, SpecificCurrent};
///
/// let mut grid = LvGrid::new();
/// let slack = grid.add_bus("slack", PerUnit(1.0));
/// let b1 = grid.add_bus("b1", PerUnit(0.96));
/// let b2 = grid.add_bus("b2", PerUnit(0.93));
/// let s1 = grid.add_section("slack-b1", slack, b1, SpecificCurrent(1.3)).unwrap();
/// grid.add_section("b1-b2", b1, b2, SpecificCurrent(0.9)).unwrap();
///
/// let mut planner = GridExtension::new(&grid, &grid);
/// planner.report_current_overload(s1).unwrap();
/// let pair = planner.find_buses_to_extend_between().unwrap().unwrap();
/// assert_eq!(pair.violation, ViolationKind::Thermal);
/// assert_eq!((pair.low_voltage_bus, pair.high_voltage_bus), (b2, slack));
/// ```
#[derive(Debug)]
pub struct GridExtension<'g, G: ?Sized, R: ?Sized> {
    grid: &'g G,
    router: &'g R,
    config: ExtensionConfig,
    tracker: OverloadTracker,
}

impl<'g, G, R> GridExtension<'g, G, R>
where
    G: GridTopology + ?Sized,
    R: RouteFinder + ?Sized,
{
    /// Planner with the default relieve factors.
    pub fn new(grid: &'g G, router: &'g R) -> Self {
        Self {
            grid,
            router,
            config: ExtensionConfig::default(),
            tracker: OverloadTracker::new(),
        }
    }

    /// Planner with explicit relieve factors.
    pub fn with_config(grid: &'g G, router: &'g R, config: ExtensionConfig) -> LvgxResult<Self> {
        config.validate()?;
        Ok(Self {
            grid,
            router,
            config,
            tracker: OverloadTracker::new(),
        })
    }

    /// Record a thermally overloaded section.
    ///
    /// Only the section with the highest loading among all reports is kept.
    pub fn report_current_overload(&mut self, section: SectionId) -> LvgxResult<()> {
        let current = self.grid.abs_specific_current(section)?;
        if self.tracker.report_current(section, current) {
            debug!(%section, %current, "new worst current overload");
        }
        Ok(())
    }

    /// Record a bus outside its voltage band.
    ///
    /// Only the bus deviating most from nominal among all reports is kept.
    pub fn report_voltage_overload(&mut self, bus: BusId) -> LvgxResult<()> {
        let voltage = self.grid.voltage_pu(bus)?;
        if self.tracker.report_voltage(bus, voltage) {
            debug!(%bus, %voltage, "new worst voltage overload");
        }
        Ok(())
    }

    pub fn has_overloads(&self) -> bool {
        self.tracker.has_overloads()
    }

    pub fn worst_current_overload(&self) -> Option<CurrentOverload> {
        self.tracker.worst_current()
    }

    pub fn worst_voltage_overload(&self) -> Option<VoltageOverload> {
        self.tracker.worst_voltage()
    }

    /// Drop all reports, keeping the relieve factors.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// The pair of buses to connect with a new cable, or `None` when nothing
    /// was reported.
    ///
    /// The worst current overload wins over the worst voltage violation.
    /// Reports are not consumed; asking twice gives the same answer.
    pub fn find_buses_to_extend_between(&self) -> LvgxResult<Option<ExtensionPair>> {
        let walker = FeederWalker::new(self.grid);

        let pair = if let Some(overload) = self.tracker.worst_current() {
            let (low, high) = walker
                .thermal_relief_pair(overload.section, self.config.relieve_factor_current)?;
            ExtensionPair {
                low_voltage_bus: low,
                high_voltage_bus: high,
                violation: ViolationKind::Thermal,
            }
        } else if let Some(overload) = self.tracker.worst_voltage() {
            let (low, high) = walker.voltage_relief_pair(
                overload.bus,
                self.router,
                self.config.relieve_factor_voltage,
            )?;
            ExtensionPair {
                low_voltage_bus: low,
                high_voltage_bus: high,
                violation: ViolationKind::Voltage,
            }
        } else {
            debug!("no overloads reported");
            return Ok(None);
        };

        info!(%pair, "extension planned");
        Ok(Some(pair))
    }

    pub fn config(&self) -> ExtensionConfig {
        self.config
    }

    pub fn relieve_factor_current(&self) -> f64 {
        self.config.relieve_factor_current
    }

    /// Fails with `InvalidParameter` outside `[0, 1]` and keeps the old value.
    pub fn set_relieve_factor_current(&mut self, value: f64) -> LvgxResult<()> {
        self.config.relieve_factor_current = check_relieve_factor("relieve_factor_current", value)?;
        Ok(())
    }

    pub fn relieve_factor_voltage(&self) -> f64 {
        self.config.relieve_factor_voltage
    }

    /// Fails with `InvalidParameter` outside `[0, 1]` and keeps the old value.
    pub fn set_relieve_factor_voltage(&mut self, value: f64) -> LvgxResult<()> {
        self.config.relieve_factor_voltage = check_relieve_factor("relieve_factor_voltage", value)?;
        Ok(())
    }
}
