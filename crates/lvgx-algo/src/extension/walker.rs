//! Feeder walks along the voltage gradient.
//!
//! Every walk here moves from bus to bus over the incident section whose far
//! end continues the voltage trend (strictly higher or strictly lower voltage)
//! and, among those, carries the most current. Because each step strictly
//! raises or strictly lowers the voltage, no bus is visited twice and every
//! walk ends after at most one step per bus.

use lvgx_core::{BusId, GridTopology, LvgxResult, PerUnit, RouteFinder, SectionId, SpecificCurrent};
use serde::Serialize;
use tracing::{debug, trace};

/// Which way along the voltage gradient a walk travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Toward the feeding point (higher voltage on an under-voltage feeder)
    TowardHigherVoltage,
    /// Toward the feeder end (lower voltage on an under-voltage feeder)
    TowardLowerVoltage,
}

impl Direction {
    /// True when moving from `from` to `to` continues this direction.
    fn continues(self, from: PerUnit, to: PerUnit) -> bool {
        match self {
            Direction::TowardHigherVoltage => to > from,
            Direction::TowardLowerVoltage => to < from,
        }
    }
}

/// One step of a walk: the section taken and the bus it leads to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkStep {
    pub section: SectionId,
    pub bus: BusId,
    pub abs_specific_current: SpecificCurrent,
}

/// The part of a feeder between a start bus and one local voltage extremum.
#[derive(Debug, Clone, PartialEq)]
pub struct FeederBranch {
    pub extremum: BusId,
    /// Sections in walking order, the first one touching the start bus
    pub sections: Vec<SectionId>,
}

/// A feeder between its two local voltage extrema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feeder {
    pub low_voltage_end: BusId,
    pub high_voltage_end: BusId,
    /// Sections ordered from `low_voltage_end` to `high_voltage_end`
    pub sections: Vec<SectionId>,
}

/// Graph walks over any [`GridTopology`].
#[derive(Debug, Clone, Copy)]
pub struct FeederWalker<'g, G: ?Sized> {
    grid: &'g G,
}

impl<'g, G: GridTopology + ?Sized> FeederWalker<'g, G> {
    pub fn new(grid: &'g G) -> Self {
        Self { grid }
    }

    /// The end of `section` lying in `direction`.
    ///
    /// With exactly equal voltages the first declared end is returned for
    /// both directions.
    pub fn section_end(&self, section: SectionId, direction: Direction) -> LvgxResult<BusId> {
        let (first, second) = self.grid.connected_buses(section)?;
        let v_first = self.grid.voltage_pu(first)?;
        let v_second = self.grid.voltage_pu(second)?;
        if direction.continues(v_first, v_second) {
            Ok(second)
        } else {
            Ok(first)
        }
    }

    /// The most loaded incident section of `bus` whose far end continues
    /// `direction`, or `None` at a local voltage extremum.
    ///
    /// Equal loadings keep the first section in incidence order.
    pub fn next_step(&self, bus: BusId, direction: Direction) -> LvgxResult<Option<WalkStep>> {
        let here = self.grid.voltage_pu(bus)?;
        let mut best: Option<WalkStep> = None;
        for section in self.grid.connected_sections(bus)? {
            let far = self.grid.opposite_bus(section, bus)?;
            if !direction.continues(here, self.grid.voltage_pu(far)?) {
                continue;
            }
            let current = self.grid.abs_specific_current(section)?;
            let better = match best {
                None => true,
                Some(step) => current > step.abs_specific_current,
            };
            if better {
                best = Some(WalkStep {
                    section,
                    bus: far,
                    abs_specific_current: current,
                });
            }
        }
        Ok(best)
    }

    /// Termination bus of a thermal-relief cable on one side of `overloaded`.
    ///
    /// Starting at the end of `overloaded` in `direction`, the walk follows
    /// [`next_step`](Self::next_step) until it reaches a voltage extremum or
    /// the next section carries less than `(1 - relieve_factor)` of the
    /// overloaded section's current. The bus reached before that section is
    /// the termination point.
    pub fn thermal_relief_end(
        &self,
        overloaded: SectionId,
        direction: Direction,
        relieve_factor: f64,
    ) -> LvgxResult<BusId> {
        let overload_current = self.grid.abs_specific_current(overloaded)?;
        let threshold = overload_current * (1.0 - relieve_factor);
        let mut bus = self.section_end(overloaded, direction)?;

        loop {
            let step = match self.next_step(bus, direction)? {
                Some(step) => step,
                None => {
                    trace!(%bus, ?direction, "voltage extremum reached");
                    return Ok(bus);
                }
            };
            if step.abs_specific_current < threshold {
                trace!(
                    %bus,
                    next = %step.section,
                    current = step.abs_specific_current.value(),
                    threshold = threshold.value(),
                    "overload sufficiently relieved"
                );
                return Ok(bus);
            }
            trace!(from = %bus, to = %step.bus, via = %step.section, "extending");
            bus = step.bus;
        }
    }

    /// Both termination buses for a thermal-relief cable, `(low, high)`.
    pub fn thermal_relief_pair(
        &self,
        overloaded: SectionId,
        relieve_factor: f64,
    ) -> LvgxResult<(BusId, BusId)> {
        let high = self.thermal_relief_end(overloaded, Direction::TowardHigherVoltage, relieve_factor)?;
        let low = self.thermal_relief_end(overloaded, Direction::TowardLowerVoltage, relieve_factor)?;
        debug!(section = %overloaded, %low, %high, "thermal relief ends found");
        Ok((low, high))
    }

    /// Walk from `start` to the local voltage extremum in `direction`.
    pub fn feeder_extremum(&self, start: BusId, direction: Direction) -> LvgxResult<FeederBranch> {
        let mut bus = start;
        let mut sections = Vec::new();
        while let Some(step) = self.next_step(bus, direction)? {
            sections.push(step.section);
            bus = step.bus;
        }
        Ok(FeederBranch {
            extremum: bus,
            sections,
        })
    }

    /// The feeder through `start`, spanning its voltage minimum and maximum.
    pub fn main_feeder(&self, start: BusId) -> LvgxResult<Feeder> {
        let high = self.feeder_extremum(start, Direction::TowardHigherVoltage)?;
        let low = self.feeder_extremum(start, Direction::TowardLowerVoltage)?;

        let mut sections = low.sections;
        sections.reverse();
        sections.extend(high.sections);
        Ok(Feeder {
            low_voltage_end: low.extremum,
            high_voltage_end: high.extremum,
            sections,
        })
    }

    /// Buses and voltages met when following `route` from `start`.
    ///
    /// Fails with `DisconnectedSection` when consecutive sections do not share
    /// a bus.
    pub fn profile_along(&self, start: BusId, route: &[SectionId]) -> LvgxResult<FeederProfile> {
        let mut buses = Vec::with_capacity(route.len() + 1);
        let mut voltages = Vec::with_capacity(route.len() + 1);
        let mut bus = start;
        buses.push(bus);
        voltages.push(self.grid.voltage_pu(bus)?);
        for &section in route {
            bus = self.grid.opposite_bus(section, bus)?;
            buses.push(bus);
            voltages.push(self.grid.voltage_pu(bus)?);
        }
        Ok(FeederProfile { buses, voltages })
    }

    /// Both termination buses for a voltage-relief cable, `(low, high)`.
    ///
    /// Finds the feeder extrema through `violating`, asks `router` for the
    /// canonical route between them, and widens outward from the bus closest
    /// to nominal voltage as far as `relieve_factor` allows.
    pub fn voltage_relief_pair<R: RouteFinder + ?Sized>(
        &self,
        violating: BusId,
        router: &R,
        relieve_factor: f64,
    ) -> LvgxResult<(BusId, BusId)> {
        let feeder = self.main_feeder(violating)?;
        debug!(
            bus = %violating,
            low_end = %feeder.low_voltage_end,
            high_end = %feeder.high_voltage_end,
            "feeder extrema found"
        );

        let route = router.shortest_route(feeder.low_voltage_end, feeder.high_voltage_end)?;
        if route != feeder.sections {
            debug!(
                walked = feeder.sections.len(),
                routed = route.len(),
                "canonical route differs from the walked feeder"
            );
        }

        let profile = self.profile_along(feeder.low_voltage_end, &route)?;
        let centre = profile.centre_position();
        let low = profile.low_side_position(centre, relieve_factor);
        let high = profile.high_side_position(centre, relieve_factor);
        debug!(
            centre = %profile.buses[centre],
            low = %profile.buses[low],
            high = %profile.buses[high],
            "voltage relief ends found"
        );
        Ok((profile.buses[low], profile.buses[high]))
    }
}

/// Buses along a route from the low-voltage end to the high-voltage end,
/// with the voltage of each.
///
/// Positions index `buses`; position 0 is the low-voltage end and the last
/// position the high-voltage end. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct FeederProfile {
    pub buses: Vec<BusId>,
    pub voltages: Vec<PerUnit>,
}

impl FeederProfile {
    fn last_position(&self) -> usize {
        self.buses.len() - 1
    }

    /// Position of the bus closest to nominal voltage, searching from the
    /// low-voltage end.
    ///
    /// A low-voltage end at or above nominal is itself the centre. Otherwise
    /// the search advances while the deviation from nominal does not grow.
    pub fn centre_position(&self) -> usize {
        let start = self.voltages[0];
        if !start.is_undervoltage() {
            return 0;
        }
        let mut centre = 0;
        let mut deviation = start.deviation_from_nominal();
        for (position, voltage) in self.voltages.iter().enumerate().skip(1) {
            let next = voltage.deviation_from_nominal();
            if next > deviation {
                break;
            }
            centre = position;
            deviation = next;
        }
        centre
    }

    /// Widen from `centre` toward the low-voltage end while voltages stay at
    /// or above `1 - factor * (1 - v_low)`.
    pub fn low_side_position(&self, centre: usize, relieve_factor: f64) -> usize {
        let low_end = self.voltages[0].value();
        let threshold = 1.0 - relieve_factor * (1.0 - low_end);
        let mut position = centre;
        while position > 0 && self.voltages[position - 1].value() >= threshold {
            position -= 1;
        }
        position
    }

    /// Widen from `centre` toward the high-voltage end while voltages stay at
    /// or below `1 + factor * (v_high - 1)`.
    ///
    /// Mirrors [`low_side_position`](Self::low_side_position): the cable keeps
    /// growing while the next bus is within `factor` of the end's deviation.
    pub fn high_side_position(&self, centre: usize, relieve_factor: f64) -> usize {
        let last = self.last_position();
        let high_end = self.voltages[last].value();
        let threshold = 1.0 + relieve_factor * (high_end - 1.0);
        let mut position = centre;
        while position < last && self.voltages[position + 1].value() <= threshold {
            position += 1;
        }
        position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvgx_core::{LvGrid, LvgxError};

    struct Chain {
        grid: LvGrid,
        buses: Vec<BusId>,
        sections: Vec<SectionId>,
    }

    /// Buses in a line, `voltages[i]` at bus i, `currents[i]` on section i -> i+1.
    fn chain(voltages: &[f64], currents: &[f64]) -> Chain {
        let mut grid = LvGrid::new();
        let buses: Vec<BusId> = voltages
            .iter()
            .enumerate()
            .map(|(i, &v)| grid.add_bus(format!("b{i}"), PerUnit(v)))
            .collect();
        let sections = currents
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                grid.add_section(
                    format!("b{i}-b{}", i + 1),
                    buses[i],
                    buses[i + 1],
                    SpecificCurrent(c),
                )
                .unwrap()
            })
            .collect();
        Chain {
            grid,
            buses,
            sections,
        }
    }

    fn profile(voltages: &[f64]) -> FeederProfile {
        FeederProfile {
            buses: (0..voltages.len()).map(BusId::new).collect(),
            voltages: voltages.iter().copied().map(PerUnit).collect(),
        }
    }

    #[test]
    fn test_section_end_orientation_independent() {
        let mut grid = LvGrid::new();
        let hi = grid.add_bus("hi", PerUnit(1.0));
        let lo = grid.add_bus("lo", PerUnit(0.97));
        let forward = grid.add_section("hi-lo", hi, lo, SpecificCurrent(1.0)).unwrap();
        let backward = grid.add_section("lo-hi", lo, hi, SpecificCurrent(1.0)).unwrap();
        let walker = FeederWalker::new(&grid);

        for section in [forward, backward] {
            assert_eq!(walker.section_end(section, Direction::TowardHigherVoltage).unwrap(), hi);
            assert_eq!(walker.section_end(section, Direction::TowardLowerVoltage).unwrap(), lo);
        }
    }

    #[test]
    fn test_section_end_tie_picks_first_declared() {
        let mut grid = LvGrid::new();
        let a = grid.add_bus("a", PerUnit(0.98));
        let b = grid.add_bus("b", PerUnit(0.98));
        let section = grid.add_section("a-b", a, b, SpecificCurrent(1.0)).unwrap();
        let walker = FeederWalker::new(&grid);

        assert_eq!(walker.section_end(section, Direction::TowardHigherVoltage).unwrap(), a);
        assert_eq!(walker.section_end(section, Direction::TowardLowerVoltage).unwrap(), a);
    }

    #[test]
    fn test_next_step_picks_most_loaded_continuation() {
        let mut grid = LvGrid::new();
        let centre = grid.add_bus("centre", PerUnit(0.98));
        let up = grid.add_bus("up", PerUnit(0.99));
        let down_light = grid.add_bus("down-light", PerUnit(0.97));
        let down_heavy = grid.add_bus("down-heavy", PerUnit(0.975));
        let flat = grid.add_bus("flat", PerUnit(0.98));
        grid.add_section("c-up", centre, up, SpecificCurrent(0.9)).unwrap();
        grid.add_section("c-dl", centre, down_light, SpecificCurrent(0.2)).unwrap();
        let heavy = grid.add_section("c-dh", centre, down_heavy, SpecificCurrent(0.6)).unwrap();
        grid.add_section("c-flat", centre, flat, SpecificCurrent(5.0)).unwrap();
        let walker = FeederWalker::new(&grid);

        let step = walker
            .next_step(centre, Direction::TowardLowerVoltage)
            .unwrap()
            .unwrap();
        assert_eq!(step.section, heavy);
        assert_eq!(step.bus, down_heavy);

        let step = walker
            .next_step(centre, Direction::TowardHigherVoltage)
            .unwrap()
            .unwrap();
        assert_eq!(step.bus, up);

        // equal voltage never continues a walk
        assert!(walker.next_step(flat, Direction::TowardHigherVoltage).unwrap().is_none());
        assert!(walker.next_step(flat, Direction::TowardLowerVoltage).unwrap().is_none());
    }

    #[test]
    fn test_next_step_tie_keeps_first_section() {
        let mut grid = LvGrid::new();
        let centre = grid.add_bus("centre", PerUnit(1.0));
        let a = grid.add_bus("a", PerUnit(0.99));
        let b = grid.add_bus("b", PerUnit(0.98));
        let first = grid.add_section("c-a", centre, a, SpecificCurrent(0.5)).unwrap();
        grid.add_section("c-b", centre, b, SpecificCurrent(0.5)).unwrap();
        let walker = FeederWalker::new(&grid);

        let step = walker
            .next_step(centre, Direction::TowardLowerVoltage)
            .unwrap()
            .unwrap();
        assert_eq!(step.section, first);
    }

    #[test]
    fn test_thermal_relief_stops_on_threshold() {
        // 1.0 overload on the first section; 0.6 threshold with factor 0.4
        let c = chain(&[1.0, 0.99, 0.98, 0.97, 0.96], &[1.0, 0.8, 0.65, 0.5]);
        let walker = FeederWalker::new(&c.grid);

        let low = walker
            .thermal_relief_end(c.sections[0], Direction::TowardLowerVoltage, 0.4)
            .unwrap();
        // 0.8 and 0.65 keep extending, 0.5 < 0.6 stops at bus 3
        assert_eq!(low, c.buses[3]);

        let high = walker
            .thermal_relief_end(c.sections[0], Direction::TowardHigherVoltage, 0.4)
            .unwrap();
        assert_eq!(high, c.buses[0]);
    }

    #[test]
    fn test_thermal_relief_runs_to_extremum() {
        let c = chain(&[1.0, 0.99, 0.98], &[1.0, 0.95]);
        let walker = FeederWalker::new(&c.grid);
        let (low, high) = walker.thermal_relief_pair(c.sections[0], 0.4).unwrap();
        assert_eq!((low, high), (c.buses[2], c.buses[0]));
    }

    #[test]
    fn test_thermal_relief_factor_extremes() {
        let c = chain(&[1.0, 0.99, 0.98, 0.97], &[1.0, 0.9, 0.1]);
        let walker = FeederWalker::new(&c.grid);

        // factor 0: only sections at least as loaded as the overload continue
        let (low, _) = walker.thermal_relief_pair(c.sections[0], 0.0).unwrap();
        assert_eq!(low, c.buses[1]);

        // factor 1: threshold is zero, the walk reaches the feeder end
        let (low, _) = walker.thermal_relief_pair(c.sections[0], 1.0).unwrap();
        assert_eq!(low, c.buses[3]);
    }

    #[test]
    fn test_thermal_relief_from_mid_feeder() {
        let c = chain(&[1.0, 0.99, 0.98, 0.97, 0.96], &[0.9, 1.2, 1.0, 0.3]);
        let walker = FeederWalker::new(&c.grid);
        let (low, high) = walker.thermal_relief_pair(c.sections[1], 0.4).unwrap();
        assert_eq!(low, c.buses[3]);
        assert_eq!(high, c.buses[0]);
    }

    #[test]
    fn test_main_feeder_orders_sections_low_to_high() {
        let c = chain(&[1.0, 0.99, 0.98, 0.97], &[0.4, 0.3, 0.2]);
        let walker = FeederWalker::new(&c.grid);

        let feeder = walker.main_feeder(c.buses[2]).unwrap();
        assert_eq!(feeder.low_voltage_end, c.buses[3]);
        assert_eq!(feeder.high_voltage_end, c.buses[0]);
        assert_eq!(
            feeder.sections,
            vec![c.sections[2], c.sections[1], c.sections[0]]
        );
    }

    #[test]
    fn test_feeder_extremum_of_extremum_is_itself() {
        let c = chain(&[1.0, 0.99], &[0.4]);
        let walker = FeederWalker::new(&c.grid);
        let branch = walker
            .feeder_extremum(c.buses[0], Direction::TowardHigherVoltage)
            .unwrap();
        assert_eq!(branch.extremum, c.buses[0]);
        assert!(branch.sections.is_empty());
    }

    #[test]
    fn test_profile_along_rejects_broken_route() {
        let c = chain(&[1.0, 0.99, 0.98, 0.97], &[0.4, 0.3, 0.2]);
        let walker = FeederWalker::new(&c.grid);
        let err = walker
            .profile_along(c.buses[3], &[c.sections[2], c.sections[0]])
            .unwrap_err();
        assert!(matches!(err, LvgxError::DisconnectedSection { .. }));
    }

    #[test]
    fn test_centre_of_undervoltage_feeder_is_nominal_end() {
        let p = profile(&[0.95, 0.97, 0.99, 1.0]);
        assert_eq!(p.centre_position(), 3);
    }

    #[test]
    fn test_centre_when_low_end_not_undervoltage() {
        let p = profile(&[1.0, 1.02, 1.05]);
        assert_eq!(p.centre_position(), 0);
    }

    #[test]
    fn test_centre_stops_when_deviation_grows() {
        let p = profile(&[0.96, 0.99, 1.02, 1.05]);
        assert_eq!(p.centre_position(), 1);
    }

    #[test]
    fn test_low_side_threshold() {
        // threshold = 1 - 0.5 * 0.06 = 0.97
        let p = profile(&[0.94, 0.96, 0.975, 0.985, 1.0]);
        assert_eq!(p.low_side_position(4, 0.5), 2);
        assert_eq!(p.low_side_position(4, 1.0), 0);
        assert_eq!(p.low_side_position(4, 0.0), 4);
        assert_eq!(p.low_side_position(0, 0.5), 0);
    }

    #[test]
    fn test_high_side_threshold() {
        // threshold = 1 + 0.5 * 0.06 = 1.03
        let p = profile(&[1.0, 1.01, 1.025, 1.045, 1.06]);
        assert_eq!(p.high_side_position(0, 0.5), 2);
        assert_eq!(p.high_side_position(0, 1.0), 4);
        assert_eq!(p.high_side_position(0, 0.0), 0);
        assert_eq!(p.high_side_position(4, 0.5), 4);
    }

    #[test]
    fn test_voltage_relief_on_overvoltage_feeder() {
        // feeding point at 1.0, PV pushes the far end to 1.08
        let c = chain(&[1.0, 1.02, 1.04, 1.06, 1.08], &[0.5, 0.4, 0.3, 0.2]);
        let walker = FeederWalker::new(&c.grid);
        let (low, high) = walker
            .voltage_relief_pair(c.buses[4], &c.grid, 0.6)
            .unwrap();
        // threshold = 1 + 0.6 * 0.08 = 1.048
        assert_eq!(low, c.buses[0]);
        assert_eq!(high, c.buses[2]);
    }

    #[test]
    fn test_voltage_relief_single_bus_feeder() {
        let mut grid = LvGrid::new();
        let lonely = grid.add_bus("lonely", PerUnit(0.9));
        let walker = FeederWalker::new(&grid);
        let pair = walker.voltage_relief_pair(lonely, &grid, 0.7).unwrap();
        assert_eq!(pair, (lonely, lonely));
    }
}
