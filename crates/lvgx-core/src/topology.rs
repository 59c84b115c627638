//! The grid query contract.
//!
//! Anything that can answer these four questions about a power-flow snapshot
//! can be reinforced by the planner: a petgraph [`LvGrid`](crate::LvGrid), a
//! view over a database, or a hand-written fixture in a test.

use crate::{BusId, LvgxError, LvgxResult, PerUnit, SectionId, SpecificCurrent};

/// Read-only view of buses, sections and their power-flow results.
///
/// Implementations return [`LvgxError::UnknownBus`] /
/// [`LvgxError::UnknownSection`] for handles they do not own.
pub trait GridTopology {
    /// Per-unit voltage magnitude of a bus.
    fn voltage_pu(&self, bus: BusId) -> LvgxResult<PerUnit>;

    /// Sections incident to a bus. Callers must not rely on the order for
    /// anything but deterministic tie-breaking.
    fn connected_sections(&self, bus: BusId) -> LvgxResult<Vec<SectionId>>;

    /// Loading fraction of a section.
    fn abs_specific_current(&self, section: SectionId) -> LvgxResult<SpecificCurrent>;

    /// The two distinct buses a section connects, in declaration order.
    fn connected_buses(&self, section: SectionId) -> LvgxResult<(BusId, BusId)>;

    /// The bus at the far end of `section`, seen from `bus`.
    ///
    /// Fails with [`LvgxError::DisconnectedSection`] when `bus` is not one of
    /// the section's two ends.
    fn opposite_bus(&self, section: SectionId, bus: BusId) -> LvgxResult<BusId> {
        let (a, b) = self.connected_buses(section)?;
        if a == bus {
            Ok(b)
        } else if b == bus {
            Ok(a)
        } else {
            Err(LvgxError::DisconnectedSection { section, bus })
        }
    }
}

impl<T: GridTopology + ?Sized> GridTopology for &T {
    fn voltage_pu(&self, bus: BusId) -> LvgxResult<PerUnit> {
        (**self).voltage_pu(bus)
    }

    fn connected_sections(&self, bus: BusId) -> LvgxResult<Vec<SectionId>> {
        (**self).connected_sections(bus)
    }

    fn abs_specific_current(&self, section: SectionId) -> LvgxResult<SpecificCurrent> {
        (**self).abs_specific_current(section)
    }

    fn connected_buses(&self, section: SectionId) -> LvgxResult<(BusId, BusId)> {
        (**self).connected_buses(section)
    }
}
