//! # lvgx-core: Low-Voltage Grid Model Core
//!
//! Provides the grid model and the two collaborator contracts that the
//! reinforcement planner in `lvgx-algo` consumes.
//!
//! ## Design Philosophy
//!
//! A low-voltage grid is modeled as an **undirected multigraph** where:
//! - **Nodes**: Buses, annotated with the per-unit voltage of a power-flow snapshot
//! - **Edges**: Sections (cables/lines), annotated with their specific current
//!
//! Buses and sections are addressed by stable integer handles ([`BusId`],
//! [`SectionId`]) instead of references, so a bus can list its sections and a
//! section its buses without any cyclic ownership. Parallel sections between
//! the same two buses are allowed.
//!
//! The planner never touches [`LvGrid`] directly. It talks to:
//! - [`GridTopology`] - voltages, loadings and incidence for any grid representation
//! - [`RouteFinder`] - an ordered shortest sequence of sections between two buses
//!
//! ## Quick Start
//!
//! ```rust
//! use lvgx_core::*;
//!
//! let mut grid = LvGrid::new();
//! let slack = grid.add_bus("slack", PerUnit(1.0));
//! let b1 = grid.add_bus("b1", PerUnit(0.98));
//! let cable = grid
//!     .add_section("slack-b1", slack, b1, SpecificCurrent(1.1))
//!     .unwrap();
//!
//! assert_eq!(grid.opposite_bus(cable, slack).unwrap(), b1);
//! assert_eq!(grid.shortest_route(b1, slack).unwrap(), vec![cable]);
//! ```
//!
//! ## Modules
//!
//! - [`topology`] - The grid query contract
//! - [`route`] - The path query contract and its shipped implementations
//! - [`graph_utils`] - Topological summaries (components, islands, voltage band)
//! - [`units`] - Per-unit voltage and loading newtypes

use petgraph::prelude::*;
use petgraph::visit::EdgeRef;
use petgraph::Undirected;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod graph_utils;
pub mod route;
pub mod topology;
pub mod units;

pub use error::{LvgxError, LvgxResult};
pub use graph_utils::*;
pub use route::{BreadthFirstRouteFinder, RouteFinder};
pub use topology::GridTopology;
pub use units::{PerUnit, SpecificCurrent};

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(usize);

impl BusId {
    #[inline]
    pub fn new(value: usize) -> Self {
        BusId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl SectionId {
    #[inline]
    pub fn new(value: usize) -> Self {
        SectionId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for BusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bus#{}", self.0)
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Section#{}", self.0)
    }
}

/// A connection point of the grid (substation busbar, cable box, meter point).
#[derive(Debug, Clone)]
pub struct Bus {
    pub id: BusId,
    pub name: String,
    /// Voltage magnitude in per-unit from the latest power flow
    pub voltage_pu: PerUnit,
}

/// A cable or line segment between exactly two buses.
#[derive(Debug, Clone)]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    /// Carried current divided by rated current
    pub abs_specific_current: SpecificCurrent,
}

/// Arena-backed low-voltage grid.
///
/// Node and edge indices are never removed, so the handles returned by
/// [`LvGrid::add_bus`] and [`LvGrid::add_section`] stay valid for the
/// lifetime of the grid.
#[derive(Debug, Default, Clone)]
pub struct LvGrid {
    pub graph: Graph<Bus, Section, Undirected>,
}

impl LvGrid {
    pub fn new() -> Self {
        Self {
            graph: Graph::new_undirected(),
        }
    }

    /// Add a bus carrying the per-unit voltage of the current snapshot.
    pub fn add_bus(&mut self, name: impl Into<String>, voltage_pu: PerUnit) -> BusId {
        let id = BusId::new(self.graph.node_count());
        let index = self.graph.add_node(Bus {
            id,
            name: name.into(),
            voltage_pu,
        });
        debug_assert_eq!(index.index(), id.value());
        id
    }

    /// Connect two distinct buses with a section.
    pub fn add_section(
        &mut self,
        name: impl Into<String>,
        a: BusId,
        b: BusId,
        abs_specific_current: SpecificCurrent,
    ) -> LvgxResult<SectionId> {
        let name = name.into();
        let a_idx = self.node_index(a)?;
        let b_idx = self.node_index(b)?;
        if a == b {
            return Err(LvgxError::SelfLoop { name, bus: a });
        }
        let id = SectionId::new(self.graph.edge_count());
        let index = self.graph.add_edge(
            a_idx,
            b_idx,
            Section {
                id,
                name,
                abs_specific_current,
            },
        );
        debug_assert_eq!(index.index(), id.value());
        Ok(id)
    }

    pub fn bus(&self, id: BusId) -> LvgxResult<&Bus> {
        self.graph
            .node_weight(NodeIndex::new(id.value()))
            .ok_or(LvgxError::UnknownBus(id))
    }

    pub fn section(&self, id: SectionId) -> LvgxResult<&Section> {
        self.graph
            .edge_weight(EdgeIndex::new(id.value()))
            .ok_or(LvgxError::UnknownSection(id))
    }

    /// Overwrite a bus voltage with the result of a newer power flow.
    pub fn set_voltage(&mut self, id: BusId, voltage_pu: PerUnit) -> LvgxResult<()> {
        let bus = self
            .graph
            .node_weight_mut(NodeIndex::new(id.value()))
            .ok_or(LvgxError::UnknownBus(id))?;
        bus.voltage_pu = voltage_pu;
        Ok(())
    }

    /// Overwrite a section loading with the result of a newer power flow.
    pub fn set_specific_current(
        &mut self,
        id: SectionId,
        abs_specific_current: SpecificCurrent,
    ) -> LvgxResult<()> {
        let section = self
            .graph
            .edge_weight_mut(EdgeIndex::new(id.value()))
            .ok_or(LvgxError::UnknownSection(id))?;
        section.abs_specific_current = abs_specific_current;
        Ok(())
    }

    /// Look a bus up by its name (first match).
    pub fn bus_by_name(&self, name: &str) -> Option<BusId> {
        self.graph
            .node_weights()
            .find(|bus| bus.name == name)
            .map(|bus| bus.id)
    }

    pub fn bus_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn section_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All buses in insertion order.
    pub fn buses(&self) -> impl Iterator<Item = &Bus> {
        self.graph.node_weights()
    }

    /// All sections in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.graph.edge_weights()
    }

    pub(crate) fn node_index(&self, id: BusId) -> LvgxResult<NodeIndex> {
        if id.value() < self.graph.node_count() {
            Ok(NodeIndex::new(id.value()))
        } else {
            Err(LvgxError::UnknownBus(id))
        }
    }
}

// The grid answers the planner's queries straight from the petgraph arena.
impl GridTopology for LvGrid {
    fn voltage_pu(&self, bus: BusId) -> LvgxResult<PerUnit> {
        Ok(self.bus(bus)?.voltage_pu)
    }

    fn connected_sections(&self, bus: BusId) -> LvgxResult<Vec<SectionId>> {
        let node = self.node_index(bus)?;
        // petgraph walks adjacency lists newest-first; report declaration order
        let mut sections: Vec<SectionId> = self
            .graph
            .edges(node)
            .map(|edge| SectionId::new(edge.id().index()))
            .collect();
        sections.sort_unstable();
        Ok(sections)
    }

    fn abs_specific_current(&self, section: SectionId) -> LvgxResult<SpecificCurrent> {
        Ok(self.section(section)?.abs_specific_current)
    }

    fn connected_buses(&self, section: SectionId) -> LvgxResult<(BusId, BusId)> {
        let (a, b) = self
            .graph
            .edge_endpoints(EdgeIndex::new(section.value()))
            .ok_or(LvgxError::UnknownSection(section))?;
        Ok((BusId::new(a.index()), BusId::new(b.index())))
    }
}
