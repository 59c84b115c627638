use crate::{BusId, LvGrid, PerUnit, SpecificCurrent};
use petgraph::algo::connected_components;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Summary of a grid snapshot: size, connectivity, voltage band and peak loading.
#[derive(Debug, Clone, PartialEq)]
pub struct GridStats {
    pub bus_count: usize,
    pub section_count: usize,
    pub connected_components: usize,
    pub min_voltage: Option<PerUnit>,
    pub max_voltage: Option<PerUnit>,
    pub max_specific_current: Option<SpecificCurrent>,
    pub overloaded_sections: usize,
}

/// One electrically connected part of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandSummary {
    pub island_id: usize,
    pub bus_count: usize,
}

/// Tags a bus with the island it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct BusAssignment {
    pub bus: BusId,
    pub label: String,
    pub island_id: usize,
}

/// Aggregated island analysis result.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandAnalysis {
    pub islands: Vec<IslandSummary>,
    pub assignments: Vec<BusAssignment>,
}

/// Collects size, component count and the voltage/loading envelope of a grid.
pub fn grid_stats(grid: &LvGrid) -> GridStats {
    let min_voltage = grid.buses().map(|bus| bus.voltage_pu).reduce(PerUnit::min);
    let max_voltage = grid.buses().map(|bus| bus.voltage_pu).reduce(PerUnit::max);
    let max_specific_current = grid
        .sections()
        .map(|section| section.abs_specific_current)
        .reduce(SpecificCurrent::max);
    let overloaded_sections = grid
        .sections()
        .filter(|section| section.abs_specific_current.is_overloaded())
        .count();

    GridStats {
        bus_count: grid.bus_count(),
        section_count: grid.section_count(),
        connected_components: connected_components(&grid.graph),
        min_voltage,
        max_voltage,
        max_specific_current,
        overloaded_sections,
    }
}

/// Labels every bus with its island.
///
/// Islands are numbered in order of their lowest bus handle, and assignments
/// come back sorted by bus.
pub fn find_islands(grid: &LvGrid) -> IslandAnalysis {
    let mut sets = UnionFind::<usize>::new(grid.bus_count());
    for edge in grid.graph.edge_references() {
        sets.union(edge.source().index(), edge.target().index());
    }

    let mut island_of_root: HashMap<usize, usize> = HashMap::new();
    let mut islands: Vec<IslandSummary> = Vec::new();
    let mut assignments = Vec::with_capacity(grid.bus_count());
    for bus in grid.buses() {
        let root = sets.find(bus.id.value());
        let island_id = *island_of_root.entry(root).or_insert_with(|| {
            islands.push(IslandSummary {
                island_id: islands.len(),
                bus_count: 0,
            });
            islands.len() - 1
        });
        islands[island_id].bus_count += 1;
        assignments.push(BusAssignment {
            bus: bus.id,
            label: bus.name.clone(),
            island_id,
        });
    }
    IslandAnalysis {
        islands,
        assignments,
    }
}
