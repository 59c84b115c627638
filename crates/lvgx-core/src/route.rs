//! The path query contract.
//!
//! The voltage-relief walk needs the shortest sequence of sections between the
//! two voltage extrema of a feeder. How that sequence is found is up to the
//! surrounding application; a grid with a known layout can answer from a
//! lookup table while an unknown one falls back to a search.
//!
//! Shipped implementations:
//!
//! | Finder | Works on | Method |
//! |--------|----------|--------|
//! | [`LvGrid`] | the petgraph arena | A* with unit weights (hop count) |
//! | [`BreadthFirstRouteFinder`] | any [`GridTopology`] | brute-force breadth-first search |
//! | `Fn(BusId, BusId) -> LvgxResult<Vec<SectionId>>` | canned routes | whatever the closure does |
//!
//! Routes are trusted: the planner does not check that they are shortest, only
//! that consecutive sections share a bus when it walks them.

use std::collections::{HashMap, VecDeque};

use petgraph::algo::astar;
use petgraph::visit::EdgeRef;

use crate::{BusId, GridTopology, LvGrid, LvgxError, LvgxResult, SectionId};

/// Supplies the ordered shortest route of sections between two buses.
pub trait RouteFinder {
    /// Sections leading from `start` to `goal`, first section touching `start`.
    ///
    /// An empty route means `start == goal`.
    fn shortest_route(&self, start: BusId, goal: BusId) -> LvgxResult<Vec<SectionId>>;
}

impl<F> RouteFinder for F
where
    F: Fn(BusId, BusId) -> LvgxResult<Vec<SectionId>>,
{
    fn shortest_route(&self, start: BusId, goal: BusId) -> LvgxResult<Vec<SectionId>> {
        self(start, goal)
    }
}

impl RouteFinder for LvGrid {
    fn shortest_route(&self, start: BusId, goal: BusId) -> LvgxResult<Vec<SectionId>> {
        let start_idx = self.node_index(start)?;
        let goal_idx = self.node_index(goal)?;
        let (_, nodes) = astar(
            &self.graph,
            start_idx,
            |node| node == goal_idx,
            |_| 1usize,
            |_| 0usize,
        )
        .ok_or(LvgxError::NoRoute { start, goal })?;

        let mut route = Vec::with_capacity(nodes.len().saturating_sub(1));
        for pair in nodes.windows(2) {
            // Parallel sections: the lowest handle wins so routes are reproducible
            let section = self
                .graph
                .edges_connecting(pair[0], pair[1])
                .map(|edge| edge.id().index())
                .min()
                .ok_or(LvgxError::NoRoute { start, goal })?;
            route.push(SectionId::new(section));
        }
        Ok(route)
    }
}

/// Brute-force breadth-first route search over any [`GridTopology`].
///
/// Explores every bus reachable from the start, so it costs O(buses +
/// sections) per query. Grids with exploitable structure (a single radial
/// feeder, a known ring) should bring their own [`RouteFinder`].
#[derive(Debug, Clone, Copy)]
pub struct BreadthFirstRouteFinder<'a, G: ?Sized> {
    topology: &'a G,
}

impl<'a, G: GridTopology + ?Sized> BreadthFirstRouteFinder<'a, G> {
    pub fn new(topology: &'a G) -> Self {
        Self { topology }
    }
}

impl<G: GridTopology + ?Sized> RouteFinder for BreadthFirstRouteFinder<'_, G> {
    fn shortest_route(&self, start: BusId, goal: BusId) -> LvgxResult<Vec<SectionId>> {
        // Validate both handles up front so a foreign goal is not reported as NoRoute
        self.topology.voltage_pu(start)?;
        self.topology.voltage_pu(goal)?;

        let mut reached_via: HashMap<BusId, Option<(BusId, SectionId)>> = HashMap::new();
        reached_via.insert(start, None);
        let mut queue = VecDeque::from([start]);

        while let Some(bus) = queue.pop_front() {
            if bus == goal {
                break;
            }
            for section in self.topology.connected_sections(bus)? {
                let next = self.topology.opposite_bus(section, bus)?;
                if !reached_via.contains_key(&next) {
                    reached_via.insert(next, Some((bus, section)));
                    queue.push_back(next);
                }
            }
        }

        if !reached_via.contains_key(&goal) {
            return Err(LvgxError::NoRoute { start, goal });
        }

        let mut route = Vec::new();
        let mut cursor = goal;
        while let Some(&Some((previous, section))) = reached_via.get(&cursor) {
            route.push(section);
            cursor = previous;
        }
        route.reverse();
        Ok(route)
    }
}
