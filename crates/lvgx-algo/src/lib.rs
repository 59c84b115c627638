//! # lvgx-algo: Reinforcement Planning for Low-Voltage Grids
//!
//! When a power-flow run over a low-voltage grid shows overloaded cables or
//! buses outside their voltage band, the usual fix is to lay a new cable in
//! parallel to part of the existing feeder. This crate decides where that
//! cable starts and ends.
//!
//! ## Extension Planning
//!
//! The [`GridExtension`] planner takes the violations of one snapshot and
//! returns an [`ExtensionPair`]:
//!
//! | Violation | Walk | Tunable |
//! |-----------|------|---------|
//! | [`ViolationKind::Thermal`] | Greedy along the most loaded sections, both directions | `relieve_factor_current` |
//! | [`ViolationKind::Voltage`] | Outward from the bus closest to nominal voltage | `relieve_factor_voltage` |
//!
//! The grid is reached only through [`lvgx_core::GridTopology`] and route
//! queries through [`lvgx_core::RouteFinder`], so the planner runs unchanged
//! over a petgraph [`lvgx_core::LvGrid`] or any other grid store.
//!
//! ## Example
//!
//! ```
//! use lvgx_algo::{ExtensionConfig, GridExtension};
//! use lvgx_core::{LvGrid, PerUnit, SpecificCurrent};
//!
//! let mut grid = LvGrid::new();
//! let slack = grid.add_bus("slack", PerUnit(1.0));
//! let b1 = grid.add_bus("b1", PerUnit(0.97));
//! let b2 = grid.add_bus("b2", PerUnit(0.94));
//! grid.add_section("slack-b1", slack, b1, SpecificCurrent(0.8)).unwrap();
//! grid.add_section("b1-b2", b1, b2, SpecificCurrent(0.4)).unwrap();
//!
//! let config = ExtensionConfig::from_toml_str("[extension]\nrelieve_factor_voltage = 0.6").unwrap();
//! let mut planner = GridExtension::with_config(&grid, &grid, config).unwrap();
//! planner.report_voltage_overload(b2).unwrap();
//!
//! // b1 at 0.97 lies within 60 % of the 0.06 deviation at b2
//! let pair = planner.find_buses_to_extend_between().unwrap().unwrap();
//! assert_eq!((pair.low_voltage_bus, pair.high_voltage_bus), (b1, slack));
//! ```

pub mod extension;

pub use extension::{
    ExtensionConfig, ExtensionPair, Feeder, FeederWalker, GridExtension, OverloadTracker,
    ViolationKind,
};
