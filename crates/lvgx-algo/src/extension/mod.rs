//! Parallel-cable extension planning
//!
//! A new cable is laid alongside an existing feeder between two of its buses.
//! This module picks those two buses for the single worst violation of a
//! power-flow snapshot.
//!
//! ## Workflow
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  power-flow result                                                   │
//! │    │                                                                 │
//! │    ├─ report_current_overload(section)  ─┐                           │
//! │    └─ report_voltage_overload(bus)      ─┴─► OverloadTracker         │
//! │                                              (worst of each kind)    │
//! │                                                   │                  │
//! │  find_buses_to_extend_between()                   ▼                  │
//! │    current overload?  ── yes ─► thermal walk (FeederWalker)          │
//! │          │ no                                                        │
//! │    voltage overload?  ── yes ─► extrema ─► route ─► centre ─► widen  │
//! │          │ no                                                        │
//! │          ▼                                                           │
//! │        None                                                          │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thermal Relief
//!
//! From the overloaded section the walk moves toward higher and toward lower
//! voltage, each time over the most loaded section that continues the
//! gradient. It stops before the first section carrying less than
//! `(1 - relieve_factor_current)` of the overload.
//!
//! ## Voltage Relief
//!
//! The feeder through the violating bus is followed to its voltage minimum
//! and maximum. Along the shortest route between them the bus closest to
//! nominal voltage is the centre; from there the cable is widened toward
//! each end while the deviation stays within `relieve_factor_voltage` of that
//! end's deviation.
//!
//! ## Configuration
//!
//! See [`ExtensionConfig`] for the TOML layout.

mod config;
mod resolver;
mod tracker;
mod walker;

pub use config::{
    check_relieve_factor, ExtensionConfig, DEFAULT_RELIEVE_FACTOR_CURRENT,
    DEFAULT_RELIEVE_FACTOR_VOLTAGE,
};
pub use resolver::{ExtensionPair, GridExtension, ViolationKind};
pub use tracker::{CurrentOverload, OverloadTracker, VoltageOverload};
pub use walker::{Direction, Feeder, FeederBranch, FeederProfile, FeederWalker, WalkStep};
