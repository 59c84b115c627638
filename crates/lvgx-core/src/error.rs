//! Unified error types for the grid extension crates
//!
//! Every failure in this workspace is a caller contract violation (a relieve
//! factor outside `[0, 1]`, a handle that does not belong to the grid, a route
//! whose sections do not chain). None of them are retried; they surface
//! through `?` to whoever asked for the extension.
//!
//! # Example
//!
//! ```ignore
//! use lvgx_core::{LvgxError, LvgxResult};
//!
//! fn far_end(grid: &LvGrid, section: SectionId, bus: BusId) -> LvgxResult<BusId> {
//!     grid.opposite_bus(section, bus)
//! }
//! ```

use crate::{BusId, SectionId};
use thiserror::Error;

/// Unified error type for all grid extension operations.
#[derive(Error, Debug)]
pub enum LvgxError {
    /// A tunable parameter was set outside its allowed range
    #[error("Invalid parameter: {name} must be between 0 and 1, but was {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The opposing end of a section was requested for a bus it does not touch
    #[error("Section {section} does not connect to bus {bus}; no opposing end exists")]
    DisconnectedSection { section: SectionId, bus: BusId },

    /// A bus handle that the grid does not know
    #[error("Unknown bus: {0}")]
    UnknownBus(BusId),

    /// A section handle that the grid does not know
    #[error("Unknown section: {0}")]
    UnknownSection(SectionId),

    /// A section was declared with the same bus at both ends
    #[error("Section '{name}' would connect bus {bus} to itself")]
    SelfLoop { name: String, bus: BusId },

    /// No path of sections connects the two buses
    #[error("No route between bus {start} and bus {goal}")]
    NoRoute { start: BusId, goal: BusId },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results using LvgxError.
pub type LvgxResult<T> = Result<T, LvgxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LvgxError::InvalidParameter {
            name: "relieve_factor_current",
            value: 1.5,
        };
        assert!(err.to_string().contains("relieve_factor_current"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_disconnected_section_display() {
        let err = LvgxError::DisconnectedSection {
            section: SectionId::new(3),
            bus: BusId::new(7),
        };
        let msg = err.to_string();
        assert!(msg.contains("Section#3"));
        assert!(msg.contains("Bus#7"));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> LvgxResult<()> {
            Err(LvgxError::UnknownBus(BusId::new(0)))
        }

        fn outer() -> LvgxResult<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(LvgxError::UnknownBus(_))));
    }
}
