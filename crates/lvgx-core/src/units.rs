//! Unit-safe quantities read from a power-flow snapshot.
//!
//! The extension algorithms only ever look at two numbers per element: the
//! per-unit voltage magnitude of a bus and the specific current (loading
//! fraction) of a section. Wrapping them keeps a loading fraction from being
//! compared against a voltage by accident.
//!
//! # Usage
//!
//! ```
//! use lvgx_core::units::{PerUnit, SpecificCurrent};
//!
//! let v = PerUnit(0.94);
//! assert!((v.deviation_from_nominal() - 0.06).abs() < 1e-12);
//!
//! let loading = SpecificCurrent(1.2);
//! assert!(loading.is_overloaded());
//!
//! // Does not compile - different units
//! // let wrong = v < loading;
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Implements the scaling and formatting shared by every unit type.
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Mul<$type> for f64 {
            type Output = $type;
            fn mul(self, rhs: $type) -> Self::Output {
                <$type>::new(self * rhs.0)
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Minimum of two values
            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            /// Maximum of two values
            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }
    };
}

// =============================================================================
// Voltage
// =============================================================================

/// Voltage magnitude in per-unit (pu)
///
/// Normalised to the nominal voltage of the grid, so a healthy LV bus sits in
/// a narrow band around 1.0 and the slack bus is pinned at exactly 1.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PerUnit(pub f64);

impl_unit_ops!(PerUnit, "pu");

impl PerUnit {
    /// One per-unit (nominal voltage)
    pub const ONE: Self = Self(1.0);

    /// Absolute distance to nominal voltage, `|v - 1|`.
    #[inline]
    pub fn deviation_from_nominal(self) -> f64 {
        (self.0 - 1.0).abs()
    }

    /// True when the magnitude sits below nominal.
    #[inline]
    pub fn is_undervoltage(self) -> bool {
        self.0 < 1.0
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Carried current divided by the rated current of a section.
///
/// Values above 1.0 mean a thermal overload; nothing here enforces that bound.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SpecificCurrent(pub f64);

impl_unit_ops!(SpecificCurrent, "of rating");

impl SpecificCurrent {
    /// Build a loading fraction from an absolute current and its rating.
    ///
    /// A non-positive rating yields zero loading instead of an infinity.
    #[inline]
    pub fn from_amperes(current_a: f64, rating_a: f64) -> Self {
        if rating_a <= 0.0 {
            Self(0.0)
        } else {
            Self(current_a.abs() / rating_a)
        }
    }

    /// True when the section carries more than its rating.
    #[inline]
    pub fn is_overloaded(self) -> bool {
        self.0 > 1.0
    }
}
