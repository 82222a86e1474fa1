//! Integer pixel unit used for rail measurements, handle offsets and pointer
//! coordinates.
//!
//! Every quantity the layout provider or the drag source hands to the engine
//! is a whole number of physical pixels along the drag axis. [`Px`] keeps
//! that explicit in signatures and provides the handful of saturating
//! operations the engine needs so that extreme pointer coordinates never
//! overflow.
//!
//! # Example
//!
//! ```
//! use twinrail::Px;
//!
//! let start = Px::new(40);
//! let delta = Px::new(200).saturating_sub(Px::new(180));
//! assert_eq!(start.saturating_add(delta), Px::new(60));
//! assert_eq!(Px::new(i32::MAX).saturating_add(Px::new(1)), Px::MAX);
//! ```

use serde::{Deserialize, Serialize};

/// A single physical pixel offset along the drag axis.
///
/// Negative values are allowed: a pointer may leave the track on the left,
/// and a misconfigured layout may report a negative rail.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash, Serialize, Deserialize,
)]
pub struct Px(pub i32);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0);

    /// The largest representable offset.
    pub const MAX: Self = Self(i32::MAX);

    /// Creates a new `Px` from a raw pixel count.
    pub const fn new(value: i32) -> Self {
        Px(value)
    }

    /// Returns the raw pixel count.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Converts to `f32`, used for highlight geometry where half pixels
    /// matter.
    pub fn to_f32(self) -> f32 {
        self.0 as f32
    }

    /// Converts to `f64`, used by the value converter.
    pub fn to_f64(self) -> f64 {
        self.0 as f64
    }

    /// Creates a `Px` from an `f64`, truncating toward zero and saturating at
    /// the `i32` bounds. `NaN` maps to zero.
    ///
    /// ```
    /// use twinrail::Px;
    ///
    /// assert_eq!(Px::saturating_from_f64(42.9), Px(42));
    /// assert_eq!(Px::saturating_from_f64(f64::MAX), Px::MAX);
    /// assert_eq!(Px::saturating_from_f64(f64::NAN), Px::ZERO);
    /// ```
    pub fn saturating_from_f64(value: f64) -> Self {
        // `as` saturates and maps NaN to 0
        Px(value as i32)
    }

    /// Saturating addition.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Px(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Px(self.0.saturating_sub(rhs.0))
    }

    /// Returns the value clamped to be non-negative.
    pub fn non_negative(self) -> Self {
        Px(self.0.max(0))
    }
}

impl From<i32> for Px {
    fn from(value: i32) -> Self {
        Px(value)
    }
}

impl std::fmt::Display for Px {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}px", self.0)
    }
}
