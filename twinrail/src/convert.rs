//! Pure mapping between rail pixel offsets and normalized values.
//!
//! `value_to_position` floors the low edge and ceils the high edge. With
//! integer pixel rendering this keeps the highlight between the handles free
//! of sub-pixel gaps and overlaps, so the two directions intentionally round
//! differently.

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Handle, RailGeometry},
    px::Px,
};

/// Products closer than this to a whole pixel are treated as that pixel.
/// Absorbs `f64` noise such as `(1.0 / 49.0) * 49.0 < 1.0`.
const SNAP_TOLERANCE: f64 = 1e-9;

/// A range endpoint pair, each in `[0, 1]`, with `low <= high` once
/// normalized.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeValue {
    /// Lower bound.
    pub low: f64,
    /// Upper bound.
    pub high: f64,
}

impl RangeValue {
    /// The empty range at the start of the rail.
    pub const ZERO: Self = Self {
        low: 0.0,
        high: 0.0,
    };

    /// The full range.
    pub const FULL: Self = Self {
        low: 0.0,
        high: 1.0,
    };

    /// Creates a value as given, without normalizing.
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Reorders and clamps a pair of arbitrary numbers into a valid range.
    ///
    /// `NaN` components count as `0`.
    ///
    /// ```
    /// use twinrail::RangeValue;
    ///
    /// assert_eq!(RangeValue::ordered(0.7, 0.3), RangeValue::new(0.3, 0.7));
    /// assert_eq!(RangeValue::ordered(-2.0, 5.0), RangeValue::FULL);
    /// ```
    pub fn ordered(a: f64, b: f64) -> Self {
        let a = if a.is_nan() { 0.0 } else { a };
        let b = if b.is_nan() { 0.0 } else { b };
        Self {
            low: a.min(b).clamp(0.0, 1.0),
            high: a.max(b).clamp(0.0, 1.0),
        }
    }

    /// This value reordered and clamped.
    pub fn normalized(self) -> Self {
        Self::ordered(self.low, self.high)
    }

    /// Bitwise comparison of both components, the equality used to decide
    /// whether a gesture changed anything.
    pub fn same_as(&self, other: &Self) -> bool {
        self.low.to_bits() == other.low.to_bits() && self.high.to_bits() == other.high.to_bits()
    }
}

/// Left-edge pixel offsets of both handles along the rail.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlePosition {
    /// Left edge of the low handle.
    pub low: Px,
    /// Left edge of the high handle.
    pub high: Px,
}

impl HandlePosition {
    /// Creates a position pair.
    pub const fn new(low: Px, high: Px) -> Self {
        Self { low, high }
    }

    /// Position of the given handle.
    pub fn get(&self, handle: Handle) -> Px {
        match handle {
            Handle::Low => self.low,
            Handle::High => self.high,
        }
    }

    /// Replaces the position of the given handle.
    pub fn set(&mut self, handle: Handle, position: Px) {
        match handle {
            Handle::Low => self.low = position,
            Handle::High => self.high = position,
        }
    }

    /// Whether the pair respects the non-crossing rule for `geometry`.
    pub fn is_non_crossing(&self, geometry: &RailGeometry) -> bool {
        self.high >= self.low.saturating_add(geometry.low_span())
    }
}

/// Left edge and width of the filled region between the handle centers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightBounds {
    /// Center of the low handle.
    pub left: f32,
    /// Distance from the low handle center to the high handle center.
    pub width: f32,
}

/// Rounds products within [`SNAP_TOLERANCE`] of a whole pixel onto it, so
/// `(1.0 / 49.0) * 49.0` floors to 1 instead of 0.
fn snap(scaled: f64) -> f64 {
    let nearest = scaled.round();
    if (scaled - nearest).abs() < SNAP_TOLERANCE {
        nearest
    } else {
        scaled
    }
}

/// Maps a value onto handle positions.
///
/// ```
/// use twinrail::{Px, RailGeometry, RangeValue, value_to_position};
///
/// let geometry = RailGeometry::new(Px(100), Px(10), Px(10));
/// let position = value_to_position(&geometry, RangeValue::FULL);
/// assert_eq!((position.low, position.high), (Px(0), Px(110)));
/// ```
pub fn value_to_position(geometry: &RailGeometry, value: RangeValue) -> HandlePosition {
    let value = value.normalized();
    let rail = geometry.effective_rail().to_f64();
    let low = snap(value.low * rail).floor();
    let high = snap(value.high * rail + geometry.low_span().to_f64()).ceil();
    HandlePosition::new(
        Px::saturating_from_f64(low),
        Px::saturating_from_f64(high),
    )
}

/// Maps handle positions back onto a value.
///
/// Inverse of [`value_to_position`] up to rounding. A collapsed rail always
/// yields [`RangeValue::ZERO`].
pub fn position_to_value(geometry: &RailGeometry, position: HandlePosition) -> RangeValue {
    if geometry.is_collapsed() {
        return RangeValue::ZERO;
    }
    let rail = geometry.rail_length().to_f64();
    let low = (position.low.to_f64() / rail).max(0.0);
    let high = ((position.high.to_f64() - geometry.low_span().to_f64()) / rail).min(1.0);
    RangeValue::new(low, high).normalized()
}

/// Region between the two handle centers.
pub fn highlight_bounds(geometry: &RailGeometry, position: HandlePosition) -> HighlightBounds {
    let left = position.low.to_f32() + geometry.low_span().to_f32() / 2.0;
    let width = position.high.to_f32() + geometry.high_span().to_f32() / 2.0 - left;
    HighlightBounds { left, width }
}
