//! Static layout measurements of the track and the two handles.
//!
//! The low handle is aligned on its right border and the high handle on its
//! left border, which lets both handles report the same value while sitting
//! side by side. The room left for travel is therefore the track width minus
//! both handle footprints.

use serde::{Deserialize, Serialize};

use crate::px::Px;

/// Identifies one of the two handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    /// The handle holding the lower bound of the range.
    Low,
    /// The handle holding the upper bound of the range.
    High,
}

impl Handle {
    /// Both handles, low first.
    pub const ALL: [Handle; 2] = [Handle::Low, Handle::High];

    /// The handle this one is constrained against.
    pub fn other(self) -> Handle {
        match self {
            Handle::Low => Handle::High,
            Handle::High => Handle::Low,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Handle::Low => 0,
            Handle::High => 1,
        }
    }
}

/// Post-layout measurements of one handle element.
///
/// The handle's footprint on the rail includes its borders.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HandleMetrics {
    /// Content width.
    pub width: Px,
    /// Left border width.
    pub border_left: Px,
    /// Right border width.
    pub border_right: Px,
}

impl HandleMetrics {
    /// Metrics for a borderless handle of the given width.
    pub fn new(width: Px) -> Self {
        Self {
            width,
            border_left: Px::ZERO,
            border_right: Px::ZERO,
        }
    }

    /// Sets both border widths.
    pub fn with_borders(mut self, left: Px, right: Px) -> Self {
        self.border_left = left;
        self.border_right = right;
        self
    }

    /// Total footprint of the handle along the rail.
    pub fn span(&self) -> Px {
        self.width
            .saturating_add(self.border_left)
            .saturating_add(self.border_right)
    }
}

/// Rail length and handle footprints, fixed once the track is laid out.
///
/// A zero or negative rail is accepted: every value then collapses onto the
/// start of the rail.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RailGeometry {
    rail_length: Px,
    low_span: Px,
    high_span: Px,
}

impl RailGeometry {
    /// Creates geometry from an already computed rail length and spans.
    pub fn new(rail_length: Px, low_span: Px, high_span: Px) -> Self {
        Self {
            rail_length,
            low_span,
            high_span,
        }
    }

    /// Derives geometry from the full track width and both handles'
    /// measurements.
    ///
    /// ```
    /// use twinrail::{HandleMetrics, Px, RailGeometry};
    ///
    /// let thumb = HandleMetrics::new(Px(8)).with_borders(Px(1), Px(1));
    /// let geometry = RailGeometry::measure(Px(120), thumb, thumb);
    /// assert_eq!(geometry.rail_length(), Px(100));
    /// assert_eq!(geometry.low_span(), Px(10));
    /// ```
    pub fn measure(track_width: Px, low: HandleMetrics, high: HandleMetrics) -> Self {
        let low_span = low.span();
        let high_span = high.span();
        let rail_length = track_width.saturating_sub(low_span).saturating_sub(high_span);
        Self::new(rail_length, low_span, high_span)
    }

    /// Pixels available for handle travel, as measured. May be zero or
    /// negative.
    pub fn rail_length(&self) -> Px {
        self.rail_length
    }

    /// Footprint of the low handle.
    pub fn low_span(&self) -> Px {
        self.low_span
    }

    /// Footprint of the high handle.
    pub fn high_span(&self) -> Px {
        self.high_span
    }

    /// Footprint of the given handle.
    pub fn span(&self, handle: Handle) -> Px {
        match handle {
            Handle::Low => self.low_span,
            Handle::High => self.high_span,
        }
    }

    /// Returns `true` when there is no room to travel.
    pub fn is_collapsed(&self) -> bool {
        self.rail_length <= Px::ZERO
    }

    /// Rail length used for conversions, never negative.
    pub(crate) fn effective_rail(&self) -> Px {
        self.rail_length.non_negative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_subtracts_both_footprints() {
        let low = HandleMetrics::new(Px(10)).with_borders(Px(2), Px(3));
        let high = HandleMetrics::new(Px(12));
        let geometry = RailGeometry::measure(Px(200), low, high);

        assert_eq!(geometry.low_span(), Px(15));
        assert_eq!(geometry.high_span(), Px(12));
        assert_eq!(geometry.rail_length(), Px(173));
        assert_eq!(geometry.span(Handle::High), Px(12));
        assert!(!geometry.is_collapsed());
    }

    #[test]
    fn narrow_track_is_collapsed_not_rejected() {
        let thumb = HandleMetrics::new(Px(20));
        let geometry = RailGeometry::measure(Px(30), thumb, thumb);
        assert_eq!(geometry.rail_length(), Px(-10));
        assert!(geometry.is_collapsed());
        assert_eq!(geometry.effective_rail(), Px::ZERO);
    }

    #[test]
    fn default_geometry_is_collapsed() {
        assert!(RailGeometry::default().is_collapsed());
    }

    #[test]
    fn other_handle() {
        assert_eq!(Handle::Low.other(), Handle::High);
        assert_eq!(Handle::High.other(), Handle::Low);
        assert_eq!(Handle::ALL.map(Handle::index), [0, 1]);
    }
}
