//! Non-crossing constraint between the two handles.
//!
//! This is the only place the rule `high >= low + low_span` is enforced. It
//! runs on every pointer move so a handle stops at the boundary instead of
//! jumping back once the gesture ends.

use crate::{
    convert::HandlePosition,
    geometry::{Handle, RailGeometry},
    px::Px,
};

/// Resolves the allowed position for `handle` given a raw `proposed` offset
/// and the current positions of both handles.
///
/// Only the other handle's entry of `current` is read. When the proposal
/// would cross it, the result is pinned exactly at the touching position.
///
/// ```
/// use twinrail::{Handle, HandlePosition, Px, RailGeometry, resolve};
///
/// let geometry = RailGeometry::new(Px(100), Px(10), Px(10));
/// let current = HandlePosition::new(Px(0), Px(110));
/// assert_eq!(resolve(&geometry, Handle::Low, Px(200), current), Px(100));
/// assert_eq!(resolve(&geometry, Handle::Low, Px(40), current), Px(40));
/// ```
pub fn resolve(
    geometry: &RailGeometry,
    handle: Handle,
    proposed: Px,
    current: HandlePosition,
) -> Px {
    match handle {
        Handle::Low => {
            let limit = current.high.saturating_sub(geometry.low_span());
            if proposed >= limit { limit } else { proposed }
        }
        Handle::High => {
            let limit = current.low.saturating_add(geometry.low_span());
            if proposed <= limit { limit } else { proposed }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn geometry() -> RailGeometry {
        RailGeometry::new(Px(100), Px(10), Px(10))
    }

    #[test]
    fn low_handle_pins_against_high() {
        let current = HandlePosition::new(Px(0), Px(110));
        assert_eq!(resolve(&geometry(), Handle::Low, Px(200), current), Px(100));
        assert_eq!(resolve(&geometry(), Handle::Low, Px(100), current), Px(100));
        assert_eq!(resolve(&geometry(), Handle::Low, Px(99), current), Px(99));
    }

    #[test]
    fn high_handle_pins_against_low() {
        let current = HandlePosition::new(Px(30), Px(110));
        assert_eq!(resolve(&geometry(), Handle::High, Px(0), current), Px(40));
        assert_eq!(resolve(&geometry(), Handle::High, Px(41), current), Px(41));
    }

    #[test]
    fn resolver_ignores_the_moved_handles_current_entry() {
        let current = HandlePosition::new(Px(95), Px(60));
        // The low entry is stale; only high limits the low handle.
        assert_eq!(resolve(&geometry(), Handle::Low, Px(10), current), Px(10));
    }

    #[test]
    fn outward_moves_are_left_to_the_converter() {
        let current = HandlePosition::new(Px(20), Px(60));
        assert_eq!(resolve(&geometry(), Handle::Low, Px(-30), current), Px(-30));
        assert_eq!(resolve(&geometry(), Handle::High, Px(500), current), Px(500));
    }

    proptest! {
        #[test]
        fn resolved_pairs_never_cross(
            low in -500i32..500,
            high in -500i32..500,
            proposed in -1000i32..1000,
            span in 0i32..50,
        ) {
            let geometry = RailGeometry::new(Px(100), Px(span), Px(span));
            let start = HandlePosition::new(Px(low), Px(low + span + high.abs()));

            let mut moved = start;
            moved.low = resolve(&geometry, Handle::Low, Px(proposed), start);
            prop_assert!(moved.is_non_crossing(&geometry));

            let mut moved = start;
            moved.high = resolve(&geometry, Handle::High, Px(proposed), start);
            prop_assert!(moved.is_non_crossing(&geometry));
        }
    }
}
