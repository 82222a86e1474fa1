//! Constraint and synchronization engine for dual-handle range sliders.
//!
//! A range slider has two handles on one track. The low handle sits on its
//! right border and the high handle on its left border, so both can hold the
//! same value while side by side. This crate owns everything between raw
//! pointer input and the bound value:
//!
//! - [`RailGeometry`] describes the track after layout,
//! - [`value_to_position`] and [`position_to_value`] convert between pixel
//!   offsets and normalized values,
//! - [`resolve`] keeps the handles from crossing,
//! - [`DragSessions`] runs one gesture state machine per handle,
//! - [`BindingSynchronizer`] keeps the working value and a [`ValueStore`]
//!   field in agreement without notification loops,
//! - [`RangeSliderController`] wires them together for a host widget.
//!
//! Rendering, pointer capture and persistence stay with the host.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use twinrail::{
//!     Handle, HandleMetrics, MemoryStore, Px, RangeSliderArgs, RangeSliderController,
//!     RangeValue, ValueStore,
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! store.set("filters.price", json!([0.0, 1.0]));
//!
//! let slider = RangeSliderController::new(
//!     RangeSliderArgs::default()
//!         .id("price")
//!         .width(Px(120))
//!         .bind(store.clone(), "filters.price")
//!         .on_change(|value| println!("committed {value:?}")),
//! )?;
//! slider.initialize(HandleMetrics::new(Px(10)), HandleMetrics::new(Px(10)));
//!
//! slider.on_drag_start(Handle::High, Px(300));
//! slider.on_drag_end(Handle::High, Px(250));
//!
//! assert_eq!(slider.value(), RangeValue::new(0.0, 0.5));
//! assert_eq!(store.read("filters.price"), Some(json!([0.0, 0.5])));
//! # Ok::<(), twinrail::ConfigError>(())
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

mod args;
mod binding;
mod callback;
mod constraint;
mod controller;
mod convert;
mod drag;
mod geometry;
mod px;
mod store;

pub use args::{Binding, ConfigError, DEFAULT_WIDTH, RangeSliderArgs};
pub use binding::{BindingSynchronizer, normalize_bound_value, to_bound_value};
pub use callback::CallbackWith;
pub use constraint::resolve;
pub use controller::{RangeSliderController, SliderDisplay};
pub use convert::{
    HandlePosition, HighlightBounds, RangeValue, highlight_bounds, position_to_value,
    value_to_position,
};
pub use drag::{DragEvent, DragPhase, DragSession, DragSessions, DragStep};
pub use geometry::{Handle, HandleMetrics, RailGeometry};
pub use px::Px;
pub use store::{MemoryStore, StoreListener, SubscriptionId, ValueStore};
