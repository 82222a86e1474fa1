//! The range slider controller.
//!
//! [`RangeSliderController`] ties the pieces together: it owns the rail
//! geometry, the displayed positions, the working value and both drag
//! sessions, and keeps the working value in sync with the bound store.
//!
//! Store writes and user callbacks always run with the controller's state
//! lock released, so a callback may query the controller or write the store
//! again without deadlocking.

use std::sync::{
    Arc, Weak,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    args::{ConfigError, RangeSliderArgs},
    binding::BindingSynchronizer,
    callback::CallbackWith,
    convert::{HandlePosition, HighlightBounds, RangeValue, highlight_bounds, value_to_position},
    drag::{DragEvent, DragPhase, DragSessions},
    geometry::{Handle, HandleMetrics, RailGeometry},
    px::Px,
};

static NEXT_DYNAMIC_ID: AtomicU64 = AtomicU64::new(0);

fn dynamic_id() -> String {
    format!("twinrail{}", NEXT_DYNAMIC_ID.fetch_add(1, Ordering::Relaxed))
}

/// Everything a renderer needs to draw the slider.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderDisplay {
    /// Left edges of both handles.
    pub positions: HandlePosition,
    /// Filled region between them.
    pub highlight: HighlightBounds,
}

#[derive(Default)]
struct SliderState {
    geometry: RailGeometry,
    positions: HandlePosition,
    value: RangeValue,
    sessions: DragSessions,
    initialized: bool,
}

impl SliderState {
    fn display(&self) -> SliderDisplay {
        SliderDisplay {
            positions: self.positions,
            highlight: highlight_bounds(&self.geometry, self.positions),
        }
    }

    /// Re-derives positions from the working value.
    fn refresh(&mut self) -> Option<SliderDisplay> {
        if !self.initialized {
            return None;
        }
        self.positions = value_to_position(&self.geometry, self.value);
        Some(self.display())
    }
}

struct Shared {
    id: String,
    width: Px,
    binding: Option<BindingSynchronizer>,
    on_change: CallbackWith<RangeValue>,
    on_display: CallbackWith<SliderDisplay>,
    state: Mutex<SliderState>,
    disposed: AtomicBool,
}

impl Shared {
    fn pull(&self) {
        let Some(binding) = &self.binding else {
            return;
        };
        let current = self.state.lock().value;
        let value = binding.pull(current);
        self.state.lock().value = value;
    }

    fn emit_display(&self, display: Option<SliderDisplay>) {
        if let Some(display) = display {
            self.on_display.call(display);
        }
    }

    fn sync_from_store(&self) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }
        self.pull();
        let display = self.state.lock().refresh();
        self.emit_display(display);
    }

    fn on_external_change(&self) {
        if self
            .binding
            .as_ref()
            .is_some_and(BindingSynchronizer::is_suppressed)
        {
            trace!(id = %self.id, "ignoring echo of own store write");
            return;
        }
        debug!(id = %self.id, "bound value changed externally");
        self.sync_from_store();
    }

    fn accepts_drag(&self, handle: Handle) -> bool {
        if self.disposed.load(Ordering::Acquire) {
            debug!(id = %self.id, ?handle, "drag event after dispose ignored");
            return false;
        }
        if !self.state.lock().initialized {
            debug!(id = %self.id, ?handle, "drag event before initialization ignored");
            return false;
        }
        true
    }

    /// Applies one pointer coordinate. Returns `false` when `handle` has no
    /// active session.
    fn apply_drag(&self, handle: Handle, pointer: Px) -> bool {
        let changed = {
            let mut state = self.state.lock();
            let SliderState {
                geometry,
                positions,
                sessions,
                value,
                ..
            } = &mut *state;
            let Some(step) = sessions.step(handle, pointer, geometry, positions) else {
                return false;
            };
            trace!(
                id = %self.id,
                ?handle,
                raw_pointer = pointer.raw(),
                resolved = step.resolved.raw(),
                "drag step"
            );
            if step.moved() && !step.value.same_as(value) {
                *value = step.value;
                true
            } else {
                false
            }
        };

        if changed {
            if let Some(binding) = &self.binding {
                let value = self.state.lock().value;
                binding.push(value);
            }
            let display = self.state.lock().refresh();
            self.emit_display(display);
        } else {
            // Pinned or not moved: value unchanged, but the display still
            // snaps back to the stored value.
            self.sync_from_store();
        }
        true
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(binding) = &self.binding {
            binding.detach();
        }
    }
}

/// Controller for a dual-handle range slider.
///
/// Cloning yields another handle on the same slider.
///
/// ```
/// use std::sync::Arc;
///
/// use serde_json::json;
/// use twinrail::{HandleMetrics, MemoryStore, Px, RangeSliderArgs, RangeSliderController};
///
/// let store = Arc::new(MemoryStore::new());
/// store.set("range", json!([0.0, 1.0]));
///
/// let slider = RangeSliderController::new(
///     RangeSliderArgs::default()
///         .width(Px(120))
///         .bind(store.clone(), "range"),
/// )?;
/// let thumb = HandleMetrics::new(Px(10));
/// slider.initialize(thumb, thumb);
///
/// let positions = slider.handle_positions();
/// assert_eq!((positions.low, positions.high), (Px(0), Px(110)));
/// # Ok::<(), twinrail::ConfigError>(())
/// ```
#[derive(Clone)]
pub struct RangeSliderController {
    shared: Arc<Shared>,
}

impl RangeSliderController {
    /// Validates `args`, subscribes to the bound store field and reads the
    /// initial value.
    pub fn new(args: RangeSliderArgs) -> Result<Self, ConfigError> {
        args.validate()?;

        let id = args.id.unwrap_or_else(dynamic_id);
        let binding = args
            .bind
            .map(|bind| BindingSynchronizer::new(bind.store, bind.path));

        let shared = Arc::new(Shared {
            id,
            width: args.width,
            binding,
            on_change: args.on_change,
            on_display: args.on_display,
            state: Mutex::new(SliderState {
                value: args.value.normalized(),
                ..SliderState::default()
            }),
            disposed: AtomicBool::new(false),
        });

        if let Some(binding) = &shared.binding {
            binding.attach(store_listener(
                Arc::downgrade(&shared),
                binding.suppression_flag(),
            ));
        }
        shared.pull();

        debug!(id = %shared.id, width = shared.width.raw(), "range slider created");
        Ok(Self { shared })
    }

    /// Applies post-layout handle measurements against the configured width.
    pub fn initialize(&self, low: HandleMetrics, high: HandleMetrics) {
        self.initialize_with(RailGeometry::measure(self.shared.width, low, high));
    }

    /// Applies an already computed geometry, re-reads the store and renders
    /// the initial positions.
    pub fn initialize_with(&self, geometry: RailGeometry) {
        if self.is_disposed() {
            return;
        }
        {
            let mut state = self.shared.state.lock();
            state.geometry = geometry;
            state.initialized = true;
        }
        debug!(
            id = %self.shared.id,
            rail = geometry.rail_length().raw(),
            low_span = geometry.low_span().raw(),
            high_span = geometry.high_span().raw(),
            "range slider initialized"
        );
        self.shared.sync_from_store();
    }

    /// Id the drag source uses for `handle`.
    pub fn source_id(&self, handle: Handle) -> String {
        match handle {
            Handle::Low => format!("{}_first", self.shared.id),
            Handle::High => format!("{}_second", self.shared.id),
        }
    }

    /// Maps a drag source id to the handle it belongs to.
    pub fn handle_for_source(&self, source: &str) -> Option<Handle> {
        Handle::ALL
            .into_iter()
            .find(|handle| self.source_id(*handle) == source)
    }

    /// Routes a raw drag source event. Events for unknown sources are
    /// ignored.
    pub fn dispatch(&self, event: &DragEvent) {
        let Some(handle) = self.handle_for_source(&event.source) else {
            debug!(
                id = %self.shared.id,
                source = %event.source,
                "drag event for unknown source ignored"
            );
            return;
        };
        match event.phase {
            DragPhase::Start => self.on_drag_start(handle, event.coordinate),
            DragPhase::Move => self.on_drag_move(handle, event.coordinate),
            DragPhase::End => self.on_drag_end(handle, event.coordinate),
        }
    }

    /// Begins a gesture on `handle` at `pointer`.
    #[tracing::instrument(level = "trace", skip(self), fields(id = %self.shared.id))]
    pub fn on_drag_start(&self, handle: Handle, pointer: Px) {
        if !self.shared.accepts_drag(handle) {
            return;
        }
        let mut state = self.shared.state.lock();
        let (positions, value) = (state.positions, state.value);
        state.sessions.start(handle, pointer, positions, value);
    }

    /// Moves `handle` to follow `pointer`, writing the live value to the
    /// store.
    #[tracing::instrument(level = "trace", skip(self), fields(id = %self.shared.id))]
    pub fn on_drag_move(&self, handle: Handle, pointer: Px) {
        if !self.shared.accepts_drag(handle) {
            return;
        }
        if !self.shared.apply_drag(handle, pointer) {
            debug!(?handle, "drag move without active session ignored");
        }
    }

    /// Ends the gesture on `handle`, firing `on_change` if the value differs
    /// from the one at drag start.
    #[tracing::instrument(level = "trace", skip(self), fields(id = %self.shared.id))]
    pub fn on_drag_end(&self, handle: Handle, pointer: Px) {
        if !self.shared.accepts_drag(handle) {
            return;
        }
        if !self.shared.apply_drag(handle, pointer) {
            debug!(?handle, "drag end without active session ignored");
            return;
        }
        let (session, value) = {
            let mut state = self.shared.state.lock();
            (state.sessions.finish(handle), state.value)
        };
        let Some(session) = session else {
            return;
        };
        if !session.snapshot().same_as(&value) {
            debug!(?handle, low = value.low, high = value.high, "range change committed");
            self.shared.on_change.call(value);
        }
    }

    /// Reacts to a change of the bound store field. Ignored while the
    /// controller itself is writing.
    pub fn on_external_change(&self) {
        self.shared.on_external_change();
    }

    /// Releases the store subscription and drops active gestures. Calling it
    /// again does nothing.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(binding) = &self.shared.binding {
            binding.detach();
        }
        self.shared.state.lock().sessions.clear();
        debug!(id = %self.shared.id, "range slider disposed");
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::Acquire)
    }

    /// Widget id, configured or generated.
    pub fn id(&self) -> &str {
        &self.shared.id
    }

    /// Current working value.
    pub fn value(&self) -> RangeValue {
        self.shared.state.lock().value
    }

    /// Left-edge offsets of both handles.
    pub fn handle_positions(&self) -> HandlePosition {
        self.shared.state.lock().positions
    }

    /// Filled region between the handles.
    pub fn highlight_bounds(&self) -> HighlightBounds {
        self.shared.state.lock().display().highlight
    }

    /// Positions and highlight together.
    pub fn display(&self) -> SliderDisplay {
        self.shared.state.lock().display()
    }

    /// Geometry from the last initialization, all zero before it.
    pub fn geometry(&self) -> RailGeometry {
        self.shared.state.lock().geometry
    }

    /// Whether `handle` has an active gesture.
    pub fn is_dragging(&self, handle: Handle) -> bool {
        self.shared.state.lock().sessions.is_dragging(handle)
    }
}

fn store_listener(
    shared: Weak<Shared>,
    suppressed: Arc<AtomicBool>,
) -> crate::store::StoreListener {
    Arc::new(move |path: &str| {
        if suppressed.load(Ordering::Acquire) {
            trace!(path, "store change during own write ignored");
            return;
        }
        if let Some(shared) = shared.upgrade() {
            shared.on_external_change();
        }
    })
}
