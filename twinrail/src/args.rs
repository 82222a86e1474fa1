//! Configuration accepted by [`RangeSliderController::new`].
//!
//! [`RangeSliderController::new`]: crate::RangeSliderController::new

use std::sync::Arc;

use derive_setters::Setters;
use thiserror::Error;

use crate::{
    callback::CallbackWith, controller::SliderDisplay, convert::RangeValue, px::Px,
    store::ValueStore,
};

/// Width used when none is configured.
pub const DEFAULT_WIDTH: Px = Px(260);

/// Rejected configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The track width is zero or negative.
    #[error("invalid configuration for the slider: width must be positive, got {0}")]
    InvalidWidth(i32),
    /// A binding was configured with an empty path.
    #[error("invalid configuration for the slider: binding path is empty")]
    EmptyBindingPath,
    /// An explicit id was set to the empty string.
    #[error("invalid configuration for the slider: id is empty")]
    EmptyId,
}

/// Store field the slider value is bound to.
#[derive(Clone)]
pub struct Binding {
    /// Store holding the persisted range.
    pub store: Arc<dyn ValueStore>,
    /// Path of the field inside `store`.
    pub path: String,
}

/// Arguments for a range slider controller.
#[derive(Clone, Setters)]
pub struct RangeSliderArgs {
    /// Id used to derive the drag source ids (`{id}_first`, `{id}_second`).
    /// Generated when absent.
    #[setters(strip_option, into)]
    pub id: Option<String>,
    /// Full track width, handles included.
    pub width: Px,
    /// Starting value when the slider is not bound to a store.
    pub value: RangeValue,
    /// Bound store field. When set, the store is the source of truth and
    /// `value` is ignored.
    #[setters(skip)]
    pub bind: Option<Binding>,
    /// Called once per gesture that ends with a different value.
    #[setters(skip)]
    pub on_change: CallbackWith<RangeValue>,
    /// Called whenever handle positions or the highlight are refreshed.
    #[setters(skip)]
    pub on_display: CallbackWith<SliderDisplay>,
}

impl RangeSliderArgs {
    /// Binds the slider to `path` in `store`.
    pub fn bind(mut self, store: Arc<dyn ValueStore>, path: impl Into<String>) -> Self {
        self.bind = Some(Binding {
            store,
            path: path.into(),
        });
        self
    }

    /// Sets the committed-change handler.
    pub fn on_change<F>(mut self, on_change: F) -> Self
    where
        F: Fn(RangeValue) + Send + Sync + 'static,
    {
        self.on_change = CallbackWith::new(on_change);
        self
    }

    /// Sets the display refresh handler.
    pub fn on_display<F>(mut self, on_display: F) -> Self
    where
        F: Fn(SliderDisplay) + Send + Sync + 'static,
    {
        self.on_display = CallbackWith::new(on_display);
        self
    }

    /// Checks the arguments without building a controller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= Px::ZERO {
            return Err(ConfigError::InvalidWidth(self.width.raw()));
        }
        if self.id.as_deref() == Some("") {
            return Err(ConfigError::EmptyId);
        }
        if self.bind.as_ref().is_some_and(|b| b.path.is_empty()) {
            return Err(ConfigError::EmptyBindingPath);
        }
        Ok(())
    }
}

impl Default for RangeSliderArgs {
    fn default() -> Self {
        Self {
            id: None,
            width: DEFAULT_WIDTH,
            value: RangeValue::ZERO,
            bind: None,
            on_change: CallbackWith::new(|_| {}),
            on_display: CallbackWith::new(|_| {}),
        }
    }
}
