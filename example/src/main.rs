//! Drives a range slider with a scripted pointer stream against an
//! in-memory store and logs what a renderer and a form would observe.
//!
//! Run with `RUST_LOG=twinrail=trace` to see every drag step.

use std::sync::Arc;

use serde_json::json;
use tracing::info;
use twinrail::{
    DragEvent, Handle, HandleMetrics, MemoryStore, Px, RangeSliderArgs, RangeSliderController,
    ValueStore,
};

const PATH: &str = "filters.price";

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new("error,twinrail=debug,example=info")
        {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let store = Arc::new(MemoryStore::new());
    store.set(PATH, json!([0.9, 0.1]));

    let slider = RangeSliderController::new(
        RangeSliderArgs::default()
            .id("price")
            .width(Px(240))
            .bind(store.clone(), PATH)
            .on_change(|value| info!(low = value.low, high = value.high, "range committed"))
            .on_display(|snapshot| {
                info!(
                    low = snapshot.positions.low.raw(),
                    high = snapshot.positions.high.raw(),
                    highlight_left = snapshot.highlight.left,
                    highlight_width = snapshot.highlight.width,
                    "display refreshed"
                )
            }),
    )?;

    let thumb = HandleMetrics::new(Px(18)).with_borders(Px(1), Px(1));
    slider.initialize(thumb, thumb);
    info!(value = ?slider.value(), stored = ?store.read(PATH), "initialized");

    let low = slider.source_id(Handle::Low);
    let high = slider.source_id(Handle::High);

    // Drag the low handle past the high one; it stops where they touch.
    let script = [
        DragEvent::start(&low, Px(30)),
        DragEvent::moved(&low, Px(80)),
        DragEvent::moved(&low, Px(400)),
        DragEvent::end(&low, Px(400)),
        // Pull the high handle back out to the right.
        DragEvent::start(&high, Px(500)),
        DragEvent::moved(&high, Px(560)),
        DragEvent::end(&high, Px(640)),
        // A no-op gesture does not commit.
        DragEvent::start(&high, Px(10)),
        DragEvent::end(&high, Px(10)),
    ];
    for event in &script {
        slider.dispatch(event);
    }
    info!(value = ?slider.value(), stored = ?store.read(PATH), "after gestures");

    store.set(PATH, json!([0.25, 0.75]));
    info!(positions = ?slider.handle_positions(), "after external change");

    slider.dispose();
    slider.dispose();
    info!(subscriptions = store.subscription_count(), "disposed");
    Ok(())
}
