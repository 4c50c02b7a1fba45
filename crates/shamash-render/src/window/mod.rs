//! Platform window runtime.
//!
//! Wraps the winit event loop and owns per-window GPU contexts. Applications
//! implement [`core::App`](crate::core::App) and drive rendering from
//! `on_frame`; the runtime handles window lifecycle, resize and redraw
//! scheduling.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
