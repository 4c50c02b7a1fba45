//! Shamash renderer crate.
//!
//! A clustered-deferred real-time lighting renderer on wgpu: a geometry pass
//! fills a G-buffer (position / normal / albedo + depth), a compute stage
//! assigns lights to view-space clusters, and a fullscreen resolve pass
//! shades every pixel once using only the lights of its cluster.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod camera;
pub mod scene;
pub mod lights;
pub mod render;
