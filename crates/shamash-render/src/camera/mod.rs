//! Camera subsystem.
//!
//! Responsibilities:
//! - perspective camera math (view / projection / inverse-projection)
//! - the GPU-visible uniform block shared by every pass of the frame
//!
//! The uniform buffer is updated at most once per frame, before any pass is
//! recorded; both render passes and the cluster stage read the same snapshot.

mod camera;
mod uniforms;

pub use camera::Camera;
pub use uniforms::{CameraBinding, CameraUniforms};
