//! Light management.
//!
//! Owns the GPU-facing light list and the cluster-assignment buffer the
//! resolve pass consumes, plus the compute stage that populates the latter.
//!
//! Buffer contracts:
//! - the light list is a storage buffer: a count header followed by a packed
//!   array of [`GpuLight`], re-uploaded whenever the CPU light set changes
//! - the cluster buffer is a storage buffer of `u32` records, one per
//!   cluster: `[count, index 0, index 1, ..]` with a fixed stride derived
//!   from [`ClusterGrid`]; it is cleared and rewritten every frame and never
//!   carries state across frames

mod cluster;
mod culling;
mod light;
mod set;

pub use cluster::{slice_for_view_z, ClusterGrid, ClusterParamsUniform};
pub use culling::{ClusterStage, LightCulling};
pub use light::{GpuLight, PointLight};
pub use set::{LightSet, LIGHT_ARRAY_OFFSET};
