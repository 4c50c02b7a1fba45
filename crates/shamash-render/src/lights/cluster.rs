use anyhow::Result;
use bytemuck::{Pod, Zeroable};

/// Cluster grid configuration.
///
/// The view volume is partitioned into `x * y * z` clusters: screen tiles in
/// x/y, exponential depth slices in z. Each cluster records at most
/// `max_lights_per_cluster` light indices; lights beyond that are dropped
/// for the cluster (bounded, never a crash).
///
/// These values are a contract between the culling stage and the resolve
/// shader, carried in a uniform so neither side hard-codes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterGrid {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub max_lights_per_cluster: u32,
}

impl Default for ClusterGrid {
    fn default() -> Self {
        Self {
            x: 16,
            y: 9,
            z: 24,
            max_lights_per_cluster: 63,
        }
    }
}

impl ClusterGrid {
    /// Rejects degenerate grids. Called by every consumer that sizes a
    /// buffer or a dispatch from this configuration.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.x > 0 && self.y > 0 && self.z > 0,
            "cluster grid has a zero dimension: {}x{}x{}",
            self.x,
            self.y,
            self.z
        );
        anyhow::ensure!(
            self.max_lights_per_cluster > 0,
            "cluster light capacity must be non-zero"
        );
        Ok(())
    }

    pub fn cluster_count(&self) -> u32 {
        self.x * self.y * self.z
    }

    /// `u32` words per cluster record: one count word plus the index list,
    /// rounded up so records stay 16-byte aligned.
    pub fn stride_u32s(&self) -> u32 {
        (1 + self.max_lights_per_cluster).next_multiple_of(4)
    }

    /// Total cluster buffer size in bytes.
    pub fn buffer_size(&self) -> u64 {
        self.cluster_count() as u64 * self.stride_u32s() as u64 * 4
    }

    /// Linearizes a (tile_x, tile_y, slice) coordinate. Mirrors the indexing
    /// in `cluster.wgsl` and `resolve.wgsl`.
    pub fn linear_index(&self, tile_x: u32, tile_y: u32, slice: u32) -> u32 {
        debug_assert!(tile_x < self.x && tile_y < self.y && slice < self.z);
        tile_x + tile_y * self.x + slice * self.x * self.y
    }

    /// Screen tile containing a pixel, clamped to the grid.
    pub fn tile_for_pixel(&self, px: f32, py: f32, width: f32, height: f32) -> (u32, u32) {
        let tx = (px / width * self.x as f32) as u32;
        let ty = (py / height * self.y as f32) as u32;
        (tx.min(self.x - 1), ty.min(self.y - 1))
    }

    pub fn params_uniform(&self) -> ClusterParamsUniform {
        ClusterParamsUniform {
            grid: [self.x, self.y, self.z],
            max_lights: self.max_lights_per_cluster,
            stride: self.stride_u32s(),
            _pad: [0; 3],
        }
    }
}

/// Depth slice for a positive view-space distance.
///
/// Exponential partition: slice boundaries sit at
/// `near * (far/near)^(i / slices)`, which keeps cluster depth extents
/// roughly proportional to their distance. Out-of-range depths clamp into
/// the first/last slice rather than indexing out of bounds.
pub fn slice_for_view_z(depth: f32, z_near: f32, z_far: f32, slices: u32) -> u32 {
    if depth <= z_near {
        return 0;
    }
    let s = ((depth / z_near).ln() / (z_far / z_near).ln() * slices as f32) as u32;
    s.min(slices - 1)
}

/// GPU cluster parameter block. Mirrors `ClusterParams` in the shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ClusterParamsUniform {
    pub grid: [u32; 3],
    pub max_lights: u32,
    pub stride: u32,
    pub _pad: [u32; 3],
}

impl ClusterParamsUniform {
    pub fn min_binding_size() -> std::num::NonZeroU64 {
        std::num::NonZeroU64::new(std::mem::size_of::<ClusterParamsUniform>() as u64)
            .expect("ClusterParamsUniform has non-zero size by construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_is_valid() {
        assert!(ClusterGrid::default().validate().is_ok());
    }

    #[test]
    fn zero_dimension_rejected() {
        let grid = ClusterGrid { x: 0, ..Default::default() };
        assert!(grid.validate().is_err());

        let grid = ClusterGrid { max_lights_per_cluster: 0, ..Default::default() };
        assert!(grid.validate().is_err());
    }

    #[test]
    fn stride_keeps_records_aligned() {
        // 63 indices + 1 count = 64 words exactly.
        assert_eq!(ClusterGrid::default().stride_u32s(), 64);

        // 10 indices + 1 count = 11 words, rounded up to 12.
        let grid = ClusterGrid { max_lights_per_cluster: 10, ..Default::default() };
        assert_eq!(grid.stride_u32s(), 12);
        assert_eq!(grid.stride_u32s() % 4, 0);
    }

    #[test]
    fn buffer_size_counts_every_cluster() {
        let grid = ClusterGrid { x: 2, y: 3, z: 4, max_lights_per_cluster: 3 };
        assert_eq!(grid.cluster_count(), 24);
        assert_eq!(grid.stride_u32s(), 4);
        assert_eq!(grid.buffer_size(), 24 * 4 * 4);
    }

    #[test]
    fn linear_index_is_x_major() {
        let grid = ClusterGrid { x: 4, y: 3, z: 2, max_lights_per_cluster: 1 };
        assert_eq!(grid.linear_index(0, 0, 0), 0);
        assert_eq!(grid.linear_index(3, 0, 0), 3);
        assert_eq!(grid.linear_index(0, 1, 0), 4);
        assert_eq!(grid.linear_index(0, 0, 1), 12);
        assert_eq!(grid.linear_index(3, 2, 1), 23);
    }

    #[test]
    fn every_cell_maps_into_the_buffer() {
        let grid = ClusterGrid { x: 5, y: 4, z: 3, max_lights_per_cluster: 7 };
        let mut seen = vec![false; grid.cluster_count() as usize];
        for z in 0..grid.z {
            for y in 0..grid.y {
                for x in 0..grid.x {
                    let i = grid.linear_index(x, y, z) as usize;
                    assert!(!seen[i], "index collision");
                    seen[i] = true;
                }
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn tile_for_pixel_clamps_to_grid() {
        let grid = ClusterGrid::default();
        assert_eq!(grid.tile_for_pixel(0.0, 0.0, 800.0, 600.0), (0, 0));
        // The bottom-right pixel edge lands exactly on the grid bound.
        assert_eq!(
            grid.tile_for_pixel(800.0, 600.0, 800.0, 600.0),
            (grid.x - 1, grid.y - 1)
        );
    }

    #[test]
    fn slices_are_monotone_and_clamped() {
        let (near, far, slices) = (0.1, 100.0, 24);
        assert_eq!(slice_for_view_z(0.0, near, far, slices), 0);
        assert_eq!(slice_for_view_z(near, near, far, slices), 0);
        assert_eq!(slice_for_view_z(far * 10.0, near, far, slices), slices - 1);

        let mut last = 0;
        for i in 1..200 {
            let depth = near + (far - near) * i as f32 / 200.0;
            let s = slice_for_view_z(depth, near, far, slices);
            assert!(s >= last);
            assert!(s < slices);
            last = s;
        }
        // The exponential partition actually uses the whole range.
        assert_eq!(last, slices - 1);
    }

    #[test]
    fn params_uniform_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<ClusterParamsUniform>(), 32);
        assert_eq!(std::mem::offset_of!(ClusterParamsUniform, max_lights), 12);
        assert_eq!(std::mem::offset_of!(ClusterParamsUniform, stride), 16);
    }
}
