use anyhow::{Context, Result};
use wgpu::util::DeviceExt;

use super::{ClusterGrid, GpuLight, PointLight};

/// Byte offset of the packed light array inside the light-list buffer.
///
/// The WGSL mirror is `struct LightSet { count: u32, lights: array<Light> }`;
/// the array member is aligned to the 16-byte alignment of `Light`, leaving
/// twelve padding bytes after the count.
pub const LIGHT_ARRAY_OFFSET: u64 = 16;

/// GPU-resident light list plus the cluster buffer derived from it.
///
/// The light list is read-only for the render passes; `upload` is the only
/// writer and runs before any pass of the frame is recorded. The cluster
/// buffer contents are owned by the culling stage within a frame.
pub struct LightSet {
    grid: ClusterGrid,
    capacity: u32,
    count: u32,

    light_buffer: wgpu::Buffer,
    cluster_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,

    warned_overflow: bool,
}

impl LightSet {
    /// Allocates buffers for up to `capacity` lights and the cluster records
    /// implied by `grid`.
    ///
    /// Allocation failures and degenerate configurations surface here, at
    /// setup time; nothing in the per-frame path allocates.
    pub fn new(device: &wgpu::Device, capacity: u32, grid: ClusterGrid) -> Result<Self> {
        anyhow::ensure!(capacity > 0, "light capacity must be non-zero");
        grid.validate().context("invalid cluster grid")?;

        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shamash light list"),
            size: LIGHT_ARRAY_OFFSET + capacity as u64 * std::mem::size_of::<GpuLight>() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // COPY_DST so the orchestrator can clear it at the top of each frame.
        let cluster_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shamash cluster buffer"),
            size: grid.buffer_size(),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shamash cluster params"),
            contents: bytemuck::bytes_of(&grid.params_uniform()),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        Ok(Self {
            grid,
            capacity,
            count: 0,
            light_buffer,
            cluster_buffer,
            params_buffer,
            warned_overflow: false,
        })
    }

    /// Uploads the current lights, replacing the previous contents.
    ///
    /// Lights beyond the buffer capacity are dropped (logged once); the
    /// uploaded count always matches what the array actually holds.
    pub fn upload(&mut self, queue: &wgpu::Queue, lights: &[PointLight]) {
        if lights.len() > self.capacity as usize && !self.warned_overflow {
            log::warn!(
                "light set holds {} lights but capacity is {}; excess dropped",
                lights.len(),
                self.capacity
            );
            self.warned_overflow = true;
        }

        let n = lights.len().min(self.capacity as usize);
        let packed: Vec<GpuLight> = lights[..n].iter().map(GpuLight::from).collect();

        self.count = n as u32;
        queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::cast_slice(&[self.count, 0, 0, 0]),
        );
        queue.write_buffer(
            &self.light_buffer,
            LIGHT_ARRAY_OFFSET,
            bytemuck::cast_slice(&packed),
        );
    }

    pub fn grid(&self) -> ClusterGrid {
        self.grid
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn light_buffer(&self) -> &wgpu::Buffer {
        &self.light_buffer
    }

    pub fn cluster_buffer(&self) -> &wgpu::Buffer {
        &self.cluster_buffer
    }

    pub fn params_buffer(&self) -> &wgpu::Buffer {
        &self.params_buffer
    }
}
