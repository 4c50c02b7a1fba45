use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::SceneLayouts;

/// GPU material block. Mirrors `MaterialUniform` in `geometry.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct MaterialUniform {
    /// Linear base color written to the albedo channel.
    pub base_color: [f32; 4],
}

impl MaterialUniform {
    pub fn min_binding_size() -> std::num::NonZeroU64 {
        std::num::NonZeroU64::new(std::mem::size_of::<MaterialUniform>() as u64)
            .expect("MaterialUniform has non-zero size by construction")
    }
}

/// Opaque surface material.
///
/// Immutable after creation; materials that change per frame would need a
/// COPY_DST buffer and an upload path instead.
pub struct Material {
    bind_group: wgpu::BindGroup,
    _buffer: wgpu::Buffer,
}

impl Material {
    pub fn new(device: &wgpu::Device, layouts: &SceneLayouts, base_color: [f32; 4]) -> Self {
        let uniform = MaterialUniform { base_color };

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shamash material ubo"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shamash material bind group"),
            layout: &layouts.material,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            bind_group,
            _buffer: buffer,
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_one_vec4() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 16);
    }
}
