use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use super::{Material, Primitive, SceneLayouts};

/// GPU model block. Mirrors `ModelUniform` in `geometry.wgsl`.
///
/// Normals are transformed with the upper-left 3x3 of `model`; transforms
/// with non-uniform scale would additionally need an inverse-transpose here.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn min_binding_size() -> std::num::NonZeroU64 {
        std::num::NonZeroU64::new(std::mem::size_of::<ModelUniform>() as u64)
            .expect("ModelUniform has non-zero size by construction")
    }
}

/// A material together with the primitives drawn with it.
pub struct MaterialSlot {
    pub material: Material,
    pub primitives: Vec<Primitive>,
}

/// A scene node: one model transform plus the materials/primitives under it.
pub struct Node {
    bind_group: wgpu::BindGroup,
    _buffer: wgpu::Buffer,
    slots: Vec<MaterialSlot>,
}

impl Node {
    pub fn new(device: &wgpu::Device, layouts: &SceneLayouts, transform: Mat4) -> Self {
        let uniform = ModelUniform {
            model: transform.to_cols_array_2d(),
        };

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shamash model ubo"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shamash model bind group"),
            layout: &layouts.model,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            bind_group,
            _buffer: buffer,
            slots: Vec::new(),
        }
    }

    /// Appends a material and the primitives it draws.
    pub fn add(&mut self, material: Material, primitives: Vec<Primitive>) {
        self.slots.push(MaterialSlot {
            material,
            primitives,
        });
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn slots(&self) -> &[MaterialSlot] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_uniform_is_one_mat4() {
        assert_eq!(std::mem::size_of::<ModelUniform>(), 64);
    }
}
