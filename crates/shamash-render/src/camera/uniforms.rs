use bytemuck::{Pod, Zeroable};

/// GPU camera uniform block.
///
/// Mirrors `CameraUniforms` in the WGSL shaders; field order and padding must
/// stay in sync. All three passes bind this buffer read-only:
/// - geometry pass: `view_proj` (vertex stage)
/// - cluster stage: `view`, `inv_proj`, near/far (compute stage)
/// - resolve pass: `view`, `viewport`, near/far (fragment stage)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub inv_proj: [[f32; 4]; 4],

    /// Output resolution in physical pixels.
    pub viewport: [f32; 2],
    pub z_near: f32,
    pub z_far: f32,
}

impl CameraUniforms {
    pub const SIZE: u64 = std::mem::size_of::<CameraUniforms>() as u64;
}

/// Owns the camera uniform buffer.
///
/// Created once at renderer initialization; the buffer handle is stable for
/// the renderer's lifetime, so pass bind groups never need rebinding when the
/// camera moves — only the contents change.
pub struct CameraBinding {
    buffer: wgpu::Buffer,
}

impl CameraBinding {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shamash camera ubo"),
            size: CameraUniforms::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self { buffer }
    }

    /// Uploads a new uniform snapshot.
    ///
    /// Must happen before the frame's passes are recorded; the contents are
    /// immutable for the duration of the frame.
    pub fn upload(&self, queue: &wgpu::Queue, uniforms: &CameraUniforms) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Minimum binding size for bind group layout declarations.
    pub fn min_binding_size() -> std::num::NonZeroU64 {
        std::num::NonZeroU64::new(CameraUniforms::SIZE)
            .expect("CameraUniforms has non-zero size by construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_matches_wgsl_layout() {
        // 3 mat4x4<f32> + vec2<f32> + 2 f32 = 192 + 16 bytes.
        assert_eq!(CameraUniforms::SIZE, 208);
        assert_eq!(std::mem::align_of::<CameraUniforms>(), 4);
    }

    #[test]
    fn viewport_offset_follows_matrices() {
        let u = CameraUniforms {
            view_proj: [[0.0; 4]; 4],
            view: [[0.0; 4]; 4],
            inv_proj: [[0.0; 4]; 4],
            viewport: [1.0, 2.0],
            z_near: 3.0,
            z_far: 4.0,
        };
        let bytes = bytemuck::bytes_of(&u);
        let tail: &[f32] = bytemuck::cast_slice(&bytes[192..]);
        assert_eq!(tail, &[1.0, 2.0, 3.0, 4.0]);
    }
}
