use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// CPU-side point light.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,

    /// Linear light color.
    pub color: Vec3,

    /// Influence radius in world units; contribution falls to zero at the
    /// boundary and the light is skipped entirely beyond it.
    pub radius: f32,

    pub intensity: f32,
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3, radius: f32) -> Self {
        Self {
            position,
            color,
            radius,
            intensity: 1.0,
        }
    }
}

/// Packed light as stored in the light-list buffer. Mirrors `Light` in the
/// cluster and resolve shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct GpuLight {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    pub intensity: f32,
}

impl From<&PointLight> for GpuLight {
    fn from(light: &PointLight) -> Self {
        Self {
            position: light.position.to_array(),
            radius: light.radius,
            color: light.color.to_array(),
            intensity: light.intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_light_matches_wgsl_layout() {
        // vec3 + f32 + vec3 + f32, 16-byte aligned pairs.
        assert_eq!(std::mem::size_of::<GpuLight>(), 32);
        assert_eq!(std::mem::offset_of!(GpuLight, radius), 12);
        assert_eq!(std::mem::offset_of!(GpuLight, color), 16);
        assert_eq!(std::mem::offset_of!(GpuLight, intensity), 28);
    }

    #[test]
    fn conversion_preserves_fields() {
        let light = PointLight {
            position: Vec3::new(1.0, 2.0, 3.0),
            color: Vec3::new(0.5, 0.25, 0.125),
            radius: 7.0,
            intensity: 2.0,
        };
        let gpu = GpuLight::from(&light);
        assert_eq!(gpu.position, [1.0, 2.0, 3.0]);
        assert_eq!(gpu.color, [0.5, 0.25, 0.125]);
        assert_eq!(gpu.radius, 7.0);
        assert_eq!(gpu.intensity, 2.0);
    }
}
