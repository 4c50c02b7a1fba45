use glam::{Mat4, Vec3};

use super::CameraUniforms;

/// Perspective camera.
///
/// Produces right-handed view/projection matrices (view space looks down -Z).
/// The camera itself is plain data; uploading its matrices to the GPU is the
/// job of [`CameraBinding`](super::CameraBinding).
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,

    /// Vertical field of view in radians.
    pub fovy: f32,

    /// Near plane distance. Must be > 0.
    pub z_near: f32,

    /// Far plane distance. Must be > z_near.
    pub z_far: f32,
}

impl Camera {
    pub fn new(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Y,
            fovy: 60f32.to_radians(),
            z_near: 0.1,
            z_far: 100.0,
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fovy, aspect, self.z_near, self.z_far)
    }

    /// Builds the per-frame uniform snapshot for the given output resolution.
    ///
    /// `width`/`height` are the frame target's physical pixel dimensions; the
    /// resolve pass uses them to map fragment coordinates to cluster tiles.
    pub fn uniforms(&self, width: u32, height: u32) -> CameraUniforms {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let view = self.view();
        let proj = self.projection(aspect);

        CameraUniforms {
            view_proj: (proj * view).to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            inv_proj: proj.inverse().to_cols_array_2d(),
            viewport: [width as f32, height as f32],
            z_near: self.z_near,
            z_far: self.z_far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn view_space_looks_down_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let view = camera.view();
        let origin_in_view = view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin_in_view.z - -5.0).abs() < 1e-5);
    }

    #[test]
    fn centered_point_projects_to_ndc_center() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let u = camera.uniforms(800, 600);
        let vp = Mat4::from_cols_array_2d(&u.view_proj);
        let clip = vp * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }

    #[test]
    fn inverse_projection_round_trips() {
        let camera = Camera::new(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO);
        let u = camera.uniforms(1280, 720);
        let proj = camera.projection(1280.0 / 720.0);
        let inv = Mat4::from_cols_array_2d(&u.inv_proj);
        let p = Vec4::new(0.3, -0.2, 0.5, 1.0);
        let back = inv * (proj * p);
        let back = back / back.w;
        assert!((back.x - p.x).abs() < 1e-4);
        assert!((back.y - p.y).abs() < 1e-4);
        assert!((back.z - p.z).abs() < 1e-4);
    }
}
