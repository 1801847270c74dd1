//! Camera: perspective projection parameters plus pose.

use glam::{Mat4, Vec3};

use crate::config::CameraCfg;

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(cfg: &CameraCfg, aspect: f32) -> Self {
        Self {
            eye: Vec3::from_array(cfg.eye),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy: cfg.fov_deg.to_radians(),
            znear: cfg.znear,
            zfar: cfg.zfar,
        }
    }

    /// Recompute the aspect ratio from a viewport size.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_aspect_is_exact() {
        let mut cam = Camera::new(&CameraCfg::default(), 1.0);
        cam.set_aspect(1920, 1080);
        assert_eq!(cam.aspect, 1920.0 / 1080.0);
        cam.set_aspect(333, 777);
        assert_eq!(cam.aspect, 333.0 / 777.0);
    }

    #[test]
    fn set_aspect_survives_zero_dimensions() {
        let mut cam = Camera::new(&CameraCfg::default(), 1.0);
        cam.set_aspect(0, 0);
        assert_eq!(cam.aspect, 1.0);
    }

    #[test]
    fn view_proj_is_finite() {
        let cam = Camera::new(&CameraCfg::default(), 16.0 / 9.0);
        let m = cam.view_proj();
        assert!(m.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
