use glam::{Mat4, Vec2, Vec3};

use super::Camera;

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub size: Vec2,
    pub fovy: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, fovy: f32, znear: f32, zfar: f32) -> Self {
        Self {
            size: Vec2::new(width.max(1) as f32, height.max(1) as f32),
            fovy,
            znear,
            zfar,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.size.x / self.size.y
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    pub fn calc_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect(), self.znear, self.zfar)
    }

    /// Normalized device coordinates of a world point; depth runs 0 (near) to
    /// 1 (far).
    pub fn project(&self, camera: &Camera, world: Vec3) -> Vec3 {
        (self.calc_matrix() * camera.view_matrix()).project_point3(world)
    }
}
