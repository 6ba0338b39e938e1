use glam::{Mat4, Quat, Vec3};

mod controller;
pub use controller::{GesturePhase, GestureController};

pub mod distance;
pub use distance::*;

mod projection;
pub use projection::Projection;

mod uniform;
pub use uniform::CameraUniform;

/// The camera sits on +Z looking at the globe centre with +Y up; the globe
/// itself turns by `orientation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub orientation: Quat,
    pub distance: f32,
}

impl Camera {
    pub fn new(orientation: Quat, distance: f32) -> Self {
        Self {
            orientation,
            distance,
        }
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::Z * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    pub fn globe_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation)
    }

    /// World position of a point given in the globe's own frame.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.orientation * local
    }

    /// World-space z of the plane through the visible horizon of a sphere of
    /// `radius`. Surface points behind it are hidden by the sphere.
    pub fn horizon_z(&self, radius: f32) -> f32 {
        if self.distance <= radius {
            return radius;
        }

        radius * radius / self.distance
    }
}
