use super::{Camera, Projection};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    globe: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn update_view_projection(camera: &Camera, projection: &Projection) -> Self {
        Self {
            view_proj: (projection.calc_matrix() * camera.view_matrix()).to_cols_array_2d(),
            globe: camera.globe_matrix().to_cols_array_2d(),
        }
    }

    pub fn view_proj(&self) -> [[f32; 4]; 4] {
        self.view_proj
    }

    pub fn globe(&self) -> [[f32; 4]; 4] {
        self.globe
    }
}
