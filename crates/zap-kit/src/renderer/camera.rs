use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

/// Orthographic camera on the XY plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    /// Camera center in world space.
    pub center: Vec2,
    /// Half of the visible height, in world units.
    pub orthographic_size: f32,
    /// Viewport width divided by height.
    pub aspect: f32,
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub projection: [[f32; 4]; 4],
}

impl Camera2D {
    pub fn new(orthographic_size: f32, aspect: f32) -> Self {
        Self {
            center: Vec2::ZERO,
            orthographic_size,
            aspect,
        }
    }

    /// Visible height in world units.
    pub fn height(&self) -> f32 {
        self.orthographic_size * 2.0
    }

    /// Visible width in world units.
    pub fn width(&self) -> f32 {
        self.height() * self.aspect
    }

    /// Orthographic projection, Y-up, Z in [0, 1].
    pub fn projection_matrix(&self) -> Mat4 {
        let half_h = self.height() / 2.0;
        let half_w = self.width() / 2.0;
        Mat4::orthographic_rh(
            self.center.x - half_w,
            self.center.x + half_w,
            self.center.y - half_h,
            self.center.y + half_h,
            0.0,
            1.0,
        )
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            projection: self.projection_matrix().to_cols_array_2d(),
        }
    }

    /// Update the aspect ratio after a viewport resize. Degenerate sizes are ignored.
    pub fn resize(&mut self, viewport_width: f32, viewport_height: f32) {
        if viewport_width > 0.0 && viewport_height > 0.0 {
            self.aspect = viewport_width / viewport_height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_matrix_is_orthographic() {
        let cam = Camera2D::new(5.0, 16.0 / 9.0);
        let cols = cam.projection_matrix().to_cols_array_2d();
        assert!((cols[3][3] - 1.0).abs() < 1e-6);
        // Top edge of the view maps to clip +1
        let top = cam.projection_matrix().project_point3(glam::Vec3::new(0.0, 5.0, 0.0));
        assert!((top.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn size_and_aspect_define_extent() {
        let mut cam = Camera2D::new(5.0, 1.0);
        cam.resize(1920.0, 1080.0);
        assert!((cam.height() - 10.0).abs() < 1e-6);
        assert!((cam.width() - 10.0 * 1920.0 / 1080.0).abs() < 1e-4);

        cam.resize(0.0, 1080.0);
        assert!((cam.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn projection_follows_center() {
        let mut cam = Camera2D::new(1.0, 2.0);
        cam.center = Vec2::new(10.0, 0.0);
        let right = cam.projection_matrix().project_point3(glam::Vec3::new(12.0, 0.0, 0.0));
        assert!((right.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn uniform_is_pod() {
        let cam = Camera2D::new(2.0, 1.5);
        let uniform = cam.uniform();
        assert_eq!(bytemuck::bytes_of(&uniform).len(), 64);
    }
}
