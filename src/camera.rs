use glam::{Mat4, Vec2, Vec3, Vec4};
use wgpu::util::DeviceExt;

use crate::math::Ray;

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn perspective(fov_y_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            eye: Vec3::Z,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees,
            near,
            far,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self, resolution: Vec2) -> Mat4 {
        let aspect = if resolution.y > 0.0 {
            resolution.x / resolution.y
        } else {
            1.0
        };

        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }

    pub fn get_vp_matrix(&self, resolution: Vec2) -> Mat4 {
        self.projection_matrix(resolution) * self.view_matrix()
    }

    /// Window coordinates (pixels, origin top-left) of a world-space point.
    pub fn project_to_screen(&self, world: Vec3, resolution: Vec2) -> Vec2 {
        let ndc = self.get_vp_matrix(resolution).project_point3(world);
        let half = resolution * 0.5;

        Vec2::new(ndc.x * half.x + half.x, -ndc.y * half.y + half.y)
    }

    /// Ray from the eye through a window pixel.
    pub fn ray_from_screen(&self, screen: Vec2, resolution: Vec2) -> Ray {
        let ndc = Vec2::new(
            screen.x / resolution.x * 2.0 - 1.0,
            -(screen.y / resolution.y) * 2.0 + 1.0,
        );

        let inverse = self.get_vp_matrix(resolution).inverse();
        let point = inverse.project_point3(ndc.extend(0.5));

        Ray::new(self.eye, point - self.eye)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct CameraUniform {
    view_proj: Mat4,
    view: Mat4,
    inverse_view_proj: Mat4,
    eye: Vec4,
}

impl CameraUniform {
    pub fn update(&mut self, resolution: winit::dpi::PhysicalSize<u32>, camera: &Camera) {
        let resolution = Vec2::new(resolution.width as f32, resolution.height as f32);

        self.view_proj = camera.get_vp_matrix(resolution);
        self.view = camera.view_matrix();
        self.inverse_view_proj = self.view_proj.inverse();
        self.eye = camera.eye.extend(1.0);
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> Camera {
        let mut camera = Camera::perspective(60.0, 1.0, 1000.0);
        camera.eye = Vec3::new(20.0, 30.0, 50.0);
        camera.target = Vec3::ZERO;
        camera
    }

    #[test]
    fn target_projects_to_screen_center() {
        let camera = test_camera();
        let resolution = Vec2::new(800.0, 600.0);

        let screen = camera.project_to_screen(camera.target, resolution);
        assert!((screen - Vec2::new(400.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn up_is_up_on_screen() {
        let mut camera = Camera::perspective(30.0, 1.0, 10000.0);
        camera.eye = Vec3::new(0.0, 0.0, 1000.0);
        let resolution = Vec2::new(800.0, 600.0);

        let above = camera.project_to_screen(Vec3::new(0.0, 50.0, 0.0), resolution);
        let right = camera.project_to_screen(Vec3::new(50.0, 0.0, 0.0), resolution);

        assert!(above.y < 300.0);
        assert!(right.x > 400.0);
    }

    #[test]
    fn center_ray_points_at_target() {
        let camera = test_camera();
        let resolution = Vec2::new(1024.0, 768.0);

        let ray = camera.ray_from_screen(resolution * 0.5, resolution);
        let expected = (camera.target - camera.eye).normalize();

        assert!((ray.origin - camera.eye).length() < 1e-4);
        assert!(ray.direction.dot(expected) > 0.9999);
    }

    #[test]
    fn ray_passes_through_projected_point() {
        let camera = test_camera();
        let resolution = Vec2::new(1024.0, 768.0);
        let world = Vec3::new(-5.0, 2.0, 3.0);

        let screen = camera.project_to_screen(world, resolution);
        let ray = camera.ray_from_screen(screen, resolution);
        let to_point = (world - camera.eye).normalize();

        assert!(ray.direction.dot(to_point) > 0.9999);
    }
}
