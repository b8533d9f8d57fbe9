//! First-person camera with yaw/pitch look and free movement.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

const DEFAULT_YAW: f32 = -90.0;
const PITCH_LIMIT: f32 = 89.0;

/// First-person camera. Yaw and pitch are stored in degrees; the
/// front/right/up basis is recomputed whenever they change.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Yaw in degrees. -90 looks down -Z.
    yaw: f32,
    /// Pitch in degrees, clamped to [-89, 89].
    pitch: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Mouse sensitivity in degrees per pixel of cursor travel.
    pub sensitivity: f32,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    /// Create a camera at the given position, looking down -Z.
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            yaw: DEFAULT_YAW,
            pitch: 0.0,
            front: -Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
            world_up: Vec3::Y,
            speed: 50.0,
            sensitivity: 0.1,
            fov_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
        };
        camera.update_vectors();
        camera
    }

    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Apply a mouse offset to yaw/pitch, clamping pitch so the up
    /// vector never inverts.
    pub fn process_mouse(&mut self, offset_x: f32, offset_y: f32) {
        self.yaw += offset_x * self.sensitivity;
        self.pitch = (self.pitch + offset_y * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Move along the camera basis: `input.y` forward/back along front,
    /// `input.x` strafe along right, `vertical` along world up.
    pub fn process_movement(&mut self, input: glam::Vec2, vertical: f32, dt: f32) {
        let velocity = self.speed * dt;
        self.position += self.front * (input.y * velocity);
        self.position += self.right * (input.x * velocity);
        self.position += self.world_up * (vertical * velocity);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

/// Camera uniform data for GPU: separate view and projection so the
/// shader contract stays `projection * view * model`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }

    pub fn update(&mut self, camera: &Camera) {
        self.view = camera.view_matrix().to_cols_array_2d();
        self.projection = camera.projection_matrix().to_cols_array_2d();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_clamps_at_89_degrees() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.sensitivity = 1.0;
        camera.process_mouse(0.0, 500.0);
        assert_eq!(camera.pitch(), 89.0);
        camera.process_mouse(0.0, -1000.0);
        assert_eq!(camera.pitch(), -89.0);
    }

    #[test]
    fn basis_stays_orthonormal_after_look() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse(123.0, -45.0);
        assert!((camera.front().length() - 1.0).abs() < 1e-5);
        assert!(camera.front().dot(camera.right).abs() < 1e-5);
        assert!(camera.front().dot(camera.up).abs() < 1e-5);
        assert!(camera.right.dot(camera.up).abs() < 1e-5);
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 150.0));
        assert!((camera.front() - -Vec3::Z).length() < 1e-5);
        // A point in front of the camera lands in front in view space.
        let view = camera.view_matrix();
        let p = view.transform_point3(Vec3::new(0.0, 0.0, 0.0));
        assert!(p.z < 0.0);
    }

    #[test]
    fn movement_follows_camera_basis() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.speed = 10.0;
        camera.process_movement(glam::Vec2::new(0.0, 1.0), 0.0, 0.5);
        assert!((camera.position - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4);
        camera.process_movement(glam::Vec2::ZERO, 1.0, 0.1);
        assert!((camera.position.y - 1.0).abs() < 1e-4);
    }
}
