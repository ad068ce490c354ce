use glam::{Mat4, Vec3};

use crate::input::{InputState, Key};

const MIN_FOV_DEGREES: f32 = 1.0;
const MAX_FOV_DEGREES: f32 = 179.0;
const MIN_NEAR_PLANE: f32 = 1e-3;
const MIN_PLANE_GAP: f32 = 1e-3;
const MIN_ASPECT: f32 = 1e-3;
const MIN_ORTHO_HEIGHT: f32 = 1e-3;

/// View parameters for the scene camera.
///
/// The projection branch and every numeric field are edited live by the
/// settings panel, so the matrix accessors clamp out-of-range values instead
/// of trusting the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees; only used in perspective mode.
    pub fov_degrees: f32,
    pub aspect_ratio: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub orthographic: bool,
    /// Full vertical extent of the orthographic view volume.
    pub ortho_height: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
            aspect_ratio: 16.0 / 9.0,
            near_plane: 0.1,
            far_plane: 100.0,
            orthographic: false,
            ortho_height: 6.0,
        }
    }
}

impl Camera {
    /// World-to-view transform looking from `position` toward `target` with
    /// +Y up. When the two coincide, or the forward direction is parallel to
    /// the up axis, the camera falls back to looking down -Z from `position`.
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.target - self.position;
        let degenerate = forward.length_squared() < f32::EPSILON
            || forward.normalize().cross(Vec3::Y).length_squared() < f32::EPSILON;
        let target = if degenerate {
            self.position - Vec3::Z
        } else {
            self.target
        };
        Mat4::look_at_rh(self.position, target, Vec3::Y)
    }

    /// View-to-clip transform. Branches on `orthographic`.
    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.aspect_ratio.max(MIN_ASPECT);
        let near = self.near_plane.max(MIN_NEAR_PLANE);
        let far = self.far_plane.max(near + MIN_PLANE_GAP);
        if self.orthographic {
            let half_height = self.ortho_height.max(MIN_ORTHO_HEIGHT) * 0.5;
            let half_width = half_height * aspect;
            Mat4::orthographic_rh(-half_width, half_width, -half_height, half_height, near, far)
        } else {
            let fov = self
                .fov_degrees
                .clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES)
                .to_radians();
            Mat4::perspective_rh(fov, aspect, near, far)
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Restores the documented boot defaults and zeroes the paired
    /// controller's look angles.
    pub fn reset(&mut self, controller: &mut CameraController) {
        self.position = Vec3::new(0.0, 0.0, 5.0);
        self.target = Vec3::ZERO;
        self.fov_degrees = 60.0;
        self.ortho_height = 6.0;
        self.near_plane = 0.1;
        self.far_plane = 100.0;
        self.orthographic = false;

        controller.yaw_degrees = 0.0;
        controller.pitch_degrees = 0.0;
    }
}

/// Fly-style controller that drives the camera from the input snapshot.
///
/// Yaw/pitch of zero looks down -Z, matching the reset camera pose.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraController {
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    pub move_speed: f32,
    pub sprint_move_speed: f32,
    /// Degrees of rotation per pixel of mouse travel.
    pub look_sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            yaw_degrees: 0.0,
            pitch_degrees: 0.0,
            move_speed: 5.0,
            sprint_move_speed: 10.0,
            look_sensitivity: 0.1,
        }
    }
}

impl CameraController {
    pub fn forward(&self) -> Vec3 {
        let yaw = self.yaw_degrees.to_radians();
        let pitch = self.pitch_degrees.to_radians();
        Vec3::new(
            yaw.sin() * pitch.cos(),
            pitch.sin(),
            -yaw.cos() * pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Applies one frame of look + movement input to the camera, scaled by
    /// `dt` and the configured speeds.
    pub fn update(&mut self, input: &InputState, camera: &mut Camera, dt: f32) {
        let look = input.take_look_delta();
        if input.look_active() {
            self.yaw_degrees += look.x * self.look_sensitivity;
            self.pitch_degrees -= look.y * self.look_sensitivity;
            self.pitch_degrees = self.pitch_degrees.clamp(-89.0, 89.0);
        }

        let speed = if input.sprint_held() {
            self.sprint_move_speed
        } else {
            self.move_speed
        };

        let forward = self.forward();
        let right = self.right();
        let mut motion = Vec3::ZERO;
        if input.is_held(Key::Forward) {
            motion += forward;
        }
        if input.is_held(Key::Backward) {
            motion -= forward;
        }
        if input.is_held(Key::Left) {
            motion -= right;
        }
        if input.is_held(Key::Right) {
            motion += right;
        }
        if input.is_held(Key::Up) {
            motion += Vec3::Y;
        }
        if input.is_held(Key::Down) {
            motion -= Vec3::Y;
        }
        if motion.length_squared() > 0.0 {
            camera.position += motion.normalize() * speed * dt;
        }

        camera.target = camera.position + forward;
    }
}
