//! Camera and orbit controls.
//!
//! The camera circles the globe at a fixed distance, auto-rotating about the
//! Y axis; the speed follows the playback state. Dragging tilts and spins the
//! globe group, easing toward the accumulated drag offset.

use crate::core::constants::{
    AUTO_ROTATE_RAD_PER_SEC, CAMERA_FOVY_DEG, CAMERA_Z, CAMERA_ZFAR, CAMERA_ZNEAR, DRAG_EASE_SEC,
    DRAG_RAD_PER_PX, POLAR_MAX, POLAR_MIN,
};
use glam::{Mat4, Quat, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Drag {
    last_x: f32,
    last_y: f32,
}

#[derive(Clone, Debug)]
pub struct OrbitState {
    pub azimuth: f32,
    pub polar: f32,
    pub distance: f32,
    group_yaw: f32,
    group_pitch: f32,
    target_yaw: f32,
    target_pitch: f32,
    drag: Option<Drag>,
}

impl Default for OrbitState {
    fn default() -> Self {
        Self {
            azimuth: 0.0,
            polar: std::f32::consts::FRAC_PI_2,
            distance: CAMERA_Z,
            group_yaw: 0.0,
            group_pitch: 0.0,
            target_yaw: 0.0,
            target_pitch: 0.0,
            drag: None,
        }
    }
}

impl OrbitState {
    /// Advance auto-rotation at `auto_speed` (1.0 = one orbit per minute) and
    /// ease the group rotation toward the drag target.
    pub fn update(&mut self, dt_sec: f32, auto_speed: f32) {
        let dt = dt_sec.max(0.0);
        self.azimuth = (self.azimuth + AUTO_ROTATE_RAD_PER_SEC * auto_speed * dt)
            % std::f32::consts::TAU;
        self.polar = self.polar.clamp(POLAR_MIN, POLAR_MAX);
        // ~95% of the way in DRAG_EASE_SEC
        let k = 1.0 - (-dt * 3.0 / DRAG_EASE_SEC).exp();
        self.group_yaw += (self.target_yaw - self.group_yaw) * k;
        self.group_pitch += (self.target_pitch - self.group_pitch) * k;
    }

    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.drag = Some(Drag {
            last_x: x,
            last_y: y,
        });
    }

    /// Pointer moved to `(x, y)` CSS pixels; no-op unless dragging.
    pub fn drag_to(&mut self, x: f32, y: f32) {
        if let Some(d) = &mut self.drag {
            // Tilt keeps the view inside the same polar band as the camera.
            self.target_pitch = (self.target_pitch + (y - d.last_y) * DRAG_RAD_PER_PX).clamp(
                POLAR_MIN - std::f32::consts::FRAC_PI_2,
                POLAR_MAX - std::f32::consts::FRAC_PI_2,
            );
            self.target_yaw += (x - d.last_x) * DRAG_RAD_PER_PX;
            d.last_x = x;
            d.last_y = y;
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn eye(&self) -> Vec3 {
        let (sp, cp) = self.polar.sin_cos();
        let (sa, ca) = self.azimuth.sin_cos();
        Vec3::new(self.distance * sp * sa, self.distance * cp, self.distance * sp * ca)
    }

    pub fn camera(&self, aspect: f32) -> Camera {
        Camera {
            eye: self.eye(),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: aspect.max(1e-3),
            fovy_radians: CAMERA_FOVY_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }

    /// Rotation applied to the globe and its markers.
    pub fn group_rotation(&self) -> Quat {
        Quat::from_euler(glam::EulerRot::YXZ, self.group_yaw, self.group_pitch, 0.0)
    }
}
