//! First-person camera driven by held actions

use serde::{Serialize, Deserialize};
use super::math::{Mat4, RigidTransform, Vec4};
use crate::input::{Action, InputState};

/// Camera movement tuning, all rates per second
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub start: Vec4,
    pub yaw: f32,
    pub move_speed: f32,
    pub turn_rate: f32,
    pub climb_speed: f32,
    pub strafe_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            start: Vec4::point(0.5, 0.5, 4.5),
            yaw: 0.0,
            move_speed: 8.0,
            turn_rate: 1.0,
            climb_speed: 4.0,
            strafe_speed: 4.0,
        }
    }
}

/// Camera state
pub struct Camera {
    pub position: Vec4,
    /// Rotation about world Y, radians
    pub yaw: f32,
    /// Derived from `yaw`, never accumulated
    pub look_dir: Vec4,
}

impl Camera {
    pub fn new(position: Vec4, yaw: f32) -> Self {
        Self {
            position,
            yaw,
            look_dir: look_direction(yaw),
        }
    }

    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self::new(Vec4 { w: 1.0, ..settings.start }, settings.yaw)
    }

    /// Advance by `dt` seconds of held input.
    pub fn update(&mut self, dt: f32, input: &InputState, settings: &CameraSettings) {
        if input.is_held(Action::TurnLeft) {
            self.yaw -= settings.turn_rate * dt;
        }
        if input.is_held(Action::TurnRight) {
            self.yaw += settings.turn_rate * dt;
        }
        self.look_dir = look_direction(self.yaw);

        let forward = self.look_dir * (settings.move_speed * dt);
        if input.is_held(Action::MoveForward) {
            self.position = self.position + forward;
        }
        if input.is_held(Action::MoveBack) {
            self.position = self.position - forward;
        }
        if input.is_held(Action::MoveUp) {
            self.position.y += settings.climb_speed * dt;
        }
        if input.is_held(Action::MoveDown) {
            self.position.y -= settings.climb_speed * dt;
        }
        if input.is_held(Action::StrafeLeft) {
            self.position.x -= settings.strafe_speed * dt;
        }
        if input.is_held(Action::StrafeRight) {
            self.position.x += settings.strafe_speed * dt;
        }
    }

    /// Camera-to-world placement
    pub fn transform(&self) -> RigidTransform {
        let target = self.position + self.look_dir;
        RigidTransform::point_at(self.position, target, Vec4::UP)
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        self.transform().inverse()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

fn look_direction(yaw: f32) -> Vec4 {
    Mat4::rotation_y(yaw).transform(Vec4::FORWARD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::PI;

    fn held(actions: &[Action]) -> InputState {
        let mut input = InputState::default();
        for a in actions {
            input.press(*a);
        }
        input
    }

    #[test]
    fn test_forward_moves_along_look() {
        let settings = CameraSettings::default();
        let mut cam = Camera::new(Vec4::ZERO, 0.0);
        cam.update(0.5, &held(&[Action::MoveForward]), &settings);
        assert_abs_diff_eq!(cam.position.z, 4.0, epsilon = 1e-5);
        assert_abs_diff_eq!(cam.position.x, 0.0, epsilon = 1e-5);
        assert_eq!(cam.position.w, 1.0);
    }

    #[test]
    fn test_turn_is_scaled_by_dt() {
        let settings = CameraSettings::default();
        let mut cam = Camera::new(Vec4::ZERO, 0.0);
        cam.update(0.25, &held(&[Action::TurnRight]), &settings);
        assert_abs_diff_eq!(cam.yaw, 0.25);
        cam.update(1.0, &held(&[Action::TurnLeft]), &settings);
        assert_abs_diff_eq!(cam.yaw, -0.75);
    }

    #[test]
    fn test_look_dir_does_not_drift() {
        let settings = CameraSettings::default();
        let mut cam = Camera::new(Vec4::ZERO, 0.0);
        let right = held(&[Action::TurnRight]);
        for _ in 0..1000 {
            cam.update(0.016, &right, &settings);
        }
        assert_abs_diff_eq!(cam.look_dir.len(), 1.0, epsilon = 1e-5);
        assert_eq!(cam.look_dir, look_direction(cam.yaw));
    }

    #[test]
    fn test_climb_and_strafe_are_axis_aligned() {
        let settings = CameraSettings::default();
        let mut cam = Camera::new(Vec4::ZERO, PI / 3.0);
        cam.update(1.0, &held(&[Action::MoveUp, Action::StrafeRight]), &settings);
        assert_abs_diff_eq!(cam.position.y, 4.0);
        assert_abs_diff_eq!(cam.position.x, 4.0);
        assert_abs_diff_eq!(cam.position.z, 0.0);
    }

    #[test]
    fn test_view_matrix_moves_camera_to_origin() {
        let cam = Camera::new(Vec4::point(1.0, 2.0, 3.0), 0.4);
        let origin = cam.view_matrix().transform(cam.position);
        assert_abs_diff_eq!(origin.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(origin.y, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(origin.z, 0.0, epsilon = 1e-5);

        let ahead = cam.view_matrix().transform(cam.position + cam.look_dir * 2.0);
        assert_abs_diff_eq!(ahead.z, 2.0, epsilon = 1e-5);
    }
}
