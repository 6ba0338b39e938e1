//! Base orientation of the globe.
//!
//! The solver turns the focus of the current view into the rotation that puts
//! it in front of the camera (+Z) with the polar axis pointing up on screen.
//! User and auto rotation are layered on top by [`compose`].

use glam::{Quat, Vec3};

use crate::config::OrientationConfig;
use crate::types::rotation_between;
use crate::ViewMode;

/// What the camera should centre on, in the globe's own frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Focus {
    Single(Vec3),
    Pair { primary: Vec3, secondary: Vec3 },
    Overview { points: Vec<Vec3>, fallback: Vec3 },
}

impl Focus {
    pub fn mode(&self) -> ViewMode {
        match self {
            Focus::Single(_) => ViewMode::SelfFocus,
            Focus::Pair { .. } => ViewMode::PairFocus,
            Focus::Overview { .. } => ViewMode::Overview,
        }
    }

    /// Direction that ends up facing the camera.
    pub fn direction(&self, config: &OrientationConfig) -> Vec3 {
        match self {
            Focus::Single(point) => *point,
            Focus::Pair { primary, secondary } => {
                let weight = config.pair_primary_weight.clamp(0., 1.);
                let blend = primary.normalize_or_zero() * weight
                    + secondary.normalize_or_zero() * (1. - weight);

                blend.try_normalize().unwrap_or(*primary)
            }
            Focus::Overview { points, fallback } => points
                .iter()
                .map(|point| point.normalize_or_zero())
                .sum::<Vec3>()
                .try_normalize()
                .unwrap_or(*fallback),
        }
    }
}

/// Rotation bringing `direction` to +Z.
pub fn face_camera(direction: Vec3) -> Quat {
    rotation_between(direction, Vec3::Z)
}

/// Roll `rotation` about the view axis until the polar axis points up on
/// screen. Leaves it alone when the pole faces the camera head on.
pub fn upright(rotation: Quat) -> Quat {
    let pole = rotation * Vec3::Y;

    if pole.x * pole.x + pole.y * pole.y < 1e-8 {
        return rotation;
    }

    let roll = pole.x.atan2(pole.y);

    (Quat::from_rotation_z(roll) * rotation).normalize()
}

pub fn base_orientation(config: &OrientationConfig, focus: &Focus) -> Quat {
    let facing = upright(face_camera(focus.direction(config)));

    // Spin about the globe's own axis so the yaw keeps the pole upright.
    let facing = match focus {
        Focus::Overview { .. } => {
            facing * Quat::from_rotation_y(config.overview_yaw_degrees.to_radians())
        }
        _ => facing,
    };

    let tilt = Quat::from_rotation_x(config.tilt_degrees.to_radians());

    (tilt * facing).normalize()
}

/// Final globe orientation: `user * base * auto`.
///
/// Auto-rotation is applied in the globe's own frame, about its polar axis,
/// so its on-screen direction flips together with the globe when the user
/// turns it upside down.
pub fn compose(user_rotation: Quat, base: Quat, auto_rotation_angle: f32) -> Quat {
    let auto = Quat::from_rotation_y(auto_rotation_angle);

    (user_rotation.normalize() * base * auto).normalize()
}
