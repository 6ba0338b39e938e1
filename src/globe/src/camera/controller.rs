use glam::{Quat, Vec2};

use crate::config::{CameraConfig, GestureConfig};

use super::distance::{clamp_zoom, smooth_zoom};

/// Per-gesture state: idle, or active with the value captured when the gesture
/// began.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GesturePhase<T> {
    #[default]
    Idle,
    Active {
        baseline: T,
    },
}

impl<T: Copy> GesturePhase<T> {
    pub fn is_active(&self) -> bool {
        matches!(self, GesturePhase::Active { .. })
    }

    /// Baseline of the running gesture, starting one from `current` if idle.
    fn baseline_or_begin(&mut self, current: T) -> T {
        match *self {
            GesturePhase::Active { baseline } => baseline,
            GesturePhase::Idle => {
                *self = GesturePhase::Active { baseline: current };
                current
            }
        }
    }
}

/// Turns drag, pinch and twist gestures into new user rotation and zoom
/// values.
///
/// Each update is computed from the total translation, scale or angle since
/// the gesture began, applied to the value captured at that moment. Dropped or
/// batched events therefore never accumulate error.
#[derive(Debug)]
pub struct GestureController {
    sensitivity: f32,
    camera: CameraConfig,

    drag: GesturePhase<Quat>,
    pinch: GesturePhase<f32>,
    pinch_scale: f32,
    twist: GesturePhase<Quat>,
}

impl GestureController {
    pub fn new(gesture: &GestureConfig, camera: &CameraConfig) -> Self {
        Self {
            sensitivity: gesture.drag_sensitivity,
            camera: camera.clone(),

            drag: GesturePhase::Idle,
            pinch: GesturePhase::Idle,
            pinch_scale: 1.,
            twist: GesturePhase::Idle,
        }
    }

    /// `translation` is the total screen movement since the drag began, +y down.
    pub fn on_drag_changed(&mut self, translation: Vec2, current: Quat) -> Quat {
        let baseline = self.drag.baseline_or_begin(current);

        let pitch = Quat::from_rotation_x(translation.y * self.sensitivity);
        let yaw = Quat::from_rotation_y(translation.x * self.sensitivity);

        (pitch * yaw * baseline).normalize()
    }

    pub fn on_drag_ended(&mut self) {
        self.drag = GesturePhase::Idle;
    }

    /// `scale` is the ratio of finger spread now to finger spread at the start.
    pub fn on_pinch_changed(&mut self, scale: f32, current_zoom: f32) -> f32 {
        let baseline = self.pinch.baseline_or_begin(clamp_zoom(&self.camera, current_zoom));

        if scale.is_finite() && scale > 0. {
            self.pinch_scale = scale;
        }

        smooth_zoom(&self.camera, current_zoom, baseline * self.pinch_scale)
    }

    /// Commit the pinch: the zoom lands on the baseline times the last scale,
    /// however many updates the host delivered on the way.
    pub fn on_pinch_ended(&mut self, current_zoom: f32) -> f32 {
        let zoom = match self.pinch {
            GesturePhase::Active { baseline } => baseline * self.pinch_scale,
            GesturePhase::Idle => current_zoom,
        };

        self.pinch = GesturePhase::Idle;
        self.pinch_scale = 1.;

        clamp_zoom(&self.camera, zoom)
    }

    /// `angle` is the total twist in radians since the gesture began,
    /// counter-clockwise on screen.
    pub fn on_twist_changed(&mut self, angle: f32, current: Quat) -> Quat {
        let baseline = self.twist.baseline_or_begin(current);

        (Quat::from_rotation_z(-angle) * baseline).normalize()
    }

    pub fn on_twist_ended(&mut self) {
        self.twist = GesturePhase::Idle;
    }

    /// Drop every running gesture, e.g. when the view is interrupted.
    pub fn cancel(&mut self) {
        if self.is_interacting() || self.twist.is_active() {
            log::debug!("Cancelling active gestures");
        }

        self.drag = GesturePhase::Idle;
        self.pinch = GesturePhase::Idle;
        self.pinch_scale = 1.;
        self.twist = GesturePhase::Idle;
    }

    /// Whether a drag or pinch is running, which holds auto-rotation back.
    pub fn is_interacting(&self) -> bool {
        self.drag.is_active() || self.pinch.is_active()
    }

    pub fn drag_phase(&self) -> GesturePhase<Quat> {
        self.drag
    }

    pub fn pinch_phase(&self) -> GesturePhase<f32> {
        self.pinch
    }

    pub fn twist_phase(&self) -> GesturePhase<Quat> {
        self.twist
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn controller() -> GestureController {
        GestureController::new(&GestureConfig::default(), &CameraConfig::default())
    }

    #[test]
    fn drag_uses_total_translation_not_deltas() {
        let mut controller = controller();
        let start = Quat::from_rotation_y(0.3);

        // Feed intermediate results back as "current" like a host would.
        let mut current = start;
        for step in 1..=10 {
            current = controller.on_drag_changed(Vec2::new(step as f32 * 10., 0.), current);
        }

        let mut direct = self::controller();
        let expected = direct.on_drag_changed(Vec2::new(100., 0.), start);

        assert!(current.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn horizontal_drag_moves_front_point_right() {
        let mut controller = controller();
        let rotation = controller.on_drag_changed(Vec2::new(50., 0.), Quat::IDENTITY);

        assert!((rotation * Vec3::Z).x > 0.);
    }

    #[test]
    fn downward_drag_moves_front_point_down() {
        let mut controller = controller();
        let rotation = controller.on_drag_changed(Vec2::new(0., 50.), Quat::IDENTITY);

        assert!((rotation * Vec3::Z).y < 0.);
    }

    #[test]
    fn drag_end_resets_baseline() {
        let mut controller = controller();
        let first = controller.on_drag_changed(Vec2::new(40., 0.), Quat::IDENTITY);
        controller.on_drag_ended();
        assert_eq!(controller.drag_phase(), GesturePhase::Idle);

        let second = controller.on_drag_changed(Vec2::new(40., 0.), first);
        let expected = (Quat::from_rotation_y(40. * 0.005) * first).normalize();

        assert!(second.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn twist_rolls_against_gesture_angle() {
        let mut controller = controller();
        let rotation = controller.on_twist_changed(0.5, Quat::IDENTITY);

        assert!(rotation.abs_diff_eq(Quat::from_rotation_z(-0.5), 1e-6));
        assert!(controller.twist_phase().is_active());
        assert!(!controller.is_interacting());
    }

    #[test]
    fn pinch_converges_on_scaled_baseline() {
        let mut controller = controller();
        let mut zoom = 1.;

        for _ in 0..50 {
            zoom = controller.on_pinch_changed(2., zoom);
        }

        assert!((zoom - 2.).abs() < 1e-3);
        assert_eq!(controller.pinch_phase(), GesturePhase::Active { baseline: 1. });
    }

    #[test]
    fn pinch_end_ignores_event_batching() {
        let mut batched = controller();
        let zoom = batched.on_pinch_changed(2., 1.);
        let batched = batched.on_pinch_ended(zoom);

        let mut streamed = controller();
        let mut zoom = 1.;
        for step in 1..=10 {
            zoom = streamed.on_pinch_changed(1. + step as f32 / 10., zoom);
        }
        let streamed = streamed.on_pinch_ended(zoom);

        assert!((batched - 2.).abs() < 1e-5);
        assert!((streamed - 2.).abs() < 1e-5);
    }

    #[test]
    fn pinch_end_without_pinch_keeps_zoom() {
        let mut controller = controller();

        assert_eq!(controller.on_pinch_ended(1.3), 1.3);
        assert_eq!(controller.on_pinch_ended(f32::NAN), 1.);
    }

    #[test]
    fn pinch_respects_zoom_bounds() {
        let mut controller = controller();
        let mut zoom = 1.;

        for _ in 0..200 {
            zoom = controller.on_pinch_changed(100., zoom);
        }

        assert!(zoom <= CameraConfig::default().max_zoom);
    }

    #[test]
    fn cancel_returns_everything_to_idle() {
        let mut controller = controller();
        controller.on_drag_changed(Vec2::ONE, Quat::IDENTITY);
        controller.on_pinch_changed(1.5, 1.);
        controller.on_twist_changed(0.2, Quat::IDENTITY);

        assert!(controller.is_interacting());
        controller.cancel();

        assert!(!controller.is_interacting());
        assert!(!controller.twist_phase().is_active());
    }
}
