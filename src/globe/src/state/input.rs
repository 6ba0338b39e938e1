use glam::Vec2;
use winit::event::{MouseButton, MouseScrollDelta, Touch, WindowEvent};

use super::{Globe, GlobeState};
use crate::camera::step_zoom;

/// Pixels of trackpad scrolling that count as one zoom step.
const PIXELS_PER_STEP: f32 = 50.;

/// A gesture update, already reduced to totals since the gesture began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Screen translation in points since the drag began, +y down.
    DragChanged { translation: Vec2 },
    DragEnded,
    /// Finger spread now over finger spread at the start.
    PinchChanged { scale: f32 },
    PinchEnded,
    /// Radians since the twist began, counter-clockwise on screen.
    TwistChanged { angle: f32 },
    TwistEnded,
    /// Whole zoom steps; positive zooms in.
    ZoomStep { steps: i32 },
    Cancel,
}

#[derive(Debug, Default)]
pub(super) struct PointerState {
    cursor: Vec2,
    drag_origin: Option<Vec2>,
    scroll: f32,
}

impl Globe {
    /// Apply one gesture update to the caller's zoom and rotation.
    pub fn input(&mut self, event: GestureEvent, state: &mut GlobeState) {
        match event {
            GestureEvent::DragChanged { translation } => {
                state.user_rotation = self
                    .gestures
                    .on_drag_changed(translation, state.user_rotation);
            }
            GestureEvent::DragEnded => self.gestures.on_drag_ended(),

            GestureEvent::PinchChanged { scale } => {
                state.zoom = self.gestures.on_pinch_changed(scale, state.zoom);
            }
            GestureEvent::PinchEnded => {
                state.zoom = self.gestures.on_pinch_ended(state.zoom);
            }

            GestureEvent::TwistChanged { angle } => {
                state.user_rotation = self
                    .gestures
                    .on_twist_changed(angle, state.user_rotation);
            }
            GestureEvent::TwistEnded => self.gestures.on_twist_ended(),

            GestureEvent::ZoomStep { steps } => {
                state.zoom = step_zoom(&self.config.camera, state.zoom, steps);
            }
            GestureEvent::Cancel => self.gestures.cancel(),
        }
    }

    /// Feed a raw window event. Returns whether the globe consumed it.
    pub fn window_event(&mut self, event: &WindowEvent, state: &mut GlobeState) -> bool {
        match event {
            WindowEvent::MouseInput {
                state: button,
                button: MouseButton::Left,
                ..
            } => {
                self.mouse_button(button.is_pressed(), state);
                true
            }

            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                self.cursor_moved(position, state);
                true
            }

            WindowEvent::CursorLeft { .. } => {
                self.release_pointer(state);
                true
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll(delta, state);
                true
            }

            WindowEvent::Touch(Touch {
                id, phase, location, ..
            }) => {
                let location = Vec2::new(location.x as f32, location.y as f32);
                self.touch(*id, *phase, location, state);
                true
            }

            _ => false,
        }
    }

    /// The left button starts a drag from the cursor and ends it on release.
    fn mouse_button(&mut self, pressed: bool, state: &mut GlobeState) {
        if pressed {
            self.pointer.drag_origin = Some(self.pointer.cursor);
        } else {
            self.release_pointer(state);
        }
    }

    fn cursor_moved(&mut self, position: Vec2, state: &mut GlobeState) {
        self.pointer.cursor = position;

        if let Some(origin) = self.pointer.drag_origin {
            let translation = position - origin;
            self.input(GestureEvent::DragChanged { translation }, state);
        }
    }

    /// Restart a held mouse drag from where the cursor is now.
    pub(super) fn rebase_pointer(&mut self) {
        if let Some(origin) = self.pointer.drag_origin.as_mut() {
            *origin = self.pointer.cursor;
        }
    }

    fn release_pointer(&mut self, state: &mut GlobeState) {
        if self.pointer.drag_origin.take().is_some() {
            self.input(GestureEvent::DragEnded, state);
        }
    }

    /// Mouse wheel and trackpad scrolling zoom in whole steps.
    pub fn scroll(&mut self, delta: &MouseScrollDelta, state: &mut GlobeState) {
        self.pointer.scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_STEP,
        };

        let steps = self.pointer.scroll.trunc();
        self.pointer.scroll -= steps;

        if steps != 0. {
            self.input(GestureEvent::ZoomStep { steps: steps as i32 }, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};
    use winit::dpi::PhysicalPosition;

    use super::*;
    use crate::config::GlobeConfig;

    fn globe() -> Globe {
        Globe::new(GlobeConfig::default()).unwrap()
    }

    #[test]
    fn drag_updates_user_rotation() {
        let mut globe = globe();
        let mut state = GlobeState::default();

        globe.input(
            GestureEvent::DragChanged {
                translation: Vec2::new(60., 0.),
            },
            &mut state,
        );

        assert!((state.user_rotation * Vec3::Z).x > 0.);
        assert!(globe.gestures().is_interacting());

        globe.input(GestureEvent::DragEnded, &mut state);
        assert!(!globe.gestures().is_interacting());
    }

    #[test]
    fn zoom_steps_round_trip() {
        let mut globe = globe();
        let mut state = GlobeState::default();

        globe.input(GestureEvent::ZoomStep { steps: 3 }, &mut state);
        assert!(state.zoom > 1.9);
        globe.input(GestureEvent::ZoomStep { steps: -3 }, &mut state);

        assert!((state.zoom - 1.).abs() < 1e-4);
    }

    #[test]
    fn pixel_scrolling_accumulates() {
        let mut globe = globe();
        let mut state = GlobeState::default();
        let nudge = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0., 20.));

        globe.scroll(&nudge, &mut state);
        globe.scroll(&nudge, &mut state);
        assert_eq!(state.zoom, 1.);

        globe.scroll(&nudge, &mut state);
        assert!((state.zoom - 1.25).abs() < 1e-5);
    }

    #[test]
    fn mouse_drag_from_press_point() {
        let mut globe = globe();
        let mut state = GlobeState::default();

        globe.cursor_moved(Vec2::new(100., 100.), &mut state);
        assert_eq!(state.user_rotation, Quat::IDENTITY);

        globe.mouse_button(true, &mut state);
        globe.cursor_moved(Vec2::new(100., 150.), &mut state);
        assert!((state.user_rotation * Vec3::Z).y < 0.);
        assert!(globe.gestures().is_interacting());

        globe.mouse_button(false, &mut state);
        assert!(!globe.gestures().is_interacting());

        // Moving without the button held leaves the globe alone.
        let held = state.user_rotation;
        globe.cursor_moved(Vec2::new(300., 10.), &mut state);
        assert_eq!(state.user_rotation, held);
    }

    #[test]
    fn leaving_the_window_ends_the_drag() {
        let mut globe = globe();
        let mut state = GlobeState::default();

        globe.mouse_button(true, &mut state);
        globe.cursor_moved(Vec2::new(40., 0.), &mut state);
        assert!(globe.gestures().is_interacting());

        globe.release_pointer(&mut state);
        assert!(!globe.gestures().is_interacting());
    }

    #[test]
    fn pinch_lands_on_final_scale_however_it_was_delivered() {
        let mut batched = globe();
        let mut one = GlobeState::default();
        batched.input(GestureEvent::PinchChanged { scale: 2. }, &mut one);
        batched.input(GestureEvent::PinchEnded, &mut one);

        let mut streamed = globe();
        let mut ten = GlobeState::default();
        for step in 1..=10 {
            let scale = 1. + step as f32 / 10.;
            streamed.input(GestureEvent::PinchChanged { scale }, &mut ten);
        }
        streamed.input(GestureEvent::PinchEnded, &mut ten);

        assert!((one.zoom - 2.).abs() < 1e-5, "{}", one.zoom);
        assert!((ten.zoom - 2.).abs() < 1e-5, "{}", ten.zoom);
        assert!(!batched.gestures().is_interacting());
    }
}
