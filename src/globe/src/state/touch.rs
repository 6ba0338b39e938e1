use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use glam::Vec2;
use winit::event::TouchPhase;

use super::{Globe, GlobeState, GestureEvent};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
enum TouchGesture {
    #[default]
    None,
    Drag {
        origin: Vec2,
    },
    Pinch {
        ids: [u64; 2],
        spread: f32,
        last_angle: f32,
        twist: f32,
    },
}

/// Raw touch points turned into drag, pinch and twist updates.
///
/// One finger drags; two fingers pinch and twist at once. Whenever the
/// number of fingers changes, or a lifted finger hands the pinch to a
/// different pair, the running gesture ends and the next one starts from the
/// current finger positions.
#[derive(Debug, Default)]
pub(super) struct TouchState {
    touches: HashMap<u64, Vec2>,
    gesture: TouchGesture,
}

impl TouchState {
    pub(super) fn touch(&mut self, id: u64, phase: TouchPhase, location: Vec2) -> Vec<GestureEvent> {
        match phase {
            TouchPhase::Started => {
                self.touches.insert(id, location);
            }
            TouchPhase::Moved => {
                if let Some(point) = self.touches.get_mut(&id) {
                    *point = location;
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.remove(&id);
            }
        }

        let mut events = Vec::new();

        let fingers = self.touches.len().min(2);
        let pair = pair(&self.touches);
        let (running, same_pair) = match self.gesture {
            TouchGesture::None => (0, true),
            TouchGesture::Drag { .. } => (1, true),
            TouchGesture::Pinch { ids, .. } => (2, pair.map(|(current, ..)| current) == Some(ids)),
        };

        if fingers != running || !same_pair {
            self.end(&mut events);
            self.begin();
            return events;
        }

        let points = self.points();

        match &mut self.gesture {
            TouchGesture::None => {}
            TouchGesture::Drag { origin } => {
                if let [point] = points.as_slice() {
                    events.push(GestureEvent::DragChanged {
                        translation: *point - *origin,
                    });
                }
            }
            TouchGesture::Pinch {
                spread,
                last_angle,
                twist,
                ..
            } => {
                let Some((_, a, b)) = pair else {
                    return events;
                };

                let scale = if *spread > f32::EPSILON {
                    a.distance(b) / *spread
                } else {
                    1.
                };

                let angle = screen_angle(a, b);
                *twist += wrap(angle - *last_angle);
                *last_angle = angle;

                events.push(GestureEvent::PinchChanged { scale });
                events.push(GestureEvent::TwistChanged { angle: *twist });
            }
        }

        events
    }

    /// Forget the running gesture; the fingers still down start a new one on
    /// their next move.
    pub(super) fn interrupt(&mut self) {
        self.gesture = TouchGesture::None;
    }

    fn end(&mut self, events: &mut Vec<GestureEvent>) {
        match self.gesture {
            TouchGesture::None => {}
            TouchGesture::Drag { .. } => events.push(GestureEvent::DragEnded),
            TouchGesture::Pinch { .. } => {
                events.push(GestureEvent::PinchEnded);
                events.push(GestureEvent::TwistEnded);
            }
        }

        self.gesture = TouchGesture::None;
    }

    fn begin(&mut self) {
        self.gesture = match self.points().as_slice() {
            [] => TouchGesture::None,
            [origin] => TouchGesture::Drag { origin: *origin },
            _ => match pair(&self.touches) {
                Some((ids, a, b)) => TouchGesture::Pinch {
                    ids,
                    spread: a.distance(b),
                    last_angle: screen_angle(a, b),
                    twist: 0.,
                },
                None => TouchGesture::None,
            },
        };
    }

    fn points(&self) -> Vec<Vec2> {
        self.touches.values().copied().collect()
    }
}

/// The two touches with the lowest ids, so extra fingers never reshuffle
/// the pair.
fn pair(touches: &HashMap<u64, Vec2>) -> Option<([u64; 2], Vec2, Vec2)> {
    let mut ids: Vec<_> = touches.keys().copied().collect();
    ids.sort_unstable();

    match ids.as_slice() {
        [a, b, ..] => Some(([*a, *b], touches[a], touches[b])),
        _ => None,
    }
}

/// Counter-clockwise angle of `a -> b` on a screen whose y axis points down.
fn screen_angle(a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    (-d.y).atan2(d.x)
}

fn wrap(angle: f32) -> f32 {
    let angle = (angle + PI).rem_euclid(TAU) - PI;
    if angle <= -PI {
        angle + TAU
    } else {
        angle
    }
}

impl Globe {
    /// Feed one raw touch point.
    pub fn touch(&mut self, id: u64, phase: TouchPhase, location: Vec2, state: &mut GlobeState) {
        for event in self.touch_state.touch(id, phase, location) {
            self.input(event, state);
        }
    }
}
