use common::{Contact, GeoPoint};
use glam::{Quat, Vec3};
use web_time::Duration;

use crate::{
    auto_rotation::AutoRotationTicker,
    camera::{auto_zoom, camera_distance, Camera, CameraUniform, GestureController, Projection},
    config::GlobeConfig,
    error::ConfigError,
    nudge::{EffectNode, NudgePhase, NudgeSequencer},
    orientation::{base_orientation, compose, Focus},
    overlay::{pin_glow_scale, OverlayLayout, OverlayManager, OverlaySignature},
    route::{revealed_prefix, RevealDriver, RouteCache, TravelingPulse},
    types::{angular_separation, surface_position, HandleAllocator, NodeHandle, SurfaceTextures},
};
use input::PointerState;
use touch::TouchState;

mod input;
mod touch;

pub use input::GestureEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    /// The user and the selected contact, joined by the route.
    #[default]
    PairFocus,
    SelfFocus,
    Overview,
}

/// What the caller wants shown.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeScene {
    pub mode: ViewMode,
    pub user: Contact,
    /// Only used in pair mode. Without one, pair mode shows the user alone.
    pub contact: Option<Contact>,
    /// Only used in overview mode.
    pub contacts: Vec<Contact>,
}

impl GlobeScene {
    pub fn pair(user: Contact, contact: Contact) -> Self {
        Self {
            mode: ViewMode::PairFocus,
            user,
            contact: Some(contact),
            contacts: Vec::new(),
        }
    }

    pub fn single(user: Contact) -> Self {
        Self {
            mode: ViewMode::SelfFocus,
            user,
            contact: None,
            contacts: Vec::new(),
        }
    }

    pub fn overview(user: Contact, contacts: Vec<Contact>) -> Self {
        Self {
            mode: ViewMode::Overview,
            user,
            contact: None,
            contacts,
        }
    }

    /// Great-circle distance for the "miles apart" caption in pair mode.
    pub fn miles_apart(&self) -> Option<u32> {
        match self.effective_mode() {
            ViewMode::PairFocus => self
                .contact
                .as_ref()
                .map(|contact| self.user.location.distance_in_miles(&contact.location)),
            _ => None,
        }
    }

    /// The mode actually shown: pair mode needs a contact.
    pub fn effective_mode(&self) -> ViewMode {
        match (self.mode, &self.contact) {
            (ViewMode::PairFocus, None) => ViewMode::SelfFocus,
            (mode, _) => mode,
        }
    }
}

/// Values owned by the caller and written back by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobeState {
    pub zoom: f32,
    pub user_rotation: Quat,
    pub auto_rotation_angle: f32,
    pub route_reveal_progress: f32,
    pub nudge_triggered: bool,
}

impl Default for GlobeState {
    fn default() -> Self {
        Self {
            zoom: 1.,
            user_rotation: Quat::IDENTITY,
            auto_rotation_angle: 0.,
            route_reveal_progress: 0.,
            nudge_triggered: false,
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub mode: ViewMode,
    pub orientation: Quat,
    pub camera: Camera,
    pub uniform: CameraUniform,
    pub overlay_rebuilt: bool,
    /// Overlay and effect nodes that no longer exist.
    pub removed: Vec<NodeHandle>,
    pub marker_visibility: Vec<(NodeHandle, bool)>,
    pub marker_scale: f32,
    pub pin_glow: f32,
    /// Position of the pulse on a fully drawn route.
    pub pulse: Option<Vec3>,
    pub nudge: NudgePhase,
}

impl FrameOutput {
    pub fn camera_distance(&self) -> f32 {
        self.camera.distance
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FocusKey {
    mode: ViewMode,
    user: GeoPoint,
    contact: Option<GeoPoint>,
}

impl FocusKey {
    fn new(scene: &GlobeScene) -> Self {
        let mode = scene.effective_mode();

        Self {
            mode,
            user: scene.user.location,
            contact: match mode {
                ViewMode::PairFocus => scene.contact.as_ref().map(|contact| contact.location),
                _ => None,
            },
        }
    }
}

/// The globe engine.
///
/// Owns every piece of transient state (running gestures, timers, caches,
/// overlay and effect nodes) and turns the caller's [`GlobeScene`] and
/// [`GlobeState`] into a [`FrameOutput`] once per frame.
#[derive(Debug)]
pub struct Globe {
    config: GlobeConfig,
    projection: Projection,
    textures: SurfaceTextures,

    handles: HandleAllocator,
    gestures: GestureController,
    touch_state: TouchState,
    pointer: PointerState,

    ticker: AutoRotationTicker,
    reveal: RevealDriver,
    routes: RouteCache,
    pulse: TravelingPulse,
    overlay: OverlayManager,
    nudge: NudgeSequencer,

    focus: Option<FocusKey>,
    marker_scale: f32,
    clock: Duration,
}

impl Globe {
    pub fn new(config: GlobeConfig) -> Result<Globe, ConfigError> {
        config.validate()?;

        let camera = &config.camera;
        let projection = Projection::new(
            1,
            1,
            camera.fovy_degrees.to_radians(),
            camera.znear,
            camera.zfar,
        );

        Ok(Self {
            projection,
            textures: SurfaceTextures::placeholder(),

            handles: HandleAllocator::new(),
            gestures: GestureController::new(&config.gesture, &config.camera),
            touch_state: TouchState::default(),
            pointer: PointerState::default(),

            ticker: AutoRotationTicker::new(&config.auto_rotation),
            reveal: RevealDriver::new(&config.route),
            routes: RouteCache::new(),
            pulse: TravelingPulse::new(&config.route),
            overlay: OverlayManager::new(&config.overlay, &config.surface),
            nudge: NudgeSequencer::new(&config.nudge),

            focus: None,
            marker_scale: 1.,
            clock: Duration::ZERO,

            config,
        })
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn set_textures(&mut self, textures: SurfaceTextures) {
        self.textures = textures;
    }

    pub fn textures(&self) -> &SurfaceTextures {
        &self.textures
    }

    pub fn overlay(&self) -> &OverlayManager {
        &self.overlay
    }

    pub fn effects(&self) -> &[EffectNode] {
        self.nudge.effects()
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    pub fn routes(&self) -> &RouteCache {
        &self.routes
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.is_animating()
    }

    /// Start the nudge beam along the current route, unless one is running.
    pub fn trigger_nudge(&mut self) -> bool {
        let pair = self
            .focus
            .as_ref()
            .is_some_and(|focus| focus.mode == ViewMode::PairFocus);

        match self.routes.arc() {
            Some(arc) if pair => self.nudge.trigger(arc, self.marker_scale),
            _ => {
                log::debug!("Nudge ignored: no route on screen");
                false
            }
        }
    }

    /// Advance everything by `dt` and compute this frame.
    pub fn update(&mut self, scene: &GlobeScene, state: &mut GlobeState, dt: Duration) -> FrameOutput {
        self.clock += dt;

        let key = FocusKey::new(scene);
        let mode = key.mode;
        if self.focus.as_ref() != Some(&key) {
            self.change_focus(scene, state, key);
        }

        if let Some(progress) = self.reveal.advance(dt) {
            state.route_reveal_progress = progress;
        }

        let paused = self.gestures.is_interacting();
        self.ticker.tick(dt, &mut state.auto_rotation_angle, paused);

        let radius = self.config.surface.marker_radius;
        let user = surface_position(scene.user.location, 1.);
        let contact = match mode {
            ViewMode::PairFocus => scene.contact.as_ref(),
            _ => None,
        };

        let focus = match (mode, contact) {
            (ViewMode::PairFocus, Some(contact)) => Focus::Pair {
                primary: surface_position(contact.location, 1.),
                secondary: user,
            },
            (ViewMode::Overview, _) => Focus::Overview {
                points: scene
                    .contacts
                    .iter()
                    .map(|contact| surface_position(contact.location, 1.))
                    .collect(),
                fallback: user,
            },
            _ => Focus::Single(user),
        };

        let base = base_orientation(&self.config.orientation, &focus);
        let orientation = compose(state.user_rotation, base, state.auto_rotation_angle);

        let separation = match &focus {
            Focus::Pair { primary, secondary } => Some(angular_separation(*primary, *secondary)),
            _ => None,
        };
        let distance = camera_distance(&self.config.camera, state.zoom, mode, separation);
        let camera = Camera::new(orientation, distance);
        let uniform = CameraUniform::update_view_projection(&camera, &self.projection);

        self.marker_scale = distance / self.config.camera.default_distance;

        let arc = match contact {
            Some(contact) => Some(self.routes.get_or_build(
                scene.user.location,
                contact.location,
                radius,
                &self.config.route,
            )),
            None => None,
        };

        let progress = if arc.is_some() {
            state.route_reveal_progress
        } else {
            0.
        };

        let shown: Vec<&Contact> = match mode {
            ViewMode::Overview => std::iter::once(&scene.user).chain(&scene.contacts).collect(),
            _ => std::iter::once(&scene.user).chain(contact).collect(),
        };
        let coordinates: Vec<GeoPoint> = shown.iter().map(|contact| contact.location).collect();
        let avatars: Vec<&str> = shown.iter().map(|contact| contact.avatar.as_str()).collect();

        let signature = OverlaySignature::new(
            &self.config.overlay,
            mode,
            &coordinates,
            progress,
            self.marker_scale,
            &avatars,
        );

        let scale = self.marker_scale;
        let rebuilt = self.overlay.sync(&signature, &mut self.handles, || OverlayLayout {
            pins: match mode {
                ViewMode::Overview => Vec::new(),
                _ => shown.clone(),
            },
            arc: arc.map(|arc| revealed_prefix(arc, progress)),
            markers: shown.clone(),
            scale,
        });

        let overlay_rebuilt = rebuilt.is_some();
        let mut removed = rebuilt.unwrap_or_default();

        self.overlay.update_visibility(&camera, &self.projection);

        let pulse = match arc {
            Some(arc) if progress >= 1. => self.pulse.position(arc, dt),
            _ => None,
        };

        self.nudge.observe(state.nudge_triggered, arc, scale);
        removed.extend(self.nudge.advance(dt, &mut self.handles));

        log::trace!("Frame {mode:?}: distance {distance}, progress {progress}");

        FrameOutput {
            mode,
            orientation,
            camera,
            uniform,
            overlay_rebuilt,
            removed,
            marker_visibility: self.overlay.visibility(),
            marker_scale: scale,
            pin_glow: pin_glow_scale(&self.config.overlay, self.clock),
            pulse,
            nudge: self.nudge.phase(),
        }
    }

    fn change_focus(&mut self, scene: &GlobeScene, state: &mut GlobeState, key: FocusKey) {
        if scene.mode != key.mode {
            log::debug!("No contact selected, falling back to {:?}", key.mode);
        }
        log::debug!("Focus changed to {:?}", key.mode);

        state.route_reveal_progress = 0.;
        self.pulse.reset();

        // Every focus starts from a fresh viewport.
        self.gestures.cancel();
        self.touch_state.interrupt();
        self.rebase_pointer();
        state.user_rotation = Quat::IDENTITY;

        let camera = &self.config.camera;
        match key.mode {
            ViewMode::PairFocus => {
                self.ticker.stop();
                self.reveal.restart();
                state.auto_rotation_angle = 0.;

                let miles = scene.miles_apart().unwrap_or_default();
                state.zoom = auto_zoom(camera, miles as f32);
            }
            ViewMode::SelfFocus => {
                self.ticker.stop();
                self.reveal.cancel();
                state.auto_rotation_angle = 0.;
                state.zoom = camera.self_zoom;
            }
            ViewMode::Overview => {
                self.reveal.cancel();
                self.ticker.start();
                state.zoom = 1.;
            }
        }

        self.focus = Some(key);
    }
}
