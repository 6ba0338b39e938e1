//! Tuning knobs for the globe.
//!
//! Every constant the engine uses lives here so a host can retune the look
//! without touching the math. Angles are given in degrees and times in
//! seconds, since those are what a designer edits; the engine converts on use.

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub surface: SurfaceConfig,
    pub orientation: OrientationConfig,
    pub camera: CameraConfig,
    pub gesture: GestureConfig,
    pub auto_rotation: AutoRotationConfig,
    pub route: RouteConfig,
    pub overlay: OverlayConfig,
    pub nudge: NudgeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub globe_radius: f32,
    /// Radius pins, arcs and markers sit at, slightly above the surface.
    pub marker_radius: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            globe_radius: 1.,
            marker_radius: 1.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Share of the primary point in the pair-mode focus blend.
    pub pair_primary_weight: f32,
    pub tilt_degrees: f32,
    pub overview_yaw_degrees: f32,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            pair_primary_weight: 0.68,
            tilt_degrees: 3.5,
            overview_yaw_degrees: 20.,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub default_distance: f32,
    pub overview_distance: f32,
    /// Angular separation (degrees) above which pair mode pulls the camera back.
    pub pair_separation_threshold_degrees: f32,
    /// Extra baseline distance per radian of separation beyond the threshold.
    pub pair_distance_per_radian: f32,
    pub pair_max_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Multiplicative zoom change of one discrete step.
    pub zoom_step_factor: f32,
    /// Fraction of the remaining log-space gap closed per pinch event.
    pub pinch_smoothing: f32,
    /// Zoom set when the view switches to the user alone.
    pub self_zoom: f32,
    /// Zoom set when a pair comes into focus, eased from `auto_zoom_near` at
    /// `auto_zoom_near_miles` down to `auto_zoom_far` at `auto_zoom_far_miles`.
    pub auto_zoom_near: f32,
    pub auto_zoom_far: f32,
    pub auto_zoom_near_miles: f32,
    pub auto_zoom_far_miles: f32,
    pub auto_zoom_exponent: f32,
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            default_distance: 3.2,
            overview_distance: 3.6,
            pair_separation_threshold_degrees: 50.,
            pair_distance_per_radian: 0.9,
            pair_max_distance: 5.,
            min_distance: 1.6,
            max_distance: 8.,
            min_zoom: 0.5,
            max_zoom: 3.,
            zoom_step_factor: 1.25,
            pinch_smoothing: 0.35,
            self_zoom: 1.05,
            auto_zoom_near: 1.62,
            auto_zoom_far: 0.84,
            auto_zoom_near_miles: 150.,
            auto_zoom_far_miles: 9_000.,
            auto_zoom_exponent: 0.68,
            fovy_degrees: 45.,
            znear: 0.1,
            zfar: 100.,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Radians of rotation per point of drag translation.
    pub drag_sensitivity: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoRotationConfig {
    pub rate_hz: u32,
    pub step_degrees: f32,
    /// Upper bound on ticks replayed after a long frame.
    pub max_catch_up_ticks: u32,
}

impl Default for AutoRotationConfig {
    fn default() -> Self {
        Self {
            rate_hz: 30,
            step_degrees: 0.1,
            max_catch_up_ticks: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub segments: u32,
    pub lift_factor: f32,
    pub reveal_seconds: f32,
    pub pulse_period_seconds: f32,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            segments: 64,
            lift_factor: 0.08,
            reveal_seconds: 1.2,
            pulse_period_seconds: 2.,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Coordinates closer than this (degrees) share a signature.
    pub coordinate_quantum: f32,
    pub progress_buckets: u32,
    pub scale_buckets: u32,
    pub pin_glow_period_seconds: f32,
    pub pin_glow_peak_scale: f32,
    pub badge_size: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            coordinate_quantum: 1e-4,
            progress_buckets: 60,
            scale_buckets: 50,
            pin_glow_period_seconds: 1.5,
            pin_glow_peak_scale: 1.8,
            badge_size: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NudgeConfig {
    pub orb_launch_seconds: Vec<f32>,
    pub orb_travel_seconds: f32,
    pub orb_base_size: f32,
    /// Each later orb is this much larger, relative to the first.
    pub orb_growth: f32,
    pub flash_seconds: f32,
    pub ring_count: u32,
    pub ring_stagger_seconds: f32,
    pub ring_seconds: f32,
    pub ring_radius: f32,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            orb_launch_seconds: vec![0., 0.25, 0.5],
            orb_travel_seconds: 2.5,
            orb_base_size: 0.02,
            orb_growth: 0.3,
            flash_seconds: 0.45,
            ring_count: 5,
            ring_stagger_seconds: 0.08,
            ring_seconds: 0.6,
            ring_radius: 0.22,
        }
    }
}

impl NudgeConfig {
    /// Time from trigger until the last orb lands.
    pub fn beam_seconds(&self) -> f32 {
        let last_launch = self
            .orb_launch_seconds
            .iter()
            .copied()
            .fold(0., f32::max);

        last_launch + self.orb_travel_seconds
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0. {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { field, min, max })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0. ..=1.).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

/// Non-negative, finite and small enough to become a [`Duration`].
fn seconds(field: &'static str, value: f32) -> Result<(), ConfigError> {
    match Duration::try_from_secs_f32(value) {
        Ok(_) => Ok(()),
        Err(_) => Err(ConfigError::InvalidSeconds { field, value }),
    }
}

fn at_least(field: &'static str, min: u32, value: u32) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::TooSmall { field, min, value })
    }
}

impl GlobeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let surface = &self.surface;
        positive("surface.globe_radius", surface.globe_radius)?;
        positive("surface.marker_radius", surface.marker_radius)?;

        unit(
            "orientation.pair_primary_weight",
            self.orientation.pair_primary_weight,
        )?;

        let camera = &self.camera;
        positive("camera.default_distance", camera.default_distance)?;
        positive("camera.overview_distance", camera.overview_distance)?;
        positive("camera.min_distance", camera.min_distance)?;
        ordered("camera.distance", camera.min_distance, camera.max_distance)?;
        ordered(
            "camera.pair_distance",
            camera.default_distance,
            camera.pair_max_distance,
        )?;
        positive("camera.min_zoom", camera.min_zoom)?;
        ordered("camera.zoom", camera.min_zoom, camera.max_zoom)?;
        positive("camera.zoom_step_factor", camera.zoom_step_factor)?;
        unit("camera.pinch_smoothing", camera.pinch_smoothing)?;
        positive("camera.self_zoom", camera.self_zoom)?;
        positive("camera.auto_zoom_near", camera.auto_zoom_near)?;
        positive("camera.auto_zoom_far", camera.auto_zoom_far)?;
        ordered(
            "camera.auto_zoom_miles",
            camera.auto_zoom_near_miles,
            camera.auto_zoom_far_miles,
        )?;
        positive("camera.auto_zoom_exponent", camera.auto_zoom_exponent)?;
        positive("camera.fovy_degrees", camera.fovy_degrees)?;
        positive("camera.znear", camera.znear)?;
        ordered("camera.clip", camera.znear, camera.zfar)?;

        positive("gesture.drag_sensitivity", self.gesture.drag_sensitivity)?;

        at_least("auto_rotation.rate_hz", 1, self.auto_rotation.rate_hz)?;
        at_least(
            "auto_rotation.max_catch_up_ticks",
            1,
            self.auto_rotation.max_catch_up_ticks,
        )?;

        let route = &self.route;
        at_least("route.segments", 1, route.segments)?;
        positive("route.reveal_seconds", route.reveal_seconds)?;
        seconds("route.reveal_seconds", route.reveal_seconds)?;
        positive("route.pulse_period_seconds", route.pulse_period_seconds)?;
        seconds("route.pulse_period_seconds", route.pulse_period_seconds)?;

        let overlay = &self.overlay;
        positive("overlay.coordinate_quantum", overlay.coordinate_quantum)?;
        at_least("overlay.progress_buckets", 1, overlay.progress_buckets)?;
        at_least("overlay.scale_buckets", 1, overlay.scale_buckets)?;
        positive(
            "overlay.pin_glow_period_seconds",
            overlay.pin_glow_period_seconds,
        )?;
        at_least("overlay.badge_size", 4, overlay.badge_size)?;

        let nudge = &self.nudge;
        if nudge.orb_launch_seconds.is_empty() {
            return Err(ConfigError::EmptyOrbSchedule);
        }
        for offset in &nudge.orb_launch_seconds {
            seconds("nudge.orb_launch_seconds", *offset)?;
        }
        positive("nudge.orb_travel_seconds", nudge.orb_travel_seconds)?;
        positive("nudge.flash_seconds", nudge.flash_seconds)?;
        positive("nudge.ring_seconds", nudge.ring_seconds)?;
        seconds("nudge.orb_travel_seconds", nudge.orb_travel_seconds)?;
        seconds("nudge.flash_seconds", nudge.flash_seconds)?;
        seconds("nudge.ring_stagger_seconds", nudge.ring_stagger_seconds)?;
        seconds("nudge.ring_seconds", nudge.ring_seconds)?;
        // Orbs land at launch + travel.
        seconds("nudge.beam_seconds", nudge.beam_seconds())?;

        Ok(())
    }
}
