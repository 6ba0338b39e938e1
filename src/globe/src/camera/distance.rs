//! Camera distance from semantic zoom.
//!
//! Zoom is a multiplier on top of a per-mode baseline distance: zoom 2 puts the
//! camera twice as close as the baseline. All zoom arithmetic that a user can
//! feel (pinch smoothing, +/- steps) happens in log space so one step looks
//! the same at every zoom level.

use crate::config::CameraConfig;
use crate::ViewMode;

/// Zoom clamped into the configured range. Garbage in gives the neutral zoom.
pub fn clamp_zoom(config: &CameraConfig, zoom: f32) -> f32 {
    let zoom = if zoom.is_nan() { 1. } else { zoom };

    zoom.clamp(config.min_zoom, config.max_zoom)
}

/// Distance the camera would sit at with zoom 1.
pub fn baseline_distance(config: &CameraConfig, mode: ViewMode, separation: Option<f32>) -> f32 {
    match (mode, separation) {
        (ViewMode::PairFocus, Some(separation)) => {
            let threshold = config.pair_separation_threshold_degrees.to_radians();
            let excess = (separation - threshold).max(0.);

            (config.default_distance + excess * config.pair_distance_per_radian)
                .clamp(config.default_distance, config.pair_max_distance)
        }
        (ViewMode::Overview, _) => config.overview_distance,
        _ => config.default_distance,
    }
}

/// Final camera distance for this frame.
///
/// `separation` is the angle in radians between the two focused points and
/// only matters in pair mode.
pub fn camera_distance(
    config: &CameraConfig,
    zoom: f32,
    mode: ViewMode,
    separation: Option<f32>,
) -> f32 {
    let baseline = baseline_distance(config, mode, separation);
    let zoom = clamp_zoom(config, zoom);

    (baseline / zoom).clamp(config.min_distance, config.max_distance)
}

/// Zoom that frames a newly focused pair `miles` apart: close in for
/// neighbours, pulled back for the far side of the world.
pub fn auto_zoom(config: &CameraConfig, miles: f32) -> f32 {
    let near = config.auto_zoom_near_miles;
    let far = config.auto_zoom_far_miles;

    let t = if far > near {
        ((miles - near) / (far - near)).clamp(0., 1.)
    } else {
        0.
    };
    let eased = if t.is_nan() {
        0.
    } else {
        t.powf(config.auto_zoom_exponent)
    };

    clamp_zoom(
        config,
        config.auto_zoom_near - eased * (config.auto_zoom_near - config.auto_zoom_far),
    )
}

/// Move `zoom` by whole steps of `zoom_step_factor`; positive steps zoom in.
pub fn step_zoom(config: &CameraConfig, zoom: f32, steps: i32) -> f32 {
    let zoom = clamp_zoom(config, zoom);
    let step = config.zoom_step_factor.ln();

    clamp_zoom(config, (zoom.ln() + step * steps as f32).exp())
}

/// One pinch update: close part of the log-space gap between `current` and
/// `target`.
pub fn smooth_zoom(config: &CameraConfig, current: f32, target: f32) -> f32 {
    let current = clamp_zoom(config, current).ln();
    let target = clamp_zoom(config, target).ln();

    clamp_zoom(
        config,
        (current + (target - current) * config.pinch_smoothing).exp(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CameraConfig {
        CameraConfig::default()
    }

    #[test]
    fn single_focus_uses_default_distance() {
        let config = config();

        assert_eq!(
            camera_distance(&config, 1., ViewMode::SelfFocus, None),
            config.default_distance
        );
        assert_eq!(
            camera_distance(&config, 1., ViewMode::Overview, None),
            config.overview_distance
        );
    }

    #[test]
    fn zoom_divides_distance() {
        let config = config();
        let distance = camera_distance(&config, 2., ViewMode::SelfFocus, None);

        assert!((distance - config.default_distance / 2.).abs() < 1e-6);
    }

    #[test]
    fn pair_pulls_back_for_far_apart_points() {
        let config = config();
        let near = camera_distance(&config, 1., ViewMode::PairFocus, Some(0.3));
        let far = camera_distance(&config, 1., ViewMode::PairFocus, Some(2.5));
        let opposite = camera_distance(&config, 1., ViewMode::PairFocus, Some(std::f32::consts::PI));

        assert_eq!(near, config.default_distance);
        assert!(far > near);
        assert!(opposite <= config.pair_max_distance);
    }

    #[test]
    fn auto_zoom_eases_between_neighbours_and_antipodes() {
        let config = config();

        assert!((auto_zoom(&config, 0.) - 1.62).abs() < 1e-6);
        assert!((auto_zoom(&config, 150.) - 1.62).abs() < 1e-6);
        assert!((auto_zoom(&config, 9_000.) - 0.84).abs() < 1e-6);
        assert!((auto_zoom(&config, 12_000.) - 0.84).abs() < 1e-6);

        // Halfway in miles is well past halfway in zoom.
        let halfway = auto_zoom(&config, 4_575.);
        let expected = 1.62 - 0.5_f32.powf(0.68) * 0.78;
        assert!((halfway - expected).abs() < 1e-5);
        assert!(halfway < (1.62 + 0.84) / 2.);

        assert!((auto_zoom(&config, f32::NAN) - 1.62).abs() < 1e-6);
    }

    #[test]
    fn degenerate_zoom_is_clamped() {
        let config = config();

        for zoom in [0., -3., f32::INFINITY, f32::NEG_INFINITY, f32::NAN, 1e30] {
            let distance = camera_distance(&config, zoom, ViewMode::PairFocus, Some(3.));
            assert!(
                (config.min_distance..=config.max_distance).contains(&distance),
                "zoom {zoom} gave {distance}"
            );
        }
    }

    #[test]
    fn steps_are_log_uniform() {
        let config = config();

        let up = step_zoom(&config, 1., 1);
        let up_again = step_zoom(&config, up, 1);

        assert!((up - 1.25).abs() < 1e-5);
        assert!((up_again / up - up / 1.).abs() < 1e-5);
    }

    #[test]
    fn steps_round_trip() {
        let config = config();
        let mut zoom = 1.;

        for _ in 0..3 {
            zoom = step_zoom(&config, zoom, 1);
        }
        for _ in 0..3 {
            zoom = step_zoom(&config, zoom, -1);
        }

        assert!((zoom - 1.).abs() < 1e-5);
    }

    #[test]
    fn smoothing_approaches_target_geometrically() {
        let config = config();
        let mut zoom = 1.;

        for _ in 0..60 {
            zoom = smooth_zoom(&config, zoom, 2.);
        }
        assert!((zoom - 2.).abs() < 1e-3);

        let first = smooth_zoom(&config, 1., 2.);
        let expected = (2_f32.ln() * config.pinch_smoothing).exp();
        assert!((first - expected).abs() < 1e-5);
    }
}
