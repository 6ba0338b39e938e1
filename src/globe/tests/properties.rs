use common::GeoPoint;
use glam::{Quat, Vec3};
use globe::camera::{camera_distance, step_zoom};
use globe::config::{CameraConfig, OrientationConfig};
use globe::orientation::{base_orientation, compose, Focus};
use globe::route::{build_arc, revealed_prefix};
use globe::types::surface_position;
use globe::ViewMode;
use proptest::prelude::*;

fn geo_point() -> impl Strategy<Value = GeoPoint> {
    (-90_f32..=90., -180_f32..=180.).prop_map(|(lat, lon)| GeoPoint::new(lat, lon))
}

fn unit_quat() -> impl Strategy<Value = Quat> {
    (-1_f32..1., -1_f32..1., -1_f32..1., -1_f32..1.)
        .prop_filter("non-degenerate", |(x, y, z, w)| x * x + y * y + z * z + w * w > 1e-3)
        .prop_map(|(x, y, z, w)| Quat::from_xyzw(x, y, z, w).normalize())
}

fn view_mode() -> impl Strategy<Value = ViewMode> {
    prop_oneof![
        Just(ViewMode::PairFocus),
        Just(ViewMode::SelfFocus),
        Just(ViewMode::Overview),
    ]
}

proptest! {
    #[test]
    fn surface_positions_lie_on_the_sphere(point in geo_point(), radius in 0.1_f32..10.) {
        let position = surface_position(point, radius);

        prop_assert!((position.length() - radius).abs() < radius * 1e-5);
        prop_assert_eq!(position, surface_position(point, radius));
    }

    #[test]
    fn quaternion_inverse_cancels(q in unit_quat()) {
        prop_assert!((q * q.inverse()).normalize().abs_diff_eq(Quat::IDENTITY, 1e-5));
    }

    #[test]
    fn composed_orientation_is_unit(
        user in unit_quat(),
        point in geo_point(),
        angle in -100_f32..100.,
    ) {
        let base = base_orientation(
            &OrientationConfig::default(),
            &Focus::Single(surface_position(point, 1.)),
        );
        let composed = compose(user, base, angle);

        prop_assert!((base.length() - 1.).abs() < 1e-5);
        prop_assert!((composed.length() - 1.).abs() < 1e-5);
    }

    #[test]
    fn camera_distance_stays_in_bounds(
        zoom in prop_oneof![
            Just(0_f32),
            Just(f32::INFINITY),
            Just(f32::NEG_INFINITY),
            Just(f32::NAN),
            -10_f32..100.,
        ],
        mode in view_mode(),
        separation in proptest::option::of(0_f32..std::f32::consts::PI),
    ) {
        let config = CameraConfig::default();
        let distance = camera_distance(&config, zoom, mode, separation);

        prop_assert!(distance >= config.min_distance);
        prop_assert!(distance <= config.max_distance);
    }

    #[test]
    fn revealed_prefixes_grow_monotonically(
        from in geo_point(),
        to in geo_point(),
        a in 0.001_f32..0.999,
        b in 0.001_f32..0.999,
    ) {
        let (p1, p2) = if a <= b { (a, b) } else { (b, a) };
        let arc = build_arc(from, to, 1.01, 64, 0.08);

        let short = revealed_prefix(&arc, p1);
        let long = revealed_prefix(&arc, p2);

        prop_assert!(short.len() <= long.len());
        // Every committed point of the shorter prefix is shared.
        let committed = short.len() - 1;
        prop_assert_eq!(&short[..committed], &long[..committed]);
        prop_assert_eq!(revealed_prefix(&arc, 0.), vec![arc[0]]);
        prop_assert_eq!(revealed_prefix(&arc, 1.), arc.clone());
    }

    #[test]
    fn zoom_steps_round_trip(steps in 0_i32..3) {
        let config = CameraConfig::default();

        let zoomed = step_zoom(&config, 1., steps);
        let back = step_zoom(&config, zoomed, -steps);

        prop_assert!((back - 1.).abs() < 1e-4);
    }
}

#[test]
fn poles_sit_on_the_polar_axis() {
    for lon in [-180., -90., 0., 45., 180.] {
        let pole = surface_position(GeoPoint::new(90., lon), 1.);

        assert!(pole.abs_diff_eq(Vec3::Y, 1e-6), "{lon}: {pole}");
    }

    assert!(surface_position(GeoPoint::new(0., 0.), 1.).abs_diff_eq(Vec3::X, 1e-6));
}
