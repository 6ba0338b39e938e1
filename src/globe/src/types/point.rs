use common::GeoPoint;
use glam::{Quat, Vec3};

/// Dot products closer to ±1 than this count as (anti)parallel.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Map a coordinate onto a sphere of the given radius.
///
/// +Y is the polar axis, (0°, 0°) lands on +X and longitude grows towards -Z,
/// which lines the prime meridian up with the seam of an equirectangular
/// texture wrapped the usual way. Every conversion from [`GeoPoint`] in the
/// crate goes through here.
pub fn surface_position(point: GeoPoint, radius: f32) -> Vec3 {
    let lat = point.lat.to_radians();
    let lon = point.lon.to_radians();

    Vec3::new(
        radius * lat.cos() * lon.cos(),
        radius * lat.sin(),
        -radius * lat.cos() * lon.sin(),
    )
}

// cartesian to spherical coordinates
pub fn geo_point(position: Vec3) -> GeoPoint {
    let horizontal = (position.x * position.x + position.z * position.z).sqrt();

    if horizontal < 1.0e-10 {
        let lat = if position.y >= 0. { 90. } else { -90. };
        return GeoPoint::new(lat, 0.);
    }

    let lat = position.y.atan2(horizontal).to_degrees();
    let lon = (-position.z).atan2(position.x).to_degrees();

    GeoPoint::new(lat, lon)
}

/// Angle in radians between two directions, stable near 0 and π.
pub fn angular_separation(a: Vec3, b: Vec3) -> f32 {
    let cross = a.cross(b).length();
    let dot = a.dot(b);

    cross.atan2(dot)
}

/// Shortest rotation taking direction `from` onto direction `to`.
///
/// Parallel inputs give the identity. Opposite inputs turn half a circle
/// around some axis orthogonal to `from`, where the cross product would
/// otherwise vanish.
pub fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    let (Some(from), Some(to)) = (from.try_normalize(), to.try_normalize()) else {
        return Quat::IDENTITY;
    };

    let dot = from.dot(to).clamp(-1., 1.);

    if dot > 1. - PARALLEL_EPSILON {
        return Quat::IDENTITY;
    }

    if dot < -1. + PARALLEL_EPSILON {
        return Quat::from_axis_angle(from.any_orthonormal_vector(), std::f32::consts::PI);
    }

    let axis = from.cross(to).normalize();

    Quat::from_axis_angle(axis, dot.acos()).normalize()
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;

    #[test]
    fn equator_and_pole() {
        let origin = surface_position(GeoPoint::new(0., 0.), 1.);
        assert!(origin.abs_diff_eq(Vec3::X, 1e-6));

        for lon in [-180., -45., 0., 90., 137.] {
            let pole = surface_position(GeoPoint::new(90., lon), 1.);
            assert!(pole.x.abs() < 1e-6, "lon {lon}: {pole}");
            assert!(pole.z.abs() < 1e-6, "lon {lon}: {pole}");
            assert!((pole.y - 1.).abs() < 1e-6);
        }
    }

    #[test]
    fn east_is_minus_z() {
        let east = surface_position(GeoPoint::new(0., 90.), 2.);

        assert!(east.abs_diff_eq(Vec3::new(0., 0., -2.), 1e-5));
    }

    #[test]
    fn geo_point_inverts_surface_position() {
        let shanghai = GeoPoint::new(31.2304, 121.4737);
        let back = geo_point(surface_position(shanghai, 1.01));

        assert!((back.lat - shanghai.lat).abs() < 1e-3);
        assert!((back.lon - shanghai.lon).abs() < 1e-3);
    }

    #[test]
    fn separation() {
        assert!((angular_separation(Vec3::X, Vec3::Y) - FRAC_PI_2).abs() < 1e-6);
        assert!((angular_separation(Vec3::X, -Vec3::X) - PI).abs() < 1e-6);
        assert!(angular_separation(Vec3::Z, Vec3::Z * 3.).abs() < 1e-6);
    }

    #[test]
    fn rotation_between_maps_from_onto_to() {
        let from = Vec3::new(0.3, -0.8, 0.2).normalize();
        let rotation = rotation_between(from, Vec3::Z);

        assert!((rotation * from).abs_diff_eq(Vec3::Z, 1e-5));
        assert!((rotation.length() - 1.).abs() < 1e-6);
    }

    #[test]
    fn rotation_between_degenerate_inputs() {
        assert_eq!(rotation_between(Vec3::Z, Vec3::Z), Quat::IDENTITY);
        assert_eq!(rotation_between(Vec3::ZERO, Vec3::Z), Quat::IDENTITY);

        let flipped = rotation_between(-Vec3::Z, Vec3::Z);
        assert!(!flipped.is_nan());
        assert!((flipped * -Vec3::Z).abs_diff_eq(Vec3::Z, 1e-5));
    }
}
